//! Output formatting for the leaf table.
//!
//! - [`table`] - Column selection, terminal table and CSV
//! - [`terminal`] - Address, range and field formatting helpers

mod table;
mod terminal;

pub use table::{build_rows, header, render_csv, render_table, Column, Columns, TableRow};
pub use terminal::{format_addr, format_field, format_range};
