//! Leaf table rendering.
//!
//! One row per leaf subnet, in address order, with optional columns.

use super::terminal::{format_addr, format_field, format_range, paint_label};
use crate::error::{Result, SubnetError};
use crate::models::Label;
use crate::processing::Session;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Optional table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Subnet,
    Netmask,
    Network,
    Broadcast,
    Range,
    Useable,
    Hosts,
    HostsUsable,
    Join,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Subnet,
        Column::Netmask,
        Column::Network,
        Column::Broadcast,
        Column::Range,
        Column::Useable,
        Column::Hosts,
        Column::HostsUsable,
        Column::Join,
    ];

    /// Identifier used on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Column::Subnet => "subnet",
            Column::Netmask => "netmask",
            Column::Network => "network",
            Column::Broadcast => "broadcast",
            Column::Range => "range",
            Column::Useable => "useable",
            Column::Hosts => "hosts",
            Column::HostsUsable => "hostsUsable",
            Column::Join => "join",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Subnet => "Subnet address",
            Column::Netmask => "Netmask",
            Column::Network => "Network",
            Column::Broadcast => "Broadcast",
            Column::Range => "Range of addresses",
            Column::Useable => "Useable IPs",
            Column::Hosts => "Hosts",
            Column::HostsUsable => "Usable hosts",
            Column::Join => "Join",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Column {
    type Err = SubnetError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace(['-', '_'], "");
        Column::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                SubnetError::Parse(format!(
                    "unknown column '{s}', expected one of {}",
                    Column::ALL.iter().join(", ")
                ))
            })
    }
}

/// Visible column set. Everything is shown unless hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    hidden: BTreeSet<Column>,
}

impl Columns {
    pub fn is_visible(&self, column: Column) -> bool {
        !self.hidden.contains(&column)
    }

    pub fn hide(&mut self, column: Column) {
        self.hidden.insert(column);
    }

    pub fn show(&mut self, column: Column) {
        self.hidden.remove(&column);
    }

    /// Flip a column, returning whether it is now visible.
    pub fn toggle(&mut self, column: Column) -> bool {
        if self.hidden.remove(&column) {
            true
        } else {
            self.hidden.insert(column);
            false
        }
    }

    pub fn visible(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.is_visible(*c))
            .collect()
    }
}

/// A rendered leaf row: its label and the visible cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub label: Option<Label>,
    pub cells: Vec<String>,
}

/// Header cells for the visible columns, label column first.
pub fn header(session: &Session) -> Vec<String> {
    std::iter::once("Label".to_string())
        .chain(
            session
                .display
                .columns
                .visible()
                .into_iter()
                .map(|c| c.title().to_string()),
        )
        .collect()
}

/// Plain text rows for every leaf of the session's tree.
pub fn build_rows(session: &Session) -> Result<Vec<TableRow>> {
    let binary = session.display.binary_format;
    let columns = session.display.columns.visible();
    let tree = session.tree();

    tree.leaves()?
        .into_iter()
        .map(|row| -> Result<TableRow> {
            let mut cells = Vec::with_capacity(columns.len());
            for column in &columns {
                let cell = match column {
                    Column::Subnet => {
                        format!("{}/{}", format_addr(row.network(), binary), row.subnet.mask)
                    }
                    Column::Netmask => format_addr(row.netmask, binary),
                    Column::Network => format_addr(row.network(), binary),
                    Column::Broadcast => format_addr(row.broadcast(), binary),
                    Column::Range => format_range(row.network(), row.broadcast(), binary),
                    Column::Useable => format_range(row.usable_first, row.usable_last, binary),
                    Column::Hosts => row.total_addresses.to_string(),
                    Column::HostsUsable => row.usable_host_count.to_string(),
                    // innermost first, like the join cells of the web page
                    Column::Join => tree
                        .join_groups(&row.subnet)?
                        .iter()
                        .rev()
                        .map(|g| format!("/{}", g.subnet.mask))
                        .join(" "),
                };
                cells.push(cell);
            }
            Ok(TableRow {
                label: session.labels().get(&row.key()).cloned(),
                cells,
            })
        })
        .collect()
}

/// Aligned terminal table with coloured labels.
pub fn render_table(session: &Session) -> Result<String> {
    let titles = header(session);
    let rows = build_rows(session)?;

    let mut widths: Vec<usize> = titles.iter().map(|h| h.len()).collect();
    for row in &rows {
        let name_len = row.label.as_ref().map_or(0, |l| l.name.len());
        widths[0] = widths[0].max(name_len);
        for (i, cell) in row.cells.iter().enumerate() {
            widths[i + 1] = widths[i + 1].max(cell.len());
        }
    }

    let mut out = String::new();
    let line = titles
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:<w$}"))
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');

    for row in &rows {
        let name = row.label.as_ref().map_or("", |l| l.name.as_str());
        let padded = format!("{name:<w$}", w = widths[0]);
        let label_cell = match &row.label {
            Some(label) => paint_label(&padded, label).to_string(),
            None => padded,
        };
        let cells = row
            .cells
            .iter()
            .zip(&widths[1..])
            .map(|(c, &w)| format!("{c:<w$}"))
            .join("  ");
        out.push_str(format!("{label_cell}  {cells}").trim_end());
        out.push('\n');
    }
    Ok(out)
}

/// Quoted CSV, one line per leaf.
pub fn render_csv(session: &Session) -> Result<String> {
    let mut out = header(session)
        .iter()
        .map(|h| format_field(h, 0))
        .join(",");
    out.push('\n');
    for row in build_rows(session)? {
        let name = row.label.map(|l| l.name).unwrap_or_default();
        let line = std::iter::once(format_field(name, 0))
            .chain(row.cells.iter().map(|c| format_field(c, 0)))
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
