//! Domain models for the subnet calculator.
//!
//! - [`ipv4`] - IPv4 address math and the [`Ipv4`] CIDR value
//! - [`node`] - [`SubnetNode`], the binary division tree node
//! - [`label`] - [`Label`] palette and [`LabelMap`]

mod ipv4;
mod label;
mod node;

// Re-export public types
pub use ipv4::{
    address_count, format_address, format_binary, last_address, netmask, network_address,
    parse_address, parse_mask, usable_range, Ipv4, UsableRange, MAX_LENGTH,
};
pub use label::{Label, LabelMap, PALETTE};
pub use node::{Metrics, SubnetNode};
