//! CLI argument parsing types using `clap`.

use clap::{Parser, ValueEnum};
use subnet_calc::models::Ipv4;
use subnet_calc::output::Column;

/// Visual subnet calculator: divide a network and share the result
#[derive(Parser, Debug)]
#[command(name = "subnet-calc")]
#[command(author, version, about = "Divide an IPv4 network into subnets")]
pub struct Cli {
    /// Base network address, e.g. 10.0.0.0
    #[arg(short, long)]
    pub network: Option<String>,

    /// Base mask length, 0-32
    #[arg(short, long)]
    pub mask: Option<String>,

    /// Division token from a share link, e.g. 3.1
    #[arg(short, long)]
    pub division: Option<String>,

    /// Restore everything from a share link
    #[arg(short, long)]
    pub link: Option<String>,

    /// Divide the leaf at this subnet (repeatable, applied in order)
    #[arg(long, value_name = "CIDR")]
    pub divide: Vec<Ipv4>,

    /// Join the subnet back into one leaf (repeatable)
    #[arg(long, value_name = "CIDR")]
    pub join: Vec<Ipv4>,

    /// Label a leaf, e.g. 10.0.0.0/25=A (repeatable)
    #[arg(long, value_name = "CIDR=NAME", value_parser = parse_label)]
    pub label: Vec<(Ipv4, String)>,

    /// Show addresses in dotted binary
    #[arg(short, long)]
    pub binary: bool,

    /// Hide a column (repeatable)
    #[arg(long, value_name = "COLUMN")]
    pub hide: Vec<Column>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Page the share link points at
    #[arg(long)]
    pub base_url: Option<String>,

    /// Reset divisions without asking when the base changes
    #[arg(short, long)]
    pub yes: bool,
}

/// Output format for the leaf table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
}

/// Split `CIDR=NAME`.
fn parse_label(s: &str) -> Result<(Ipv4, String), String> {
    let (cidr, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CIDR=NAME, got '{s}'"))?;
    let subnet = cidr.parse::<Ipv4>().map_err(|e| e.to_string())?;
    Ok((subnet, name.trim().to_string()))
}
