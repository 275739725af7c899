//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! through `dotenv`); command line flags override them.

use std::env;

pub const DEFAULT_NETWORK: &str = "192.168.0.0";
pub const DEFAULT_MASK: &str = "16";
pub const DEFAULT_BASE_URL: &str = "http://localhost/subnets.html";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base network used when nothing else is given.
    pub network: String,
    /// Base mask length used when nothing else is given.
    pub mask: String,
    /// Page the share link points at.
    pub base_url: String,
    /// Render addresses in dotted binary.
    pub binary: bool,
    /// Level for the fallback console logger.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            network: DEFAULT_NETWORK.to_string(),
            mask: DEFAULT_MASK.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            binary: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Read `SUBNET_CALC_*` variables from the process environment.
    pub fn from_env() -> Config {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            network: lookup("SUBNET_CALC_NETWORK").unwrap_or(defaults.network),
            mask: lookup("SUBNET_CALC_MASK").unwrap_or(defaults.mask),
            base_url: lookup("SUBNET_CALC_BASE_URL").unwrap_or(defaults.base_url),
            binary: lookup("SUBNET_CALC_BINARY")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.binary),
            log_level: lookup("SUBNET_CALC_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
