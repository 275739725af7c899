//! Error types for the subnet calculator.

/// Errors raised by address math, tree mutation and the share token codec.
///
/// Every variant is recoverable: a failing operation leaves the tree and
/// labels exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubnetError {
    /// Malformed address, mask or share link text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Mask outside 0..=32 or octet outside 0..=255.
    #[error("out of range: {0}")]
    Range(String),

    /// Divide of a /32, join of a leaf, or a subnet that names no node.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Truncated shape string or token that references missing bits.
    #[error("codec error: {0}")]
    Codec(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SubnetError>;
