//! Visual subnet calculator.
//!
//! Recursively divides an IPv4 network into a binary tree of subnets and
//! persists the division as a short token for share links.
//!
//! # Modules
//! - [`models`] - Address math, tree nodes and labels
//! - [`processing`] - Division tree, share token codec and session
//! - [`output`] - Table and CSV rendering
//! - [`config`] - Environment configuration

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use error::{Result, SubnetError};
