//! Subnet division logic.
//!
//! - [`codec`] - Share token packing of tree shapes
//! - [`tree`] - The division tree rooted at a base network
//! - [`session`] - Tree, labels and display settings of one user

mod codec;
mod session;
mod tree;

// Re-export public functions
pub use codec::{pack, unpack};
pub use session::{BaseChange, DisplaySettings, Session, UpdateOutcome};
pub use tree::{build_tree, traverse_leaves, BuildOutcome, JoinGroup, LeafRow, Tree};
