//! CRDT (Conflict-free Replicated Data Type) implementation module.
//!
//! This module contains the LSEQ sequence-tree implementation and all
//! its supporting types and structures.

pub mod error;
pub mod node;
pub mod ops;
pub mod snapshot;
pub mod tree;
pub mod types;

// Re-export the main public API
pub use error::TreeError;
pub use node::{Node, SENTINEL_END_DIGIT, SENTINEL_START_DIGIT};
pub use ops::TreeIter;
pub use snapshot::{NodeSnapshot, TreeSnapshot};
pub use tree::{AllocationStrategy, DEFAULT_BOUNDARY, Tree};
pub use types::{Event, Identifier, Interval, Value, base_at};
