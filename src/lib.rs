//! # LSEQ sequence-tree CRDT
//!
//! A Conflict-free Replicated Data Type (CRDT) for ordered sequences,
//! suitable for collaborative editing: per-character text content and
//! per-block child ordering share the identical data structure.
//!
//! ## Features
//!
//! - **Conflict-free**: independent replicas insert and delete without
//!   coordination and converge once they exchange events
//! - **Bounded identifier growth**: per-depth boundary+/boundary−
//!   allocation keeps identifiers short even under repeated insertion
//!   at the same edge
//! - **Tombstone-based deletion**: deleted elements keep their place so
//!   neighbor lookups and later insertions stay well-defined
//! - **Stable wire formats**: events and full-tree snapshots serialize
//!   with serde
//!
//! ## Example
//!
//! ```rust
//! use crdt_lseq::Tree;
//!
//! let mut tree = Tree::new();
//! let events = tree.insert_at(0, 'a'.into()).unwrap();
//! tree.insert_at(1, 'b'.into()).unwrap();
//!
//! assert_eq!(tree.to_text(), "ab");
//! assert_eq!(events.len(), 1);
//! ```

pub mod crdt;

// Re-export the main public API from the CRDT module
pub use crdt::{AllocationStrategy, DEFAULT_BOUNDARY, Tree, TreeError, TreeIter};
pub use crdt::{Event, Identifier, Interval, Value, base_at};
pub use crdt::{Node, NodeSnapshot, SENTINEL_END_DIGIT, SENTINEL_START_DIGIT, TreeSnapshot};
