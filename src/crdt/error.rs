//! Error taxonomy for tree and positional operations.
//!
//! Every failure is local and synchronous; nothing is retried inside
//! the core beyond the bounded allocation loop. Callers decide whether
//! to surface, retry at a higher level, or treat an error as fatal.

use thiserror::Error;

use crate::crdt::types::Identifier;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A digit is out of range for its depth, or an identifier is empty
    /// where at least one digit is required.
    #[error("identifier has a digit out of range for its depth, or is empty")]
    InvalidIdentifier,

    /// An insert targeted an already-occupied identifier. On remote
    /// apply this is the signal that the sender has to reallocate.
    #[error("a node already exists at identifier {0}")]
    IdentifierCollision(Identifier),

    /// An insert arrived before the insert of its parent path. The
    /// transport is expected to deliver ancestors first.
    #[error("parent path of identifier {0} does not exist yet")]
    OutOfOrderInsert(Identifier),

    #[error("position {position} is outside the valid range for size {size}")]
    PositionOutOfRange { position: usize, size: usize },

    #[error("no node exists at the requested position")]
    NodeNotFound,

    #[error("no neighbor could be resolved for identifier {0}")]
    NoSuchNeighbor(Identifier),

    /// The depth search for a free slot between two neighbors exceeded
    /// its iteration cap.
    #[error("no depth with room for a new identifier within the search cap")]
    UnableToDetermineDepth,

    /// The allocation retry loop exceeded its iteration cap.
    #[error("identifier allocation exceeded its retry limit")]
    UnableToAllocate,

    /// An interval was requested between prefixes of unequal length, or
    /// with the left prefix not strictly less than the right one.
    #[error("left prefix must be strictly less than right prefix and of equal length")]
    InvalidPrefixOrder,
}
