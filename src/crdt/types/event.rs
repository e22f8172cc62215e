//! Replicable mutation records exchanged between replicas.

use serde::{Deserialize, Serialize};

use crate::crdt::types::identifier::Identifier;
use crate::crdt::types::value::Value;

/// A single replicable mutation.
///
/// Events carry the identifier assigned by the originating replica, and
/// receivers replay them verbatim via [`Tree::apply`] without ever
/// re-deriving a position. Every replica that applies the same set of
/// events, in any order respecting ancestor-before-descendant delivery,
/// ends up with the same sequence.
///
/// [`Tree::apply`]: crate::crdt::tree::Tree::apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Insert { identifier: Identifier, value: Value },
    Delete { identifier: Identifier },
}

impl Event {
    pub fn insert(identifier: Identifier, value: Value) -> Self {
        Event::Insert { identifier, value }
    }

    pub fn delete(identifier: Identifier) -> Self {
        Event::Delete { identifier }
    }

    /// The identifier this event targets.
    pub fn identifier(&self) -> &Identifier {
        match self {
            Event::Insert { identifier, .. } => identifier,
            Event::Delete { identifier } => identifier,
        }
    }
}
