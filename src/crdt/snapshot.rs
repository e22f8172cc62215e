//! Serializable snapshots for persistence and full-state transfer.
//!
//! A snapshot is the one wire layout the crate keeps stable:
//! `{ boundary, rootNode }` with recursively nested nodes. Allocation
//! strategies are replica-local state and deliberately absent; a
//! restored tree re-chooses its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crdt::error::TreeError;
use crate::crdt::node::{Node, SENTINEL_END_DIGIT, SENTINEL_START_DIGIT};
use crate::crdt::tree::Tree;
use crate::crdt::types::{Identifier, Value};

/// Full-tree wire representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub boundary: u32,
    pub root_node: NodeSnapshot,
}

/// Recursive node wire representation. Children are `(index, node)`
/// pairs in ascending index order; `deletedAt` is omitted for live
/// nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub identifier: Identifier,
    pub value: Option<Value>,
    pub base: u32,
    pub children: Vec<(u32, NodeSnapshot)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tree {
    /// Serializable copy of the whole tree, tombstones included.
    pub fn to_snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            boundary: self.boundary(),
            root_node: snapshot_node(self.root()),
        }
    }

    /// Reconstructs a tree from a snapshot.
    ///
    /// Validates digit ranges, parent/child identifier consistency, and
    /// the presence of both sentinels; malformed input yields
    /// `InvalidIdentifier`.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Tree, TreeError> {
        if !snapshot.root_node.identifier.is_empty() {
            return Err(TreeError::InvalidIdentifier);
        }
        let root = restore_node(snapshot.root_node)?;
        if root.child(SENTINEL_START_DIGIT).is_none() || root.child(SENTINEL_END_DIGIT).is_none() {
            return Err(TreeError::InvalidIdentifier);
        }
        Ok(Tree::from_parts(root, snapshot.boundary))
    }
}

fn snapshot_node(node: &Node) -> NodeSnapshot {
    NodeSnapshot {
        identifier: node.identifier().clone(),
        value: node.value().cloned(),
        base: node.base(),
        children: node
            .children_with_digits()
            .map(|(digit, child)| (digit, snapshot_node(child)))
            .collect(),
        deleted_at: node.deleted_at(),
    }
}

fn restore_node(snapshot: NodeSnapshot) -> Result<Node, TreeError> {
    if !snapshot.identifier.is_empty() {
        snapshot.identifier.validate()?;
    }
    let mut node = Node::restore(
        snapshot.identifier,
        snapshot.value,
        snapshot.deleted_at,
    );
    for (digit, child_snapshot) in snapshot.children {
        if child_snapshot.identifier != node.identifier().child(digit) {
            return Err(TreeError::InvalidIdentifier);
        }
        node.attach(digit, restore_node(child_snapshot)?);
    }
    Ok(node)
}
