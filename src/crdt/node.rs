//! Node definition and the sentinel bounds of the editable range.
//!
//! Each node owns its children exclusively; a child is reachable only
//! through its parent, so the tree is a plain ownership hierarchy with
//! no shared references.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Values;
use std::ops::Bound;

use chrono::{DateTime, Utc};

use crate::crdt::types::{Identifier, Value, base_at};

/// Root child index of the permanent start bound.
pub const SENTINEL_START_DIGIT: u32 = 0;
/// Root child index of the permanent end bound, `base_at(0) - 1`.
pub const SENTINEL_END_DIGIT: u32 = 15;

/// A vertex of the sequence tree.
///
/// Carries its identifier, an optional payload (the root and the two
/// sentinels have none), the branching factor for its children, the
/// children themselves keyed by digit, and an optional tombstone
/// timestamp.
///
/// # Tombstone deletion
///
/// Nodes are never physically removed. Deletion sets `deleted_at`,
/// which hides the node from visible traversal while keeping it in
/// place so neighbor lookups and identifier allocation stay correct.
#[derive(Debug, Clone)]
pub struct Node {
    identifier: Identifier,
    value: Option<Value>,
    base: u32,
    children: BTreeMap<u32, Node>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Node {
    /// Creates a node; the branching factor for its children is derived
    /// from the identifier's depth.
    pub fn new(identifier: Identifier, value: Option<Value>) -> Self {
        let base = base_at(identifier.len());
        Node {
            identifier,
            value,
            base,
            children: BTreeMap::new(),
            deleted_at: None,
        }
    }

    /// Creates the tree root: empty path, no value, two sentinel
    /// children bounding the valid insertion range.
    pub fn root() -> Self {
        let mut root = Node::new(Identifier::root(), None);
        root.attach(SENTINEL_START_DIGIT, Node::sentinel_start());
        root.attach(SENTINEL_END_DIGIT, Node::sentinel_end());
        root
    }

    /// Creates the start bound node. Every identifier allocated for a
    /// value sorts after it.
    pub fn sentinel_start() -> Self {
        Node::new(Identifier::new(vec![SENTINEL_START_DIGIT]), None)
    }

    /// Creates the end bound node. Every identifier allocated for a
    /// value sorts before it.
    pub fn sentinel_end() -> Self {
        Node::new(Identifier::new(vec![SENTINEL_END_DIGIT]), None)
    }

    pub(crate) fn restore(
        identifier: Identifier,
        value: Option<Value>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut node = Node::new(identifier, value);
        node.deleted_at = deleted_at;
        node
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Branching factor for this node's children.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_root_node(&self) -> bool {
        self.identifier.is_empty()
    }

    /// True for the two permanent bound nodes under the root.
    pub fn is_sentinel(&self) -> bool {
        self.identifier.len() == 1
            && matches!(
                self.identifier.last_digit(),
                Some(SENTINEL_START_DIGIT) | Some(SENTINEL_END_DIGIT)
            )
    }

    /// True when the node holds a live, user-visible payload.
    pub fn is_visible(&self) -> bool {
        self.value.is_some() && !self.is_deleted() && !self.is_sentinel()
    }

    /// Whether any non-sentinel child exists directly under this node,
    /// optionally ignoring tombstoned ones.
    pub fn has_children(&self, skip_tombstoned: bool) -> bool {
        self.children
            .values()
            .any(|child| !child.is_sentinel() && !(skip_tombstoned && child.is_deleted()))
    }

    /// Marks this node as deleted. Idempotent: the first deletion
    /// timestamp is kept.
    pub fn delete(&mut self) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(Utc::now());
        }
    }

    pub fn child(&self, digit: u32) -> Option<&Node> {
        self.children.get(&digit)
    }

    pub(crate) fn child_mut(&mut self, digit: u32) -> Option<&mut Node> {
        self.children.get_mut(&digit)
    }

    pub(crate) fn attach(&mut self, digit: u32, child: Node) {
        self.children.insert(digit, child);
    }

    /// Children in ascending digit order.
    pub fn children(&self) -> Values<'_, u32, Node> {
        self.children.values()
    }

    pub(crate) fn children_with_digits(&self) -> impl Iterator<Item = (u32, &Node)> {
        self.children.iter().map(|(&digit, child)| (digit, child))
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.values().next()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.values().next_back()
    }

    /// The next sibling after child slot `digit`, if any.
    pub fn child_after(&self, digit: u32) -> Option<&Node> {
        self.children
            .range((Bound::Excluded(digit), Bound::Unbounded))
            .map(|(_, child)| child)
            .next()
    }

    /// The last sibling before child slot `digit`, if any.
    pub fn child_before(&self, digit: u32) -> Option<&Node> {
        self.children.range(..digit).map(|(_, child)| child).next_back()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}
