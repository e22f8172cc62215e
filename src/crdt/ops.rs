//! Positional editing on top of the tree: index-based insertion and
//! deletion, neighbor search, traversal, and remote event application.
//!
//! These operations translate between "linear index in the visible
//! sequence" and "identifier in the tree". Every local mutation returns
//! the events a caller forwards to other replicas; remote events are
//! replayed verbatim with [`Tree::apply`].

use tracing::debug;

use crate::crdt::error::TreeError;
use crate::crdt::node::Node;
use crate::crdt::tree::Tree;
use crate::crdt::types::{Event, Identifier, Value};

impl Tree {
    /// Inserts `value` so it becomes the `position`-th visible element.
    ///
    /// `position` must be in `0..=visible_node_count()`. Returns the
    /// events to forward to other replicas: usually one `Insert`, or
    /// three events when a front insert has to relocate a first node
    /// that sits on the minimal identifier for its depth.
    pub fn insert_at(&mut self, position: usize, value: Value) -> Result<Vec<Event>, TreeError> {
        let size = self.visible_node_count();
        if position > size {
            return Err(TreeError::PositionOutOfRange { position, size });
        }
        if position == 0 {
            return self.insert_at_front(value);
        }

        let left = self
            .node_at(position - 1)
            .ok_or(TreeError::NodeNotFound)?
            .identifier()
            .clone();
        let right = if position == size {
            self.sentinel_end_id()
        } else {
            self.node_at(position)
                .ok_or(TreeError::NodeNotFound)?
                .identifier()
                .clone()
        };

        let identifier = self.available_identifier_between(&left, &right)?;
        self.insert(identifier.clone(), value.clone())?;
        Ok(vec![Event::insert(identifier, value)])
    }

    fn insert_at_front(&mut self, value: Value) -> Result<Vec<Event>, TreeError> {
        let start = self.sentinel_start_id();
        let end = self.sentinel_end_id();

        let first = self
            .node_at(0)
            .map(|node| (node.identifier().clone(), node.value().cloned()));

        let Some((first_id, first_value)) = first else {
            // No visible elements yet: allocate between the sentinels.
            let identifier = self.available_identifier_between(&start, &end)?;
            self.insert(identifier.clone(), value.clone())?;
            return Ok(vec![Event::insert(identifier, value)]);
        };

        if has_left_headroom(&first_id) {
            let identifier = self.available_identifier_between(&start, &first_id)?;
            self.insert(identifier.clone(), value.clone())?;
            return Ok(vec![Event::insert(identifier, value)]);
        }

        // The first node sits on the minimal identifier for its depth,
        // leaving no room to its left. Relocate it: the new value and a
        // replacement carrying the old value are allocated against the
        // old node's visible successor, and the old node is tombstoned.
        let first_value = first_value.ok_or(TreeError::NodeNotFound)?;
        let successor = self.next_visible_identifier(&first_id)?;
        debug!(first = %first_id, "front of sequence exhausted, relocating first node");

        let new_id = self.available_identifier_between(&start, &successor)?;
        self.insert(new_id.clone(), value.clone())?;
        self.delete(&first_id);
        let replacement_id = self.available_identifier_between(&new_id, &successor)?;
        self.insert(replacement_id.clone(), first_value.clone())?;

        Ok(vec![
            Event::insert(new_id, value),
            Event::delete(first_id),
            Event::insert(replacement_id, first_value),
        ])
    }

    /// Tombstones the `position`-th visible element and returns the
    /// `Delete` event to forward.
    pub fn delete_at(&mut self, position: usize) -> Result<Event, TreeError> {
        let size = self.visible_node_count();
        if position >= size {
            return Err(TreeError::PositionOutOfRange { position, size });
        }
        let identifier = self
            .node_at(position)
            .ok_or(TreeError::NodeNotFound)?
            .identifier()
            .clone();
        self.delete(&identifier);
        Ok(Event::delete(identifier))
    }

    /// Replays a remote event verbatim, using the identifier carried in
    /// the event rather than re-deriving a position.
    ///
    /// Re-applying an `Insert` yields `IdentifierCollision`; replaying
    /// a `Delete` is idempotent.
    pub fn apply(&mut self, event: Event) -> Result<(), TreeError> {
        match event {
            Event::Insert { identifier, value } => self.insert(identifier, value),
            Event::Delete { identifier } => {
                self.delete(&identifier);
                Ok(())
            }
        }
    }

    /// The `position`-th visible node in sequence order.
    pub fn node_at(&self, position: usize) -> Option<&Node> {
        self.iter().filter(|node| node.is_visible()).nth(position)
    }

    /// The `position`-th visible node counting backward from the end
    /// (`0` is the last visible node), walking predecessors from the
    /// end sentinel.
    pub fn node_at_from_end(&self, position: usize) -> Option<&Node> {
        let mut identifier = self.sentinel_end_id();
        let mut remaining = position;
        loop {
            let previous = self.previous_node(&identifier).ok()??;
            if previous.is_visible() {
                if remaining == 0 {
                    return Some(previous);
                }
                remaining -= 1;
            }
            identifier = previous.identifier().clone();
        }
    }

    /// In-order successor of the node at `identifier`: its first child,
    /// or the nearest following sibling found while climbing.
    ///
    /// Returns `Ok(None)` past the last node and `NoSuchNeighbor` when
    /// the identifier cannot be resolved.
    pub fn next_node(&self, identifier: &Identifier) -> Result<Option<&Node>, TreeError> {
        let node = self
            .get(identifier)
            .ok_or_else(|| TreeError::NoSuchNeighbor(identifier.clone()))?;
        if let Some(child) = node.first_child() {
            return Ok(Some(child));
        }

        let mut current = identifier.clone();
        loop {
            let Some(parent_id) = current.parent() else {
                return Ok(None);
            };
            let digit = current
                .last_digit()
                .ok_or_else(|| TreeError::NoSuchNeighbor(identifier.clone()))?;
            let parent = self
                .get(&parent_id)
                .ok_or_else(|| TreeError::NoSuchNeighbor(identifier.clone()))?;
            if let Some(sibling) = parent.child_after(digit) {
                return Ok(Some(sibling));
            }
            current = parent_id;
        }
    }

    /// In-order predecessor of the node at `identifier`: the deepest
    /// last descendant of the preceding sibling, or the parent itself.
    ///
    /// Returns `Ok(None)` before the first node and `NoSuchNeighbor`
    /// when the identifier cannot be resolved.
    pub fn previous_node(&self, identifier: &Identifier) -> Result<Option<&Node>, TreeError> {
        if self.get(identifier).is_none() {
            return Err(TreeError::NoSuchNeighbor(identifier.clone()));
        }
        let Some(parent_id) = identifier.parent() else {
            return Ok(None);
        };
        let digit = identifier
            .last_digit()
            .ok_or_else(|| TreeError::NoSuchNeighbor(identifier.clone()))?;
        let parent = self
            .get(&parent_id)
            .ok_or_else(|| TreeError::NoSuchNeighbor(identifier.clone()))?;

        if let Some(sibling) = parent.child_before(digit) {
            return Ok(Some(deepest_descendant(sibling)));
        }
        if parent.is_root_node() {
            return Ok(None);
        }
        Ok(Some(parent))
    }

    fn next_visible_identifier(&self, identifier: &Identifier) -> Result<Identifier, TreeError> {
        let mut current = identifier.clone();
        while let Some(node) = self.next_node(&current)? {
            if node.is_visible() {
                return Ok(node.identifier().clone());
            }
            current = node.identifier().clone();
        }
        Ok(self.sentinel_end_id())
    }

    /// Depth-first, sorted-by-index traversal over every node,
    /// tombstones and sentinels included. Callers filter as needed.
    pub fn iter(&self) -> TreeIter<'_> {
        let mut stack: Vec<&Node> = self.root().children().collect();
        stack.reverse();
        TreeIter { stack }
    }

    /// Visible payloads in sequence order.
    pub fn to_values(&self) -> Vec<Value> {
        self.iter()
            .filter(|node| node.is_visible())
            .filter_map(|node| node.value().cloned())
            .collect()
    }

    /// Payloads in sequence order with tombstoned ones included, for
    /// debugging and replay inspection.
    pub fn to_values_with_tombstones(&self) -> Vec<Value> {
        self.iter()
            .filter(|node| !node.is_sentinel())
            .filter_map(|node| node.value().cloned())
            .collect()
    }

    /// Visible payloads concatenated into a string.
    pub fn to_text(&self) -> String {
        self.iter()
            .filter(|node| node.is_visible())
            .filter_map(|node| node.value())
            .map(ToString::to_string)
            .collect()
    }

    /// For debugging: prints every node including sentinels and
    /// tombstones.
    pub fn dump_nodes(&self) {
        println!("--- Tree Node Dump (boundary: {}) ---", self.boundary());
        for node in self.iter() {
            let status = if node.is_sentinel() {
                "SENTINEL"
            } else if node.is_deleted() {
                "DELETED"
            } else {
                "ACTIVE"
            };
            let value = node.value().map(ToString::to_string).unwrap_or_default();
            println!("{} -> '{}', Status: {}", node.identifier(), value, status);
        }
        println!("Content: '{}'", self.to_text());
        println!("------------------------------------");
    }
}

/// Room exists to the left of this identifier at its own depth: some
/// leading digit is non-zero, or the final digit is at least 2. An
/// identifier failing both tests is the minimal allocatable path of its
/// depth, and a front insert has to relocate it instead.
fn has_left_headroom(identifier: &Identifier) -> bool {
    match identifier.digits().split_last() {
        Some((last, leading)) => leading.iter().any(|&digit| digit != 0) || *last > 1,
        None => false,
    }
}

fn deepest_descendant(node: &Node) -> &Node {
    let mut current = node;
    while let Some(last) = current.last_child() {
        current = last;
    }
    current
}

/// Iterator behind [`Tree::iter`]: pre-order, children in ascending
/// digit order.
pub struct TreeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().rev());
        Some(node)
    }
}
