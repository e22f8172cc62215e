//! Core sequence-tree implementation: node storage and the identifier
//! allocation algorithm.
//!
//! This module contains the [`Tree`] struct and its structural
//! operations. The tree is a conflict-free replicated data type for
//! ordered sequences: every element carries a path identifier, and the
//! total order over identifiers is the order of the sequence.
//!
//! # Design
//!
//! - Digit-path identifiers with a branching factor that doubles per
//!   depth, starting at 16
//! - Per-depth boundary+/boundary− allocation, chosen at random and
//!   memoized, which keeps identifier growth balanced under repeated
//!   insertion at the same edge
//! - Tombstone-based deletion for consistency
//! - Permanent sentinel children of the root bounding the valid range
//! - Exclusive ownership: one logical owner mutates a tree; replicas
//!   converge by exchanging events, not by sharing memory

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, trace};

use crate::crdt::error::TreeError;
use crate::crdt::node::{Node, SENTINEL_END_DIGIT, SENTINEL_START_DIGIT};
use crate::crdt::types::{Identifier, Interval, Value};

/// Default maximum random step when allocating between two neighbors.
pub const DEFAULT_BOUNDARY: u32 = 10;

/// Cap on the depth search for a free slot between two neighbors.
const MAX_DEPTH_SEARCH: usize = 20;

/// Cap on reallocation attempts after identifier collisions.
const MAX_ALLOC_ATTEMPTS: usize = 100;

/// Per-depth allocation bias.
///
/// `BoundaryPlus` allocates a new identifier by adding a random step to
/// the left neighbor's prefix at the chosen depth; `BoundaryMinus`
/// subtracts from the right neighbor's prefix. The choice is made
/// uniformly at random the first time a depth is used and memoized for
/// the lifetime of the tree, so growth patterns at a depth stay
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationStrategy {
    BoundaryPlus,
    BoundaryMinus,
}

/// The sequence tree CRDT.
///
/// Owns the root node (with its two permanent sentinel children), the
/// per-depth allocation-strategy cache, and the boundary parameter
/// controlling identifier growth.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Node,
    strategies: BTreeMap<usize, AllocationStrategy>,
    boundary: u32,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Tree {
    /// Creates an empty tree with the default boundary.
    pub fn new() -> Self {
        Tree::with_boundary(DEFAULT_BOUNDARY)
    }

    /// Creates an empty tree with an explicit boundary.
    pub fn with_boundary(boundary: u32) -> Self {
        Tree {
            root: Node::root(),
            strategies: BTreeMap::new(),
            boundary,
        }
    }

    pub(crate) fn from_parts(root: Node, boundary: u32) -> Self {
        Tree {
            root,
            strategies: BTreeMap::new(),
            boundary,
        }
    }

    pub fn boundary(&self) -> u32 {
        self.boundary
    }

    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    /// Identifier of the permanent start bound.
    pub fn sentinel_start_id(&self) -> Identifier {
        Identifier::new(vec![SENTINEL_START_DIGIT])
    }

    /// Identifier of the permanent end bound.
    pub fn sentinel_end_id(&self) -> Identifier {
        Identifier::new(vec![SENTINEL_END_DIGIT])
    }

    /// Resolves a node by descending the identifier's digit path.
    pub fn get(&self, identifier: &Identifier) -> Option<&Node> {
        let mut current = &self.root;
        for &digit in identifier.digits() {
            current = current.child(digit)?;
        }
        Some(current)
    }

    fn get_mut(&mut self, identifier: &Identifier) -> Option<&mut Node> {
        let mut current = &mut self.root;
        for &digit in identifier.digits() {
            current = current.child_mut(digit)?;
        }
        Some(current)
    }

    /// Inserts a value at an exact identifier.
    ///
    /// The identifier's parent path must already exist
    /// (`OutOfOrderInsert` otherwise) and the final slot must be empty
    /// (`IdentifierCollision` otherwise).
    pub fn insert(&mut self, identifier: Identifier, value: Value) -> Result<(), TreeError> {
        identifier.validate()?;
        let digits = identifier.digits().to_vec();
        let last = digits[digits.len() - 1];

        let mut current = &mut self.root;
        for &digit in &digits[..digits.len() - 1] {
            current = match current.child_mut(digit) {
                Some(child) => child,
                None => return Err(TreeError::OutOfOrderInsert(identifier.clone())),
            };
        }
        if current.child(last).is_some() {
            return Err(TreeError::IdentifierCollision(identifier.clone()));
        }
        current.attach(last, Node::new(identifier, Some(value)));
        Ok(())
    }

    /// Applies a list of exact-identifier inserts in order, stopping at
    /// the first failure.
    pub fn insert_many<I>(&mut self, entries: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = (Identifier, Value)>,
    {
        for (identifier, value) in entries {
            self.insert(identifier, value)?;
        }
        Ok(())
    }

    /// Tombstones the node at `identifier`.
    ///
    /// Returns `true` when a node was resolved (idempotently for
    /// already-deleted nodes); a missing node, the root, or a sentinel
    /// is a no-op.
    pub fn delete(&mut self, identifier: &Identifier) -> bool {
        match self.get_mut(identifier) {
            Some(node) if !node.is_sentinel() && !node.is_root_node() => {
                node.delete();
                true
            }
            _ => false,
        }
    }

    /// Number of visible (non-sentinel, non-tombstoned) nodes.
    pub fn visible_node_count(&self) -> usize {
        Self::count_subtree(&self.root, true)
    }

    /// Number of non-sentinel nodes including tombstones.
    pub fn total_node_count(&self) -> usize {
        Self::count_subtree(&self.root, false)
    }

    fn count_subtree(node: &Node, skip_tombstoned: bool) -> usize {
        node.children()
            .map(|child| {
                let counted =
                    usize::from(!child.is_sentinel() && !(skip_tombstoned && child.is_deleted()));
                counted + Self::count_subtree(child, skip_tombstoned)
            })
            .sum()
    }

    /// Allocates a fresh identifier strictly between two existing ones.
    ///
    /// Finds the shallowest depth with room between the neighbors,
    /// steps off one of them according to the depth's memoized
    /// strategy, and retries with a narrowed right bound whenever the
    /// produced identifier is already taken. When the produced
    /// identifier's parent path does not fully exist, the shallowest
    /// missing ancestor slot is used instead, which keeps parent paths
    /// intact for replicas applying the resulting event.
    pub fn available_identifier_between(
        &mut self,
        left: &Identifier,
        right: &Identifier,
    ) -> Result<Identifier, TreeError> {
        let mut right_bound = right.clone();
        for _ in 0..MAX_ALLOC_ATTEMPTS {
            let (depth, interval) = Self::shallow_insert_depth(left, &right_bound)?;
            let candidate = self.step_between(left, &right_bound, depth, &interval)?;
            match self.first_free_depth(&candidate) {
                Some(free_depth) if free_depth + 1 == candidate.len() => {
                    debug!(identifier = %candidate, depth, "allocated identifier");
                    return Ok(candidate);
                }
                Some(free_depth) => {
                    let resolved = candidate.prefix(free_depth + 1);
                    debug_assert!(&resolved > left && resolved < right_bound);
                    debug!(identifier = %resolved, "allocated identifier at missing ancestor");
                    return Ok(resolved);
                }
                None => {
                    trace!(identifier = %candidate, "allocation collision, narrowing search");
                    right_bound = candidate;
                }
            }
        }
        Err(TreeError::UnableToAllocate)
    }

    /// Finds the shallowest depth at which the two neighbors' prefixes
    /// leave room for a new sibling.
    ///
    /// Equal prefixes at a depth mean the neighbors share that ancestor
    /// path and the search descends; the search is capped to keep a
    /// malformed neighbor pair from looping forever.
    fn shallow_insert_depth(
        left: &Identifier,
        right: &Identifier,
    ) -> Result<(usize, Interval), TreeError> {
        for depth in 1..=MAX_DEPTH_SEARCH {
            let left_prefix = left.prefix(depth);
            let right_prefix = right.prefix(depth);
            if left_prefix == right_prefix {
                continue;
            }
            let interval = Interval::between(&left_prefix, &right_prefix)?;
            if !interval.is_zero() {
                return Ok((depth, interval));
            }
        }
        Err(TreeError::UnableToDetermineDepth)
    }

    fn step_between(
        &mut self,
        left: &Identifier,
        right: &Identifier,
        depth: usize,
        interval: &Interval,
    ) -> Result<Identifier, TreeError> {
        // The step stays within the deepest digit's radix so the
        // multi-radix arithmetic below is always representable.
        let cap = u64::from(crate::crdt::types::base_at(depth - 1) - 1);
        let bound = interval
            .magnitude()
            .min(u64::from(self.boundary))
            .min(cap)
            .max(1);
        let step = rand::thread_rng().gen_range(1..=bound) as u32;
        match self.strategy_at(depth) {
            AllocationStrategy::BoundaryPlus => left.prefix(depth).add(step),
            AllocationStrategy::BoundaryMinus => right.prefix(depth).subtract(step),
        }
    }

    fn strategy_at(&mut self, depth: usize) -> AllocationStrategy {
        if let Some(&strategy) = self.strategies.get(&depth) {
            return strategy;
        }
        let strategy = if rand::thread_rng().gen_bool(0.5) {
            AllocationStrategy::BoundaryPlus
        } else {
            AllocationStrategy::BoundaryMinus
        };
        trace!(depth, ?strategy, "memoized allocation strategy");
        self.strategies.insert(depth, strategy);
        strategy
    }

    /// Depth of the first missing node along the identifier's path, or
    /// `None` when every node on the path (the identifier included)
    /// already exists.
    fn first_free_depth(&self, identifier: &Identifier) -> Option<usize> {
        let mut current = &self.root;
        for (depth, &digit) in identifier.digits().iter().enumerate() {
            match current.child(digit) {
                Some(child) => current = child,
                None => return Some(depth),
            }
        }
        None
    }
}
