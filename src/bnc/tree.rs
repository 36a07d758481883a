//! Search nodes and the arena-backed work list.

use super::cut::CutId;
use super::types::NodeSelection;
use crate::graph::EdgeId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One node of the branch-and-cut tree.
#[derive(Debug, Clone)]
pub(crate) struct SearchNode {
    /// Lower bound inherited from the parent's relaxation.
    pub(crate) bound: f64,
    pub(crate) depth: usize,
    /// Branching decisions: edge forced in (`true`) or out (`false`).
    pub(crate) fixings: Vec<(EdgeId, bool)>,
    /// Cuts active in the parent's final relaxation.
    pub(crate) cuts: Vec<CutId>,
    /// Parent's fractional edges, used to branch if this node's LP fails.
    pub(crate) parent_point: Vec<(EdgeId, f64)>,
}

impl SearchNode {
    pub(crate) fn root() -> Self {
        Self {
            bound: f64::NEG_INFINITY,
            depth: 0,
            fixings: Vec::new(),
            cuts: Vec::new(),
            parent_point: Vec::new(),
        }
    }

    /// Child with `edge` fixed to `value` on top of this node's fixings.
    pub(crate) fn child(
        &self,
        edge: EdgeId,
        value: bool,
        bound: f64,
        cuts: &[CutId],
        point: &[(EdgeId, f64)],
    ) -> Self {
        let mut fixings = self.fixings.clone();
        fixings.push((edge, value));
        Self {
            bound,
            depth: self.depth + 1,
            fixings,
            cuts: cuts.to_vec(),
            parent_point: point.to_vec(),
        }
    }

    pub(crate) fn fixing(&self, edge: EdgeId) -> Option<bool> {
        self.fixings
            .iter()
            .rev()
            .find(|&&(e, _)| e == edge)
            .map(|&(_, v)| v)
    }
}

/// Heap entry. Larger compares as higher priority.
struct Entry {
    primary: f64,
    secondary: f64,
    seq: u64,
    slot: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| self.secondary.total_cmp(&other.secondary))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Open nodes stored in an indexed arena, ordered by a binary heap.
pub(crate) struct WorkList {
    selection: NodeSelection,
    arena: Vec<Option<SearchNode>>,
    free: Vec<usize>,
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl WorkList {
    pub(crate) fn new(selection: NodeSelection) -> Self {
        Self {
            selection,
            arena: Vec::new(),
            free: Vec::new(),
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub(crate) fn push(&mut self, node: SearchNode) {
        let (primary, secondary) = match self.selection {
            NodeSelection::BestBound => (-node.bound, node.depth as f64),
            NodeSelection::DepthFirst => (node.depth as f64, -node.bound),
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.arena[slot] = Some(node);
                slot
            }
            None => {
                self.arena.push(Some(node));
                self.arena.len() - 1
            }
        };
        self.heap.push(Entry {
            primary,
            secondary,
            seq: self.seq,
            slot,
        });
        self.seq += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<SearchNode> {
        let entry = self.heap.pop()?;
        let node = self.arena[entry.slot].take();
        self.free.push(entry.slot);
        node
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest bound among open nodes.
    pub(crate) fn min_bound(&self) -> Option<f64> {
        self.arena
            .iter()
            .flatten()
            .map(|node| node.bound)
            .min_by(|a, b| a.total_cmp(b))
    }
}
