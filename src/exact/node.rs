//! Search tree storage for the branch-and-bound.
//!
//! Nodes are immutable once built. Branching copies the parent's visited set,
//! adds one stop and allocates a new node in the arena. The parent link is only
//! used to rebuild the stop order of a route.

use crate::instance::DEPOT;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const WORD_BITS: usize = 64;

/// Fixed-size bitset over stop indices
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisitedSet {
    words: Vec<u64>,
}

impl VisitedSet {
    /// Empty set able to hold indices `0..dimension`
    pub fn new(dimension: usize) -> Self {
        VisitedSet {
            words: vec![0; dimension.div_ceil(WORD_BITS).max(1)],
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .map_or(false, |w| w & (1u64 << (index % WORD_BITS)) != 0)
    }

    #[inline]
    pub fn insert(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Copy of this set with `index` added
    pub fn with(&self, index: usize) -> Self {
        let mut set = self.clone();
        set.insert(index);
        set
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}

/// Index of a node in the [`NodeArena`]
pub type NodeId = usize;

/// A partial route: leaves the depot, visits some stops and has not returned yet
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Value collected so far
    pub value: f64,
    /// Minutes spent so far, without the return leg
    pub elapsed: f64,
    /// Last visited stop
    pub position: usize,
    /// Stops visited so far, depot included
    pub visited: VisitedSet,
    /// Number of stops visited (depot excluded)
    pub depth: usize,
    /// Upper bound on the value of any completion of this node
    pub bound: f64,
    pub parent: Option<NodeId>,
}

impl SearchNode {
    /// The empty route sitting at the depot
    pub fn root(dimension: usize) -> Self {
        let mut visited = VisitedSet::new(dimension);
        visited.insert(DEPOT);
        SearchNode {
            value: 0.0,
            elapsed: 0.0,
            position: DEPOT,
            visited,
            depth: 0,
            bound: 0.0,
            parent: None,
        }
    }

    /// Extend this node by one stop. The bound is left at zero for the caller to fill in.
    pub fn branch(&self, id: NodeId, stop: usize, value: f64, elapsed: f64) -> Self {
        SearchNode {
            value,
            elapsed,
            position: stop,
            visited: self.visited.with(stop),
            depth: self.depth + 1,
            bound: 0.0,
            parent: Some(id),
        }
    }
}

/// Append-only node storage owned by one solve
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: SearchNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stops from the depot to `id`, in visiting order (leading depot included)
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.nodes[id].depth + 1);
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            path.push(node.position);
            cursor = node.parent;
        }
        path.reverse();
        path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    bound: OrderedFloat<f64>,
    id: NodeId,
}

impl Ord for FrontierEntry {
    // highest bound first, then oldest node first
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound
            .cmp(&other.bound)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first open list: pops the node with the highest bound, FIFO among equal bounds
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier { heap: BinaryHeap::new() }
    }

    pub fn push(&mut self, id: NodeId, bound: f64) {
        self.heap.push(FrontierEntry { bound: OrderedFloat(bound), id });
    }

    /// Pops the most promising node as `(id, bound)`
    pub fn pop(&mut self) -> Option<(NodeId, f64)> {
        self.heap.pop().map(|e| (e.id, e.bound.into_inner()))
    }

    /// Highest bound still open
    pub fn peek_bound(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.bound.into_inner())
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
