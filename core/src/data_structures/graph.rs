//! Arena-backed residual graph storage
//!
//! Every node is interned once into a dense index, every ordered node pair
//! owns at most one [`ResidualArc`], and each arc records the index of its
//! paired reverse arc. Forward and reverse residuals are therefore two
//! lookups into the same arc vector, with no pointer cycles.
//!
//! # Invariants
//! For every ordered pair `(u, v)` present in the arena:
//! - the pair `(v, u)` is present too, and the two arcs point at each other
//! - `residual(u, v) = capacity(u, v) - flow(u, v) + flow(v, u)`
//! - `flow(u, v) > 0` only if the arc was declared by the caller
//!
//! Adjacency lists preserve insertion order, which makes breadth-first
//! exploration (and hence augmenting-path choice) reproducible.

use std::collections::HashMap;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{Capacity, Flow, NodeKey};

/// Dense node index into the arena
pub type NodeIndex = usize;

/// Dense arc index into the arena
pub type ArcIndex = usize;

/// Directed residual arc with its paired reverse index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualArc {
    /// Tail vertex
    pub tail: NodeIndex,
    /// Head vertex
    pub head: NodeIndex,
    /// Declared capacity, zero for bookkeeping-only arcs
    pub capacity: Capacity,
    /// Current residual capacity
    pub residual: Capacity,
    /// Cumulative flow routed along this arc
    pub flow: Flow,
    /// Whether the caller registered this arc through `add_edge`
    pub declared: bool,
    /// Index of the paired reverse arc
    pub reverse: ArcIndex,
}

impl ResidualArc {
    fn bookkeeping(tail: NodeIndex, head: NodeIndex, reverse: ArcIndex) -> Self {
        Self {
            tail,
            head,
            capacity: 0.0,
            residual: 0.0,
            flow: 0.0,
            declared: false,
            reverse,
        }
    }
}

/// Residual graph with interned nodes and paired arcs
#[derive(Debug, Clone)]
pub struct ResidualGraph<N: NodeKey> {
    /// Node keys by dense index
    nodes: Vec<N>,
    /// Reverse lookup from key to dense index
    index: HashMap<N, NodeIndex>,
    /// All arcs, forward and reverse
    arcs: Vec<ResidualArc>,
    /// Ordered pair lookup
    lookup: HashMap<(NodeIndex, NodeIndex), ArcIndex>,
    /// Outgoing arcs per node in insertion order
    adjacency: Vec<Vec<ArcIndex>>,
}

impl<N: NodeKey> Default for ResidualGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeKey> ResidualGraph<N> {
    /// Creates an empty residual graph
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            arcs: Vec::new(),
            lookup: HashMap::new(),
            adjacency: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored arcs, bookkeeping arcs included
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Returns the dense index of `node`, interning it if new
    pub fn intern(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        idx
    }

    #[inline]
    pub fn node_index(&self, node: &N) -> Option<NodeIndex> {
        self.index.get(node).copied()
    }

    #[inline]
    pub fn node(&self, idx: NodeIndex) -> &N {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    #[inline]
    pub fn arc(&self, idx: ArcIndex) -> &ResidualArc {
        &self.arcs[idx]
    }

    pub fn arcs(&self) -> &[ResidualArc] {
        &self.arcs
    }

    /// Arc index for the ordered pair `(tail, head)`, if present
    #[inline]
    pub fn arc_between(&self, tail: NodeIndex, head: NodeIndex) -> Option<ArcIndex> {
        self.lookup.get(&(tail, head)).copied()
    }

    /// Outgoing arcs of `node` in insertion order
    #[inline]
    pub fn outgoing(&self, node: NodeIndex) -> &[ArcIndex] {
        &self.adjacency[node]
    }

    /// Returns the arc `tail -> head`, creating it and its reverse twin if absent
    ///
    /// An existing pair is returned untouched, so a reverse arc's residual
    /// state survives later registrations of the opposite direction.
    pub fn ensure_pair(&mut self, tail: NodeIndex, head: NodeIndex) -> ArcIndex {
        if let Some(idx) = self.arc_between(tail, head) {
            return idx;
        }

        let forward = self.arcs.len();
        let reverse = forward + 1;

        self.arcs.push(ResidualArc::bookkeeping(tail, head, reverse));
        self.arcs.push(ResidualArc::bookkeeping(head, tail, forward));

        self.lookup.insert((tail, head), forward);
        self.lookup.insert((head, tail), reverse);

        self.adjacency[tail].push(forward);
        self.adjacency[head].push(reverse);

        forward
    }

    /// Marks `arc` as caller-declared with the given capacity
    ///
    /// The residual is recomputed from the arc's own flow and the flow on its
    /// reverse twin. Callers must ensure `capacity >= flow`.
    pub fn declare(&mut self, arc: ArcIndex, capacity: Capacity) {
        let reverse_flow = self.arcs[self.arcs[arc].reverse].flow;
        let entry = &mut self.arcs[arc];
        debug_assert!(capacity >= entry.flow, "declared capacity below routed flow");
        entry.capacity = capacity;
        entry.declared = true;
        entry.residual = capacity - entry.flow + reverse_flow;
    }

    /// Pushes `amount` units along `arc`
    ///
    /// Flow recorded on the reverse twin is cancelled first; only the
    /// remainder is credited to `arc` itself.
    pub fn push(&mut self, arc: ArcIndex, amount: Flow) {
        let reverse = self.arcs[arc].reverse;
        debug_assert!(amount <= self.arcs[arc].residual, "push exceeds residual capacity");

        let cancelled = amount.min(self.arcs[reverse].flow);

        let back = &mut self.arcs[reverse];
        back.residual += amount;
        back.flow -= cancelled;

        let entry = &mut self.arcs[arc];
        entry.residual -= amount;
        entry.flow += amount - cancelled;
    }
}
