//! Edmonds-Karp Maximum Flow Implementation
//!
//! This module implements the Edmonds-Karp maximum flow method: breadth-first
//! search for shortest augmenting paths in the residual network, repeated
//! until the sink becomes unreachable. The residual network lives in a
//! [`ResidualGraph`] arena where every arc knows its reverse twin.
//!
//! # Complexity
//! Choosing shortest augmenting paths bounds the number of augmentations by
//! O(V·E), giving O(V·E²) overall independent of capacity magnitudes. This
//! bound is what separates Edmonds-Karp from generic Ford-Fulkerson, so the
//! search is always breadth-first.
//!
//! # Determinism
//! Adjacency is explored in insertion order. Ties between equally short
//! augmenting paths are therefore broken identically on every run, and the
//! reported per-arc assignment is reproducible for a fixed construction order.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Instant;

use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{
    describe, is_unbounded, Capacity, Flow, FlowError, FlowResult, NodeKey, SolveMetrics,
    UNBOUNDED_CAPACITY,
};
use crate::data_structures::graph::{ArcIndex, NodeIndex, ResidualGraph};

/// Solver tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Residual capacities at or below this value count as saturated
    pub epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { epsilon: 0.0 }
    }
}

impl SolverConfig {
    /// Reject thresholds under which a search could revisit drained arcs
    pub fn validate(&self) -> FlowResult<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(FlowError::InvalidConfig(format!(
                "epsilon must be a finite non-negative number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Cumulative flow on caller-declared arcs
///
/// Only arcs carrying strictly positive flow are present. Bookkeeping reverse
/// arcs never appear here.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAssignment<N: NodeKey> {
    flows: BTreeMap<(N, N), Flow>,
}

impl<N: NodeKey> Default for FlowAssignment<N> {
    fn default() -> Self {
        Self { flows: BTreeMap::new() }
    }
}

impl<N: NodeKey> FlowAssignment<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flow on `from -> to`, zero when the arc carries none
    pub fn get(&self, from: &N, to: &N) -> Flow {
        // BTreeMap lookups on tuple keys need an owned key
        self.flows
            .get(&(from.clone(), to.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Arcs in ascending `(from, to)` order
    pub fn iter(&self) -> impl Iterator<Item = (&N, &N, Flow)> {
        self.flows.iter().map(|((from, to), &flow)| (from, to, flow))
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Total flow leaving `node`
    pub fn outflow(&self, node: &N) -> Flow {
        self.iter()
            .filter(|(from, _, _)| *from == node)
            .map(|(_, _, flow)| flow)
            .sum()
    }

    /// Total flow entering `node`
    pub fn inflow(&self, node: &N) -> Flow {
        self.iter()
            .filter(|(_, to, _)| *to == node)
            .map(|(_, _, flow)| flow)
            .sum()
    }

    /// Outflow minus inflow
    pub fn net_outflow(&self, node: &N) -> Flow {
        self.outflow(node) - self.inflow(node)
    }
}

impl<N: NodeKey> FromIterator<((N, N), Flow)> for FlowAssignment<N> {
    fn from_iter<I: IntoIterator<Item = ((N, N), Flow)>>(iter: I) -> Self {
        Self {
            flows: iter.into_iter().filter(|(_, flow)| *flow > 0.0).collect(),
        }
    }
}

/// Breadth-first search tree leading from source to sink
#[derive(Debug, Clone, PartialEq)]
pub struct ParentMap<N: NodeKey> {
    source: N,
    sink: N,
    parents: HashMap<N, N>,
}

impl<N: NodeKey> ParentMap<N> {
    /// Node from which `node` was first reached, `None` for the source
    /// and for nodes never visited
    pub fn parent_of(&self, node: &N) -> Option<&N> {
        self.parents.get(node)
    }

    /// Number of nodes reached besides the source
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Node sequence of the augmenting path, source first
    pub fn path(&self) -> Vec<N> {
        let mut path = vec![self.sink.clone()];
        let mut current = &self.sink;
        while let Some(parent) = self.parents.get(current) {
            path.push(parent.clone());
            current = parent;
        }
        path.reverse();
        debug_assert_eq!(path.first(), Some(&self.source));
        path
    }
}

/// Outcome of one `max_flow` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct MaxFlowResult<N: NodeKey> {
    /// Flow added by this invocation
    pub total_flow: Flow,
    /// Cumulative per-arc flow after this invocation
    pub assignment: FlowAssignment<N>,
    /// Solver performance metrics
    pub metrics: SolveMetrics,
}

impl<N: NodeKey> MaxFlowResult<N> {
    fn empty(assignment: FlowAssignment<N>) -> Self {
        Self {
            total_flow: 0.0,
            assignment,
            metrics: SolveMetrics::default(),
        }
    }

    pub fn into_parts(self) -> (Flow, FlowAssignment<N>) {
        (self.total_flow, self.assignment)
    }
}

/// Source-side cut certificate of a terminated solve
#[derive(Debug, Clone, PartialEq)]
pub struct MinCut<N: NodeKey> {
    /// Nodes reachable from the source through positive residual arcs
    pub source_side: BTreeSet<N>,
    /// Declared arcs from the source side to the sink side
    pub cut_arcs: Vec<(N, N, Capacity)>,
    /// Sum of crossing capacities, saturating at [`UNBOUNDED_CAPACITY`]
    pub capacity: Capacity,
}

/// Visited set and search tree from one breadth-first exploration
struct Exploration {
    visited: Vec<bool>,
    parent_arc: Vec<Option<ArcIndex>>,
    dequeued: usize,
    reached: bool,
}

/// Directed capacitated network with residual bookkeeping
#[derive(Debug, Clone)]
pub struct FlowNetwork<N: NodeKey> {
    graph: ResidualGraph<N>,
    config: SolverConfig,
    declared: usize,
}

impl<N: NodeKey> Default for FlowNetwork<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeKey> FlowNetwork<N> {
    /// Create an empty flow network with default solver settings
    pub fn new() -> Self {
        Self {
            graph: ResidualGraph::new(),
            config: SolverConfig::default(),
            declared: 0,
        }
    }

    /// Create an empty flow network with validated solver settings
    pub fn with_config(config: SolverConfig) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self { config, ..Self::new() })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of caller-declared arcs
    pub fn arc_count(&self) -> usize {
        self.declared
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.graph.node_index(node).is_some()
    }

    /// Add a directed arc with its zero-capacity reverse twin
    ///
    /// Registering the same ordered pair again replaces its capacity. An
    /// existing reverse arc keeps its residual state. Self-loops can never
    /// lie on an augmenting path and are accepted without being stored.
    pub fn add_edge(&mut self, from: N, to: N, capacity: Capacity) -> FlowResult<()> {
        if capacity.is_nan() || capacity < 0.0 {
            return Err(FlowError::InvalidCapacity {
                from: describe(&from),
                to: describe(&to),
                capacity,
            });
        }

        if let Some(arc) = self.lookup(&from, &to) {
            let existing = self.graph.arc(arc);
            if capacity < existing.flow {
                return Err(FlowError::CapacityBelowFlow {
                    from: describe(&from),
                    to: describe(&to),
                    capacity,
                    flow: existing.flow,
                });
            }
        }

        if from == to {
            debug!("Ignoring self-loop on {:?}", from);
            return Ok(());
        }

        let tail = self.graph.intern(from);
        let head = self.graph.intern(to);
        let arc = self.graph.ensure_pair(tail, head);

        if self.graph.arc(arc).declared {
            warn!(
                "Overwriting capacity of arc {:?} -> {:?}: {} replaced by {}",
                self.graph.node(tail),
                self.graph.node(head),
                self.graph.arc(arc).capacity,
                capacity
            );
        } else {
            self.declared += 1;
        }

        self.graph.declare(arc, capacity);
        Ok(())
    }

    /// Declared capacity of `from -> to`
    pub fn capacity(&self, from: &N, to: &N) -> Option<Capacity> {
        self.lookup(from, to)
            .map(|arc| self.graph.arc(arc))
            .filter(|arc| arc.declared)
            .map(|arc| arc.capacity)
    }

    /// Current residual capacity of `from -> to`, bookkeeping arcs included
    pub fn residual_capacity(&self, from: &N, to: &N) -> Option<Capacity> {
        self.lookup(from, to).map(|arc| self.graph.arc(arc).residual)
    }

    /// Cumulative flow on `from -> to`
    pub fn flow(&self, from: &N, to: &N) -> Flow {
        self.lookup(from, to)
            .map(|arc| self.graph.arc(arc).flow)
            .unwrap_or(0.0)
    }

    /// Caller-declared arcs with their capacities, in registration order
    pub fn declared_arcs(&self) -> impl Iterator<Item = (&N, &N, Capacity)> {
        self.graph
            .arcs()
            .iter()
            .filter(|arc| arc.declared)
            .map(|arc| (self.graph.node(arc.tail), self.graph.node(arc.head), arc.capacity))
    }

    /// Snapshot of the cumulative per-arc flow
    pub fn assignment(&self) -> FlowAssignment<N> {
        self.graph
            .arcs()
            .iter()
            .filter(|arc| arc.declared && arc.flow > 0.0)
            .map(|arc| {
                (
                    (self.graph.node(arc.tail).clone(), self.graph.node(arc.head).clone()),
                    arc.flow,
                )
            })
            .collect()
    }

    /// Breadth-first search for an augmenting path
    ///
    /// Returns `None` when the sink is unreachable through positive residual
    /// arcs, when either endpoint is unknown, or when source and sink coincide.
    pub fn find_augmenting_path(&self, source: &N, sink: &N) -> Option<ParentMap<N>> {
        let (s, t) = self.endpoints(source, sink)?;
        let exploration = self.explore(s, Some(t), |residual| residual > self.config.epsilon);
        if !exploration.reached {
            return None;
        }

        let parents = exploration
            .parent_arc
            .iter()
            .enumerate()
            .filter_map(|(node, arc)| {
                arc.map(|arc| {
                    let tail = self.graph.arc(arc).tail;
                    (self.graph.node(node).clone(), self.graph.node(tail).clone())
                })
            })
            .collect();

        Some(ParentMap {
            source: source.clone(),
            sink: sink.clone(),
            parents,
        })
    }

    /// Run Edmonds-Karp from `source` to `sink`
    ///
    /// Augments along shortest residual paths until none remain. The
    /// returned total covers this invocation only, while the assignment is
    /// cumulative, so re-solving a drained network yields zero additional
    /// flow and an unchanged assignment.
    pub fn max_flow(&mut self, source: &N, sink: &N) -> FlowResult<MaxFlowResult<N>> {
        if source == sink {
            return Ok(MaxFlowResult::empty(FlowAssignment::new()));
        }
        let Some((s, t)) = self.endpoints(source, sink) else {
            debug!("Endpoint {:?} or {:?} absent; no augmenting path exists", source, sink);
            return Ok(MaxFlowResult::empty(self.assignment()));
        };

        let started = Instant::now();
        let mut metrics = SolveMetrics::default();
        let mut total_flow: Flow = 0.0;

        debug!(
            "Edmonds-Karp {:?} -> {:?} over {} nodes, {} arcs",
            source,
            sink,
            self.graph.node_count(),
            self.declared
        );

        // Unbounded arcs keep their sentinel residual under finite pushes, so a
        // path made only of them exists now or never does
        if self.explore(s, Some(t), is_unbounded).reached {
            return Err(FlowError::UnboundedPath {
                origin: describe(source),
                sink: describe(sink),
            });
        }

        loop {
            let exploration = self.explore(s, Some(t), |residual| residual > self.config.epsilon);
            metrics.nodes_visited += exploration.dequeued;
            if !exploration.reached {
                break;
            }

            let path = self.trace_path(&exploration.parent_arc, s, t);
            let bottleneck = path
                .iter()
                .map(|&arc| self.graph.arc(arc).residual)
                .fold(UNBOUNDED_CAPACITY, Capacity::min);

            debug_assert!(!is_unbounded(bottleneck));

            for &arc in &path {
                self.graph.push(arc, bottleneck);
            }

            total_flow += bottleneck;
            metrics.augmentations += 1;
            trace!(
                "Augmentation {}: {} units along {} arcs (total {})",
                metrics.augmentations,
                bottleneck,
                path.len(),
                total_flow
            );
        }

        metrics.execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Edmonds-Karp finished: flow {} after {} augmentations",
            total_flow, metrics.augmentations
        );

        Ok(MaxFlowResult {
            total_flow,
            assignment: self.assignment(),
            metrics,
        })
    }

    /// Residual-reachable cut after a solve
    ///
    /// Once no augmenting path remains, the crossing capacity equals the
    /// maximum flow value.
    pub fn min_cut(&self, source: &N) -> MinCut<N> {
        let Some(s) = self.graph.node_index(source) else {
            return MinCut {
                source_side: BTreeSet::from([source.clone()]),
                cut_arcs: Vec::new(),
                capacity: 0.0,
            };
        };

        let exploration = self.explore(s, None, |residual| residual > self.config.epsilon);
        let source_side = exploration
            .visited
            .iter()
            .enumerate()
            .filter(|(_, seen)| **seen)
            .map(|(node, _)| self.graph.node(node).clone())
            .collect();

        let mut cut_arcs: Vec<(N, N, Capacity)> = self
            .graph
            .arcs()
            .iter()
            .filter(|arc| arc.declared)
            .filter(|arc| exploration.visited[arc.tail] && !exploration.visited[arc.head])
            .map(|arc| {
                (
                    self.graph.node(arc.tail).clone(),
                    self.graph.node(arc.head).clone(),
                    arc.capacity,
                )
            })
            .collect();
        cut_arcs.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

        let capacity = cut_arcs
            .iter()
            .map(|(_, _, capacity)| *capacity)
            .fold(0.0, |acc: Capacity, c| (acc + c).min(UNBOUNDED_CAPACITY));

        MinCut { source_side, cut_arcs, capacity }
    }

    fn lookup(&self, from: &N, to: &N) -> Option<ArcIndex> {
        let tail = self.graph.node_index(from)?;
        let head = self.graph.node_index(to)?;
        self.graph.arc_between(tail, head)
    }

    fn endpoints(&self, source: &N, sink: &N) -> Option<(NodeIndex, NodeIndex)> {
        if source == sink {
            return None;
        }
        Some((self.graph.node_index(source)?, self.graph.node_index(sink)?))
    }

    /// Breadth-first exploration over arcs whose residual satisfies `admits`,
    /// stopping early once `target` is reached
    fn explore<F>(&self, source: NodeIndex, target: Option<NodeIndex>, admits: F) -> Exploration
    where
        F: Fn(Capacity) -> bool,
    {
        let node_count = self.graph.node_count();
        let mut exploration = Exploration {
            visited: vec![false; node_count],
            parent_arc: vec![None; node_count],
            dequeued: 0,
            reached: false,
        };

        let mut queue = VecDeque::new();
        exploration.visited[source] = true;
        queue.push_back(source);

        'search: while let Some(node) = queue.pop_front() {
            exploration.dequeued += 1;
            for &arc_index in self.graph.outgoing(node) {
                let arc = self.graph.arc(arc_index);
                if exploration.visited[arc.head] || !admits(arc.residual) {
                    continue;
                }
                exploration.visited[arc.head] = true;
                exploration.parent_arc[arc.head] = Some(arc_index);
                if Some(arc.head) == target {
                    exploration.reached = true;
                    break 'search;
                }
                queue.push_back(arc.head);
            }
        }

        exploration
    }

    /// Arcs of the search-tree path, source first
    fn trace_path(&self, parent_arc: &[Option<ArcIndex>], source: NodeIndex, sink: NodeIndex) -> Vec<ArcIndex> {
        let mut path = Vec::new();
        let mut node = sink;
        while node != source {
            match parent_arc[node] {
                Some(arc) => {
                    path.push(arc);
                    node = self.graph.arc(arc).tail;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn network(edges: &[(&'static str, &'static str, Capacity)]) -> FlowNetwork<&'static str> {
        let mut network = FlowNetwork::new();
        for &(from, to, capacity) in edges {
            network.add_edge(from, to, capacity).unwrap();
        }
        network
    }

    #[test]
    fn test_chain_bottleneck() {
        let mut network = network(&[("A", "B", 10.0), ("B", "C", 4.0)]);
        let (total, assignment) = network.max_flow(&"A", &"C").unwrap().into_parts();

        assert_eq!(total, 4.0);
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.get(&"A", &"B"), 4.0);
        assert_eq!(assignment.get(&"B", &"C"), 4.0);
    }

    #[test]
    fn test_diamond_splits_evenly() {
        let mut network = network(&[
            ("A", "B", 10.0),
            ("A", "C", 10.0),
            ("B", "D", 5.0),
            ("C", "D", 5.0),
        ]);
        let result = network.max_flow(&"A", &"D").unwrap();

        assert_eq!(result.total_flow, 10.0);
        assert_eq!(result.assignment.get(&"A", &"B"), 5.0);
        assert_eq!(result.assignment.get(&"A", &"C"), 5.0);
        assert_eq!(result.assignment.get(&"B", &"D"), 5.0);
        assert_eq!(result.assignment.get(&"C", &"D"), 5.0);
        assert_eq!(result.metrics.augmentations, 2);
    }

    #[test]
    fn test_diamond_independent_of_insertion_order() {
        let mut network = network(&[
            ("C", "D", 5.0),
            ("B", "D", 5.0),
            ("A", "C", 10.0),
            ("A", "B", 10.0),
        ]);
        let result = network.max_flow(&"A", &"D").unwrap();

        assert_eq!(result.total_flow, 10.0);
        assert_eq!(result.assignment.get(&"A", &"B"), 5.0);
        assert_eq!(result.assignment.get(&"A", &"C"), 5.0);
    }

    #[test]
    fn test_cancellation_is_reflected_in_assignment() {
        // First augmentation takes s-a-b-t; the second reroutes through the
        // reverse of a -> b, cancelling its flow entirely.
        let mut network = network(&[
            ("s", "a", 1.0),
            ("a", "b", 1.0),
            ("a", "d", 1.0),
            ("b", "t", 1.0),
            ("s", "c", 1.0),
            ("c", "b", 1.0),
            ("d", "t", 1.0),
        ]);

        let first = network.find_augmenting_path(&"s", &"t").unwrap();
        assert_eq!(first.path(), vec!["s", "a", "b", "t"]);

        let result = network.max_flow(&"s", &"t").unwrap();
        assert_eq!(result.total_flow, 2.0);
        assert_eq!(result.assignment.get(&"a", &"b"), 0.0);
        assert_eq!(result.assignment.get(&"a", &"d"), 1.0);
        assert_eq!(result.assignment.get(&"c", &"b"), 1.0);
        assert_eq!(result.assignment.len(), 6);
        assert_eq!(network.residual_capacity(&"b", &"a"), Some(0.0));
    }

    #[test]
    fn test_no_path_yields_zero_flow() {
        let mut network = network(&[("A", "B", 3.0), ("C", "D", 3.0)]);
        let result = network.max_flow(&"A", &"D").unwrap();

        assert_eq!(result.total_flow, 0.0);
        assert!(result.assignment.is_empty());
        assert!(network.find_augmenting_path(&"A", &"D").is_none());
    }

    #[test]
    fn test_source_equals_sink() {
        let mut network = network(&[("A", "B", 3.0), ("B", "A", 3.0)]);
        let result = network.max_flow(&"A", &"A").unwrap();

        assert_eq!(result.total_flow, 0.0);
        assert!(result.assignment.is_empty());
        assert_eq!(result.metrics.augmentations, 0);
    }

    #[test]
    fn test_unknown_endpoints_are_not_errors() {
        let mut network = network(&[("A", "B", 3.0)]);
        assert_eq!(network.max_flow(&"A", &"Z").unwrap().total_flow, 0.0);
        assert_eq!(network.max_flow(&"Z", &"B").unwrap().total_flow, 0.0);
        assert!(network.find_augmenting_path(&"Z", &"B").is_none());
    }

    #[test]
    fn test_negative_capacity_rejected_without_side_effects() {
        let mut network = network(&[("A", "B", 3.0)]);

        let err = network.add_edge("B", "C", -1.0).unwrap_err();
        assert!(matches!(err, FlowError::InvalidCapacity { .. }));
        assert!(network.add_edge("B", "C", f64::NAN).is_err());

        assert!(!network.contains_node(&"C"));
        assert_eq!(network.node_count(), 2);
        assert_eq!(network.arc_count(), 1);
    }

    #[test]
    fn test_repeated_add_edge_overwrites() {
        let mut network = network(&[("A", "B", 3.0), ("A", "B", 8.0)]);

        assert_eq!(network.arc_count(), 1);
        assert_eq!(network.capacity(&"A", &"B"), Some(8.0));
        assert_eq!(network.max_flow(&"A", &"B").unwrap().total_flow, 8.0);
    }

    #[test]
    fn test_overwrite_below_routed_flow_rejected() {
        let mut network = network(&[("A", "B", 6.0)]);
        network.max_flow(&"A", &"B").unwrap();

        let err = network.add_edge("A", "B", 2.0).unwrap_err();
        assert!(matches!(err, FlowError::CapacityBelowFlow { .. }));
        assert_eq!(network.capacity(&"A", &"B"), Some(6.0));
    }

    #[test]
    fn test_reverse_registration_keeps_residual_state() {
        let mut network = network(&[("A", "B", 5.0)]);
        assert_eq!(network.residual_capacity(&"B", &"A"), Some(0.0));
        assert_eq!(network.capacity(&"B", &"A"), None);

        network.add_edge("B", "A", 2.0).unwrap();
        assert_eq!(network.arc_count(), 2);
        assert_eq!(network.residual_capacity(&"A", &"B"), Some(5.0));
        assert_eq!(network.residual_capacity(&"B", &"A"), Some(2.0));
    }

    #[test]
    fn test_self_loop_ignored() {
        let mut network = network(&[("A", "A", 5.0), ("A", "B", 1.0)]);
        assert_eq!(network.arc_count(), 1);
        assert_eq!(network.max_flow(&"A", &"B").unwrap().total_flow, 1.0);
    }

    #[test]
    fn test_unbounded_super_arcs() {
        let mut network = network(&[
            ("SOURCE", "T1", UNBOUNDED_CAPACITY),
            ("SOURCE", "T2", UNBOUNDED_CAPACITY),
            ("T1", "W", 7.0),
            ("T2", "W", 5.0),
            ("W", "SINK", UNBOUNDED_CAPACITY),
        ]);
        let result = network.max_flow(&"SOURCE", &"SINK").unwrap();

        assert_eq!(result.total_flow, 12.0);
        assert_eq!(result.assignment.get(&"SOURCE", &"T1"), 7.0);
        assert_eq!(result.assignment.get(&"W", &"SINK"), 12.0);
        assert!(network.capacity(&"SOURCE", &"T1").map_or(false, is_unbounded));
    }

    #[test]
    fn test_all_unbounded_path_is_an_error() {
        let mut network = network(&[("A", "B", UNBOUNDED_CAPACITY), ("B", "C", UNBOUNDED_CAPACITY)]);
        let err = network.max_flow(&"A", &"C").unwrap_err();

        assert!(matches!(err, FlowError::UnboundedPath { .. }));
        assert!(network.assignment().is_empty());
    }

    #[test]
    fn test_unbounded_path_leaves_finite_arcs_untouched() {
        // The finite A -> D arc is found first; the all-unbounded route must
        // still be reported before anything is pushed
        let mut network = network(&[
            ("A", "D", 1.0),
            ("A", "B", UNBOUNDED_CAPACITY),
            ("B", "C", UNBOUNDED_CAPACITY),
            ("C", "D", UNBOUNDED_CAPACITY),
        ]);
        let err = network.max_flow(&"A", &"D").unwrap_err();

        match err {
            FlowError::UnboundedPath { origin, sink } => {
                assert_eq!(origin, "\"A\"");
                assert_eq!(sink, "\"D\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(network.assignment().is_empty());
        assert_eq!(network.flow(&"A", &"D"), 0.0);
        assert_eq!(network.residual_capacity(&"A", &"D"), Some(1.0));
        assert_eq!(network.residual_capacity(&"D", &"A"), Some(0.0));
    }

    #[test]
    fn test_unbounded_arcs_behind_finite_bottleneck_solve() {
        let mut network = network(&[
            ("A", "B", UNBOUNDED_CAPACITY),
            ("B", "C", 3.0),
            ("C", "D", UNBOUNDED_CAPACITY),
        ]);
        let result = network.max_flow(&"A", &"D").unwrap();

        assert_eq!(result.total_flow, 3.0);
        assert!(network.residual_capacity(&"A", &"B").map_or(false, is_unbounded));
    }

    #[test]
    fn test_resolve_after_drain_is_idempotent() {
        let mut network = network(&[("A", "B", 10.0), ("B", "C", 4.0)]);
        let first = network.max_flow(&"A", &"C").unwrap();
        let second = network.max_flow(&"A", &"C").unwrap();

        assert_eq!(second.total_flow, 0.0);
        assert_eq!(second.assignment, first.assignment);
        assert_eq!(second.metrics.augmentations, 0);
    }

    #[test]
    fn test_min_cut_matches_flow() {
        let mut network = network(&[
            ("A", "B", 10.0),
            ("A", "C", 10.0),
            ("B", "D", 5.0),
            ("C", "D", 5.0),
        ]);
        let result = network.max_flow(&"A", &"D").unwrap();
        let cut = network.min_cut(&"A");

        assert_eq!(cut.capacity, result.total_flow);
        assert_eq!(cut.source_side, BTreeSet::from(["A", "B", "C"]));
        assert_eq!(
            cut.cut_arcs,
            vec![("B", "D", 5.0), ("C", "D", 5.0)]
        );
    }

    #[test]
    fn test_integer_node_keys() {
        let mut network: FlowNetwork<u32> = FlowNetwork::new();
        network.add_edge(0, 1, 3.0).unwrap();
        network.add_edge(1, 2, 2.0).unwrap();
        network.add_edge(0, 2, 1.0).unwrap();

        let result = network.max_flow(&0, &2).unwrap();
        assert_eq!(result.total_flow, 3.0);
        assert_eq!(result.assignment.net_outflow(&0), 3.0);
        assert_eq!(result.assignment.net_outflow(&1), 0.0);
    }

    #[test]
    fn test_epsilon_treats_tiny_residuals_as_saturated() {
        let mut network = FlowNetwork::with_config(SolverConfig { epsilon: 0.5 }).unwrap();
        network.add_edge("A", "B", 0.25).unwrap();
        network.add_edge("A", "C", 2.0).unwrap();
        network.add_edge("B", "D", 2.0).unwrap();
        network.add_edge("C", "D", 2.0).unwrap();

        let result = network.max_flow(&"A", &"D").unwrap();
        assert_eq!(result.total_flow, 2.0);
        assert_eq!(result.assignment.get(&"A", &"B"), 0.0);
    }

    #[test]
    fn test_invalid_epsilon_rejected() {
        for epsilon in [-1.0, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY] {
            let err = FlowNetwork::<&str>::with_config(SolverConfig { epsilon }).unwrap_err();
            assert!(matches!(err, FlowError::InvalidConfig(_)), "epsilon {epsilon} accepted");
        }
        assert!(FlowNetwork::<&str>::with_config(SolverConfig::default()).is_ok());
        assert!(SolverConfig { epsilon: 0.0 }.validate().is_ok());
    }

    #[test]
    fn test_declared_arcs_exclude_bookkeeping() {
        let mut network = network(&[("A", "B", 2.0), ("B", "C", 3.0), ("C", "B", 1.0)]);
        let declared: Vec<_> = network.declared_arcs().collect();
        assert_eq!(declared, vec![(&"A", &"B", 2.0), (&"B", &"C", 3.0), (&"C", &"B", 1.0)]);

        network.max_flow(&"A", &"C").unwrap();
        assert_eq!(network.flow(&"B", &"C"), 2.0);
        assert_eq!(network.flow(&"C", &"B"), 0.0);
        assert_eq!(network.flow(&"B", &"A"), 0.0);
        assert_eq!(network.residual_capacity(&"C", &"B"), Some(3.0));
    }

    #[test]
    fn test_parent_map_records_tree() {
        let network = network(&[("A", "B", 1.0), ("A", "C", 1.0), ("C", "D", 1.0)]);
        let parents = network.find_augmenting_path(&"A", &"D").unwrap();

        assert_eq!(parents.parent_of(&"D"), Some(&"C"));
        assert_eq!(parents.parent_of(&"C"), Some(&"A"));
        assert_eq!(parents.parent_of(&"A"), None);
        assert_eq!(parents.path(), vec!["A", "C", "D"]);
    }

    fn arbitrary_edges() -> impl Strategy<Value = Vec<(u8, u8, u8)>> {
        prop::collection::vec((0u8..8, 0u8..8, 0u8..20), 1..40)
    }

    proptest! {
        #[test]
        fn test_flow_invariants_on_random_graphs(edges in arbitrary_edges()) {
            let mut network: FlowNetwork<u8> = FlowNetwork::new();
            for &(from, to, capacity) in &edges {
                network.add_edge(from, to, capacity as f64).unwrap();
            }
            let (source, sink) = (0u8, 7u8);
            let result = network.max_flow(&source, &sink).unwrap();

            // Capacity respect
            for (from, to, flow) in result.assignment.iter() {
                let capacity = network.capacity(from, to).unwrap();
                prop_assert!(flow > 0.0 && flow <= capacity);
            }

            // Conservation everywhere but the terminals
            for node in 1u8..7 {
                prop_assert_eq!(result.assignment.net_outflow(&node), 0.0);
            }
            if network.contains_node(&source) {
                prop_assert_eq!(result.assignment.net_outflow(&source), result.total_flow);
            }

            // Max-flow equals the residual cut
            prop_assert_eq!(network.min_cut(&source).capacity, result.total_flow);

            // Drained network yields nothing more
            let again = network.max_flow(&source, &sink).unwrap();
            prop_assert_eq!(again.total_flow, 0.0);
            prop_assert_eq!(again.assignment, result.assignment);
        }
    }
}
