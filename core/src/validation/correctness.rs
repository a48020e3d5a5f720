//! Flow Correctness Verification
//!
//! Checks a solved [`FlowNetwork`] against the defining properties of a
//! maximum flow:
//!
//! - **Capacity respect**: `0 < flow(arc) <= capacity(arc)` for every
//!   reported arc
//! - **Conservation**: inflow equals outflow at every node except the
//!   source and the sink
//! - **Value**: the source's net outflow equals the reported total
//! - **Optimality**: the sink is unreachable in the residual network and the
//!   total equals the capacity of the residual cut (max-flow/min-cut duality)

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::algorithm::graph::max_flow::{FlowAssignment, FlowNetwork};
use crate::algorithm::traits::{Capacity, Flow, NodeKey};

/// Smallest absolute tolerance applied to floating-point comparisons
const BASE_TOLERANCE: f64 = 1e-9;

/// A single broken flow property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation<N> {
    /// Flow above the declared capacity, or on an undeclared arc
    CapacityExceeded { from: N, to: N, flow: Flow, capacity: Capacity },
    /// Non-positive flow recorded on an arc
    NegativeFlow { from: N, to: N, flow: Flow },
    /// Inflow and outflow differ at an interior node
    ConservationBroken { node: N, inflow: Flow, outflow: Flow },
    /// Source net outflow differs from the reported total
    SourceImbalance { total_flow: Flow, net_outflow: Flow },
    /// Residual cut capacity differs from the reported total
    CutMismatch { total_flow: Flow, cut_capacity: Capacity },
    /// The sink is still reachable through positive residual arcs
    AugmentingPathRemains,
}

/// Outcome of verifying one solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowReport<N> {
    pub total_flow: Flow,
    pub cut_capacity: Capacity,
    pub violations: Vec<Violation<N>>,
}

impl<N> FlowReport<N> {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

#[inline]
fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * (1.0 + a.abs().max(b.abs()))
}

/// Verify the network's current assignment as a maximum flow of value `total_flow`
///
/// `total_flow` is the cumulative value pushed from `source` to `sink`,
/// i.e. the total of the first solve on a fresh network.
pub fn verify_assignment<N: NodeKey>(
    network: &FlowNetwork<N>,
    source: &N,
    sink: &N,
    total_flow: Flow,
) -> FlowReport<N> {
    let tolerance = network.config().epsilon.max(BASE_TOLERANCE);
    let assignment = network.assignment();
    let mut violations = check_assignment(network, &assignment, source, sink, tolerance);

    let net_outflow = assignment.net_outflow(source);
    if !close(net_outflow, total_flow, tolerance) {
        violations.push(Violation::SourceImbalance { total_flow, net_outflow });
    }

    let cut = network.min_cut(source);
    let cut_capacity = cut.capacity;
    if cut.source_side.contains(sink) {
        violations.push(Violation::AugmentingPathRemains);
    } else if !close(cut_capacity, total_flow, tolerance) {
        violations.push(Violation::CutMismatch { total_flow, cut_capacity });
    }

    FlowReport {
        total_flow,
        cut_capacity,
        violations,
    }
}

/// Capacity and conservation checks for an arbitrary assignment
pub fn check_assignment<N: NodeKey>(
    network: &FlowNetwork<N>,
    assignment: &FlowAssignment<N>,
    source: &N,
    sink: &N,
    tolerance: f64,
) -> Vec<Violation<N>> {
    let mut violations = Vec::new();
    // node -> (inflow, outflow)
    let mut totals: BTreeMap<&N, (Flow, Flow)> = BTreeMap::new();

    for (from, to, flow) in assignment.iter() {
        totals.entry(from).or_insert((0.0, 0.0)).1 += flow;
        totals.entry(to).or_insert((0.0, 0.0)).0 += flow;

        if flow <= 0.0 {
            violations.push(Violation::NegativeFlow {
                from: from.clone(),
                to: to.clone(),
                flow,
            });
        }

        let capacity = network.capacity(from, to).unwrap_or(0.0);
        if flow > capacity && !close(flow, capacity, tolerance) {
            violations.push(Violation::CapacityExceeded {
                from: from.clone(),
                to: to.clone(),
                flow,
                capacity,
            });
        }
    }

    for (node, (inflow, outflow)) in totals {
        if node == source || node == sink {
            continue;
        }
        if !close(inflow, outflow, tolerance) {
            violations.push(Violation::ConservationBroken {
                node: node.clone(),
                inflow,
                outflow,
            });
        }
    }

    violations
}
