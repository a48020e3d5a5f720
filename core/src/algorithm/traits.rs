//! Core type definitions shared by the flow solver and the decomposer
//!
//! This module establishes the node-key abstraction, the numeric model for
//! capacities and flows, and the error taxonomy surfaced by every fallible
//! operation in the crate.
//!
//! # Numeric Model
//! Capacities and flows are ordinary `f64` values. Unbounded arcs carry the
//! saturating sentinel [`UNBOUNDED_CAPACITY`], which stays larger than any
//! finite sum the solver can accumulate, so no true infinity ever enters
//! the arithmetic.

use std::fmt::Debug;
use std::hash::Hash;
use serde::{Serialize, Deserialize};

/// Flow capacity type with algebraic properties
pub type Capacity = f64;

/// Flow value type supporting arithmetic operations
pub type Flow = f64;

/// Saturating "infinite" capacity for synthetic super-source/super-sink arcs
pub const UNBOUNDED_CAPACITY: Capacity = f64::MAX;

/// Returns true when a capacity is the unbounded sentinel
#[inline]
pub fn is_unbounded(capacity: Capacity) -> bool {
    capacity >= UNBOUNDED_CAPACITY
}

/// Opaque node identifier accepted by [`FlowNetwork`](crate::algorithm::graph::FlowNetwork)
///
/// Any ordered, hashable, cloneable key qualifies: string names, integer ids,
/// or caller-defined newtypes. Ordering is only used to make reported maps
/// iterate deterministically.
pub trait NodeKey: Clone + Eq + Hash + Ord + Debug + Send + Sync {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + Ord + Debug + Send + Sync {}

/// Caller-assigned role of a node in a three-tier network
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Where flow enters the network (terminals, suppliers)
    Origin,
    /// Intermediate transit nodes (warehouses, hubs)
    Relay,
    /// Where flow leaves the network (stores, consumers)
    Destination,
}

/// Flow algorithm errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid capacity {capacity} on arc {from} -> {to}: capacities must be non-negative numbers")]
    InvalidCapacity { from: String, to: String, capacity: Capacity },

    #[error("Capacity {capacity} on arc {from} -> {to} is below the {flow} units already routed on it")]
    CapacityBelowFlow { from: String, to: String, capacity: Capacity, flow: Flow },

    #[error("Augmenting path from {origin} to {sink} consists only of unbounded arcs; maximum flow is unbounded")]
    UnboundedPath { origin: String, sink: String },

    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error("Node {node} is already tagged {existing:?}, cannot retag as {requested:?}")]
    TierConflict { node: String, existing: Tier, requested: Tier },
}

/// Convenience alias for fallible flow operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Renders a node key for error messages
pub(crate) fn describe<N: Debug>(node: &N) -> String {
    format!("{:?}", node)
}

/// Solver performance metrics collected during one `max_flow` invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveMetrics {
    /// Number of augmenting paths applied
    pub augmentations: usize,
    /// Total nodes dequeued across all breadth-first searches
    pub nodes_visited: usize,
    /// Wall-clock solve time
    pub execution_time_ms: f64,
}
