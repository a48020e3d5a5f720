//! Storage backing the flow algorithms

pub mod graph;

pub use self::graph::{ArcIndex, NodeIndex, ResidualArc, ResidualGraph};
