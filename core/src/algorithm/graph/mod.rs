//! Network flow algorithms
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod max_flow;
pub mod decomposition;

pub use self::max_flow::{FlowAssignment, FlowNetwork, MaxFlowResult, MinCut, ParentMap, SolverConfig};
pub use self::decomposition::{Attribution, DecomposerConfig, FlowDecomposer, TierMap};
