//! Tributary Core
//!
//! Edmonds-Karp maximum flow over directed capacitated networks, with a
//! tier-aware attribution step that reports how much flow each origin
//! delivers to each destination through an intermediate relay layer.
//!
//! # Workflow
//! 1. Build a [`FlowNetwork`], adding unbounded super-source and super-sink
//!    arcs when the problem has several origins or destinations.
//! 2. Call [`FlowNetwork::max_flow`] once.
//! 3. Tag nodes in a [`TierMap`] and pass the resulting assignment to
//!    [`FlowDecomposer::decompose`].
//!
//! ```
//! use tributary_core::{FlowNetwork, FlowDecomposer, Tier, TierMap};
//!
//! let mut network = FlowNetwork::new();
//! network.add_edge("O", "R", 6.0)?;
//! network.add_edge("R", "D", 4.0)?;
//! let result = network.max_flow(&"O", &"D")?;
//! assert_eq!(result.total_flow, 4.0);
//!
//! let mut tiers = TierMap::new();
//! tiers.assign("O", Tier::Origin)?;
//! tiers.assign("R", Tier::Relay)?;
//! tiers.assign("D", Tier::Destination)?;
//! let attribution = FlowDecomposer::new(&tiers).decompose(&result.assignment);
//! assert_eq!(attribution.get(&"O", &"D"), 4.0);
//! # Ok::<(), tributary_core::FlowError>(())
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod validation;

pub use self::algorithm::*;
pub use self::validation::{verify_assignment, FlowReport, Violation};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
