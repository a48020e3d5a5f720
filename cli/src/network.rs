//! Network description files and their conversion into a solvable network.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use log::debug;
use serde::{Deserialize, Serialize};
use tributary_core::{
    Capacity, DecomposerConfig, FlowNetwork, SolverConfig, Tier, TierMap, UNBOUNDED_CAPACITY,
};

/// Synthetic node feeding every origin.
pub const SUPER_SOURCE: &str = "SOURCE";

/// Synthetic node drained by every destination.
pub const SUPER_SINK: &str = "SINK";

/// Built-in logistics demo: two terminals, four warehouses, fourteen stores.
const LOGISTICS_DEMO: &str = include_str!("../data/logistics.json");

/// Capacity as written in a network file: a number or `"unbounded"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapacitySpec {
    Finite(f64),
    Keyword(CapacityKeyword),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityKeyword {
    Unbounded,
}

impl CapacitySpec {
    pub fn value(self) -> Capacity {
        match self {
            CapacitySpec::Finite(capacity) => capacity,
            CapacitySpec::Keyword(CapacityKeyword::Unbounded) => UNBOUNDED_CAPACITY,
        }
    }
}

/// One `from -> to` arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub capacity: CapacitySpec,
}

/// JSON network description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkFile {
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub tiers: BTreeMap<String, Tier>,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub decomposer: DecomposerConfig,
}

/// A network ready for solving, with super-source and super-sink attached.
pub struct PreparedNetwork {
    pub network: FlowNetwork<String>,
    pub tiers: TierMap<String>,
    pub decomposer: DecomposerConfig,
}

impl NetworkFile {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("malformed network description")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }

    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(LOGISTICS_DEMO)
    }

    /// Build the flow network and tier map.
    ///
    /// Declared edges go in first, then `SOURCE -> origin` and
    /// `destination -> SINK` arcs with unbounded capacity.
    pub fn prepare(&self) -> anyhow::Result<PreparedNetwork> {
        let mut tiers = TierMap::new();
        for (node, &tier) in &self.tiers {
            if node == SUPER_SOURCE || node == SUPER_SINK {
                bail!("node name {node} is reserved for the synthetic terminals");
            }
            tiers.assign(node.clone(), tier)?;
        }

        let mut network = FlowNetwork::with_config(self.solver)?;
        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if endpoint == SUPER_SOURCE || endpoint == SUPER_SINK {
                    bail!("node name {endpoint} is reserved for the synthetic terminals");
                }
            }
            network.add_edge(edge.from.clone(), edge.to.clone(), edge.capacity.value())?;
        }

        let origins: Vec<String> = tiers.nodes_in(Tier::Origin).cloned().collect();
        let destinations: Vec<String> = tiers.nodes_in(Tier::Destination).cloned().collect();
        if origins.is_empty() || destinations.is_empty() {
            bail!("network needs at least one origin and one destination");
        }

        for origin in &origins {
            network.add_edge(SUPER_SOURCE.to_string(), origin.clone(), UNBOUNDED_CAPACITY)?;
        }
        for destination in &destinations {
            network.add_edge(destination.clone(), SUPER_SINK.to_string(), UNBOUNDED_CAPACITY)?;
        }

        debug!(
            "Prepared network: {} nodes, {} arcs, {} origins, {} destinations",
            network.node_count(),
            network.arc_count(),
            origins.len(),
            destinations.len()
        );

        Ok(PreparedNetwork {
            network,
            tiers,
            decomposer: self.decomposer,
        })
    }
}
