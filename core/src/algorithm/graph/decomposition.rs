//! Tiered flow attribution
//!
//! Given a three-tier network (origins feeding relays feeding destinations)
//! and the per-arc assignment produced by
//! [`FlowNetwork::max_flow`](super::FlowNetwork::max_flow), attributes flow to
//! every (origin, destination) pair with the bottleneck rule:
//!
//! ```text
//! attributed(o, d) = Σ_r min(flow(o, r), flow(r, d))
//! ```
//!
//! # Reporting Approximation
//! This is not a true path decomposition. Flow units at a relay are
//! fungible, and the rule assumes each origin's inbound flow at a relay is
//! independently available to every destination that relay feeds. When a
//! relay merges flow from several origins and splits it to several
//! destinations, the attributed totals can exceed (or misplace) the flow
//! actually carried between a specific pair. Row and column sums are
//! therefore not guaranteed to match the solver's per-arc flows.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::algorithm::graph::max_flow::FlowAssignment;
use crate::algorithm::traits::{describe, Flow, FlowError, FlowResult, NodeKey, Tier};

/// Decomposer tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposerConfig {
    /// Minimum number of origins before rows are computed in parallel
    pub parallel_threshold: usize,
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self { parallel_threshold: 64 }
    }
}

/// Explicit tier tag per node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierMap<N: NodeKey> {
    tiers: BTreeMap<N, Tier>,
}

impl<N: NodeKey> Default for TierMap<N> {
    fn default() -> Self {
        Self { tiers: BTreeMap::new() }
    }
}

impl<N: NodeKey> TierMap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `nodes` with a caller-supplied rule such as a name prefix
    ///
    /// Nodes for which `classify` returns `None` stay untagged.
    pub fn from_classifier<I, F>(nodes: I, classify: F) -> FlowResult<Self>
    where
        I: IntoIterator<Item = N>,
        F: Fn(&N) -> Option<Tier>,
    {
        let mut map = Self::new();
        for node in nodes {
            if let Some(tier) = classify(&node) {
                map.assign(node, tier)?;
            }
        }
        Ok(map)
    }

    /// Tag `node` with `tier`
    ///
    /// Repeating an identical tag is a no-op; a different tag is rejected.
    pub fn assign(&mut self, node: N, tier: Tier) -> FlowResult<()> {
        match self.tiers.get(&node) {
            Some(&existing) if existing != tier => Err(FlowError::TierConflict {
                node: describe(&node),
                existing,
                requested: tier,
            }),
            Some(_) => Ok(()),
            None => {
                self.tiers.insert(node, tier);
                Ok(())
            }
        }
    }

    pub fn tier_of(&self, node: &N) -> Option<Tier> {
        self.tiers.get(node).copied()
    }

    #[inline]
    fn is(&self, node: &N, tier: Tier) -> bool {
        self.tier_of(node) == Some(tier)
    }

    /// Nodes carrying `tier`, in ascending order
    pub fn nodes_in(&self, tier: Tier) -> impl Iterator<Item = &N> {
        self.tiers
            .iter()
            .filter(move |&(_, &t)| t == tier)
            .map(|(node, _)| node)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// Attributed flow per (origin, destination) pair
///
/// Only pairs with strictly positive attribution are present.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution<N: NodeKey> {
    rows: BTreeMap<N, BTreeMap<N, Flow>>,
}

impl<N: NodeKey> Default for Attribution<N> {
    fn default() -> Self {
        Self { rows: BTreeMap::new() }
    }
}

impl<N: NodeKey> Attribution<N> {
    pub fn get(&self, origin: &N, destination: &N) -> Flow {
        self.rows
            .get(origin)
            .and_then(|row| row.get(destination))
            .copied()
            .unwrap_or(0.0)
    }

    /// `(origin, destination, flow)` triples sorted by origin then destination
    pub fn iter(&self) -> impl Iterator<Item = (&N, &N, Flow)> {
        self.rows.iter().flat_map(|(origin, row)| {
            row.iter().map(move |(destination, &flow)| (origin, destination, flow))
        })
    }

    pub fn rows(&self) -> &BTreeMap<N, BTreeMap<N, Flow>> {
        &self.rows
    }

    pub fn origin_total(&self, origin: &N) -> Flow {
        self.rows
            .get(origin)
            .map(|row| row.values().sum())
            .unwrap_or(0.0)
    }

    pub fn destination_total(&self, destination: &N) -> Flow {
        self.rows
            .values()
            .filter_map(|row| row.get(destination))
            .sum()
    }

    /// Sum over all pairs; see the module docs for why this may exceed the max flow
    pub fn total(&self) -> Flow {
        self.iter().map(|(_, _, flow)| flow).sum()
    }

    /// Number of attributed pairs
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Bottleneck-rule attribution over a tiered network
#[derive(Debug, Clone)]
pub struct FlowDecomposer<'a, N: NodeKey> {
    tiers: &'a TierMap<N>,
    config: DecomposerConfig,
}

impl<'a, N: NodeKey> FlowDecomposer<'a, N> {
    pub fn new(tiers: &'a TierMap<N>) -> Self {
        Self::with_config(tiers, DecomposerConfig::default())
    }

    pub fn with_config(tiers: &'a TierMap<N>, config: DecomposerConfig) -> Self {
        Self { tiers, config }
    }

    /// Attribute `assignment` to (origin, destination) pairs
    ///
    /// For each relay `r` the pair `(o, d)` receives
    /// `min(flow(o, r), flow(r, d))`. Arcs between nodes of other tier
    /// combinations, untagged nodes, and tagged nodes absent from the
    /// assignment all contribute nothing.
    pub fn decompose(&self, assignment: &FlowAssignment<N>) -> Attribution<N> {
        let mut inbound: BTreeMap<&N, Vec<(&N, Flow)>> = BTreeMap::new();
        let mut outbound: HashMap<&N, Vec<(&N, Flow)>> = HashMap::new();

        for (from, to, flow) in assignment.iter() {
            if self.tiers.is(from, Tier::Origin) && self.tiers.is(to, Tier::Relay) {
                inbound.entry(from).or_default().push((to, flow));
            } else if self.tiers.is(from, Tier::Relay) && self.tiers.is(to, Tier::Destination) {
                outbound.entry(from).or_default().push((to, flow));
            }
        }

        let row_for = |relays: &[(&N, Flow)]| -> BTreeMap<N, Flow> {
            let mut row = BTreeMap::new();
            for &(relay, into_relay) in relays {
                let Some(targets) = outbound.get(relay) else { continue };
                for &(destination, out_of_relay) in targets {
                    let share = into_relay.min(out_of_relay);
                    if share > 0.0 {
                        *row.entry(destination.clone()).or_insert(0.0) += share;
                    }
                }
            }
            row
        };

        let origins: Vec<(&N, Vec<(&N, Flow)>)> = inbound.into_iter().collect();
        let parallel = origins.len() >= self.config.parallel_threshold;

        let rows: BTreeMap<N, BTreeMap<N, Flow>> = if parallel {
            origins
                .par_iter()
                .map(|(origin, relays)| ((*origin).clone(), row_for(relays)))
                .filter(|(_, row)| !row.is_empty())
                .collect::<Vec<_>>()
                .into_iter()
                .collect()
        } else {
            origins
                .iter()
                .map(|(origin, relays)| ((*origin).clone(), row_for(relays)))
                .filter(|(_, row)| !row.is_empty())
                .collect()
        };

        debug!(
            "Attributed flow for {} origins ({} pairs, parallel: {})",
            rows.len(),
            rows.values().map(BTreeMap::len).sum::<usize>(),
            parallel
        );

        Attribution { rows }
    }
}
