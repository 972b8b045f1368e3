//! Node Manager: resolves mined terms to canonical nodes and merges window counts.

use std::collections::{BTreeMap, BTreeSet};

use noema_core::config::GraphConfig;
use noema_core::constants::{GRAPH_HASH_PRECISION, NODE_ID_HEX_LEN};
use noema_core::errors::GraphError;
use noema_core::models::{ConceptNode, LabelReward};
use noema_core::versioning::round_to;

use crate::graph::ConceptGraph;
use crate::miner::{fold_case, intent_key, MinedWindow};
use crate::stats::PairStats;

/// Stable node id: the first hex characters of `blake3(key | n)`.
pub fn node_id(key: &str, ngram: usize) -> String {
    let digest = blake3::hash(format!("{key}|{ngram}").as_bytes()).to_hex();
    digest[..NODE_ID_HEX_LEN].to_string()
}

/// Case-folded NFC, whitespace-collapsed surface used as the registry key.
pub fn normalize_surface(surface: &str) -> String {
    fold_case(&surface.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// `1 - exp(-(ln(1+tf) * (1+ln(max(df,1))) * (1 + bonus*(surfaces-1))) / scale)`.
pub fn quality(tf: u64, df: u64, surfaces: usize, config: &GraphConfig) -> f64 {
    let freq = (1.0 + tf as f64).ln();
    let spread = 1.0 + (df.max(1) as f64).ln();
    let variety = 1.0 + config.surface_bonus * (surfaces.max(1) - 1) as f64;
    let raw = freq * spread * variety / config.quality_scale;
    round_to(1.0 - (-raw).exp(), GRAPH_HASH_PRECISION)
}

/// What one window did to the node set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowIntegration {
    /// The window key was already merged; nothing changed.
    pub skipped: bool,
    pub new_nodes: usize,
    /// Terms resolved onto an existing node.
    pub merged_terms: usize,
}

#[derive(Default)]
struct NodeDelta {
    tf: u64,
    entry_count: u64,
    surfaces: BTreeSet<String>,
}

/// Resolves terms to nodes and folds window counts into the graph.
#[derive(Debug, Clone, Default)]
pub struct NodeManager {
    config: GraphConfig,
}

impl NodeManager {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Fold one mined window into `graph`.
    ///
    /// A window key seen before is skipped whole, so replaying a batch under
    /// the same key leaves every count unchanged.
    pub fn integrate(&self, graph: &mut ConceptGraph, mined: &MinedWindow) -> WindowIntegration {
        let mut outcome = WindowIntegration::default();
        if !graph.windows_seen.insert(mined.key.clone()) {
            outcome.skipped = true;
            return outcome;
        }
        graph.entries_seen += mined.entry_total;

        let mut ids: BTreeMap<&str, String> = BTreeMap::new();
        let mut deltas: BTreeMap<String, NodeDelta> = BTreeMap::new();
        for (key, term) in &mined.terms {
            let (id, created) = self.resolve(graph, key, term.ngram);
            if created {
                outcome.new_nodes += 1;
            } else {
                outcome.merged_terms += 1;
            }
            let delta = deltas.entry(id.clone()).or_default();
            delta.tf += term.tf;
            delta.entry_count += term.entry_count;
            delta.surfaces.extend(term.surfaces.iter().cloned());
            ids.insert(key.as_str(), id);
        }

        for (id, delta) in deltas {
            for surface in &delta.surfaces {
                self.add_surface(graph, &id, surface);
            }
            if let Some(node) = graph.nodes.get_mut(&id) {
                if node.windows.insert(mined.key.clone()) {
                    node.tf += delta.tf;
                    node.entry_count += delta.entry_count;
                }
                node.df = node.windows.len() as u64;
                node.quality = quality(node.tf, node.df, node.surfaces.len(), &self.config);
            }
        }

        let resolve_pair = |(a, b): &(String, String)| -> Option<(String, String)> {
            let (ia, ib) = (ids.get(a.as_str())?, ids.get(b.as_str())?);
            match ia.cmp(ib) {
                std::cmp::Ordering::Less => Some((ia.clone(), ib.clone())),
                std::cmp::Ordering::Greater => Some((ib.clone(), ia.clone())),
                std::cmp::Ordering::Equal => None,
            }
        };

        for (pair, count) in &mined.pairs {
            if let Some(key) = resolve_pair(pair) {
                let stats = graph.pairs.entry(key).or_default();
                stats.co_occurrence += count.count;
                stats.entries += count.entries;
            }
        }

        for entry in &mined.entries {
            let Some(reward) = entry.reward else {
                continue;
            };
            graph.rewards.observe(reward);
            let mut per_pair: BTreeMap<(String, String), u64> = BTreeMap::new();
            for (pair, x) in &entry.pairs {
                if let Some(key) = resolve_pair(pair) {
                    *per_pair.entry(key).or_insert(0) += x;
                }
            }
            for (key, x) in per_pair {
                graph
                    .pairs
                    .entry(key)
                    .or_default()
                    .observe_reward(x as f64, reward);
            }
        }

        outcome
    }

    /// Blend per-label mean rewards into the matching intent nodes.
    /// Returns how many nodes changed.
    pub fn apply_reward_affinity(
        &self,
        graph: &mut ConceptGraph,
        label_rewards: &BTreeMap<String, LabelReward>,
    ) -> usize {
        let alpha = self.config.affinity_alpha;
        let mut updated = 0;
        for (label, reward) in label_rewards {
            if !reward.mean_reward.is_finite() {
                continue;
            }
            let Some(id) = graph
                .live_node(&node_id(&intent_key(label), 1))
                .map(|n| n.id.clone())
            else {
                continue;
            };
            if let Some(node) = graph.nodes.get_mut(&id) {
                let blended = match node.reward_affinity {
                    Some(prev) => alpha * reward.mean_reward + (1.0 - alpha) * prev,
                    None => reward.mean_reward,
                };
                node.reward_affinity = Some(round_to(blended, GRAPH_HASH_PRECISION));
                updated += 1;
            }
        }
        updated
    }

    /// Merge `absorbed` into `into`.
    ///
    /// The absorbed node is kept but marked `superseded_by`; its surfaces,
    /// counts, windows and pair statistics move to the surviving node.
    pub fn merge_nodes(
        &self,
        graph: &mut ConceptGraph,
        absorbed: &str,
        into: &str,
    ) -> Result<(), GraphError> {
        if absorbed == into {
            return Err(GraphError::SelfMerge {
                node_id: into.to_string(),
            });
        }
        let live = |graph: &ConceptGraph, id: &str| -> Result<ConceptNode, GraphError> {
            let node = graph.nodes.get(id).ok_or_else(|| GraphError::UnknownNode {
                node_id: id.to_string(),
            })?;
            match &node.superseded_by {
                Some(next) => Err(GraphError::Superseded {
                    node_id: id.to_string(),
                    superseded_by: next.clone(),
                }),
                None => Ok(node.clone()),
            }
        };
        let source = live(graph, absorbed)?;
        live(graph, into)?;

        for surface in &source.surfaces {
            self.add_surface(graph, into, surface);
        }
        if let Some(target) = graph.nodes.get_mut(into) {
            target.tf += source.tf;
            target.entry_count += source.entry_count;
            target.windows.extend(source.windows.iter().cloned());
            target.df = target.windows.len() as u64;
            target.quality = quality(target.tf, target.df, target.surfaces.len(), &self.config);
        }
        if let Some(node) = graph.nodes.get_mut(absorbed) {
            node.superseded_by = Some(into.to_string());
        }

        for owner in graph.surface_registry.values_mut() {
            if owner.as_str() == absorbed {
                *owner = into.to_string();
            }
        }
        graph
            .surface_registry
            .insert(normalize_surface(&source.canonical_term), into.to_string());

        let moved: Vec<((String, String), PairStats)> = graph
            .pairs
            .iter()
            .filter(|((a, b), _)| a == absorbed || b == absorbed)
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        for (key, stats) in moved {
            graph.pairs.remove(&key);
            let other = if key.0 == absorbed { key.1 } else { key.0 };
            if other == into {
                continue;
            }
            let remapped = if into < other.as_str() {
                (into.to_string(), other)
            } else {
                (other, into.to_string())
            };
            graph.pairs.entry(remapped).or_default().absorb(&stats);
        }
        Ok(())
    }

    /// Existing live node for `key`, by id and then by surface registry, or a new node.
    fn resolve(&self, graph: &mut ConceptGraph, key: &str, ngram: usize) -> (String, bool) {
        let id = node_id(key, ngram);
        if graph.nodes.contains_key(&id) {
            let live = graph.live_node(&id).map(|n| n.id.clone());
            return (live.unwrap_or(id), false);
        }
        if let Some(owner) = graph.surface_registry.get(&normalize_surface(key)) {
            if let Some(node) = graph.live_node(owner) {
                return (node.id.clone(), false);
            }
        }

        graph.nodes.insert(
            id.clone(),
            ConceptNode {
                id: id.clone(),
                canonical_term: key.to_string(),
                ngram,
                surfaces: BTreeSet::new(),
                tf: 0,
                df: 0,
                quality: 0.0,
                entry_count: 0,
                windows: BTreeSet::new(),
                reward_affinity: None,
                superseded_by: None,
            },
        );
        graph
            .surface_registry
            .insert(normalize_surface(key), id.clone());
        (id, true)
    }

    fn add_surface(&self, graph: &mut ConceptGraph, id: &str, surface: &str) {
        if let Some(node) = graph.nodes.get_mut(id) {
            if node.surfaces.len() < self.config.max_surfaces_per_node {
                node.surfaces.insert(surface.to_string());
            }
        }
        graph
            .surface_registry
            .entry(normalize_surface(surface))
            .or_insert_with(|| id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_short_and_stable() {
        let a = node_id("refund", 1);
        assert_eq!(a.len(), NODE_ID_HEX_LEN);
        assert_eq!(a, node_id("refund", 1));
        assert_ne!(a, node_id("refund", 2));
    }

    #[test]
    fn quality_grows_with_evidence() {
        let config = GraphConfig::default();
        let low = quality(1, 1, 1, &config);
        let more_tf = quality(5, 1, 1, &config);
        let more_df = quality(5, 3, 1, &config);
        let more_surfaces = quality(5, 3, 3, &config);
        assert!(low > 0.0);
        assert!(low < more_tf && more_tf < more_df && more_df < more_surfaces);
        assert!(more_surfaces < 1.0);
    }

    #[test]
    fn surface_normalization() {
        assert_eq!(normalize_surface("  Refund   Policy "), "refund policy");
        assert_eq!(normalize_surface("CAFE\u{301}"), "caf\u{e9}");
    }
}
