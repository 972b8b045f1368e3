//! ConceptGraph state and the immutable snapshots kept per version.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use noema_core::constants::INTENT_PREFIX;
use noema_core::errors::NoemaResult;
use noema_core::models::{ConceptEdge, ConceptGraphVersion, ConceptNode, ConceptRule};
use noema_core::versioning::{VersionId, Versioned};

use crate::nodes::{node_id, normalize_surface};
use crate::rules;
use crate::stats::{PairStats, RewardMoments};

/// Full concept graph state. Cloned at the start of every pass and mutated
/// only on the clone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptGraph {
    /// Every node ever created, keyed by id. Superseded nodes stay.
    pub nodes: BTreeMap<String, ConceptNode>,
    /// Normalized surface → node id.
    pub surface_registry: BTreeMap<String, String>,
    /// Accumulated stats per unordered live pair `(smaller id, larger id)`.
    pub pairs: BTreeMap<(String, String), PairStats>,
    /// Trace entries processed, the PMI denominator.
    pub entries_seen: u64,
    pub rewards: RewardMoments,
    /// Window keys already merged.
    pub windows_seen: BTreeSet<String>,
    /// Edges surviving the last scoring pass, sorted by (source, target).
    pub edges: Vec<ConceptEdge>,
    /// Rules from the last extraction, sorted by (kind, antecedent, consequent).
    pub rules: Vec<ConceptRule>,
}

impl ConceptGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_nodes(&self) -> impl Iterator<Item = &ConceptNode> {
        self.nodes.values().filter(|n| n.is_live())
    }

    pub fn live_node_count(&self) -> usize {
        self.live_nodes().count()
    }

    /// Live node for a canonical term, following merges. Falls back to the
    /// surface registry for terms that resolved onto another node.
    pub fn node_by_term(&self, term: &str) -> Option<&ConceptNode> {
        let ngram = if term.starts_with(INTENT_PREFIX) {
            1
        } else {
            term.split(' ').count()
        };
        if let Some(node) = self.live_node(&node_id(term, ngram)) {
            return Some(node);
        }
        let owner = self.surface_registry.get(&normalize_surface(term))?;
        self.live_node(owner)
    }

    /// Follow `superseded_by` links to the live node.
    pub fn live_node(&self, id: &str) -> Option<&ConceptNode> {
        let mut node = self.nodes.get(id)?;
        for _ in 0..self.nodes.len() {
            match &node.superseded_by {
                Some(next) => node = self.nodes.get(next)?,
                None => return Some(node),
            }
        }
        None
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&ConceptEdge> {
        self.edges
            .binary_search_by(|e| {
                (e.source_node_id.as_str(), e.target_node_id.as_str()).cmp(&(source, target))
            })
            .ok()
            .map(|i| &self.edges[i])
    }
}

/// An immutable graph state together with the version that froze it.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub version: ConceptGraphVersion,
    pub graph: Arc<ConceptGraph>,
}

impl GraphSnapshot {
    /// The root snapshot of a fresh session: an empty graph with no parent.
    pub fn genesis() -> NoemaResult<Self> {
        Self::root(ConceptGraph::new())
    }

    /// Wrap an existing state as a root snapshot.
    pub fn root(graph: ConceptGraph) -> NoemaResult<Self> {
        let version = rules::freeze_version(&graph, None)?;
        Ok(Self {
            version,
            graph: Arc::new(graph),
        })
    }

    pub fn version_id(&self) -> &VersionId {
        &self.version.version_id
    }
}

impl Versioned for GraphSnapshot {
    fn version_id(&self) -> &VersionId {
        &self.version.version_id
    }

    fn parent_version_id(&self) -> Option<&VersionId> {
        self.version.parent_version_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(graph: &mut ConceptGraph, term: &str, ngram: usize) -> String {
        let id = node_id(term, ngram);
        graph.nodes.insert(
            id.clone(),
            ConceptNode {
                id: id.clone(),
                canonical_term: term.to_string(),
                ngram,
                surfaces: BTreeSet::new(),
                tf: 1,
                df: 1,
                quality: 0.5,
                entry_count: 1,
                windows: BTreeSet::new(),
                reward_affinity: None,
                superseded_by: None,
            },
        );
        graph.surface_registry.insert(normalize_surface(term), id.clone());
        id
    }

    #[test]
    fn term_lookup_derives_the_node_id() {
        let mut graph = ConceptGraph::new();
        let order = insert(&mut graph, "cancel my order", 3);
        let intent = insert(&mut graph, "intent::track order", 1);
        assert_eq!(graph.node_by_term("cancel my order").map(|n| &n.id), Some(&order));
        assert_eq!(graph.node_by_term("intent::track order").map(|n| &n.id), Some(&intent));
        assert!(graph.node_by_term("cancel").is_none());
    }

    #[test]
    fn term_lookup_follows_merges_and_registry() {
        let mut graph = ConceptGraph::new();
        let refund = insert(&mut graph, "refund", 1);
        let repay = insert(&mut graph, "repayment", 1);
        if let Some(node) = graph.nodes.get_mut(&repay) {
            node.superseded_by = Some(refund.clone());
        }
        graph.surface_registry.insert("reimbursement".to_string(), refund.clone());

        assert_eq!(graph.node_by_term("repayment").map(|n| &n.id), Some(&refund));
        assert_eq!(graph.node_by_term("reimbursement").map(|n| &n.id), Some(&refund));
    }
}
