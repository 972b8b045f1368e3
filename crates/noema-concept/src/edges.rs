//! Edge Scorer: smoothed PMI, conditional probability, reward correlation and
//! a bounded composite weight for every accumulated live pair.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::Directed;

use noema_core::config::GraphConfig;
use noema_core::constants::GRAPH_HASH_PRECISION;
use noema_core::models::{ConceptEdge, ConceptNode};
use noema_core::versioning::round_to;

use crate::graph::ConceptGraph;

/// The underlying directed graph type. Node weights are concept node ids.
pub type ConceptStableGraph = StableGraph<String, ConceptEdge, Directed>;

/// Wrapper providing id-indexed access to scored edges.
#[derive(Debug, Clone, Default)]
pub struct EdgeGraph {
    pub graph: ConceptStableGraph,
    /// Map from node id → NodeIndex for O(1) lookup.
    pub node_index: HashMap<String, NodeIndex>,
}

impl EdgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the index for a node id.
    pub fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_index.insert(id.to_string(), idx);
        idx
    }

    pub fn add_edge(&mut self, edge: ConceptEdge) -> EdgeIndex {
        let source = self.ensure_node(&edge.source_node_id);
        let target = self.ensure_node(&edge.target_node_id);
        self.graph.add_edge(source, target, edge)
    }

    /// The edge `source → target`, if present.
    pub fn edge(&self, source: &str, target: &str) -> Option<&ConceptEdge> {
        let s = *self.node_index.get(source)?;
        let t = *self.node_index.get(target)?;
        let idx = self.graph.find_edge(s, t)?;
        self.graph.edge_weight(idx)
    }

    /// The edge running the other way.
    pub fn reverse(&self, edge: &ConceptEdge) -> Option<&ConceptEdge> {
        self.edge(&edge.target_node_id, &edge.source_node_id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &ConceptEdge> {
        self.graph.edge_weights()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges sorted by (source, target).
    pub fn sorted_edges(&self) -> Vec<ConceptEdge> {
        let mut edges: Vec<ConceptEdge> = self.edges().cloned().collect();
        edges.sort_by(|a, b| {
            (&a.source_node_id, &a.target_node_id).cmp(&(&b.source_node_id, &b.target_node_id))
        });
        edges
    }
}

/// Result of a scoring pass.
#[derive(Debug, Clone, Default)]
pub struct ScoredEdges {
    pub graph: EdgeGraph,
    /// Directed edges removed for falling under `min_weight` or the edge cap.
    pub pruned: usize,
}

/// `1 - exp(-max(x, 0))`.
pub fn squash(x: f64) -> f64 {
    1.0 - (-x.max(0.0)).exp()
}

/// Smoothed PMI in bits with `P(x) = (n_x + alpha) / (n + alpha)`.
///
/// For fixed marginals this is strictly increasing in `n_ab`.
pub fn pmi(n_ab: u64, n_a: u64, n_b: u64, n: u64, alpha: f64) -> f64 {
    let total = n as f64 + alpha;
    if total <= 0.0 {
        return 0.0;
    }
    let p = |count: u64| (count as f64 + alpha) / total;
    let ratio = p(n_ab) / (p(n_a) * p(n_b));
    if ratio.is_finite() && ratio > 0.0 {
        ratio.log2()
    } else {
        0.0
    }
}

/// Scores every accumulated live pair in both directions.
#[derive(Debug, Clone, Default)]
pub struct EdgeScorer {
    config: GraphConfig,
}

impl EdgeScorer {
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, graph: &ConceptGraph) -> ScoredEdges {
        let mut edges = EdgeGraph::new();
        for ((a, b), stats) in &graph.pairs {
            let (Some(na), Some(nb)) = (graph.nodes.get(a), graph.nodes.get(b)) else {
                continue;
            };
            if !na.is_live() || !nb.is_live() || stats.co_occurrence == 0 {
                continue;
            }

            let pmi_bits = round_to(
                pmi(
                    stats.entries,
                    na.entry_count,
                    nb.entry_count,
                    graph.entries_seen,
                    self.config.pmi_smoothing,
                ),
                GRAPH_HASH_PRECISION,
            );
            let correlation = round_to(
                stats.reward_correlation(&graph.rewards),
                GRAPH_HASH_PRECISION,
            );
            let weight = round_to(
                self.weight(pmi_bits, stats.co_occurrence, na, nb, correlation),
                GRAPH_HASH_PRECISION,
            );

            for (source, target) in [(na, nb), (nb, na)] {
                edges.add_edge(ConceptEdge {
                    source_node_id: source.id.clone(),
                    target_node_id: target.id.clone(),
                    pmi: pmi_bits,
                    co_occurrence: stats.co_occurrence,
                    conditional: round_to(
                        conditional(stats.entries, source.entry_count),
                        GRAPH_HASH_PRECISION,
                    ),
                    reward_correlation: correlation,
                    weight,
                });
            }
        }

        let pruned = prune_weak_edges(&mut edges, self.config.min_weight)
            + cap_edges(&mut edges, self.config.max_edges);
        ScoredEdges {
            graph: edges,
            pruned,
        }
    }

    fn weight(
        &self,
        pmi: f64,
        co_occurrence: u64,
        a: &ConceptNode,
        b: &ConceptNode,
        correlation: f64,
    ) -> f64 {
        let c = &self.config;
        c.weight_pmi * squash(pmi)
            + c.weight_cooc * squash(co_occurrence as f64 / c.cooc_scale)
            + c.weight_quality * a.quality.min(b.quality)
            + c.weight_reward * reward_term(correlation, a, b).max(0.0)
    }
}

/// Mean of the correlation and whichever node reward affinities exist,
/// each clipped to `[-1, 1]`.
fn reward_term(correlation: f64, a: &ConceptNode, b: &ConceptNode) -> f64 {
    let values: Vec<f64> = std::iter::once(correlation)
        .chain(a.reward_affinity)
        .chain(b.reward_affinity)
        .map(|v| v.clamp(-1.0, 1.0))
        .collect();
    values.iter().sum::<f64>() / values.len() as f64
}

fn conditional(n_ab: u64, n_source: u64) -> f64 {
    if n_source == 0 {
        return 0.0;
    }
    (n_ab as f64 / n_source as f64).min(1.0)
}

/// Remove every edge whose weight is below `min_weight`.
pub fn prune_weak_edges(graph: &mut EdgeGraph, min_weight: f64) -> usize {
    let weak: Vec<EdgeIndex> = graph
        .graph
        .edge_indices()
        .filter(|&idx| {
            graph
                .graph
                .edge_weight(idx)
                .is_some_and(|e| e.weight < min_weight)
        })
        .collect();

    let removed = weak.len();
    for idx in weak {
        graph.graph.remove_edge(idx);
    }
    removed
}

/// Keep the `max_edges` strongest edges, ranked by weight, co-occurrence,
/// then PMI, with (source, target) breaking ties. Returns how many were dropped.
pub fn cap_edges(graph: &mut EdgeGraph, max_edges: usize) -> usize {
    if graph.edge_count() <= max_edges {
        return 0;
    }
    let mut ranked: Vec<(EdgeIndex, &ConceptEdge)> = graph
        .graph
        .edge_indices()
        .filter_map(|idx| graph.graph.edge_weight(idx).map(|e| (idx, e)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.weight
            .total_cmp(&a.weight)
            .then(b.co_occurrence.cmp(&a.co_occurrence))
            .then(b.pmi.total_cmp(&a.pmi))
            .then_with(|| {
                (&a.source_node_id, &a.target_node_id).cmp(&(&b.source_node_id, &b.target_node_id))
            })
    });
    let dropped: Vec<EdgeIndex> = ranked.into_iter().skip(max_edges).map(|(idx, _)| idx).collect();

    let removed = dropped.len();
    for idx in dropped {
        graph.graph.remove_edge(idx);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str, weight: f64) -> ConceptEdge {
        ConceptEdge {
            source_node_id: source.into(),
            target_node_id: target.into(),
            pmi: 0.0,
            co_occurrence: 1,
            conditional: 0.5,
            reward_correlation: 0.0,
            weight,
        }
    }

    #[test]
    fn squash_is_bounded() {
        assert_eq!(squash(-3.0), 0.0);
        assert_eq!(squash(0.0), 0.0);
        assert!(squash(100.0) <= 1.0);
        assert!(squash(1.0) > squash(0.5));
    }

    #[test]
    fn pmi_increases_with_joint_count() {
        let low = pmi(1, 5, 5, 20, 0.5);
        let high = pmi(4, 5, 5, 20, 0.5);
        assert!(high > low);
    }

    #[test]
    fn independent_terms_have_near_zero_pmi() {
        // n_a = n_b = N: every entry has both terms.
        let v = pmi(10, 10, 10, 10, 0.5);
        assert!(v.abs() < 1e-9);
    }

    #[test]
    fn prune_removes_only_weak_edges() {
        let mut g = EdgeGraph::new();
        g.add_edge(edge("a", "b", 0.1));
        g.add_edge(edge("b", "a", 0.1));
        g.add_edge(edge("a", "c", 0.4));
        assert_eq!(prune_weak_edges(&mut g, 0.15), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.edge("a", "c").is_some());
        assert!(g.edge("a", "b").is_none());
    }

    #[test]
    fn cap_keeps_strongest_edges() {
        let mut g = EdgeGraph::new();
        g.add_edge(edge("a", "b", 0.9));
        g.add_edge(edge("b", "a", 0.9));
        g.add_edge(edge("a", "c", 0.4));
        let mut frequent = edge("c", "a", 0.4);
        frequent.co_occurrence = 7;
        g.add_edge(frequent);
        g.add_edge(edge("b", "c", 0.2));

        assert_eq!(cap_edges(&mut g, 3), 2);
        assert_eq!(g.edge_count(), 3);
        assert!(g.edge("a", "b").is_some());
        assert!(g.edge("b", "a").is_some());
        // Equal weight: the higher co-occurrence wins.
        assert!(g.edge("c", "a").is_some());
        assert!(g.edge("a", "c").is_none());
        assert!(g.edge("b", "c").is_none());
        assert_eq!(cap_edges(&mut g, 3), 0);
    }

    #[test]
    fn scorer_counts_capped_edges_as_pruned() {
        let mut graph = ConceptGraph::new();
        for (id, term) in [("n1", "refund"), ("n2", "cancel"), ("n3", "order")] {
            graph.nodes.insert(
                id.to_string(),
                ConceptNode {
                    id: id.to_string(),
                    canonical_term: term.to_string(),
                    ngram: 1,
                    surfaces: Default::default(),
                    tf: 4,
                    df: 2,
                    quality: 0.8,
                    entry_count: 4,
                    windows: Default::default(),
                    reward_affinity: None,
                    superseded_by: None,
                },
            );
        }
        graph.entries_seen = 4;
        for pair in [("n1", "n2"), ("n1", "n3"), ("n2", "n3")] {
            let stats = graph.pairs.entry((pair.0.to_string(), pair.1.to_string())).or_default();
            stats.co_occurrence = 4;
            stats.entries = 4;
        }

        let uncapped = EdgeScorer::new(GraphConfig::default()).score(&graph);
        assert_eq!(uncapped.graph.edge_count(), 6);
        assert_eq!(uncapped.pruned, 0);

        let capped = EdgeScorer::new(GraphConfig {
            max_edges: 4,
            ..Default::default()
        })
        .score(&graph);
        assert_eq!(capped.graph.edge_count(), 4);
        assert_eq!(capped.pruned, 2);
    }

    #[test]
    fn reverse_lookup() {
        let mut g = EdgeGraph::new();
        let ab = edge("a", "b", 0.5);
        g.add_edge(ab.clone());
        assert!(g.reverse(&ab).is_none());
        g.add_edge(edge("b", "a", 0.5));
        assert_eq!(g.reverse(&ab).map(|e| e.source_node_id.as_str()), Some("b"));
    }
}
