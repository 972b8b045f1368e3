//! Rule Extractor: typed rules from scored edges, and the frozen graph version.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use noema_core::config::RuleConfig;
use noema_core::constants::GRAPH_HASH_PRECISION;
use noema_core::errors::NoemaResult;
use noema_core::models::{ConceptEdge, ConceptGraphVersion, ConceptNode, ConceptRule, RuleKind};
use noema_core::versioning::{content_id, round_to, VersionId};

use crate::edges::{squash, EdgeGraph};
use crate::graph::ConceptGraph;

/// Classify one directed edge. Checked in order synonym → subsumption →
/// associative, so at most one kind applies.
pub fn classify(
    edge: &ConceptEdge,
    reverse: Option<&ConceptEdge>,
    source: &ConceptNode,
    target: &ConceptNode,
    config: &RuleConfig,
) -> Option<RuleKind> {
    if is_synonym(edge, reverse, source, target, config) {
        return Some(RuleKind::Synonym);
    }
    let reverse_conditional = reverse.map_or(0.0, |r| r.conditional);
    if edge.conditional >= config.subsumption_min_conditional
        && reverse_conditional <= config.subsumption_max_reverse
        && target.df >= source.df
    {
        return Some(RuleKind::Subsumption);
    }
    if let Some(rev) = reverse {
        if edge.weight >= config.associative_min_weight
            && rev.weight >= config.associative_min_weight
            && (edge.conditional - rev.conditional).abs() <= config.associative_max_asymmetry
        {
            return Some(RuleKind::Associative);
        }
    }
    None
}

fn is_synonym(
    edge: &ConceptEdge,
    reverse: Option<&ConceptEdge>,
    source: &ConceptNode,
    target: &ConceptNode,
    config: &RuleConfig,
) -> bool {
    reverse.is_some()
        && edge.pmi >= config.synonym_min_pmi
        && df_gap(source, target) <= config.synonym_df_tolerance
        && (source.quality - target.quality).abs() <= config.synonym_quality_tolerance
}

/// `|df_a - df_b| / max(df_a, df_b)`, zero when both are zero.
fn df_gap(a: &ConceptNode, b: &ConceptNode) -> f64 {
    let max = a.df.max(b.df);
    if max == 0 {
        return 0.0;
    }
    a.df.abs_diff(b.df) as f64 / max as f64
}

/// Extracts rules from the edges that survived pruning.
#[derive(Debug, Clone, Default)]
pub struct RuleExtractor {
    config: RuleConfig,
}

impl RuleExtractor {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Rules sorted by (kind, antecedent, consequent), at most `max_rules`,
    /// keeping the most confident when capped.
    pub fn extract(&self, edges: &EdgeGraph, nodes: &BTreeMap<String, ConceptNode>) -> Vec<ConceptRule> {
        let mut rules = Vec::new();
        for edge in edges.edges() {
            let (Some(source), Some(target)) = (
                nodes.get(&edge.source_node_id),
                nodes.get(&edge.target_node_id),
            ) else {
                continue;
            };
            let reverse = edges.reverse(edge);
            let Some(kind) = classify(edge, reverse, source, target, &self.config) else {
                continue;
            };
            // Symmetric kinds are emitted once per pair, from the smaller id.
            if kind != RuleKind::Subsumption && edge.source_node_id > edge.target_node_id {
                continue;
            }
            let rule = self.build(kind, edge, reverse, source, target);
            if rule.confidence >= self.config.min_confidence {
                rules.push(rule);
            }
        }

        if rules.len() > self.config.max_rules {
            rules.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| rule_key(a).cmp(&rule_key(b)))
            });
            rules.truncate(self.config.max_rules);
        }
        rules.sort_by(|a, b| rule_key(a).cmp(&rule_key(b)));
        rules
    }

    fn build(
        &self,
        kind: RuleKind,
        edge: &ConceptEdge,
        reverse: Option<&ConceptEdge>,
        source: &ConceptNode,
        target: &ConceptNode,
    ) -> ConceptRule {
        let supporting: Vec<&ConceptEdge> = std::iter::once(edge).chain(reverse).collect();
        let reward_evidence = supporting.iter().map(|e| e.reward_correlation).sum::<f64>()
            / supporting.len() as f64;
        let mean_weight =
            supporting.iter().map(|e| e.weight).sum::<f64>() / supporting.len() as f64;

        let confidence = match kind {
            RuleKind::Synonym => {
                let similarity = 1.0
                    - (df_gap(source, target) + (source.quality - target.quality).abs()) / 2.0;
                0.6 * similarity + 0.4 * mean_weight
            }
            RuleKind::Subsumption => 0.5 * edge.weight + 0.5 * edge.conditional,
            RuleKind::Associative => {
                0.5 * mean_weight + 0.2 * squash(edge.pmi) + 0.3 * reward_evidence.max(0.0)
            }
        };

        ConceptRule {
            kind,
            antecedent_node_id: source.id.clone(),
            consequent_node_id: target.id.clone(),
            confidence: round_to(confidence.clamp(0.0, 1.0), GRAPH_HASH_PRECISION),
            reward_evidence: round_to(reward_evidence, GRAPH_HASH_PRECISION),
        }
    }
}

pub(crate) fn rule_key(rule: &ConceptRule) -> (RuleKind, &str, &str) {
    (
        rule.kind,
        rule.antecedent_node_id.as_str(),
        rule.consequent_node_id.as_str(),
    )
}

#[derive(Serialize)]
struct GraphHashPayload<'a> {
    parent: Option<&'a str>,
    nodes: Vec<&'a ConceptNode>,
    edges: &'a [ConceptEdge],
    rules: &'a [ConceptRule],
}

/// Freeze the graph into a content-addressed version.
///
/// The id covers every node (sorted by id), the sorted edge and rule lists,
/// and the parent id. Float fields are already rounded when stored.
pub fn freeze_version(
    graph: &ConceptGraph,
    parent: Option<&VersionId>,
) -> NoemaResult<ConceptGraphVersion> {
    let payload = GraphHashPayload {
        parent: parent.map(VersionId::as_str),
        nodes: graph.nodes.values().collect(),
        edges: &graph.edges,
        rules: &graph.rules,
    };
    Ok(ConceptGraphVersion {
        version_id: content_id(&payload)?,
        parent_version_id: parent.cloned(),
        node_count: graph.live_node_count(),
        edge_count: graph.edges.len(),
        rule_count: graph.rules.len(),
        created_at: Utc::now(),
    })
}
