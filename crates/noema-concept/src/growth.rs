//! ConceptGrowth: one graph pass over a batch, from mining to a frozen version.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use noema_core::config::{GraphConfig, MinerConfig, NoemaConfig, RuleConfig};
use noema_core::errors::NoemaResult;
use noema_core::models::{
    ConceptGraphUpdatesDoc, ConceptRule, LabelReward, RuleKind, TraceWindow,
};

use crate::edges::EdgeScorer;
use crate::graph::{ConceptGraph, GraphSnapshot};
use crate::miner;
use crate::nodes::NodeManager;
use crate::rules::{self, RuleExtractor};

/// Result of one graph pass.
#[derive(Debug, Clone)]
pub struct GrowthOutcome {
    pub snapshot: GraphSnapshot,
    pub updates: ConceptGraphUpdatesDoc,
}

/// The concept graph growth engine.
///
/// Orchestrates: mine windows → resolve and merge nodes → blend reward
/// affinity → score and prune edges → extract rules → freeze a version.
#[derive(Debug, Clone, Default)]
pub struct ConceptGrowth {
    miner: MinerConfig,
    nodes: NodeManager,
    scorer: EdgeScorer,
    extractor: RuleExtractor,
}

impl ConceptGrowth {
    pub fn new(miner: MinerConfig, graph: GraphConfig, rules: RuleConfig) -> Self {
        Self {
            miner,
            nodes: NodeManager::new(graph.clone()),
            scorer: EdgeScorer::new(graph),
            extractor: RuleExtractor::new(rules),
        }
    }

    pub fn from_config(config: &NoemaConfig) -> Self {
        Self::new(
            config.miner.clone(),
            config.graph.clone(),
            config.rules.clone(),
        )
    }

    /// Grow a child of `parent` from `windows`.
    ///
    /// Works on a copy of the parent graph. An empty batch still yields a new
    /// version whose counts match the parent.
    pub fn grow(
        &self,
        parent: &GraphSnapshot,
        windows: &[TraceWindow<'_>],
        label_rewards: &BTreeMap<String, LabelReward>,
    ) -> NoemaResult<GrowthOutcome> {
        let mut graph = ConceptGraph::clone(&parent.graph);
        let mut updates = ConceptGraphUpdatesDoc::default();
        let previous_rules = graph.rules.clone();

        for window in windows {
            let mined = miner::mine_window(window, &self.miner);
            let integration = self.nodes.integrate(&mut graph, &mined);
            if integration.skipped {
                updates.windows_skipped += 1;
                debug!(window = %window.key, "window already merged, skipped");
                continue;
            }
            updates.windows_processed += 1;
            updates.new_nodes += integration.new_nodes;
            updates.merged_terms += integration.merged_terms;
        }

        self.nodes.apply_reward_affinity(&mut graph, label_rewards);
        self.rescore(&mut graph, &mut updates);
        count_new_rules(&previous_rules, &graph, &mut updates);

        let snapshot = freeze(graph, parent)?;
        debug!(
            version = %snapshot.version.version_id,
            nodes = snapshot.version.node_count,
            edges = snapshot.version.edge_count,
            rules = snapshot.version.rule_count,
            pruned = updates.pruned_edges,
            "concept graph pass computed"
        );
        Ok(GrowthOutcome { snapshot, updates })
    }

    /// Merge node `absorbed` into `into` and re-derive edges and rules,
    /// producing a child of `parent`.
    pub fn merge(
        &self,
        parent: &GraphSnapshot,
        absorbed: &str,
        into: &str,
    ) -> NoemaResult<GrowthOutcome> {
        let mut graph = ConceptGraph::clone(&parent.graph);
        let mut updates = ConceptGraphUpdatesDoc::default();
        let previous_rules = graph.rules.clone();

        self.nodes.merge_nodes(&mut graph, absorbed, into)?;
        self.rescore(&mut graph, &mut updates);
        count_new_rules(&previous_rules, &graph, &mut updates);

        let snapshot = freeze(graph, parent)?;
        Ok(GrowthOutcome { snapshot, updates })
    }

    fn rescore(&self, graph: &mut ConceptGraph, updates: &mut ConceptGraphUpdatesDoc) {
        let scored = self.scorer.score(graph);
        updates.pruned_edges = scored.pruned;
        graph.rules = self.extractor.extract(&scored.graph, &graph.nodes);
        graph.edges = scored.graph.sorted_edges();
    }
}

fn freeze(graph: ConceptGraph, parent: &GraphSnapshot) -> NoemaResult<GraphSnapshot> {
    let version = rules::freeze_version(&graph, Some(parent.version_id()))?;
    Ok(GraphSnapshot {
        version,
        graph: Arc::new(graph),
    })
}

/// Count rules that were not present, by kind, in the parent graph.
fn count_new_rules(
    previous: &[ConceptRule],
    graph: &ConceptGraph,
    updates: &mut ConceptGraphUpdatesDoc,
) {
    let known: BTreeSet<_> = previous.iter().map(rules::rule_key).collect();
    for rule in graph.rules.iter().filter(|r| !known.contains(&rules::rule_key(r))) {
        updates.new_rules += 1;
        match rule.kind {
            RuleKind::Associative => updates.associative += 1,
            RuleKind::Synonym => updates.synonym += 1,
            RuleKind::Subsumption => updates.subsumption += 1,
        }
    }
}
