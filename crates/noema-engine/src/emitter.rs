//! Version/Summary Emitter: formats pass results into the fixed-schema documents.
//!
//! Everything here copies fields that were computed upstream. Nothing is
//! recomputed, so a document always agrees with the version it describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use noema_concept::{GraphSnapshot, GrowthOutcome};
use noema_core::models::{
    AdaptationPolicyView, ConceptGraphUpdatesDoc, ConceptGraphVersionDoc, PolicyLearningDoc,
    RollbackPoint, VersionDocument,
};
use noema_core::versioning::VersionId;
use noema_policy::PolicyOutcome;

/// `policy.learning` for one policy outcome.
pub fn policy_learning(outcome: &PolicyOutcome) -> PolicyLearningDoc {
    let version = &outcome.version;
    PolicyLearningDoc {
        version_id: version.version_id.clone(),
        parent_version_id: version.parent_version_id.clone(),
        weights: version.weights.clone(),
        delta: outcome.delta.clone(),
        rollback: RollbackPoint {
            version_id: version.parent_version_id.clone(),
            weights: version
                .rollback
                .clone()
                .unwrap_or_else(|| version.weights.clone()),
        },
        summary: version.summary.clone(),
        created: outcome.created,
        updated_at: version.created_at,
    }
}

/// `concept_graph.version` for one snapshot.
pub fn graph_version(snapshot: &GraphSnapshot) -> ConceptGraphVersionDoc {
    let version = &snapshot.version;
    ConceptGraphVersionDoc {
        version_id: version.version_id.clone(),
        parent_version_id: version.parent_version_id.clone(),
        node_count: version.node_count,
        edge_count: version.edge_count,
        rule_count: version.rule_count,
        updated_at: version.created_at,
    }
}

/// All documents produced by one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassDocuments {
    pub policy: PolicyLearningDoc,
    pub adaptation: AdaptationPolicyView,
    pub graph_version: ConceptGraphVersionDoc,
    pub graph_updates: ConceptGraphUpdatesDoc,
}

impl PassDocuments {
    pub fn build(policy: &PolicyOutcome, graph: &GrowthOutcome) -> Self {
        let policy = policy_learning(policy);
        Self {
            adaptation: AdaptationPolicyView::from(&policy),
            policy,
            graph_version: graph_version(&graph.snapshot),
            graph_updates: graph.updates.clone(),
        }
    }

    /// Documents for newly constructed versions only. A policy no-op returns
    /// the parent, which was recorded when it was created.
    pub fn version_documents(&self) -> Vec<VersionDocument> {
        let mut docs = Vec::with_capacity(2);
        if self.policy.created {
            docs.push(VersionDocument::Policy(self.policy.clone()));
        }
        docs.push(VersionDocument::ConceptGraph {
            version: self.graph_version.clone(),
            updates: self.graph_updates.clone(),
        });
        docs
    }
}

/// The last committed pass of a session as seen by observability readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSummary {
    pub policy_version_id: VersionId,
    pub graph_version_id: VersionId,
    pub avg_reward: f64,
    pub updates: usize,
    pub confidence: f64,
    pub delta_norm: f64,
    pub node_count: usize,
    pub edge_count: usize,
    pub rule_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&PassDocuments> for LatestSummary {
    fn from(docs: &PassDocuments) -> Self {
        Self {
            policy_version_id: docs.adaptation.version_id.clone(),
            graph_version_id: docs.graph_version.version_id.clone(),
            avg_reward: docs.adaptation.avg_reward,
            updates: docs.adaptation.updates,
            confidence: docs.adaptation.confidence,
            delta_norm: docs.adaptation.delta_norm,
            node_count: docs.graph_version.node_count,
            edge_count: docs.graph_version.edge_count,
            rule_count: docs.graph_version.rule_count,
            updated_at: docs.graph_version.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use noema_concept::ConceptGrowth;
    use noema_core::models::{PolicyVersion, TraceEntry, WeightTable};
    use noema_policy::PolicyUpdater;

    fn outcomes(entries: &[TraceEntry]) -> (PolicyOutcome, GrowthOutcome) {
        let parent = Arc::new(PolicyVersion::genesis(&WeightTable::uniform(["A", "B"], 0.5), 6).unwrap());
        let policy = PolicyUpdater::default().update(&parent, entries).unwrap();
        let graph = ConceptGrowth::default()
            .grow(&GraphSnapshot::genesis().unwrap(), &[], &BTreeMap::new())
            .unwrap();
        (policy, graph)
    }

    #[test]
    fn adaptation_view_copies_policy_summary() {
        let entries = vec![TraceEntry::rated(1.0, "A", "A", "A"); 3];
        let (policy, graph) = outcomes(&entries);
        let docs = PassDocuments::build(&policy, &graph);
        assert_eq!(docs.adaptation.version_id, docs.policy.version_id);
        assert_eq!(docs.adaptation.avg_reward, docs.policy.summary.avg_reward);
        assert_eq!(docs.adaptation.confidence, docs.policy.summary.confidence);
        assert_eq!(docs.adaptation.delta_norm, docs.policy.summary.delta_norm);
        assert_eq!(docs.policy.rollback.version_id, docs.policy.parent_version_id);
        assert_eq!(docs.policy.rollback.weights.get("A"), Some(0.5));
    }

    #[test]
    fn noop_policy_is_not_re_recorded() {
        let (policy, graph) = outcomes(&[]);
        let docs = PassDocuments::build(&policy, &graph);
        assert!(!docs.policy.created);
        let recorded = docs.version_documents();
        assert_eq!(recorded.len(), 1);
        assert!(matches!(recorded[0], VersionDocument::ConceptGraph { .. }));
    }

    #[test]
    fn summary_mirrors_documents() {
        let entries = vec![TraceEntry::rated(1.0, "A", "A", "A").with_text("refund please")];
        let (policy, graph) = outcomes(&entries);
        let docs = PassDocuments::build(&policy, &graph);
        let summary = LatestSummary::from(&docs);
        assert_eq!(summary.updates, docs.policy.summary.updates);
        assert_eq!(summary.node_count, docs.graph_version.node_count);
        assert_eq!(summary.graph_version_id, docs.graph_version.version_id);
    }
}
