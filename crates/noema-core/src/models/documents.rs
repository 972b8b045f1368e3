//! Fixed-schema documents published to persistence and observability collaborators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PolicySummary, WeightTable};
use crate::constants;
use crate::versioning::VersionId;

/// Which lineage a recorded document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Policy,
    ConceptGraph,
}

impl VersionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => constants::KIND_POLICY,
            Self::ConceptGraph => constants::KIND_CONCEPT_GRAPH,
        }
    }
}

impl std::fmt::Display for VersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the pointer moves back to if this version is reverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackPoint {
    pub version_id: Option<VersionId>,
    pub weights: WeightTable,
}

/// `policy.learning`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyLearningDoc {
    pub version_id: VersionId,
    pub parent_version_id: Option<VersionId>,
    pub weights: WeightTable,
    /// Applied change per touched label.
    pub delta: BTreeMap<String, f64>,
    pub rollback: RollbackPoint,
    pub summary: PolicySummary,
    /// False when the batch was a no-op and the parent was returned.
    pub created: bool,
    pub updated_at: DateTime<Utc>,
}

impl PolicyLearningDoc {
    pub const KIND: &'static str = constants::DOC_POLICY_LEARNING;
}

/// `concept_graph.version`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptGraphVersionDoc {
    pub version_id: VersionId,
    pub parent_version_id: Option<VersionId>,
    pub node_count: usize,
    pub edge_count: usize,
    pub rule_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl ConceptGraphVersionDoc {
    pub const KIND: &'static str = constants::DOC_CONCEPT_GRAPH_VERSION;
}

/// `concept_graph.updates`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConceptGraphUpdatesDoc {
    pub windows_processed: usize,
    pub windows_skipped: usize,
    pub new_nodes: usize,
    pub merged_terms: usize,
    pub pruned_edges: usize,
    pub new_rules: usize,
    pub associative: usize,
    pub synonym: usize,
    pub subsumption: usize,
}

impl ConceptGraphUpdatesDoc {
    pub const KIND: &'static str = constants::DOC_CONCEPT_GRAPH_UPDATES;
}

/// `adaptation.policy`: a read-only projection of [`PolicyLearningDoc`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationPolicyView {
    pub version_id: VersionId,
    pub avg_reward: f64,
    pub updates: usize,
    pub confidence: f64,
    pub delta_norm: f64,
}

impl AdaptationPolicyView {
    pub const KIND: &'static str = constants::DOC_ADAPTATION_POLICY;
}

impl From<&PolicyLearningDoc> for AdaptationPolicyView {
    fn from(doc: &PolicyLearningDoc) -> Self {
        Self {
            version_id: doc.version_id.clone(),
            avg_reward: doc.summary.avg_reward,
            updates: doc.summary.updates,
            confidence: doc.summary.confidence,
            delta_norm: doc.summary.delta_norm,
        }
    }
}

/// Payload handed to `IVersionRecorder::record_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionDocument {
    Policy(PolicyLearningDoc),
    ConceptGraph {
        version: ConceptGraphVersionDoc,
        updates: ConceptGraphUpdatesDoc,
    },
}

impl VersionDocument {
    pub fn kind(&self) -> VersionKind {
        match self {
            Self::Policy(_) => VersionKind::Policy,
            Self::ConceptGraph { .. } => VersionKind::ConceptGraph,
        }
    }

    pub fn version_id(&self) -> &VersionId {
        match self {
            Self::Policy(doc) => &doc.version_id,
            Self::ConceptGraph { version, .. } => &version.version_id,
        }
    }
}
