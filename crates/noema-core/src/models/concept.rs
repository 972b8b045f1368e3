use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::INTENT_PREFIX;
use crate::versioning::{VersionId, Versioned};

/// Canonical graph node for one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: String,
    pub canonical_term: String,
    /// Token count of the term (intent terms count as 1).
    pub ngram: usize,
    /// Raw surface forms seen for this term, capped.
    pub surfaces: BTreeSet<String>,
    /// Total occurrences across processed windows.
    pub tf: u64,
    /// Distinct windows containing the term.
    pub df: u64,
    /// Bounded quality score in `[0, 1)`.
    pub quality: f64,
    /// Trace entries containing the term; the unit PMI is counted in.
    pub entry_count: u64,
    /// Window keys already merged into this node.
    pub windows: BTreeSet<String>,
    /// Blended policy reward for intent nodes.
    pub reward_affinity: Option<f64>,
    /// Set when this node was merged into another.
    pub superseded_by: Option<String>,
}

impl ConceptNode {
    pub fn is_intent(&self) -> bool {
        self.canonical_term.starts_with(INTENT_PREFIX)
    }

    /// The intent label, for intent nodes.
    pub fn intent_label(&self) -> Option<&str> {
        self.canonical_term.strip_prefix(INTENT_PREFIX)
    }

    pub fn is_live(&self) -> bool {
        self.superseded_by.is_none()
    }
}

/// Directed, scored relation between two live nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub source_node_id: String,
    pub target_node_id: String,
    /// Smoothed pointwise mutual information, in bits.
    pub pmi: f64,
    /// Accumulated raw co-occurrence count.
    pub co_occurrence: u64,
    /// P(target | source), counted in entries.
    pub conditional: f64,
    /// Pearson correlation of per-entry co-occurrence with entry reward.
    pub reward_correlation: f64,
    pub weight: f64,
}

/// Rule kinds derived from scored edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Associative,
    Synonym,
    Subsumption,
}

impl RuleKind {
    pub const ALL: [RuleKind; 3] = [Self::Associative, Self::Synonym, Self::Subsumption];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Associative => "associative",
            Self::Synonym => "synonym",
            Self::Subsumption => "subsumption",
        }
    }
}

/// A typed rule. For subsumption the antecedent is the narrower term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRule {
    pub kind: RuleKind,
    pub antecedent_node_id: String,
    pub consequent_node_id: String,
    pub confidence: f64,
    /// Mean reward correlation of the supporting edges.
    pub reward_evidence: f64,
}

/// Frozen, content-addressed summary of one graph pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptGraphVersion {
    pub version_id: VersionId,
    pub parent_version_id: Option<VersionId>,
    pub node_count: usize,
    pub edge_count: usize,
    pub rule_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Versioned for ConceptGraphVersion {
    fn version_id(&self) -> &VersionId {
        &self.version_id
    }

    fn parent_version_id(&self) -> Option<&VersionId> {
        self.parent_version_id.as_ref()
    }
}
