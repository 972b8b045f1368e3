use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WeightTable;
use crate::errors::{ConfigError, NoemaResult};
use crate::versioning::{content_id, VersionId, Versioned};

/// Aggregate statistics of one update cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicySummary {
    /// Mean reward over ratable entries (0 when none).
    pub avg_reward: f64,
    /// Labels whose update was applied.
    pub updates: usize,
    /// Bounded agreement score in `[0, 1]`.
    pub confidence: f64,
    /// Norm of the applied per-label deltas.
    pub delta_norm: f64,
    /// Malformed entries excluded from statistics.
    pub skipped: usize,
    /// Labels whose update was discarded as non-finite.
    pub rejected: Vec<String>,
}

/// Mean reward observed for one target label in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelReward {
    pub mean_reward: f64,
    pub samples: usize,
}

/// Immutable, content-addressed snapshot of a weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyVersion {
    pub version_id: VersionId,
    pub parent_version_id: Option<VersionId>,
    /// Rounded weights; exactly what `version_id` was derived from.
    pub weights: WeightTable,
    /// The parent's weights, kept so the pointer can move back without recomputation.
    pub rollback: Option<WeightTable>,
    pub summary: PolicySummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct PolicyHashPayload<'a> {
    parent: Option<&'a str>,
    weights: &'a WeightTable,
}

impl PolicyVersion {
    /// Derive the content-addressed id of a (rounded) weight table under `parent`.
    pub fn derive_id(weights: &WeightTable, parent: Option<&VersionId>) -> NoemaResult<VersionId> {
        content_id(&PolicyHashPayload {
            parent: parent.map(VersionId::as_str),
            weights,
        })
    }

    /// Root version of a lineage: no parent, no rollback payload.
    /// Every initial weight must be finite.
    pub fn genesis(weights: &WeightTable, precision: u32) -> NoemaResult<Self> {
        if let Some((label, weight)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(ConfigError::ValidationFailed {
                field: format!("initial_weights.{label}"),
                message: format!("weight must be finite, got {weight}"),
            }
            .into());
        }
        let weights = weights.rounded(precision);
        Ok(Self {
            version_id: Self::derive_id(&weights, None)?,
            parent_version_id: None,
            weights,
            rollback: None,
            summary: PolicySummary {
                confidence: 0.5,
                ..Default::default()
            },
            created_at: Utc::now(),
        })
    }
}

impl Versioned for PolicyVersion {
    fn version_id(&self) -> &VersionId {
        &self.version_id
    }

    fn parent_version_id(&self) -> Option<&VersionId> {
        self.parent_version_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NoemaError;

    #[test]
    fn genesis_id_matches_derivation() {
        let weights = WeightTable::uniform(["a", "b"], 0.5);
        let root = PolicyVersion::genesis(&weights, 6).unwrap();
        let again = PolicyVersion::derive_id(&root.weights, None).unwrap();
        assert_eq!(root.version_id, again);
        assert!(root.parent_version_id.is_none());
    }

    #[test]
    fn genesis_rejects_non_finite_weights() {
        let mut weights = WeightTable::uniform(["a"], 0.5);
        weights.insert("b", f64::NAN);
        let err = PolicyVersion::genesis(&weights, 6).unwrap_err();
        assert!(matches!(
            err,
            NoemaError::Config(ConfigError::ValidationFailed { ref field, .. }) if field == "initial_weights.b"
        ));

        weights.insert("b", f64::INFINITY);
        assert!(PolicyVersion::genesis(&weights, 6).is_err());
    }

    #[test]
    fn parent_changes_id() {
        let weights = WeightTable::uniform(["a"], 0.5);
        let parent = VersionId::from("p1");
        let with_parent = PolicyVersion::derive_id(&weights, Some(&parent)).unwrap();
        let without = PolicyVersion::derive_id(&weights, None).unwrap();
        assert_ne!(with_parent, without);
    }
}
