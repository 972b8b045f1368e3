//! PolicyUpdater: turns one batch of rated traces into the next policy version.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use noema_core::config::{DeltaNorm, PolicyConfig};
use noema_core::errors::NoemaResult;
use noema_core::models::{LabelReward, PolicySummary, PolicyVersion, TraceEntry};
use noema_core::versioning::round_to;

use crate::signals::BatchSignals;
use crate::uncertainty;

/// Result of one policy update.
#[derive(Debug, Clone)]
pub struct PolicyOutcome {
    /// The new version, or the parent itself when nothing was created.
    pub version: Arc<PolicyVersion>,
    /// Whether `version` is a new child of the parent.
    pub created: bool,
    /// Applied per-label deltas after clamping and rounding.
    pub delta: BTreeMap<String, f64>,
    /// Mean reward per target label, consumed by graph growth.
    pub label_rewards: BTreeMap<String, LabelReward>,
    /// Uncertainty fed into the learning rate.
    pub uncertainty: f64,
    /// The learning rate actually applied.
    pub learning_rate: f64,
    /// Entries excluded as malformed.
    pub skipped: usize,
}

/// Reward-driven weight updater.
///
/// Never mutates the parent snapshot; every update produces a fresh table.
#[derive(Debug, Clone, Default)]
pub struct PolicyUpdater {
    config: PolicyConfig,
}

impl PolicyUpdater {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Apply `entries` on top of `parent`.
    pub fn update(
        &self,
        parent: &Arc<PolicyVersion>,
        entries: &[TraceEntry],
    ) -> NoemaResult<PolicyOutcome> {
        let signals = BatchSignals::aggregate(entries, self.config.penalty_scale);

        if signals.is_empty() {
            return self.empty_batch(parent, signals);
        }

        let u = uncertainty::estimate(self.config.uncertainty, &signals);
        let lr = uncertainty::effective_learning_rate(&self.config, u);
        let precision = self.config.precision;

        let mut weights = parent.weights.clone();
        let mut delta = BTreeMap::new();
        let mut rejected = Vec::new();

        for (label, signal) in &signals.signal {
            let old = parent
                .weights
                .get(label)
                .unwrap_or(self.config.initial_weight);
            let raw = old + lr * signal;
            if !raw.is_finite() {
                warn!(label = %label, signal = signal, "non-finite policy update rejected");
                rejected.push(label.clone());
                continue;
            }
            let new = round_to(
                raw.clamp(self.config.min_weight, self.config.max_weight),
                precision,
            );
            weights.insert(label.clone(), new);
            delta.insert(label.clone(), round_to(new - old, precision));
        }

        let weights = weights.rounded(precision);
        let delta_norm = round_to(norm(self.config.delta_norm, delta.values()), precision);
        let avg_reward = signals.avg_reward();
        let summary = PolicySummary {
            avg_reward: round_to(avg_reward, precision),
            updates: delta.len(),
            confidence: round_to(confidence(avg_reward, delta_norm), precision),
            delta_norm,
            skipped: signals.skipped,
            rejected,
        };

        let version = PolicyVersion {
            version_id: PolicyVersion::derive_id(&weights, Some(&parent.version_id))?,
            parent_version_id: Some(parent.version_id.clone()),
            rollback: Some(parent.weights.clone()),
            weights,
            summary,
            created_at: Utc::now(),
        };

        debug!(
            parent = %parent.version_id,
            version = %version.version_id,
            updates = version.summary.updates,
            delta_norm = version.summary.delta_norm,
            learning_rate = lr,
            "policy update computed"
        );

        Ok(PolicyOutcome {
            version: Arc::new(version),
            created: true,
            delta,
            label_rewards: signals.label_rewards,
            uncertainty: u,
            learning_rate: lr,
            skipped: signals.skipped,
        })
    }

    fn empty_batch(
        &self,
        parent: &Arc<PolicyVersion>,
        signals: BatchSignals,
    ) -> NoemaResult<PolicyOutcome> {
        let base = PolicyOutcome {
            version: Arc::clone(parent),
            created: false,
            delta: BTreeMap::new(),
            label_rewards: BTreeMap::new(),
            uncertainty: 0.0,
            learning_rate: 0.0,
            skipped: signals.skipped,
        };
        if !self.config.advance_on_empty {
            debug!(parent = %parent.version_id, skipped = signals.skipped, "no ratable entries, policy unchanged");
            return Ok(base);
        }

        let weights = parent.weights.clone();
        let version = PolicyVersion {
            version_id: PolicyVersion::derive_id(&weights, Some(&parent.version_id))?,
            parent_version_id: Some(parent.version_id.clone()),
            rollback: Some(parent.weights.clone()),
            weights,
            summary: PolicySummary {
                confidence: confidence(0.0, 0.0),
                skipped: signals.skipped,
                ..Default::default()
            },
            created_at: Utc::now(),
        };
        Ok(PolicyOutcome {
            version: Arc::new(version),
            created: true,
            ..base
        })
    }
}

/// Aggregate applied deltas with the configured norm.
pub fn norm<'a>(kind: DeltaNorm, deltas: impl Iterator<Item = &'a f64>) -> f64 {
    match kind {
        DeltaNorm::L1 => deltas.map(|d| d.abs()).sum(),
        DeltaNorm::L2 => deltas.map(|d| d * d).sum::<f64>().sqrt(),
    }
}

/// `((clamp(avg, -1, 1) + 1) / 2) / (1 + delta_norm)`, always in `[0, 1]`.
pub fn confidence(avg_reward: f64, delta_norm: f64) -> f64 {
    let reward = (avg_reward.clamp(-1.0, 1.0) + 1.0) / 2.0;
    reward / (1.0 + delta_norm.max(0.0))
}
