//! Per-label reward signals aggregated from one batch.

use std::collections::BTreeMap;

use noema_core::models::{LabelReward, TraceEntry};

/// Everything the updater needs from a batch, gathered in one scan.
#[derive(Debug, Clone, Default)]
pub struct BatchSignals {
    /// Averaged signal per touched label.
    pub signal: BTreeMap<String, f64>,
    /// Mean reward and sample count per target label.
    pub label_rewards: BTreeMap<String, LabelReward>,
    /// Rewards of ratable entries, in batch order.
    pub rewards: Vec<f64>,
    /// Ratable entries whose top prediction missed the target.
    pub disagreements: usize,
    /// Entries without a finite reward, target and actual label.
    pub skipped: usize,
}

impl BatchSignals {
    /// Scan `entries` once.
    ///
    /// The target label gains the reward; a differing top prediction loses
    /// `reward * penalty_scale`. Sums are divided by the ratable count.
    pub fn aggregate(entries: &[TraceEntry], penalty_scale: f64) -> Self {
        let mut out = Self::default();
        let mut reward_sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

        for entry in entries {
            let (Some(reward), Some(target)) = (entry.ratable_reward(), entry.target.as_deref())
            else {
                out.skipped += 1;
                continue;
            };
            out.rewards.push(reward);
            *out.signal.entry(target.to_string()).or_insert(0.0) += reward;

            let slot = reward_sums.entry(target).or_insert((0.0, 0));
            slot.0 += reward;
            slot.1 += 1;

            if let Some(pred) = entry.top_pred.as_deref() {
                if pred != target {
                    out.disagreements += 1;
                    *out.signal.entry(pred.to_string()).or_insert(0.0) -= reward * penalty_scale;
                }
            }
        }

        let n = out.rewards.len();
        if n > 0 {
            for value in out.signal.values_mut() {
                *value /= n as f64;
            }
        }
        out.label_rewards = reward_sums
            .into_iter()
            .map(|(label, (sum, samples))| {
                (
                    label.to_string(),
                    LabelReward {
                        mean_reward: sum / samples as f64,
                        samples,
                    },
                )
            })
            .collect();
        out
    }

    pub fn ratable(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Mean reward over ratable entries, 0 when there are none.
    ///
    /// Accumulates `r / n` so a batch of large finite rewards stays finite.
    pub fn avg_reward(&self) -> f64 {
        let n = self.rewards.len();
        if n == 0 {
            return 0.0;
        }
        self.rewards.iter().map(|r| r / n as f64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_top_prediction_is_penalized() {
        let entries = vec![TraceEntry::rated(1.0, "A", "A", "B")];
        let s = BatchSignals::aggregate(&entries, 1.0);
        assert_eq!(s.signal["A"], 1.0);
        assert_eq!(s.signal["B"], -1.0);
        assert_eq!(s.disagreements, 1);
    }

    #[test]
    fn signals_are_averaged_over_ratable_entries() {
        let entries = vec![
            TraceEntry::rated(1.0, "A", "A", "A"),
            TraceEntry::rated(0.0, "B", "B", "B"),
            TraceEntry::default().with_text("unrated"),
        ];
        let s = BatchSignals::aggregate(&entries, 1.0);
        assert_eq!(s.ratable(), 2);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.signal["A"], 0.5);
        assert_eq!(s.signal["B"], 0.0);
    }

    #[test]
    fn label_rewards_track_targets_only() {
        let entries = vec![
            TraceEntry::rated(1.0, "A", "A", "C"),
            TraceEntry::rated(0.0, "A", "A", "A"),
        ];
        let s = BatchSignals::aggregate(&entries, 1.0);
        assert_eq!(s.label_rewards.len(), 1);
        let a = s.label_rewards["A"];
        assert_eq!(a.samples, 2);
        assert!((a.mean_reward - 0.5).abs() < 1e-12);
    }

    #[test]
    fn avg_reward_of_empty_batch_is_zero() {
        assert_eq!(BatchSignals::default().avg_reward(), 0.0);
    }
}
