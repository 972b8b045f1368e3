//! Accumulated co-occurrence and reward statistics behind edge scores.

use serde::{Deserialize, Serialize};

/// Reward moments over every ratable entry the graph has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardMoments {
    pub n: u64,
    pub sum: f64,
    pub sum_sq: f64,
}

impl RewardMoments {
    pub fn observe(&mut self, reward: f64) {
        self.n += 1;
        self.sum += reward;
        self.sum_sq += reward * reward;
    }
}

/// Accumulated statistics for one unordered node pair.
///
/// `sum_x*` are sufficient statistics of the per-entry co-occurrence count
/// over ratable entries; entries without the pair contribute zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    pub co_occurrence: u64,
    /// Entries where the pair co-occurred.
    pub entries: u64,
    pub sum_x: f64,
    pub sum_x_sq: f64,
    pub sum_xy: f64,
}

impl PairStats {
    /// Record one ratable entry where the pair co-occurred `x` times.
    pub fn observe_reward(&mut self, x: f64, reward: f64) {
        self.sum_x += x;
        self.sum_x_sq += x * x;
        self.sum_xy += x * reward;
    }

    pub fn absorb(&mut self, other: &PairStats) {
        self.co_occurrence += other.co_occurrence;
        self.entries += other.entries;
        self.sum_x += other.sum_x;
        self.sum_x_sq += other.sum_x_sq;
        self.sum_xy += other.sum_xy;
    }

    /// Pearson correlation between per-entry co-occurrence and reward.
    /// Zero when either side has no variance.
    pub fn reward_correlation(&self, rewards: &RewardMoments) -> f64 {
        let n = rewards.n as f64;
        if rewards.n < 2 {
            return 0.0;
        }
        let cov = n * self.sum_xy - self.sum_x * rewards.sum;
        let var_x = n * self.sum_x_sq - self.sum_x * self.sum_x;
        let var_y = n * rewards.sum_sq - rewards.sum * rewards.sum;
        let denom = (var_x * var_y).sqrt();
        if !denom.is_finite() || denom <= f64::EPSILON {
            return 0.0;
        }
        (cov / denom).clamp(-1.0, 1.0)
    }
}
