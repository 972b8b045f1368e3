use serde::{Deserialize, Serialize};

use super::defaults;

/// How the batch uncertainty feeding the learning-rate scale is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyEstimator {
    /// Share of ratable entries whose top prediction missed the target.
    #[default]
    Disagreement,
    /// Standard deviation of batch rewards, clipped to 1.
    RewardSpread,
    /// A constant uncertainty in `[0, 1]`.
    Fixed(f64),
}

/// Norm used to aggregate per-label deltas into `delta_norm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaNorm {
    /// Sum of absolute deltas.
    L1,
    /// Euclidean norm of deltas.
    #[default]
    L2,
}

/// Policy updater configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Base learning rate before uncertainty scaling. Default: 0.1.
    pub learning_rate: f64,
    /// Uncertainty estimator. Default: disagreement.
    pub uncertainty: UncertaintyEstimator,
    /// Multiplier on uncertainty: `lr_eff = lr * (1 + gain * u)`. Default: 1.0.
    pub uncertainty_gain: f64,
    /// Scale of the penalty applied to a wrong top prediction. Default: 1.0.
    pub penalty_scale: f64,
    /// Starting weight for labels not yet in the table. Default: 0.5.
    pub initial_weight: f64,
    /// Lower clamp for weights. Default: -10.0.
    pub min_weight: f64,
    /// Upper clamp for weights. Default: 10.0.
    pub max_weight: f64,
    /// Decimal places kept before snapshotting. Default: 6.
    pub precision: u32,
    /// Norm used for `delta_norm`. Default: l2.
    pub delta_norm: DeltaNorm,
    /// Chain a new identical-weights version on an empty batch. Default: false.
    pub advance_on_empty: bool,
    /// Versions kept in memory before the oldest are evicted. Default: 64.
    pub max_retained_versions: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            uncertainty: UncertaintyEstimator::default(),
            uncertainty_gain: defaults::DEFAULT_UNCERTAINTY_GAIN,
            penalty_scale: defaults::DEFAULT_PENALTY_SCALE,
            initial_weight: defaults::DEFAULT_INITIAL_WEIGHT,
            min_weight: defaults::DEFAULT_MIN_WEIGHT,
            max_weight: defaults::DEFAULT_MAX_WEIGHT,
            precision: defaults::DEFAULT_WEIGHT_PRECISION,
            delta_norm: DeltaNorm::default(),
            advance_on_empty: false,
            max_retained_versions: defaults::DEFAULT_POLICY_RETAINED_VERSIONS,
        }
    }
}
