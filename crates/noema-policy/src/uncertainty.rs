//! Batch uncertainty estimators and the effective learning rate.

use noema_core::config::{PolicyConfig, UncertaintyEstimator};

use crate::signals::BatchSignals;

/// Uncertainty in `[0, 1]` for the batch.
pub fn estimate(estimator: UncertaintyEstimator, signals: &BatchSignals) -> f64 {
    let n = signals.ratable();
    if n == 0 {
        return match estimator {
            UncertaintyEstimator::Fixed(u) => u.clamp(0.0, 1.0),
            _ => 0.0,
        };
    }
    match estimator {
        UncertaintyEstimator::Disagreement => signals.disagreements as f64 / n as f64,
        UncertaintyEstimator::RewardSpread => reward_spread(&signals.rewards).min(1.0),
        UncertaintyEstimator::Fixed(u) => u.clamp(0.0, 1.0),
    }
}

/// `learning_rate * (1 + uncertainty_gain * u)`.
pub fn effective_learning_rate(config: &PolicyConfig, uncertainty: f64) -> f64 {
    config.learning_rate * (1.0 + config.uncertainty_gain * uncertainty)
}

/// Population standard deviation.
fn reward_spread(rewards: &[f64]) -> f64 {
    let n = rewards.len() as f64;
    let mean = rewards.iter().sum::<f64>() / n;
    let var = rewards.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let sd = var.sqrt();
    if sd.is_finite() {
        sd
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noema_core::models::TraceEntry;

    fn signals(entries: &[TraceEntry]) -> BatchSignals {
        BatchSignals::aggregate(entries, 1.0)
    }

    #[test]
    fn agreement_means_no_uncertainty() {
        let s = signals(&[TraceEntry::rated(1.0, "A", "A", "A")]);
        assert_eq!(estimate(UncertaintyEstimator::Disagreement, &s), 0.0);
    }

    #[test]
    fn disagreement_is_share_of_misses() {
        let s = signals(&[
            TraceEntry::rated(1.0, "A", "A", "B"),
            TraceEntry::rated(1.0, "A", "A", "A"),
        ]);
        assert_eq!(estimate(UncertaintyEstimator::Disagreement, &s), 0.5);
    }

    #[test]
    fn spread_is_clipped_to_one() {
        let s = signals(&[
            TraceEntry::rated(-5.0, "A", "A", "A"),
            TraceEntry::rated(5.0, "A", "A", "A"),
        ]);
        assert_eq!(estimate(UncertaintyEstimator::RewardSpread, &s), 1.0);
    }

    #[test]
    fn fixed_is_clamped() {
        let s = signals(&[]);
        assert_eq!(estimate(UncertaintyEstimator::Fixed(2.0), &s), 1.0);
    }

    #[test]
    fn gain_scales_learning_rate() {
        let config = PolicyConfig {
            learning_rate: 0.1,
            uncertainty_gain: 1.0,
            ..Default::default()
        };
        assert!((effective_learning_rate(&config, 0.5) - 0.15).abs() < 1e-12);
        assert_eq!(effective_learning_rate(&config, 0.0), 0.1);
    }
}
