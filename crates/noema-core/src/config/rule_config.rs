use serde::{Deserialize, Serialize};

use super::defaults;

/// Rule extractor thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Minimum PMI (bits) for a synonym. Default: 1.0.
    pub synonym_min_pmi: f64,
    /// Maximum relative df gap for a synonym. Default: 0.1.
    pub synonym_df_tolerance: f64,
    /// Maximum quality gap for a synonym. Default: 0.05.
    pub synonym_quality_tolerance: f64,
    /// Minimum P(broader | narrower) for subsumption. Default: 0.8.
    pub subsumption_min_conditional: f64,
    /// Maximum P(narrower | broader) for subsumption. Default: 0.5.
    pub subsumption_max_reverse: f64,
    /// Minimum weight in both directions for an associative rule. Default: 0.35.
    pub associative_min_weight: f64,
    /// Maximum conditional asymmetry for an associative rule. Default: 0.25.
    pub associative_max_asymmetry: f64,
    /// Rules below this confidence are dropped. Default: 0.2.
    pub min_confidence: f64,
    /// Cap on rules kept per pass. Default: 1200.
    pub max_rules: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            synonym_min_pmi: defaults::DEFAULT_SYNONYM_MIN_PMI,
            synonym_df_tolerance: defaults::DEFAULT_SYNONYM_DF_TOLERANCE,
            synonym_quality_tolerance: defaults::DEFAULT_SYNONYM_QUALITY_TOLERANCE,
            subsumption_min_conditional: defaults::DEFAULT_SUBSUMPTION_MIN_CONDITIONAL,
            subsumption_max_reverse: defaults::DEFAULT_SUBSUMPTION_MAX_REVERSE,
            associative_min_weight: defaults::DEFAULT_ASSOCIATIVE_MIN_WEIGHT,
            associative_max_asymmetry: defaults::DEFAULT_ASSOCIATIVE_MAX_ASYMMETRY,
            min_confidence: defaults::DEFAULT_RULE_MIN_CONFIDENCE,
            max_rules: defaults::DEFAULT_MAX_RULES,
        }
    }
}
