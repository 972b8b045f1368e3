//! Noema configuration: one `#[serde(default)]` section per subsystem,
//! loaded from TOML with environment overrides and validation.

pub mod defaults;
mod graph_config;
mod miner_config;
mod observability_config;
mod policy_config;
mod rule_config;
mod session_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use graph_config::GraphConfig;
pub use miner_config::MinerConfig;
pub use observability_config::ObservabilityConfig;
pub use policy_config::{DeltaNorm, PolicyConfig, UncertaintyEstimator};
pub use rule_config::RuleConfig;
pub use session_config::{ConcurrencyMode, SessionConfig};

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`NOEMA_*`, applied via `apply_env_overrides`)
/// 2. TOML file or string
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoemaConfig {
    pub policy: PolicyConfig,
    pub miner: MinerConfig,
    pub graph: GraphConfig,
    pub rules: RuleConfig,
    pub session: SessionConfig,
    pub observability: ObservabilityConfig,
}

impl NoemaConfig {
    /// Load configuration from a TOML string. Missing keys fall back to defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, apply `NOEMA_*` overrides, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.apply_env_overrides();
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded noema config");
        Ok(config)
    }

    /// Apply `NOEMA_*` environment variables on top of the current values.
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<f64>("NOEMA_POLICY_LEARNING_RATE") {
            self.policy.learning_rate = v;
        }
        if let Some(v) = env_parse::<bool>("NOEMA_POLICY_ADVANCE_ON_EMPTY") {
            self.policy.advance_on_empty = v;
        }
        if let Some(v) = env_parse::<usize>("NOEMA_MINER_WINDOW_ENTRIES") {
            self.miner.window_entries = v;
        }
        if let Some(v) = env_parse::<f64>("NOEMA_GRAPH_MIN_WEIGHT") {
            self.graph.min_weight = v;
        }
        if let Some(v) = env_parse::<f64>("NOEMA_GRAPH_PMI_SMOOTHING") {
            self.graph.pmi_smoothing = v;
        }
        if let Ok(val) = std::env::var("NOEMA_SESSION_CONCURRENCY") {
            match val.to_ascii_lowercase().as_str() {
                "block" => self.session.concurrency = ConcurrencyMode::Block,
                "reject" => self.session.concurrency = ConcurrencyMode::Reject,
                _ => {}
            }
        }
        if let Ok(val) = std::env::var("NOEMA_LOG_LEVEL") {
            self.observability.log_level = val;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.policy;
        if !(p.learning_rate.is_finite() && p.learning_rate > 0.0) {
            return Err(invalid("policy.learning_rate", "must be a positive finite number"));
        }
        if let UncertaintyEstimator::Fixed(u) = p.uncertainty {
            if !(0.0..=1.0).contains(&u) {
                return Err(invalid("policy.uncertainty", "fixed value must be between 0.0 and 1.0"));
            }
        }
        if p.uncertainty_gain < 0.0 {
            return Err(invalid("policy.uncertainty_gain", "must not be negative"));
        }
        if p.min_weight >= p.max_weight {
            return Err(invalid("policy.min_weight", "must be below policy.max_weight"));
        }
        if p.precision > 12 {
            return Err(invalid("policy.precision", "must be at most 12 decimal places"));
        }
        if p.max_retained_versions == 0 {
            return Err(invalid("policy.max_retained_versions", "must be greater than 0"));
        }

        let m = &self.miner;
        if m.ngram_min == 0 || m.ngram_min > m.ngram_max {
            return Err(invalid("miner.ngram_min", "must be at least 1 and not above miner.ngram_max"));
        }
        if m.cooc_window == 0 {
            return Err(invalid("miner.cooc_window", "must be greater than 0"));
        }

        let g = &self.graph;
        if g.pmi_smoothing < 0.0 {
            return Err(invalid("graph.pmi_smoothing", "must not be negative"));
        }
        if g.quality_scale <= 0.0 || g.cooc_scale <= 0.0 {
            return Err(invalid("graph.quality_scale", "scales must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&g.affinity_alpha) {
            return Err(invalid("graph.affinity_alpha", "must be between 0.0 and 1.0"));
        }
        if g.max_retained_versions == 0 {
            return Err(invalid("graph.max_retained_versions", "must be greater than 0"));
        }
        if g.max_edges == 0 {
            return Err(invalid("graph.max_edges", "must be greater than 0"));
        }

        let r = &self.rules;
        if !(0.0..=1.0).contains(&r.subsumption_min_conditional)
            || !(0.0..=1.0).contains(&r.subsumption_max_reverse)
        {
            return Err(invalid("rules.subsumption_min_conditional", "conditionals must be between 0.0 and 1.0"));
        }
        if r.subsumption_max_reverse >= r.subsumption_min_conditional {
            return Err(invalid(
                "rules.subsumption_max_reverse",
                "must be below rules.subsumption_min_conditional",
            ));
        }
        // A pair asymmetric enough for subsumption must never also pass as associative.
        if r.associative_max_asymmetry >= r.subsumption_min_conditional - r.subsumption_max_reverse {
            return Err(invalid(
                "rules.associative_max_asymmetry",
                "must be below rules.subsumption_min_conditional - rules.subsumption_max_reverse",
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
