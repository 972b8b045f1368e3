use serde::{Deserialize, Serialize};

use super::defaults;

/// Term miner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Smallest n-gram size mined. Default: 1.
    pub ngram_min: usize,
    /// Largest n-gram size mined. Default: 3.
    pub ngram_max: usize,
    /// Maximum token distance for two terms to co-occur. Default: 6.
    pub cooc_window: usize,
    /// Minimum term frequency within a window. Default: 1.
    pub min_tf: u32,
    /// Cap on distinct terms kept per window. Default: 500.
    pub max_terms_per_window: usize,
    /// Entries per trace window; 0 keeps the whole batch as one window. Default: 0.
    pub window_entries: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            ngram_min: defaults::DEFAULT_NGRAM_MIN,
            ngram_max: defaults::DEFAULT_NGRAM_MAX,
            cooc_window: defaults::DEFAULT_COOC_WINDOW,
            min_tf: defaults::DEFAULT_MIN_TF,
            max_terms_per_window: defaults::DEFAULT_MAX_TERMS_PER_WINDOW,
            window_entries: 0,
        }
    }
}
