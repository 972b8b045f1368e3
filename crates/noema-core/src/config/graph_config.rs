use serde::{Deserialize, Serialize};

use super::defaults;

/// Node manager and edge scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Distinct surface forms kept per node. Default: 5.
    pub max_surfaces_per_node: usize,
    /// Quality bonus per extra surface form. Default: 0.25.
    pub surface_bonus: f64,
    /// Divisor inside the quality squash. Default: 3.0.
    pub quality_scale: f64,
    /// EMA factor for blending policy label rewards into intent nodes. Default: 0.3.
    pub affinity_alpha: f64,
    /// Additive smoothing applied to every PMI count. Default: 0.5.
    pub pmi_smoothing: f64,
    /// Co-occurrence count mapped to ~0.63 by the squash. Default: 5.0.
    pub cooc_scale: f64,
    /// Blend weight of squashed PMI. Default: 0.35.
    pub weight_pmi: f64,
    /// Blend weight of squashed co-occurrence. Default: 0.25.
    pub weight_cooc: f64,
    /// Blend weight of the weaker node's quality. Default: 0.2.
    pub weight_quality: f64,
    /// Blend weight of positive reward evidence. Default: 0.2.
    pub weight_reward: f64,
    /// Edges below this weight are pruned. Default: 0.15.
    pub min_weight: f64,
    /// Directed edges kept per scoring pass, strongest first. Default: 1200.
    pub max_edges: usize,
    /// Graph snapshots kept for pointer rollback. Default: 32.
    pub max_retained_versions: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_surfaces_per_node: defaults::DEFAULT_MAX_SURFACES_PER_NODE,
            surface_bonus: defaults::DEFAULT_SURFACE_BONUS,
            quality_scale: defaults::DEFAULT_QUALITY_SCALE,
            affinity_alpha: defaults::DEFAULT_AFFINITY_ALPHA,
            pmi_smoothing: defaults::DEFAULT_PMI_SMOOTHING,
            cooc_scale: defaults::DEFAULT_COOC_SCALE,
            weight_pmi: defaults::DEFAULT_WEIGHT_PMI,
            weight_cooc: defaults::DEFAULT_WEIGHT_COOC,
            weight_quality: defaults::DEFAULT_WEIGHT_QUALITY,
            weight_reward: defaults::DEFAULT_WEIGHT_REWARD,
            min_weight: defaults::DEFAULT_MIN_EDGE_WEIGHT,
            max_edges: defaults::DEFAULT_MAX_EDGES,
            max_retained_versions: defaults::DEFAULT_GRAPH_RETAINED_VERSIONS,
        }
    }
}
