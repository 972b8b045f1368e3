//! Compiled defaults for every config section.

// Policy updater
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_UNCERTAINTY_GAIN: f64 = 1.0;
pub const DEFAULT_PENALTY_SCALE: f64 = 1.0;
pub const DEFAULT_INITIAL_WEIGHT: f64 = 0.5;
pub const DEFAULT_MIN_WEIGHT: f64 = -10.0;
pub const DEFAULT_MAX_WEIGHT: f64 = 10.0;
pub const DEFAULT_WEIGHT_PRECISION: u32 = 6;
pub const DEFAULT_POLICY_RETAINED_VERSIONS: usize = 64;

// Term miner
pub const DEFAULT_NGRAM_MIN: usize = 1;
pub const DEFAULT_NGRAM_MAX: usize = 3;
pub const DEFAULT_COOC_WINDOW: usize = 6;
pub const DEFAULT_MIN_TF: u32 = 1;
pub const DEFAULT_MAX_TERMS_PER_WINDOW: usize = 500;

// Node manager
pub const DEFAULT_MAX_SURFACES_PER_NODE: usize = 5;
pub const DEFAULT_SURFACE_BONUS: f64 = 0.25;
pub const DEFAULT_QUALITY_SCALE: f64 = 3.0;
pub const DEFAULT_AFFINITY_ALPHA: f64 = 0.3;

// Edge scorer
pub const DEFAULT_PMI_SMOOTHING: f64 = 0.5;
pub const DEFAULT_COOC_SCALE: f64 = 5.0;
pub const DEFAULT_WEIGHT_PMI: f64 = 0.35;
pub const DEFAULT_WEIGHT_COOC: f64 = 0.25;
pub const DEFAULT_WEIGHT_QUALITY: f64 = 0.2;
pub const DEFAULT_WEIGHT_REWARD: f64 = 0.2;
pub const DEFAULT_MIN_EDGE_WEIGHT: f64 = 0.15;
pub const DEFAULT_GRAPH_RETAINED_VERSIONS: usize = 32;
pub const DEFAULT_MAX_EDGES: usize = 1200;

// Rule extractor
pub const DEFAULT_SYNONYM_MIN_PMI: f64 = 1.0;
pub const DEFAULT_SYNONYM_DF_TOLERANCE: f64 = 0.1;
pub const DEFAULT_SYNONYM_QUALITY_TOLERANCE: f64 = 0.05;
pub const DEFAULT_SUBSUMPTION_MIN_CONDITIONAL: f64 = 0.8;
pub const DEFAULT_SUBSUMPTION_MAX_REVERSE: f64 = 0.5;
pub const DEFAULT_ASSOCIATIVE_MIN_WEIGHT: f64 = 0.35;
pub const DEFAULT_ASSOCIATIVE_MAX_ASYMMETRY: f64 = 0.25;
pub const DEFAULT_RULE_MIN_CONFIDENCE: f64 = 0.2;
pub const DEFAULT_MAX_RULES: usize = 1200;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
