/// Noema system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix applied to intent labels when they become concept terms.
pub const INTENT_PREFIX: &str = "intent::";

/// Number of hex characters kept from a blake3 digest for concept node ids.
pub const NODE_ID_HEX_LEN: usize = 16;

/// Decimal places used when rounding graph statistics before hashing.
pub const GRAPH_HASH_PRECISION: u32 = 6;

/// Lineage names used in version errors and store labels.
pub const KIND_POLICY: &str = "policy";
pub const KIND_CONCEPT_GRAPH: &str = "concept_graph";

/// Document kind names, as published to persistence collaborators.
pub const DOC_POLICY_LEARNING: &str = "policy.learning";
pub const DOC_CONCEPT_GRAPH_VERSION: &str = "concept_graph.version";
pub const DOC_CONCEPT_GRAPH_UPDATES: &str = "concept_graph.updates";
pub const DOC_ADAPTATION_POLICY: &str = "adaptation.policy";
