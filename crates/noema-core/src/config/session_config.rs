use serde::{Deserialize, Serialize};

/// What a second pass request does while one is in flight for the same session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// Wait for the in-flight pass to finish.
    Block,
    /// Fail fast with `SessionError::Busy`.
    #[default]
    Reject,
}

/// Session coordination configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Behaviour on overlapping passes. Default: reject.
    pub concurrency: ConcurrencyMode,
}
