//! Span definitions per operation: learning pass, policy update, graph growth, rollback.

/// Create a span for one learning pass.
#[macro_export]
macro_rules! pass_span {
    ($session:expr, $entries:expr) => {
        tracing::info_span!("noema.pass", session = %$session, entries = $entries)
    };
}

/// Create a policy update span.
#[macro_export]
macro_rules! policy_span {
    ($parent:expr) => {
        tracing::info_span!("noema.policy", parent = %$parent)
    };
}

/// Create a graph growth span.
#[macro_export]
macro_rules! graph_span {
    ($parent:expr, $windows:expr) => {
        tracing::info_span!("noema.graph", parent = %$parent, windows = $windows)
    };
}

/// Create a rollback span.
#[macro_export]
macro_rules! rollback_span {
    ($session:expr, $kind:expr, $target:expr) => {
        tracing::info_span!("noema.rollback", session = %$session, kind = %$kind, target = %$target)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const PASS: &str = "noema.pass";
    pub const POLICY: &str = "noema.policy";
    pub const GRAPH: &str = "noema.graph";
    pub const ROLLBACK: &str = "noema.rollback";
}
