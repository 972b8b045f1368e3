//! # noema-policy
//!
//! Policy reinforcement: signal aggregation → uncertainty-scaled step → clamped, rounded,
//! content-addressed snapshot. The ledger keeps a bounded version history with pointer rollback.

pub mod ledger;
pub mod signals;
pub mod uncertainty;
pub mod updater;

pub use ledger::PolicyLedger;
pub use signals::BatchSignals;
pub use updater::{PolicyOutcome, PolicyUpdater};
