//! # noema-core
//!
//! Foundation crate for the Noema learning loops.
//! Defines trace and graph types, summary documents, errors, config,
//! the content-addressed version store, and the persistence hand-off trait.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;
pub mod versioning;

// Re-export the most commonly used types at the crate root.
pub use config::NoemaConfig;
pub use errors::{NoemaError, NoemaResult};
pub use models::{TraceEntry, WeightTable};
pub use versioning::{VersionId, VersionStore, Versioned};
