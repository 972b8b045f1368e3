//! Content-addressed version ids and the per-lineage version store.

mod hash;
mod store;

pub use hash::{content_id, round_to, VersionId};
pub use store::{VersionStore, Versioned};
