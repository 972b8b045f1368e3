//! # noema-concept
//!
//! Concept graph growth: term mining → node resolution and merge → edge scoring →
//! rule extraction → frozen, content-addressed graph version.
//! Every pass works on a copy of the parent graph, so a failed pass leaves it untouched.

pub mod edges;
pub mod graph;
pub mod growth;
pub mod history;
pub mod miner;
pub mod nodes;
pub mod rules;
pub mod stats;
pub mod stopwords;

pub use graph::{ConceptGraph, GraphSnapshot};
pub use growth::{ConceptGrowth, GrowthOutcome};
pub use history::GraphHistory;
