//! Data model shared by the policy and concept-graph loops.

mod concept;
mod documents;
mod policy_version;
mod trace;
mod weights;

pub use concept::{ConceptEdge, ConceptGraphVersion, ConceptNode, ConceptRule, RuleKind};
pub use documents::{
    AdaptationPolicyView, ConceptGraphUpdatesDoc, ConceptGraphVersionDoc, PolicyLearningDoc,
    RollbackPoint, VersionDocument, VersionKind,
};
pub use policy_version::{LabelReward, PolicySummary, PolicyVersion};
pub use trace::{segment_windows, TraceEntry, TraceWindow};
pub use weights::WeightTable;
