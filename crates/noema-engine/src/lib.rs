//! # noema-engine
//!
//! Runs learning passes per session: the policy update first, then concept
//! graph growth fed with the policy's per-label rewards. Both results commit
//! together or not at all. Also owns the version documents, the persistence
//! hand-off, rollback entry points, and tracing setup.

pub mod emitter;
pub mod engine;
pub mod recorder;
pub mod session;
pub mod tracing_setup;

pub use emitter::{LatestSummary, PassDocuments};
pub use engine::{LearningEngine, PassOutcome, PassRequest, SessionHeads};
pub use recorder::{ChannelRecorder, RecordedVersion};
pub use session::{Session, SessionRegistry};
