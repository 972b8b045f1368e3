use crate::models::{VersionDocument, VersionKind};

/// Persistence hand-off called once per newly constructed version.
///
/// Fire-and-forget: implementations must not block the caller, and delivery
/// guarantees (retries, at-least-once) are their own concern.
pub trait IVersionRecorder: Send + Sync {
    fn record_version(&self, kind: VersionKind, document: &VersionDocument);
}

/// Discards every document.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRecorder;

impl IVersionRecorder for NoOpRecorder {
    fn record_version(&self, _kind: VersionKind, _document: &VersionDocument) {}
}
