//! ChannelRecorder: fire-and-forget hand-off of version documents over a
//! tokio unbounded channel. A drain task on the receiving end owns persistence.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::warn;

use noema_core::models::{VersionDocument, VersionKind};
use noema_core::traits::IVersionRecorder;

/// One recorded document as it travels through the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVersion {
    pub kind: VersionKind,
    pub document: VersionDocument,
}

/// Receiver end handed to the drain task.
pub type RecordedVersionReceiver = mpsc::UnboundedReceiver<RecordedVersion>;

/// Never blocks the pass. Sends only fail once the receiver is gone; those
/// documents are dropped, counted, and logged.
#[derive(Debug)]
pub struct ChannelRecorder {
    sender: mpsc::UnboundedSender<RecordedVersion>,
    sent: AtomicU64,
    dropped: AtomicU64,
}

impl ChannelRecorder {
    pub fn new() -> (Self, RecordedVersionReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let recorder = Self {
            sender,
            sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        };
        (recorder, receiver)
    }

    /// `(sent, dropped)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.sent.load(Ordering::Relaxed),
            self.dropped.load(Ordering::Relaxed),
        )
    }
}

impl IVersionRecorder for ChannelRecorder {
    fn record_version(&self, kind: VersionKind, document: &VersionDocument) {
        let message = RecordedVersion {
            kind,
            document: document.clone(),
        };
        match self.sender.send(message) {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    kind = %kind,
                    version = %document.version_id(),
                    "version recorder channel closed, document dropped"
                );
            }
        }
    }
}
