/// Per-session pass coordination errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session {session_id} already has a learning pass in flight")]
    Busy { session_id: String },

    #[error("session not found: {session_id}")]
    NotFound { session_id: String },

    #[error("session {session_id} state lock poisoned")]
    Poisoned { session_id: String },
}
