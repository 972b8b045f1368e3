//! SessionRegistry: concurrent per-session state via DashMap.
//!
//! Each session owns its policy ledger and graph history behind one mutex,
//! so at most one pass runs per session. The latest summary sits behind its
//! own lock and stays readable while a pass is in flight.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};

use dashmap::DashMap;

use noema_concept::GraphHistory;
use noema_core::config::ConcurrencyMode;
use noema_core::errors::SessionError;
use noema_policy::PolicyLedger;

use crate::emitter::LatestSummary;

/// Mutable learning state of one session.
#[derive(Debug)]
pub struct SessionState {
    pub policy: PolicyLedger,
    pub graph: GraphHistory,
}

#[derive(Debug)]
pub struct Session {
    id: String,
    state: Mutex<SessionState>,
    summary: RwLock<Option<LatestSummary>>,
}

impl Session {
    pub fn new(id: impl Into<String>, state: SessionState) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(state),
            summary: RwLock::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Exclusive access to the session state.
    ///
    /// `Reject` fails with `Busy` while another pass holds the lock; `Block`
    /// waits for it.
    pub fn lock(&self, mode: ConcurrencyMode) -> Result<MutexGuard<'_, SessionState>, SessionError> {
        match mode {
            ConcurrencyMode::Reject => match self.state.try_lock() {
                Ok(guard) => Ok(guard),
                Err(TryLockError::WouldBlock) => Err(SessionError::Busy {
                    session_id: self.id.clone(),
                }),
                Err(TryLockError::Poisoned(_)) => Err(self.poisoned()),
            },
            ConcurrencyMode::Block => self.state.lock().map_err(|_| self.poisoned()),
        }
    }

    pub fn latest_summary(&self) -> Result<Option<LatestSummary>, SessionError> {
        self.summary
            .read()
            .map(|s| s.clone())
            .map_err(|_| self.poisoned())
    }

    pub fn store_summary(&self, summary: LatestSummary) -> Result<(), SessionError> {
        let mut slot = self.summary.write().map_err(|_| self.poisoned())?;
        *slot = Some(summary);
        Ok(())
    }

    fn poisoned(&self) -> SessionError {
        SessionError::Poisoned {
            session_id: self.id.clone(),
        }
    }
}

/// Thread-safe session lookup. Sessions never share mutable state.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `id`, created with `init` if absent. `init` only runs
    /// when the session does not exist yet.
    pub fn get_or_create<E>(
        &self,
        id: &str,
        init: impl FnOnce() -> Result<SessionState, E>,
    ) -> Result<Arc<Session>, E> {
        if let Some(session) = self.sessions.get(id) {
            return Ok(Arc::clone(session.value()));
        }
        let state = init()?;
        let session = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Session::new(id, state)));
        Ok(Arc::clone(session.value()))
    }

    pub fn get(&self, id: &str) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .get(id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| SessionError::NotFound {
                session_id: id.to_string(),
            })
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.remove(id).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }
}
