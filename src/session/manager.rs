use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::errors::SyncError;
use crate::session::{Session, SessionId};

/// All sessions of an engine.
///
/// The map itself is locked only long enough to look up, insert or remove a
/// session. Each session has its own lock, held for a whole cycle.
pub struct SessionManager {
    max_sessions: usize,
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            max_sessions,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Adds a session, returning its id.
    pub fn insert(&self, session: Session) -> Result<SessionId, SyncError> {
        let mut sessions = self.sessions.lock().map_err(|_| SyncError::SessionPoisoned)?;

        if sessions.len() >= self.max_sessions {
            return Err(SyncError::SessionLimitExceeded);
        }
        if sessions.contains_key(&session.id) {
            return Err(SyncError::SessionAlreadyExists);
        }

        let id = session.id;
        sessions.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.lock().ok()?;
        sessions.get(&id).cloned()
    }

    /// Removes a session. A cycle still running on it finishes on its own
    /// handle.
    pub fn remove(&self, id: SessionId) -> Result<(), SyncError> {
        let mut sessions = self.sessions.lock().map_err(|_| SyncError::SessionPoisoned)?;
        if sessions.remove(&id).is_none() {
            return Err(SyncError::SessionNotFound);
        }
        Ok(())
    }

    /// Runs `f` with exclusive access to a session. The lock is released when
    /// `f` returns, whether it succeeded or not.
    pub fn with_session<R>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> Result<R, SyncError>,
    ) -> Result<R, SyncError> {
        let session = self.get(id).ok_or(SyncError::SessionNotFound)?;
        let mut guard = session.lock().map_err(|_| SyncError::SessionPoisoned)?;
        f(&mut guard)
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions
            .lock()
            .map(|s| s.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
