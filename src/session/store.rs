//! Concurrent session map.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::session::{SessionEvent, SessionState, TransitionError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unknown session {0}")]
    Unknown(Uuid),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Sessions keyed by the id handed out at login.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<Uuid, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a logged-in session and return its id.
    pub fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.insert(id, SessionState::LoggedIn);
        tracing::debug!(session_id = %id, "Session opened");
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<SessionState> {
        self.inner.get(id).map(|entry| *entry)
    }

    /// Apply `event` to session `id`. The state is left untouched on error.
    pub fn advance(&self, id: &Uuid, event: SessionEvent) -> Result<SessionState, SessionError> {
        let mut entry = self.inner.get_mut(id).ok_or(SessionError::Unknown(*id))?;
        let next = entry.apply(event)?;
        *entry = next;
        Ok(next)
    }

    /// End session `id`. Returns whether it existed.
    pub fn close(&self, id: &Uuid) -> bool {
        let existed = self.advance(id, SessionEvent::Logout).is_ok();
        self.inner.remove(id);
        existed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_starts_logged_in() {
        let store = SessionStore::new();
        let id = store.open();
        assert_eq!(store.get(&id), Some(SessionState::LoggedIn));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_advance_keeps_state_on_error() {
        let store = SessionStore::new();
        let id = store.open();
        let err = store.advance(&id, SessionEvent::OtpValidated).unwrap_err();
        assert!(matches!(err, SessionError::Transition(_)));
        assert_eq!(store.get(&id), Some(SessionState::LoggedIn));

        assert_eq!(
            store.advance(&id, SessionEvent::Transfer).unwrap(),
            SessionState::TransferInitiated
        );
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.advance(&id, SessionEvent::Transfer),
            Err(SessionError::Unknown(unknown)) if unknown == id
        ));
    }

    #[test]
    fn test_close_removes() {
        let store = SessionStore::new();
        let id = store.open();
        assert!(store.close(&id));
        assert!(store.get(&id).is_none());
        assert!(!store.close(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_sessions() {
        let store = SessionStore::new();
        let other = store.clone();
        let id = store.open();
        assert_eq!(other.get(&id), Some(SessionState::LoggedIn));
    }
}
