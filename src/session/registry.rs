//! Session Registry
//!
//! Every live session, in registration order, behind one lock.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::Mutex;

use super::CancelToken;

/// Unique, monotonically assigned session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// What the registry knows about a session: enough to identify and cancel it
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: SessionId,

    /// Peer address (or other transport label) for logging
    pub peer: String,

    pub cancel: CancelToken,
}

impl SessionHandle {
    pub fn new(id: SessionId, peer: impl Into<String>) -> Self {
        Self {
            id,
            peer: peer.into(),
            cancel: CancelToken::new(),
        }
    }
}

/// Registry of live sessions
///
/// Ids are handed out in increasing order, so key order is insertion order.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. Returns `false` if the id was already present.
    pub fn insert(&self, handle: SessionHandle) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(&handle.id) {
            return false;
        }
        sessions.insert(handle.id, handle);
        true
    }

    /// Remove a session wherever it sits in registration order
    pub fn remove(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.lock().remove(&id)
    }

    /// Request cancellation of every registered session without waiting for
    /// any of them to exit. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let sessions = self.sessions.lock();
        for handle in sessions.values() {
            tracing::debug!(session = %handle.id, peer = %handle.peer, "cancelling");
            handle.cancel.cancel();
        }
        sessions.len()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.lock().contains_key(&id)
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
