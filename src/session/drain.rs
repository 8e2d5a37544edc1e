//! Drain Coordinator
//!
//! Counts live sessions and lets shutdown wait until there are none.
//!
//! ## Lock Order
//! Any path touching both locks takes the coordinator's `state` first and
//! the registry's second: registration, cleanup and shutdown all agree, so
//! worker cleanup can never invert against a draining shutdown.

use parking_lot::{Condvar, Mutex};

use crate::error::{fail_fast, KvError, Result};

use super::{SessionHandle, SessionId, SessionRegistry};

#[derive(Debug)]
struct DrainState {
    /// Registered sessions whose cleanup has not run yet
    live: usize,

    /// Cleared for good by `begin_shutdown`
    accepting: bool,
}

/// Tracks live sessions and orchestrates mass cancellation on shutdown
#[derive(Debug)]
pub struct DrainCoordinator {
    state: Mutex<DrainState>,

    /// Signalled when `live` drops to zero
    drained: Condvar,
}

impl Default for DrainCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl DrainCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DrainState {
                live: 0,
                accepting: true,
            }),
            drained: Condvar::new(),
        }
    }

    /// Register a session, unless shutdown has begun.
    ///
    /// The accept check and the registry insert happen in one critical
    /// section, so a session can never slip in behind a draining shutdown.
    pub fn register(&self, registry: &SessionRegistry, handle: SessionHandle) -> Result<()> {
        let mut state = self.state.lock();
        if !state.accepting {
            tracing::debug!(session = %handle.id, "registration refused, shutting down");
            return Err(KvError::NotAccepting);
        }

        let id = handle.id;
        if !registry.insert(handle) {
            fail_fast("session registered twice");
        }
        state.live += 1;
        tracing::debug!(session = %id, live = state.live, "session registered");
        Ok(())
    }

    /// Remove a registered session and count it out.
    ///
    /// `release` frees the session's resources and runs inside the critical
    /// section, before the count is decremented.
    pub fn deregister<F: FnOnce()>(&self, registry: &SessionRegistry, id: SessionId, release: F) {
        let mut state = self.state.lock();

        if registry.remove(id).is_none() {
            fail_fast("deregistering a session missing from the registry");
        }
        release();

        state.live = match state.live.checked_sub(1) {
            Some(live) => live,
            None => fail_fast("live session count underflow"),
        };
        tracing::debug!(session = %id, live = state.live, "session deregistered");

        if state.live == 0 {
            self.drained.notify_all();
        }
    }

    /// Stop accepting sessions, cancel every registered one, and block until
    /// all of them have cleaned up.
    ///
    /// Only after this returns is it safe to tear the tree down.
    pub fn begin_shutdown(&self, registry: &SessionRegistry) {
        let mut state = self.state.lock();
        state.accepting = false;

        let cancelled = registry.cancel_all();
        tracing::info!(cancelled, live = state.live, "draining sessions");

        while state.live > 0 {
            self.drained.wait(&mut state);
        }
        tracing::info!("all sessions drained");
    }

    pub fn live_sessions(&self) -> usize {
        self.state.lock().live
    }

    pub fn is_accepting(&self) -> bool {
        self.state.lock().accepting
    }
}
