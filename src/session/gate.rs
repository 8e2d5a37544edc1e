//! Gate
//!
//! Global stop/go switch. Stopping the gate pauses every session before its
//! next command without disconnecting anyone; releasing it lets them all go.

use parking_lot::{Condvar, Mutex};

use crate::error::Result;

use super::CancelToken;

/// Pause/resume control shared by all sessions
#[derive(Debug, Default)]
pub struct Gate {
    /// `true` while stopped
    stopped: Mutex<bool>,

    /// Broadcast on release and on cancellation
    go: Condvar,
}

impl Gate {
    /// Create an open gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Make future waits block.
    ///
    /// Sessions already past their wait finish their current command.
    pub fn stop(&self) {
        *self.stopped.lock() = true;
        tracing::info!("gate stopped");
    }

    /// Open the gate and wake every waiter
    pub fn release(&self) {
        let mut stopped = self.stopped.lock();
        *stopped = false;
        self.go.notify_all();
        tracing::info!("gate released");
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// Block until the gate is open.
    ///
    /// Returns `Err(Cancelled)` if `cancel` fires first.
    pub fn wait(&self, cancel: &CancelToken) -> Result<()> {
        let mut stopped = self.stopped.lock();
        while *stopped {
            cancel.check()?;
            self.go.wait(&mut stopped);
        }
        cancel.check()
    }

    /// Wake all waiters so they re-check their cancellation tokens
    pub fn interrupt(&self) {
        let _stopped = self.stopped.lock();
        self.go.notify_all();
    }
}
