//! Cancellation tokens
//!
//! Cancellation is cooperative. A worker only notices it at its gate wait and
//! its command read; hooks let the canceller wake whatever the worker is
//! currently blocked on so it gets to one of those points promptly.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{KvError, Result};

type Hook = Box<dyn Fn() + Send + Sync>;

/// Shared cancellation flag for one session
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    hooks: Mutex<Vec<Hook>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and run every wake-up hook.
    ///
    /// Returns immediately; it does not wait for the worker to exit.
    /// Repeated calls are no-ops.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let hooks = self.inner.hooks.lock();
        for hook in hooks.iter() {
            hook();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation has been requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(KvError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Register a hook run on cancellation; runs it at once if already
    /// cancelled.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut hooks = self.inner.hooks.lock();
        // Checked under the hook lock: `cancel` sets the flag before taking
        // it, so a hook is either run here or by `cancel`, never skipped.
        if self.is_cancelled() {
            drop(hooks);
            hook();
            return;
        }
        hooks.push(Box::new(hook));
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
