//! Interrupt Monitor
//!
//! A dedicated thread that turns SIGINT into a mass cancellation of every
//! live session. signal-hook routes the signal through a self-pipe, so this
//! thread is the only one that ever observes it.
//!
//! An interrupt calls `Engine::cancel_all`, not `Engine::shutdown`: the
//! sessions go away but new connections are still accepted afterwards.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use signal_hook::consts::SIGINT;
use signal_hook::iterator::{Handle, Signals};

use crate::engine::Engine;
use crate::error::{KvError, Result};

/// Running interrupt monitor; stops when `stop` is called or it is dropped
pub struct InterruptMonitor {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl InterruptMonitor {
    /// Register for SIGINT and start the monitor thread
    pub fn start(engine: Arc<Engine>) -> Result<Self> {
        let mut signals = Signals::new([SIGINT])
            .map_err(|e| KvError::Startup(format!("cannot register SIGINT handler: {}", e)))?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("interrupt-monitor".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    tracing::warn!(signal, "SIGINT received, cancelling all sessions");
                    engine.cancel_all();
                }
                tracing::debug!("interrupt monitor stopped");
            })
            .map_err(|e| KvError::Startup(format!("cannot spawn interrupt monitor: {}", e)))?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// Stop watching for interrupts and wait for the thread to exit
    pub fn stop(mut self) {
        self.shut_down();
    }

    fn shut_down(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("interrupt monitor panicked");
            }
        }
    }
}

impl Drop for InterruptMonitor {
    fn drop(&mut self) {
        self.shut_down();
    }
}
