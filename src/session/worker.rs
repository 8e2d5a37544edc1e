//! Session Worker
//!
//! The per-connection loop:
//!
//! ```text
//! Created ─► Registered ─► ┌ wait on gate ◄─────────┐
//!    │                      │ read command           │
//!    │                      │ wait on gate           │
//!    │ (not accepting)      │ execute against tree   │
//!    ▼                      └ write response ────────┘
//! Destroyed ◄── Unregistering ◄── end of stream / cancelled / error
//! ```
//!
//! The gate is checked again after the read so that stopping it also holds
//! back a command from a session that was already blocked reading.
//!
//! Unregistering is done by a `Drop` guard, so it runs exactly once however
//! the loop ends, panics included. Cancellation is only ever observed at the
//! gate wait and the command read, never inside the guard.

use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::network::Connection;

use super::SessionHandle;

/// One connected client
struct Session {
    handle: SessionHandle,
    connection: Option<Box<dyn Connection>>,
}

impl Session {
    fn connection(&mut self) -> Result<&mut Box<dyn Connection>> {
        self.connection
            .as_mut()
            .ok_or_else(|| KvError::Network(format!("{} already closed", self.handle.id)))
    }

    /// Shut the transport down and free it
    fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.shutdown();
        }
    }
}

/// Deregisters the session when dropped
struct CleanupGuard<'a> {
    engine: &'a Engine,
    session: Session,
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        let id = self.session.handle.id;
        let session = &mut self.session;
        self.engine
            .drain()
            .deregister(self.engine.registry(), id, || session.close());
    }
}

/// Run a session to completion on the current thread
pub(crate) fn run(engine: Arc<Engine>, handle: SessionHandle, mut connection: Box<dyn Connection>) {
    let id = handle.id;

    // Wake-ups are wired before registering, so a cancel_all that lands
    // right after registration still reaches a blocked gate wait or read.
    let gate = Arc::clone(engine.gate());
    handle.cancel.on_cancel(move || gate.interrupt());
    if let Err(e) = connection.bind_cancel(&handle.cancel) {
        tracing::warn!(session = %id, "cannot bind cancellation: {}", e);
        connection.shutdown();
        return;
    }

    if let Err(e) = engine.drain().register(engine.registry(), handle.clone()) {
        tracing::debug!(session = %id, "{}", e);
        connection.shutdown();
        return;
    }

    let mut guard = CleanupGuard {
        engine: &engine,
        session: Session {
            handle,
            connection: Some(connection),
        },
    };

    match serve(&engine, &mut guard.session) {
        Ok(()) => tracing::debug!(session = %id, "client disconnected"),
        Err(KvError::Cancelled) => tracing::debug!(session = %id, "session cancelled"),
        Err(e) => tracing::warn!(session = %id, "session ended: {}", e),
    }
}

fn serve(engine: &Engine, session: &mut Session) -> Result<()> {
    let cancel = session.handle.cancel.clone();
    let response_len = engine.config().max_response_len;

    loop {
        engine.gate().wait(&cancel)?;

        let line = match session.connection()?.read_command() {
            Ok(Some(line)) => line,
            // A cancelled read surfaces as end of stream or an I/O error.
            Ok(None) => return cancel.check(),
            Err(e) => {
                cancel.check()?;
                return Err(e);
            }
        };
        // A session that was already blocked in the read when the gate
        // stopped must still hold this command until the gate reopens.
        engine.gate().wait(&cancel)?;

        let response = engine.execute_line(&line, &cancel)?;
        tracing::trace!(session = %session.handle.id, status = ?response.status(), "command: {}", line);
        session
            .connection()?
            .write_response(&response.render(response_len))?;
    }
}
