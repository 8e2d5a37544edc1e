//! In-memory transport
//!
//! A `Connection` over crossbeam channels, for embedding the engine without
//! sockets and for driving sessions from tests.

use std::time::Duration;

use crossbeam::channel::{self, select, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::error::{KvError, Result};
use crate::session::CancelToken;

use super::Connection;

/// Server side of an in-memory connection
pub struct ChannelConnection {
    label: String,
    commands: Receiver<String>,
    responses: Sender<String>,

    /// Held until `bind_cancel` hands it to the cancellation hook; dropping
    /// it disconnects `kill_rx`
    kill_tx: Option<Sender<()>>,
    kill_rx: Receiver<()>,
}

/// Client side of an in-memory connection
///
/// Dropping it ends the session's stream.
pub struct ChannelClient {
    commands: Sender<String>,
    responses: Receiver<String>,
}

impl ChannelConnection {
    /// Create a connected server/client pair
    pub fn pair(label: impl Into<String>) -> (ChannelConnection, ChannelClient) {
        let (command_tx, command_rx) = channel::unbounded();
        let (response_tx, response_rx) = channel::unbounded();
        let (kill_tx, kill_rx) = channel::bounded(0);

        let connection = ChannelConnection {
            label: label.into(),
            commands: command_rx,
            responses: response_tx,
            kill_tx: Some(kill_tx),
            kill_rx,
        };
        let client = ChannelClient {
            commands: command_tx,
            responses: response_rx,
        };
        (connection, client)
    }
}

impl Connection for ChannelConnection {
    fn peer(&self) -> String {
        self.label.clone()
    }

    fn bind_cancel(&mut self, cancel: &CancelToken) -> Result<()> {
        if let Some(kill_tx) = self.kill_tx.take() {
            let kill_tx = Mutex::new(Some(kill_tx));
            cancel.on_cancel(move || {
                kill_tx.lock().take();
            });
        }
        Ok(())
    }

    fn read_command(&mut self) -> Result<Option<String>> {
        select! {
            recv(self.commands) -> command => Ok(command.ok()),
            recv(self.kill_rx) -> _ => Ok(None),
        }
    }

    fn write_response(&mut self, response: &str) -> Result<()> {
        self.responses
            .send(response.to_string())
            .map_err(|_| KvError::Network(format!("{}: client hung up", self.label)))
    }

    fn shutdown(&mut self) {
        // Swap in a dead channel so the client sees a disconnect.
        let (dead_tx, _) = channel::bounded(0);
        self.responses = dead_tx;
    }
}

impl ChannelClient {
    /// Send one command line
    pub fn send(&self, command: impl Into<String>) -> Result<()> {
        self.commands
            .send(command.into())
            .map_err(|_| KvError::Network("session closed".to_string()))
    }

    /// Wait for the next response; `None` once the session is gone
    pub fn recv(&self) -> Option<String> {
        self.responses.recv().ok()
    }

    /// Like `recv`, bounded by `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<String>> {
        match self.responses.recv_timeout(timeout) {
            Ok(response) => Ok(Some(response)),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => Err(KvError::Network("response timed out".to_string())),
        }
    }

    /// Send a command and wait for its response
    pub fn request(&self, command: impl Into<String>) -> Result<Option<String>> {
        self.send(command)?;
        Ok(self.recv())
    }
}
