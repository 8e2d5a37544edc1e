//! TCP Server
//!
//! Accepts connections and turns each into a session.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{KvError, Result};

use super::TcpConnection;

/// TCP listener feeding sessions into an engine
pub struct Server {
    listener: TcpListener,
    engine: Arc<Engine>,
}

impl Server {
    /// Bind the engine's configured listen address
    pub fn bind(engine: Arc<Engine>) -> Result<Self> {
        let addr = engine.config().listen_addr.clone();
        let listener = TcpListener::bind(&addr)
            .map_err(|e| KvError::Startup(format!("cannot listen on {}: {}", addr, e)))?;
        Ok(Self { listener, engine })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails (blocking).
    ///
    /// Connections arriving after shutdown has begun still get a session,
    /// which is refused registration and closed straight away.
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("Accept error: {}", e);
                    continue;
                }
            };

            let connection = match TcpConnection::new(stream, self.engine.config().max_command_len) {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!("Failed to set up connection: {}", e);
                    continue;
                }
            };

            // A session that cannot get a thread is fatal for the process.
            self.engine.spawn_session(Box::new(connection))?;
        }
        Ok(())
    }
}
