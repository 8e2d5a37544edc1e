//! Connection Handler
//!
//! The transport contract sessions are built on, and its TCP implementation.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};

use crate::error::{KvError, Result};
use crate::protocol::{read_line, write_line};
use crate::session::CancelToken;

/// A duplex, line-oriented client connection
///
/// Each accepted connection becomes exactly one session, which owns it until
/// its cleanup shuts it down.
pub trait Connection: Send {
    /// Peer label for logging
    fn peer(&self) -> String;

    /// Arrange for `cancel` to unblock a pending `read_command`
    fn bind_cancel(&mut self, cancel: &CancelToken) -> Result<()>;

    /// Block for the next command line; `Ok(None)` at end of stream
    fn read_command(&mut self) -> Result<Option<String>>;

    /// Send one response line
    fn write_response(&mut self, response: &str) -> Result<()>;

    /// Release the connection. Called exactly once, during session cleanup.
    fn shutdown(&mut self);
}

/// A client connected over TCP
pub struct TcpConnection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Longest command line kept in full
    max_command_len: usize,
}

impl TcpConnection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, max_command_len: usize) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            max_command_len,
        })
    }
}

impl Connection for TcpConnection {
    fn peer(&self) -> String {
        self.peer_addr.clone()
    }

    fn bind_cancel(&mut self, cancel: &CancelToken) -> Result<()> {
        // Shutting the socket down makes a blocked read return end of stream.
        let stream = self.reader.get_ref().try_clone()?;
        cancel.on_cancel(move || {
            let _ = stream.shutdown(Shutdown::Both);
        });
        Ok(())
    }

    fn read_command(&mut self) -> Result<Option<String>> {
        match read_line(&mut self.reader, self.max_command_len) {
            Ok(line) => Ok(line),
            Err(KvError::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted
                ) =>
            {
                tracing::debug!("Connection reset by client {}", self.peer_addr);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn write_response(&mut self, response: &str) -> Result<()> {
        write_line(&mut self.writer, response)
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.reader.get_ref().shutdown(Shutdown::Both) {
            // Already closed by the peer or by cancellation.
            tracing::trace!("shutdown of {} failed: {}", self.peer_addr, e);
        }
    }
}
