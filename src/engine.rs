//! Engine Module
//!
//! The context object that owns every piece of shared state.
//!
//! ## Responsibilities
//! - Own the tree, the gate, the session registry and the drain coordinator
//! - Interpret client commands against the tree
//! - Spawn one worker thread per connection
//! - Shut down: drain every session, then tear the tree down

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::network::Connection;
use crate::protocol::{read_line, Command, Response};
use crate::session::{worker, CancelToken, DrainCoordinator, Gate, SessionHandle, SessionId, SessionRegistry};
use crate::tree::Tree;

/// Deepest chain of `f` commands running other `f` commands
pub const MAX_FILE_DEPTH: usize = 16;

/// Shared server state
///
/// ## Concurrency Model
///
/// - **Tree**: per-node locks, lock-coupled traversals; no global lock
/// - **Sessions**: one thread each, paused by the `Gate`, counted by the
///   `DrainCoordinator`
/// - **Lock order**: coordinator → registry, on every path that takes both
///
/// Constructed once and shared through `Arc`. `shutdown` is the only place
/// the tree is torn down, and only after every session has exited.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Key-value storage
    tree: Tree,

    /// Pause/resume switch; `Arc` so cancellation hooks can wake it
    gate: Arc<Gate>,

    /// Live sessions
    registry: SessionRegistry,

    /// Live count and shutdown drain
    drain: DrainCoordinator,

    /// Next session id
    next_session: AtomicU64,
}

impl Engine {
    /// Create an engine with an empty tree and an open gate
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tree: Tree::with_max_len(config.max_len),
            config,
            gate: Arc::new(Gate::new()),
            registry: SessionRegistry::new(),
            drain: DrainCoordinator::new(),
            next_session: AtomicU64::new(1),
        })
    }

    // =========================================================================
    // Command Execution
    // =========================================================================

    /// Parse and execute one command line.
    ///
    /// Malformed input becomes a response; the only error is `Cancelled`,
    /// raised while running a command file.
    pub fn execute_line(&self, line: &str, cancel: &CancelToken) -> Result<Response> {
        self.execute_line_at(line, cancel, 0)
    }

    /// Execute a parsed command
    pub fn execute(&self, command: &Command, cancel: &CancelToken) -> Result<Response> {
        self.execute_at(command, cancel, 0)
    }

    fn execute_line_at(&self, line: &str, cancel: &CancelToken, depth: usize) -> Result<Response> {
        if line.len() > self.config.max_command_len {
            return Ok(Response::IllFormed);
        }
        match Command::parse(line) {
            Ok(command) => self.execute_at(&command, cancel, depth),
            Err(e) => {
                tracing::trace!("rejected command: {}", e);
                Ok(Response::IllFormed)
            }
        }
    }

    fn execute_at(&self, command: &Command, cancel: &CancelToken, depth: usize) -> Result<Response> {
        let response = match command {
            Command::Query { name } => match self.tree.query(name) {
                Ok(value) => Response::Value(value),
                Err(e) => Response::from_error(&e),
            },
            Command::Add { name, value } => match self.tree.add(name, value) {
                Ok(()) => Response::Added,
                Err(e) => Response::from_error(&e),
            },
            Command::Delete { name } => match self.tree.remove(name) {
                Ok(()) => Response::Removed,
                Err(KvError::KeyNotFound) => Response::NotInDatabase,
                Err(e) => Response::from_error(&e),
            },
            Command::ExecuteFile { path } => self.execute_file(path, cancel, depth)?,
        };
        Ok(response)
    }

    /// Run every line of a file as a command, discarding the responses.
    ///
    /// File reads are not cancellation points, so the token is checked once
    /// per line instead.
    fn execute_file(&self, path: &str, cancel: &CancelToken, depth: usize) -> Result<Response> {
        if depth >= MAX_FILE_DEPTH {
            tracing::warn!(path, "command files nested too deeply");
            return Ok(Response::IllFormed);
        }

        match self.run_file(path, cancel, depth) {
            Ok(()) => Ok(Response::FileProcessed),
            Err(e @ KvError::BadFileName(_)) => {
                tracing::debug!("{}", e);
                Ok(Response::from_error(&e))
            }
            Err(e) => Err(e),
        }
    }

    fn run_file(&self, path: &str, cancel: &CancelToken, depth: usize) -> Result<()> {
        let bad_file = |e: io::Error| KvError::BadFileName(format!("{}: {}", path, e));

        let mut reader = BufReader::new(File::open(path).map_err(bad_file)?);
        loop {
            let line = match read_line(&mut reader, self.config.max_command_len) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(()),
                Err(KvError::Io(e)) => return Err(bad_file(e)),
                Err(e) => return Err(e),
            };
            cancel.check()?;
            self.execute_line_at(&line, cancel, depth + 1)?;
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Turn a connection into a session running on its own thread
    pub fn spawn_session(self: &Arc<Self>, connection: Box<dyn Connection>) -> Result<JoinHandle<()>> {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        let handle = SessionHandle::new(id, connection.peer());
        let engine = Arc::clone(self);

        thread::Builder::new()
            .name(id.to_string())
            .spawn(move || worker::run(engine, handle, connection))
            .map_err(|e| KvError::Startup(format!("cannot spawn {}: {}", id, e)))
    }

    /// Cancel every registered session without waiting and without closing
    /// registration. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.registry.cancel_all();
        tracing::info!(cancelled, "cancelled all sessions");
        cancelled
    }

    /// Stop accepting sessions, cancel and drain every live one, then free
    /// the tree. Returns the number of nodes freed.
    pub fn shutdown(&self) -> usize {
        self.drain.begin_shutdown(&self.registry);
        let freed = self.tree.teardown();
        tracing::info!(freed, "engine shut down");
        freed
    }

    // =========================================================================
    // Operator Actions
    // =========================================================================

    /// Dump the tree to `path`, created or truncated, or to stdout if `None`
    pub fn print(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                let mut file = File::create(path)?;
                self.tree.dump(&mut file)
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                self.tree.dump(&mut out)?;
                out.flush()?;
                Ok(())
            }
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn gate(&self) -> &Arc<Gate> {
        &self.gate
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn drain(&self) -> &DrainCoordinator {
        &self.drain
    }

    /// Sessions registered and not yet cleaned up
    pub fn live_sessions(&self) -> usize {
        self.drain.live_sessions()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
