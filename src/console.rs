//! Operator console
//!
//! Commands typed on the server's standard input:
//! - `p [filename]`: dump the tree to a file, or stdout if no name is given
//! - `g`: release the gate
//! - `s`: stop the gate

use std::path::PathBuf;

use crate::engine::Engine;
use crate::error::{KvError, Result};

/// A parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Print { path: Option<PathBuf> },
    Go,
    Stop,
}

impl ConsoleCommand {
    /// Parse one console line. Only the first character selects the
    /// command; anything unknown is an error and changes nothing.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut chars = line.chars();
        match chars.next() {
            Some('p') => Ok(ConsoleCommand::Print {
                path: chars.as_str().split_whitespace().next().map(PathBuf::from),
            }),
            Some('g') => Ok(ConsoleCommand::Go),
            Some('s') => Ok(ConsoleCommand::Stop),
            _ => Err(KvError::IllFormed(format!("unknown console command {:?}", line))),
        }
    }

    /// Apply the command to `engine`
    pub fn apply(&self, engine: &Engine) -> Result<()> {
        match self {
            ConsoleCommand::Print { path } => engine.print(path.as_deref()),
            ConsoleCommand::Go => {
                engine.gate().release();
                Ok(())
            }
            ConsoleCommand::Stop => {
                engine.gate().stop();
                Ok(())
            }
        }
    }
}
