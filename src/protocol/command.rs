//! Command definitions
//!
//! Parses the one-line client commands.

use crate::error::{KvError, Result};

/// Command types, keyed by their first character on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Query,
    Add,
    Delete,
    ExecuteFile,
}

impl CommandType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(CommandType::Query),
            'a' => Some(CommandType::Add),
            'd' => Some(CommandType::Delete),
            'f' => Some(CommandType::ExecuteFile),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            CommandType::Query => 'q',
            CommandType::Add => 'a',
            CommandType::Delete => 'd',
            CommandType::ExecuteFile => 'f',
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `q <name>`
    Query { name: String },

    /// `a <name> <value>`
    Add { name: String, value: String },

    /// `d <name>`
    Delete { name: String },

    /// `f <filename>`: run every line of the file, discarding responses
    ExecuteFile { path: String },
}

impl Command {
    /// Parse one command line.
    ///
    /// The first character picks the command; the rest is split on
    /// whitespace and surplus tokens are ignored, so `qfoo` and `q foo x`
    /// both query `foo`.
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim_end_matches(['\r', '\n']);

        let mut chars = line.chars();
        let first = match chars.next() {
            Some(c) if line.len() > 1 => c,
            _ => return Err(KvError::IllFormed("command too short".to_string())),
        };
        let command_type = CommandType::from_char(first)
            .ok_or_else(|| KvError::IllFormed(format!("unknown command '{}'", first)))?;

        let mut args = chars.as_str().split_whitespace();
        let mut next_arg = |what: &str| {
            args.next()
                .map(str::to_string)
                .ok_or_else(|| KvError::IllFormed(format!("missing {}", what)))
        };

        match command_type {
            CommandType::Query => Ok(Command::Query {
                name: next_arg("name")?,
            }),
            CommandType::Add => {
                let name = next_arg("name")?;
                let value = next_arg("value")?;
                Ok(Command::Add { name, value })
            }
            CommandType::Delete => Ok(Command::Delete {
                name: next_arg("name")?,
            }),
            CommandType::ExecuteFile => Ok(Command::ExecuteFile {
                path: next_arg("file name")?,
            }),
        }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Query { .. } => CommandType::Query,
            Command::Add { .. } => CommandType::Add,
            Command::Delete { .. } => CommandType::Delete,
            Command::ExecuteFile { .. } => CommandType::ExecuteFile,
        }
    }

    /// Render back to wire form, without the trailing newline
    pub fn to_line(&self) -> String {
        let c = self.command_type().as_char();
        match self {
            Command::Query { name } | Command::Delete { name } => format!("{} {}", c, name),
            Command::Add { name, value } => format!("{} {} {}", c, name, value),
            Command::ExecuteFile { path } => format!("{} {}", c, path),
        }
    }
}
