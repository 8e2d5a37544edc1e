//! Protocol Module
//!
//! Defines the line protocol for client-server communication.
//!
//! ## Commands (one per line)
//! - `q <name>`: query
//! - `a <name> <value>`: add
//! - `d <name>`: delete
//! - `f <filename>`: run every line of a file as a command, silently
//!
//! ## Responses (one line per command)
//! - query: the value, or `not found`
//! - add: `added` or `already in database`
//! - delete: `removed` or `not in database`
//! - file: `file processed` or `bad file name`
//! - anything malformed: `ill-formed command`

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{read_line, write_command, write_line};
