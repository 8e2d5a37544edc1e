//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;

use crate::error::KvError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Value found by a query
    Value(String),
    Added,
    Removed,
    FileProcessed,

    /// Query miss
    NotFound,
    /// Delete miss
    NotInDatabase,
    AlreadyExists,

    IllFormed,
    NameTooLong,
    ValueTooLong,
    AllocationFailed,
    BadFileName,
}

impl Response {
    /// Map a failed operation to the response a client sees.
    ///
    /// `KeyNotFound` maps to the query wording; deletes translate it to
    /// `NotInDatabase` themselves.
    pub fn from_error(err: &KvError) -> Self {
        match err {
            KvError::KeyNotFound => Response::NotFound,
            KvError::DuplicateKey => Response::AlreadyExists,
            KvError::KeyTooLong { .. } => Response::NameTooLong,
            KvError::ValueTooLong { .. } => Response::ValueTooLong,
            KvError::AllocationFailed(_) => Response::AllocationFailed,
            KvError::BadFileName(_) => Response::BadFileName,
            _ => Response::IllFormed,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Response::Value(_) | Response::Added | Response::Removed | Response::FileProcessed => {
                Status::Ok
            }
            Response::NotFound | Response::NotInDatabase => Status::NotFound,
            _ => Status::Error,
        }
    }

    /// Response text cut to fit a buffer of `buffer_len` bytes, which
    /// always reserves one byte for the terminator.
    pub fn render(&self, buffer_len: usize) -> String {
        let mut text = self.to_string();
        let limit = buffer_len.saturating_sub(1);
        if text.len() > limit {
            let mut end = limit;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        text
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Response::Value(value) => value.as_str(),
            Response::Added => "added",
            Response::Removed => "removed",
            Response::FileProcessed => "file processed",
            Response::NotFound => "not found",
            Response::NotInDatabase => "not in database",
            Response::AlreadyExists => "already in database",
            Response::IllFormed => "ill-formed command",
            Response::NameTooLong => "name too long",
            Response::ValueTooLong => "value too long",
            Response::AllocationFailed => "allocation failed",
            Response::BadFileName => "bad file name",
        };
        f.write_str(text)
    }
}
