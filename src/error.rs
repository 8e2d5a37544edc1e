//! Error types for treekv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for treekv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("ill-formed command: {0}")]
    IllFormed(String),

    #[error("name too long: {len} bytes (max {max})")]
    KeyTooLong { len: usize, max: usize },

    #[error("value too long: {len} bytes (max {max})")]
    ValueTooLong { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Tree Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Key already exists")]
    DuplicateKey,

    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Bad file name: {0}")]
    BadFileName(String),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Session cancelled")]
    Cancelled,

    #[error("Server is not accepting sessions")]
    NotAccepting,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Startup / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Report a broken internal locking invariant and abort the process
pub(crate) fn fail_fast(invariant: &str) -> ! {
    tracing::error!("internal invariant violated: {}", invariant);
    std::process::abort()
}
