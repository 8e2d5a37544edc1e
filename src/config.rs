//! Configuration for treekv
//!
//! Centralized configuration with sensible defaults.

use crate::error::{KvError, Result};

/// Longest name or value accepted by the tree, in bytes
pub const DEFAULT_MAX_LEN: usize = 256;

/// Size of a response buffer; responses carry at most one byte less
pub const DEFAULT_MAX_RESPONSE_LEN: usize = 512;

/// Longest command line accepted from a client, in bytes
pub const DEFAULT_MAX_COMMAND_LEN: usize = 1024;

/// Main configuration for a treekv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Tree Configuration
    // -------------------------------------------------------------------------
    /// Maximum length of a name or value
    pub max_len: usize,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Response buffer size (text is truncated to `max_response_len - 1`)
    pub max_response_len: usize,

    /// Maximum accepted command line length
    pub max_command_len: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            max_response_len: DEFAULT_MAX_RESPONSE_LEN,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
            listen_addr: "127.0.0.1:8888".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the limits are usable
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(KvError::Config("max_len must be non-zero".to_string()));
        }
        if self.max_response_len < 2 {
            return Err(KvError::Config(format!(
                "max_response_len must be at least 2, got {}",
                self.max_response_len
            )));
        }
        if self.max_command_len < 2 {
            return Err(KvError::Config(format!(
                "max_command_len must be at least 2, got {}",
                self.max_command_len
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum name/value length
    pub fn max_len(mut self, len: usize) -> Self {
        self.config.max_len = len;
        self
    }

    /// Set the response buffer size
    pub fn max_response_len(mut self, len: usize) -> Self {
        self.config.max_response_len = len;
        self
    }

    /// Set the maximum command line length
    pub fn max_command_len(mut self, len: usize) -> Self {
        self.config.max_command_len = len;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
