//! # treekv
//!
//! A concurrent in-memory key-value store with:
//! - A binary search tree with per-node reader-writer locks
//! - Lock-coupled traversals, so disjoint subtrees never contend
//! - One thread per client session, pausable through a global gate
//! - Drain-before-teardown shutdown and SIGINT mass cancellation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │        TCP Server / in-memory transport (Connection)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one session thread per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Session Worker                                │
//! │   register ─► gate wait ─► read ─► execute ─► respond        │
//! └───────┬─────────────┬───────────────────────────┬───────────┘
//!         │             │                           │
//!         ▼             ▼                           ▼
//!   ┌───────────┐ ┌───────────┐             ┌──────────────┐
//!   │ Registry  │ │   Gate    │             │     Tree     │
//!   │  + Drain  │ │ (stop/go) │             │ (lock-coupled│
//!   └─────▲─────┘ └─────▲─────┘             │    BST)      │
//!         │             │                   └──────────────┘
//!   ┌─────┴─────┐ ┌─────┴─────┐
//!   │ Interrupt │ │ Operator  │
//!   │  Monitor  │ │  Console  │
//!   └───────────┘ └───────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod tree;
pub mod session;
pub mod network;
pub mod protocol;
pub mod engine;
pub mod console;
pub mod monitor;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use tree::Tree;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of treekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
