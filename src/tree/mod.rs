//! Tree Module
//!
//! Concurrent binary search tree holding every key/value pair.
//!
//! ## Responsibilities
//! - Point lookups, inserts and deletes from many threads at once
//! - Pre-order dump of the whole tree for operators
//! - Teardown of every node once all sessions are gone
//!
//! ## Locking: Lock Coupling
//! Every node carries its own `RwLock`. A traversal locks the sentinel root,
//! then at each step locks the chosen child *before* releasing the node it
//! came from, so the child link can never be rewritten underneath it.
//!
//! ```text
//!   (root) ── held ──┐
//!                    ▼
//!             [m] ── lock child, then release (root)
//!            /   \
//!          [c]   [t] ── ...
//! ```
//!
//! - Reads take shared locks and drop the parent as soon as the child is held
//! - Writes take exclusive locks and keep the immediate parent until its
//!   child link has been rewritten
//!
//! Locks are only ever taken root-to-leaf, which rules out cyclic waits.
//! Operations on disjoint subtrees proceed in parallel; there is no
//! whole-tree atomic snapshot.

mod node;
mod table;
mod walk;

pub use table::Tree;
