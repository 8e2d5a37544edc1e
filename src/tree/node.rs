//! Tree nodes
//!
//! A node owns its children outright. The only other handle to a node is the
//! transient `Arc` clone a traversal holds while it moves from the parent's
//! lock to the child's.

use std::sync::Arc;

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock};

use crate::error::{KvError, Result};

/// Shared, individually locked node
pub(crate) type NodeRef = Arc<RwLock<Node>>;

/// Owning child slot
pub(crate) type Link = Option<NodeRef>;

/// Shared lock on a node, independent of its parent's guard
pub(crate) type ReadGuard = ArcRwLockReadGuard<RawRwLock, Node>;

/// Exclusive lock on a node, independent of its parent's guard
pub(crate) type WriteGuard = ArcRwLockWriteGuard<RawRwLock, Node>;

/// Which child slot a key descends into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    /// Side of `node_key` on which `key` belongs
    pub(crate) fn toward(key: &str, node_key: &str) -> Side {
        if key < node_key {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// A single entry in the tree
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) left: Link,
    pub(crate) right: Link,
}

impl Node {
    /// The permanent root. Its empty key sorts before every real key.
    pub(crate) fn sentinel() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            left: None,
            right: None,
        }
    }

    /// Build a fully initialized leaf, before anything can reach it.
    ///
    /// Buffer reservation failures surface as `AllocationFailed` rather
    /// than aborting.
    pub(crate) fn leaf(key: &str, value: &str) -> Result<Self> {
        Ok(Self {
            key: copy_str(key)?,
            value: copy_str(value)?,
            left: None,
            right: None,
        })
    }

    pub(crate) fn into_ref(self) -> NodeRef {
        Arc::new(RwLock::new(self))
    }

    pub(crate) fn is_sentinel(&self) -> bool {
        self.key.is_empty()
    }

    pub(crate) fn child(&self, side: Side) -> &Link {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

fn copy_str(src: &str) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(src.len())
        .map_err(|e| KvError::AllocationFailed(e.to_string()))?;
    out.push_str(src);
    Ok(out)
}
