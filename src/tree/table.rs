//! Tree implementation
//!
//! Lock-coupled query, add and remove.

use crate::config::DEFAULT_MAX_LEN;
use crate::error::{fail_fast, KvError, Result};

use super::node::{Node, NodeRef, ReadGuard, Side, WriteGuard};

/// Concurrent key-value tree anchored at a permanent sentinel root
pub struct Tree {
    /// Sentinel; never freed, all real entries live below it
    pub(super) root: NodeRef,

    /// Longest accepted name or value, in bytes
    max_len: usize,
}

impl Tree {
    /// Create an empty tree with the default length bound
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Create an empty tree accepting names and values up to `max_len` bytes
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            root: Node::sentinel().into_ref(),
            max_len,
        }
    }

    /// Get the length bound
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Look up the value stored under `key`
    pub fn query(&self, key: &str) -> Result<String> {
        self.check_key(key)?;

        let mut current: ReadGuard = self.root.read_arc();
        loop {
            let next = match current.child(Side::toward(key, &current.key)) {
                Some(child) => child.read_arc(),
                None => return Err(KvError::KeyNotFound),
            };
            // The parent is released only now that the child is held.
            current = next;

            if current.key == key {
                return Ok(current.value.clone());
            }
        }
    }

    /// Insert `key` → `value`.
    ///
    /// Fails with `DuplicateKey` if the key is present; the existing value
    /// is left untouched.
    pub fn add(&self, key: &str, value: &str) -> Result<()> {
        self.check_key(key)?;
        self.check_value(value)?;

        let mut parent: WriteGuard = self.root.write_arc();
        loop {
            let side = Side::toward(key, &parent.key);
            let child = match parent.child(side) {
                Some(child) => child.write_arc(),
                None => {
                    let node = Node::leaf(key, value)?;
                    *parent.child_mut(side) = Some(node.into_ref());
                    tracing::trace!(key, "added");
                    return Ok(());
                }
            };

            if child.key == key {
                return Err(KvError::DuplicateKey);
            }
            parent = child;
        }
    }

    /// Delete `key` and its value
    pub fn remove(&self, key: &str) -> Result<()> {
        self.check_key(key)?;

        // Descend keeping the parent of the current node write-locked.
        let mut parent: WriteGuard = self.root.write_arc();
        let (mut target, side) = loop {
            let side = Side::toward(key, &parent.key);
            let child = match parent.child(side) {
                Some(child) => child.write_arc(),
                None => return Err(KvError::KeyNotFound),
            };

            if child.key == key {
                break (child, side);
            }
            parent = child;
        };

        // At most one child: splice it into the parent's slot.
        if target.right.is_none() {
            *parent.child_mut(side) = target.left.take();
            drop(target);
            drop(parent);
            tracing::trace!(key, "removed leaf or left-only node");
            return Ok(());
        }
        if target.left.is_none() {
            *parent.child_mut(side) = target.right.take();
            drop(target);
            drop(parent);
            tracing::trace!(key, "removed right-only node");
            return Ok(());
        }

        // Two children: the target keeps its place in the tree and takes
        // over its in-order successor's entry, so the parent is not needed.
        drop(parent);

        let mut successor: WriteGuard = match target.right.as_ref() {
            Some(right) => right.write_arc(),
            None => fail_fast("right child vanished under write lock"),
        };
        // Parent of `successor` along the left spine; `None` means `target`.
        let mut spine_parent: Option<WriteGuard> = None;

        while let Some(next) = successor.left.clone() {
            // Grandparent is no longer needed: only the successor's direct
            // parent link gets rewritten.
            drop(spine_parent.take());
            let next = next.write_arc();
            spine_parent = Some(std::mem::replace(&mut successor, next));
        }

        target.key = std::mem::take(&mut successor.key);
        target.value = std::mem::take(&mut successor.value);

        let orphan = successor.right.take();
        match spine_parent.as_mut() {
            Some(spine_parent) => spine_parent.left = orphan,
            None => target.right = orphan,
        }

        drop(target);
        drop(spine_parent);
        drop(successor);
        tracing::trace!(key, "removed node with two children");
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::IllFormed("empty name".to_string()));
        }
        if key.len() > self.max_len {
            return Err(KvError::KeyTooLong {
                len: key.len(),
                max: self.max_len,
            });
        }
        Ok(())
    }

    fn check_value(&self, value: &str) -> Result<()> {
        if value.len() > self.max_len {
            return Err(KvError::ValueTooLong {
                len: value.len(),
                max: self.max_len,
            });
        }
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        self.teardown();
    }
}
