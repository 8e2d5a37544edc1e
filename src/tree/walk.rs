//! Whole-tree walks
//!
//! Dump, in-order snapshot and teardown.

use std::io::Write;
use std::sync::Arc;

use crate::error::Result;

use super::node::{Link, NodeRef, ReadGuard};
use super::table::Tree;

impl Tree {
    /// Print the tree pre-order, one line per node, indented one space per
    /// level. The sentinel prints as `(root)`, a missing child as `(null)`.
    ///
    /// Each node stays read-locked until both of its subtrees are printed,
    /// so every subtree is internally consistent but the tree as a whole is
    /// not an atomic snapshot.
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        dump_subtree(self.root.read_arc(), 0, out)?;
        out.flush()?;
        Ok(())
    }

    /// Snapshot of every entry in key order
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        collect_in_order(self.root.read_arc(), &mut entries);
        entries
    }

    /// Number of entries, excluding the sentinel
    pub fn len(&self) -> usize {
        count_subtree(self.root.read_arc()) - 1
    }

    pub fn is_empty(&self) -> bool {
        let root = self.root.read();
        root.left.is_none() && root.right.is_none()
    }

    /// Free every node except the sentinel and return how many were freed.
    ///
    /// Callers must guarantee nothing else is using the tree.
    pub fn teardown(&self) -> usize {
        let mut pending: Vec<NodeRef> = {
            let mut root = self.root.write();
            root.left.take().into_iter().chain(root.right.take()).collect()
        };

        let mut freed = 0;
        while let Some(node) = pending.pop() {
            // Unwrapped iteratively so a degenerate, list-shaped tree does
            // not recurse once per level on drop.
            if let Ok(lock) = Arc::try_unwrap(node) {
                let mut node = lock.into_inner();
                pending.extend(node.left.take());
                pending.extend(node.right.take());
            }
            freed += 1;
        }

        if freed > 0 {
            tracing::debug!(freed, "tree torn down");
        }
        freed
    }
}

fn dump_subtree<W: Write>(node: ReadGuard, depth: usize, out: &mut W) -> Result<()> {
    write_indent(depth, out)?;
    if node.is_sentinel() {
        writeln!(out, "(root)")?;
    } else {
        writeln!(out, "{} {}", node.key, node.value)?;
    }

    dump_child(&node.left, depth + 1, out)?;
    dump_child(&node.right, depth + 1, out)?;
    Ok(())
}

fn dump_child<W: Write>(link: &Link, depth: usize, out: &mut W) -> Result<()> {
    match link {
        Some(child) => dump_subtree(child.read_arc(), depth, out),
        None => {
            write_indent(depth, out)?;
            writeln!(out, "(null)")?;
            Ok(())
        }
    }
}

fn write_indent<W: Write>(depth: usize, out: &mut W) -> Result<()> {
    for _ in 0..depth {
        out.write_all(b" ")?;
    }
    Ok(())
}

fn collect_in_order(node: ReadGuard, entries: &mut Vec<(String, String)>) {
    if let Some(left) = &node.left {
        collect_in_order(left.read_arc(), entries);
    }
    if !node.is_sentinel() {
        entries.push((node.key.clone(), node.value.clone()));
    }
    if let Some(right) = &node.right {
        collect_in_order(right.read_arc(), entries);
    }
}

fn count_subtree(node: ReadGuard) -> usize {
    let left = node.left.as_ref().map_or(0, |l| count_subtree(l.read_arc()));
    let right = node.right.as_ref().map_or(0, |r| count_subtree(r.read_arc()));
    1 + left + right
}
