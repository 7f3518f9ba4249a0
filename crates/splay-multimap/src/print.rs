//! Inspection helpers: a human-readable tree dump and a per-entry
//! structural report. Thin wrappers over the traversal primitives; nothing
//! here splays or mutates.

use std::fmt::Debug;

use crate::node::NodeId;
use crate::tree::SplayMultimap;

/// One logical entry as seen by [`SplayMultimap::structure`]: the entry's
/// key/value plus the keys of its node's structural neighbors. Duplicate
/// values materialize as sibling records sharing their node's neighbor keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureEntry<K, V> {
    pub key: K,
    pub value: V,
    pub parent: Option<K>,
    pub left: Option<K>,
    pub right: Option<K>,
}

enum Visit {
    Descend(NodeId, usize),
    Emit(NodeId, usize),
}

impl<K: Debug, V> SplayMultimap<K, V> {
    /// Renders the tree top-down, right subtree first, one node per line
    /// with indentation proportional to depth (so the output reads as the
    /// tree lying on its left side). Iterative, so deeply unbalanced shapes
    /// cannot overflow the call stack.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(Visit::Descend(root, 0));
        }
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Descend(id, depth) => {
                    if let Some(l) = self.arena[id].l {
                        stack.push(Visit::Descend(l, depth + 1));
                    }
                    stack.push(Visit::Emit(id, depth));
                    if let Some(r) = self.arena[id].r {
                        stack.push(Visit::Descend(r, depth + 1));
                    }
                }
                Visit::Emit(id, depth) => {
                    let node = &self.arena[id];
                    out.push_str(&"    ".repeat(depth));
                    out.push_str(&format!("{:?}", node.key));
                    if node.has_duplicates() {
                        out.push_str(&format!(" (+{})", node.dups.len()));
                    }
                    out.push('\n');
                }
            }
        }
        out
    }
}

impl<K: Clone, V: Clone> SplayMultimap<K, V> {
    /// Produces one record per logical entry, in ascending key order, for
    /// external inspection and testing. A node's duplicates come first (as
    /// sibling records with the same structural neighbor keys), then its
    /// primary entry.
    pub fn structure(&self) -> Vec<StructureEntry<K, V>> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut curr = self.root;
        while curr.is_some() || !stack.is_empty() {
            while let Some(id) = curr {
                stack.push(id);
                curr = self.arena[id].l;
            }
            let Some(id) = stack.pop() else { break };
            let node = &self.arena[id];
            let parent = node.p.map(|p| self.arena[p].key.clone());
            let left = node.l.map(|l| self.arena[l].key.clone());
            let right = node.r.map(|r| self.arena[r].key.clone());
            for dup in &node.dups {
                out.push(StructureEntry {
                    key: node.key.clone(),
                    value: dup.clone(),
                    parent: parent.clone(),
                    left: left.clone(),
                    right: right.clone(),
                });
            }
            out.push(StructureEntry {
                key: node.key.clone(),
                value: node.value.clone(),
                parent,
                left,
                right,
            });
            curr = node.r;
        }
        out
    }
}
