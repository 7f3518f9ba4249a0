//! Lazy, restartable traversals.
//!
//! All iterators here walk the tree with an explicit stack (never recursion)
//! and never splay, so consuming them leaves the tree shape untouched. They
//! borrow the map, which statically rules out mutation while a traversal is
//! still in flight.

use std::cmp::Ordering;

use crate::node::{Arena, NodeId};

/// In-order walk over node ids: a stack of not-yet-emitted ancestors, seeded
/// and refilled with left spines.
struct InOrderIds<'a, K, V> {
    arena: &'a Arena<K, V>,
    stack: Vec<NodeId>,
}

impl<'a, K, V> InOrderIds<'a, K, V> {
    fn new(arena: &'a Arena<K, V>, root: Option<NodeId>) -> Self {
        let mut ids = Self {
            arena,
            stack: Vec::new(),
        };
        if let Some(root) = root {
            ids.push_left_spine(root);
        }
        ids
    }

    fn push_left_spine(&mut self, mut id: NodeId) {
        loop {
            self.stack.push(id);
            match self.arena[id].l {
                Some(l) => id = l,
                None => break,
            }
        }
    }
}

impl<'a, K, V> Iterator for InOrderIds<'a, K, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(r) = self.arena[id].r {
            self.push_left_spine(r);
        }
        Some(id)
    }
}

/// Per-node in-order iterator: each distinct key once, with its primary
/// value. Created by [`crate::SplayMultimap::nodes`].
pub struct Nodes<'a, K, V> {
    ids: InOrderIds<'a, K, V>,
}

impl<'a, K, V> Nodes<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>, root: Option<NodeId>) -> Self {
        Self {
            ids: InOrderIds::new(arena, root),
        }
    }
}

impl<'a, K, V> Iterator for Nodes<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let id = self.ids.next()?;
        let node = &self.ids.arena[id];
        Some((&node.key, &node.value))
    }
}

/// Flattened multiset iterator: ascending key order, and for each node its
/// duplicates in insertion order followed by the primary value. Created by
/// [`crate::SplayMultimap::iter`].
pub struct Iter<'a, K, V> {
    ids: InOrderIds<'a, K, V>,
    // node currently being drained, and the next duplicate index within it
    current: Option<(NodeId, usize)>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>, root: Option<NodeId>) -> Self {
        Self {
            ids: InOrderIds::new(arena, root),
            current: None,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        loop {
            match self.current {
                Some((id, i)) => {
                    let node = &self.ids.arena[id];
                    if i < node.dups.len() {
                        self.current = Some((id, i + 1));
                        return Some((&node.key, &node.dups[i]));
                    }
                    self.current = None;
                    return Some((&node.key, &node.value));
                }
                None => {
                    let id = self.ids.next()?;
                    self.current = Some((id, 0));
                }
            }
        }
    }
}

/// Bounded multiset iterator over `low <= key <= high`, same per-node order
/// as [`Iter`]. Created by [`crate::SplayMultimap::range`], which pre-splays
/// the bounds as a shape hint before handing over.
///
/// The descent prunes subtrees that the BST order proves entirely below
/// `low`, and the walk stops outright at the first key above `high` (keys
/// only grow from there). Keys incomparable with a bound are treated as out
/// of range.
pub struct Range<'a, 'k, K, V> {
    arena: &'a Arena<K, V>,
    stack: Vec<NodeId>,
    current: Option<(NodeId, usize)>,
    done: bool,
    low: &'k K,
    high: &'k K,
}

impl<'a, 'k, K: PartialOrd, V> Range<'a, 'k, K, V> {
    pub(crate) fn new(
        arena: &'a Arena<K, V>,
        root: Option<NodeId>,
        low: &'k K,
        high: &'k K,
    ) -> Self {
        let mut range = Self {
            arena,
            stack: Vec::new(),
            current: None,
            done: false,
            low,
            high,
        };
        if let Some(root) = root {
            range.push_in_range(root);
        }
        range
    }

    /// Left-spine descent that skips nodes already below `low`: such a
    /// node's left subtree is all out of range, so the walk resumes in its
    /// right subtree instead of stacking it.
    fn push_in_range(&mut self, mut id: NodeId) {
        loop {
            match self.arena[id].key.partial_cmp(self.low) {
                Some(Ordering::Less) | None => match self.arena[id].r {
                    Some(r) => id = r,
                    None => break,
                },
                _ => {
                    self.stack.push(id);
                    match self.arena[id].l {
                        Some(l) => id = l,
                        None => break,
                    }
                }
            }
        }
    }
}

impl<'a, 'k, K: PartialOrd, V> Iterator for Range<'a, 'k, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        loop {
            if let Some((id, i)) = self.current {
                let node = &self.arena[id];
                if i < node.dups.len() {
                    self.current = Some((id, i + 1));
                    return Some((&node.key, &node.dups[i]));
                }
                self.current = None;
                return Some((&node.key, &node.value));
            }
            if self.done {
                return None;
            }
            let id = self.stack.pop()?;
            if let Some(r) = self.arena[id].r {
                self.push_in_range(r);
            }
            if !matches!(
                self.arena[id].key.partial_cmp(self.high),
                Some(Ordering::Less | Ordering::Equal)
            ) {
                // in-order walk: every remaining key is at least this large
                self.done = true;
                return None;
            }
            self.current = Some((id, 0));
        }
    }
}
