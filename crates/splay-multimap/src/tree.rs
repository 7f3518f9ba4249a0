//! The splay-tree multimap.
//!
//! Every key-touching operation binary-searches from the root and then
//! unconditionally splays the last node visited, so the most recently
//! touched region of the key space stays shallow. Traversal ([`iter`],
//! [`nodes`], [`range`]) never splays.
//!
//! [`iter`]: SplayMultimap::iter
//! [`nodes`]: SplayMultimap::nodes
//! [`range`]: SplayMultimap::range

use std::cmp::Ordering;

use crate::error::Error;
use crate::iter::{Iter, Nodes, Range};
use crate::node::{Arena, NodeId};

/// Orders two keys, surfacing unordered pairs as an error instead of
/// silently picking a branch.
pub(crate) fn order<K: PartialOrd>(a: &K, b: &K) -> Result<Ordering, Error> {
    a.partial_cmp(b).ok_or(Error::KeyNotComparable)
}

/// An ordered multimap backed by a self-adjusting binary search tree.
///
/// One node per distinct key. The most recently inserted value for a key is
/// the node's *primary* value (what [`get`] returns); older bindings
/// accumulate in the node's duplicate sequence in insertion order and come
/// back out LIFO through [`remove`]. `len` counts logical entries,
/// duplicates included.
///
/// [`get`]: SplayMultimap::get
/// [`remove`]: SplayMultimap::remove
///
/// Single-threaded by design: there is no internal locking, and in-flight
/// iterators borrow the tree, so the borrow checker rejects mutation while
/// a traversal is still being consumed.
#[derive(Debug, Clone)]
pub struct SplayMultimap<K, V> {
    pub(crate) arena: Arena<K, V>,
    pub(crate) root: Option<NodeId>,
    pub(crate) len: usize,
}

impl<K, V> SplayMultimap<K, V> {
    /// Creates an empty multimap.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Number of logical entries: distinct keys plus all duplicates.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Longest root-to-leaf path counted in nodes; `0` for an empty tree.
    /// Non-splaying, O(n), iterative so pathological shapes cannot blow
    /// the call stack.
    pub fn height(&self) -> usize {
        let Some(root) = self.root else { return 0 };
        let mut best = 0;
        let mut stack = vec![(root, 1usize)];
        while let Some((id, depth)) = stack.pop() {
            best = best.max(depth);
            if let Some(l) = self.arena[id].l {
                stack.push((l, depth + 1));
            }
            if let Some(r) = self.arena[id].r {
                stack.push((r, depth + 1));
            }
        }
        best
    }

    /// Drops every entry. Equivalent to replacing the map with a fresh one.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
    }

    /// Lazy in-order traversal of nodes, yielding each distinct key with its
    /// primary value. Does not splay.
    pub fn nodes(&self) -> Nodes<'_, K, V> {
        Nodes::new(&self.arena, self.root)
    }

    /// Lazy in-order traversal of the full multiset: for each node, its
    /// duplicates in insertion order and then its primary value. Does not
    /// splay.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.arena, self.root)
    }

    /// Splays `id` all the way up and makes it the root.
    fn splay(&mut self, id: NodeId) {
        self.splay_below(id, None);
        self.root = Some(id);
    }

    /// Splay loop, stopping once `id`'s parent is `boundary`. With a
    /// boundary of `None` this is a full splay-to-root; with a boundary
    /// node it restructures a subtree in place, leaving the boundary and
    /// everything above it untouched.
    fn splay_below(&mut self, id: NodeId, boundary: Option<NodeId>) {
        while self.arena[id].p != boundary {
            let Some(p) = self.arena[id].p else { break };
            if self.arena[p].p == boundary {
                // zig: parent is the (sub)root
                self.arena.rotate(id);
            } else if self.arena.is_same_side_grandchild(id) {
                // zig-zig: the parent must go first; rotating the node
                // first loses the amortized bound
                self.arena.rotate(p);
                self.arena.rotate(id);
            } else {
                // zig-zag: two rotations of the node itself
                self.arena.rotate(id);
                self.arena.rotate(id);
            }
        }
    }
}

impl<K: PartialOrd, V> SplayMultimap<K, V> {
    /// Binary search for `key` from the root. The walk stops at the matching
    /// node or at the last node before a missing child; either way the stop
    /// node is splayed to the root. Returns the stop node and how `key`
    /// compared against it (`Equal` means found), or `None` on an empty tree.
    fn locate(&mut self, key: &K) -> Result<Option<(NodeId, Ordering)>, Error> {
        let Some(mut curr) = self.root else {
            return Ok(None);
        };
        loop {
            let ord = order(key, &self.arena[curr].key)?;
            let next = match ord {
                Ordering::Equal => None,
                Ordering::Less => self.arena[curr].l,
                Ordering::Greater => self.arena[curr].r,
            };
            match next {
                Some(n) => curr = n,
                None => {
                    self.splay(curr);
                    return Ok(Some((curr, ord)));
                }
            }
        }
    }

    /// Returns the primary value bound to `key`, splaying the searched
    /// region. Duplicates are not visible here; see [`Self::duplicates`].
    pub fn get(&mut self, key: &K) -> Result<Option<&V>, Error> {
        match self.locate(key)? {
            Some((id, Ordering::Equal)) => Ok(Some(&self.arena[id].value)),
            _ => Ok(None),
        }
    }

    pub fn contains_key(&mut self, key: &K) -> Result<bool, Error> {
        Ok(matches!(self.locate(key)?, Some((_, Ordering::Equal))))
    }

    /// Inserts `(key, value)`. A fresh key gets a new node at the first
    /// missing child slot. A colliding key allocates nothing: the node's
    /// previous primary moves onto its duplicate stack and `value` becomes
    /// the new primary. The affected node is splayed to the root and `len`
    /// grows by one either way.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), Error> {
        match self.root {
            None => {
                let id = self.arena.alloc(key, value);
                self.root = Some(id);
            }
            Some(mut curr) => loop {
                match order(&key, &self.arena[curr].key)? {
                    Ordering::Equal => {
                        let node = &mut self.arena[curr];
                        let displaced = std::mem::replace(&mut node.value, value);
                        node.push_duplicate(displaced);
                        self.splay(curr);
                        break;
                    }
                    Ordering::Less => match self.arena[curr].l {
                        Some(l) => curr = l,
                        None => {
                            let id = self.arena.alloc(key, value);
                            self.arena.attach_left(curr, Some(id));
                            self.splay(id);
                            break;
                        }
                    },
                    Ordering::Greater => match self.arena[curr].r {
                        Some(r) => curr = r,
                        None => {
                            let id = self.arena.alloc(key, value);
                            self.arena.attach_right(curr, Some(id));
                            self.splay(id);
                            break;
                        }
                    },
                }
            },
        }
        self.len += 1;
        Ok(())
    }

    /// Overwrites the primary value of an existing key, leaving duplicates
    /// untouched. Returns `false` (and mutates nothing beyond the locate
    /// splay) when the key is absent.
    pub fn update(&mut self, key: &K, value: V) -> Result<bool, Error> {
        match self.locate(key)? {
            Some((id, Ordering::Equal)) => {
                self.arena[id].value = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Removes one entry for `key`: the newest duplicate while any exist
    /// (the node survives), otherwise the node itself via splice-and-rejoin.
    /// Returns the removed value, or `None` when the key is absent.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, Error> {
        let Some((id, Ordering::Equal)) = self.locate(key)? else {
            return Ok(None);
        };
        if self.arena[id].has_duplicates() {
            let value = self.arena[id].pop_duplicate();
            self.len -= 1;
            return Ok(value);
        }

        // Splice-and-rejoin: the node is the root after the locate splay.
        // Detach both subtrees, splay the left subtree's maximum to its top
        // (the same node a search for `key` would stop at there, since every
        // key in it is smaller), and hang the right subtree off it.
        let left = self.arena[id].l;
        let right = self.arena[id].r;
        if let Some(l) = left {
            self.arena[l].p = None;
        }
        if let Some(r) = right {
            self.arena[r].p = None;
        }
        let node = self.arena.release(id);
        match left {
            None => self.root = right,
            Some(l) => {
                let mut top = l;
                while let Some(r) = self.arena[top].r {
                    top = r;
                }
                self.splay(top);
                self.arena.attach_right(top, right);
            }
        }
        self.len -= 1;
        Ok(Some(node.value))
    }

    /// Smallest key with its primary value; splays that node to the root.
    pub fn min(&mut self) -> Option<(&K, &V)> {
        let mut curr = self.root?;
        while let Some(l) = self.arena[curr].l {
            curr = l;
        }
        self.splay(curr);
        let node = &self.arena[curr];
        Some((&node.key, &node.value))
    }

    /// Largest key with its primary value; splays that node to the root.
    pub fn max(&mut self) -> Option<(&K, &V)> {
        let mut curr = self.root?;
        while let Some(r) = self.arena[curr].r {
            curr = r;
        }
        self.splay(curr);
        let node = &self.arena[curr];
        Some((&node.key, &node.value))
    }

    /// Shared walk for `higher`/`ceiling`: locate `key`, and if the splayed
    /// root does not already satisfy the relation, descend to the minimum of
    /// its right subtree and splay that node up to just below the root.
    fn neighbor_above(&mut self, key: &K, strict: bool) -> Result<Option<NodeId>, Error> {
        let Some((id, ord)) = self.locate(key)? else {
            return Ok(None);
        };
        let satisfied = match ord {
            Ordering::Less => true,
            Ordering::Equal => !strict,
            Ordering::Greater => false,
        };
        if satisfied {
            return Ok(Some(id));
        }
        let Some(mut curr) = self.arena[id].r else {
            return Ok(None);
        };
        while let Some(l) = self.arena[curr].l {
            curr = l;
        }
        self.splay_below(curr, Some(id));
        Ok(Some(curr))
    }

    /// Mirror of [`Self::neighbor_above`] for `lower`/`floor`.
    fn neighbor_below(&mut self, key: &K, strict: bool) -> Result<Option<NodeId>, Error> {
        let Some((id, ord)) = self.locate(key)? else {
            return Ok(None);
        };
        let satisfied = match ord {
            Ordering::Greater => true,
            Ordering::Equal => !strict,
            Ordering::Less => false,
        };
        if satisfied {
            return Ok(Some(id));
        }
        let Some(mut curr) = self.arena[id].l else {
            return Ok(None);
        };
        while let Some(r) = self.arena[curr].r {
            curr = r;
        }
        self.splay_below(curr, Some(id));
        Ok(Some(curr))
    }

    fn entry_at(&self, id: Option<NodeId>) -> Option<(&K, &V)> {
        id.map(|id| {
            let node = &self.arena[id];
            (&node.key, &node.value)
        })
    }

    /// Smallest key strictly greater than `key`, with its primary value.
    pub fn higher(&mut self, key: &K) -> Result<Option<(&K, &V)>, Error> {
        let id = self.neighbor_above(key, true)?;
        Ok(self.entry_at(id))
    }

    /// Smallest key greater than or equal to `key`, with its primary value.
    pub fn ceiling(&mut self, key: &K) -> Result<Option<(&K, &V)>, Error> {
        let id = self.neighbor_above(key, false)?;
        Ok(self.entry_at(id))
    }

    /// Largest key strictly less than `key`, with its primary value.
    pub fn lower(&mut self, key: &K) -> Result<Option<(&K, &V)>, Error> {
        let id = self.neighbor_below(key, true)?;
        Ok(self.entry_at(id))
    }

    /// Largest key less than or equal to `key`, with its primary value.
    pub fn floor(&mut self, key: &K) -> Result<Option<(&K, &V)>, Error> {
        let id = self.neighbor_below(key, false)?;
        Ok(self.entry_at(id))
    }

    /// Every value stored under `key`: duplicates in insertion order, then
    /// the primary value last. `None` when the key is absent.
    pub fn duplicates(&mut self, key: &K) -> Result<Option<Vec<&V>>, Error> {
        match self.locate(key)? {
            Some((id, Ordering::Equal)) => {
                let node = &self.arena[id];
                let mut out: Vec<&V> = node.dups.iter().collect();
                out.push(&node.value);
                Ok(Some(out))
            }
            _ => Ok(None),
        }
    }

    /// Lazy ascending traversal of every `(key, value)` pair with
    /// `low <= key <= high`, duplicates included (duplicates before the
    /// primary per node). Pre-splays `floor(high)` then `ceiling(low)` as a
    /// shape hint so the active region sits near the root; the walk itself
    /// never splays. Empty bounds (`low > high`) yield nothing.
    pub fn range<'t, 'k>(
        &'t mut self,
        low: &'k K,
        high: &'k K,
    ) -> Result<Range<'t, 'k, K, V>, Error> {
        self.floor(high)?;
        self.ceiling(low)?;
        Ok(Range::new(&self.arena, self.root, low, high))
    }
}

impl<K, V> Default for SplayMultimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PartialOrd, V> Extend<(K, V)> for SplayMultimap<K, V> {
    /// Inserts each pair in order.
    ///
    /// # Panics
    ///
    /// Panics on incomparable keys; the trait signature admits no `Result`.
    /// Use [`SplayMultimap::insert`] directly to handle that case.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value)
                .expect("keys must be mutually comparable");
        }
    }
}

impl<K: PartialOrd, V> FromIterator<(K, V)> for SplayMultimap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
