//! Arena storage and link-level surgery.
//!
//! Nodes live in a `Vec` of slots addressed by `u32` ids; the parent link is
//! a plain back-index, so the parent/child cycle never becomes an ownership
//! cycle. Freed slots go on an intrusive vacant list and are reused by the
//! next allocation.
//!
//! Everything here is O(1) pointer surgery local to at most three nodes; the
//! tree-wide protocol (search, splay loop, splice deletion) lives in
//! [`crate::tree`].

use std::ops::{Index, IndexMut};

/// Arena index of a node.
pub(crate) type NodeId = u32;

/// One tree node: a distinct key, its primary value, and the stack of
/// duplicate values bound to the same key (insertion order, newest last).
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) p: Option<NodeId>,
    pub(crate) l: Option<NodeId>,
    pub(crate) r: Option<NodeId>,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) dups: Vec<V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            p: None,
            l: None,
            r: None,
            key,
            value,
            dups: Vec::new(),
        }
    }

    pub(crate) fn push_duplicate(&mut self, value: V) {
        self.dups.push(value);
    }

    /// Pops the newest duplicate. Callers guard with [`Self::has_duplicates`];
    /// popping an empty sequence is an internal consistency violation.
    pub(crate) fn pop_duplicate(&mut self) -> Option<V> {
        self.dups.pop()
    }

    pub(crate) fn has_duplicates(&self) -> bool {
        !self.dups.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Vacant { next: Option<NodeId> },
    Occupied(Node<K, V>),
}

/// Slab of nodes with an intrusive free list over vacant slots.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Option<NodeId>,
    occupied: usize,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            occupied: 0,
        }
    }

    /// Number of live nodes (= distinct keys in the tree).
    pub(crate) fn node_count(&self) -> usize {
        self.occupied
    }

    /// Allocates a detached node, reusing a vacant slot when one exists.
    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeId {
        self.occupied += 1;
        let node = Node::new(key, value);
        match self.free {
            Some(id) => {
                let slot = &mut self.slots[id as usize];
                let Slot::Vacant { next } = *slot else {
                    unreachable!("free list points at an occupied slot");
                };
                self.free = next;
                *slot = Slot::Occupied(node);
                id
            }
            None => {
                let id = self.slots.len() as NodeId;
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    /// Releases `id`'s slot onto the free list and returns the node.
    /// The caller is responsible for having unlinked it from the tree.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        let slot = std::mem::replace(
            &mut self.slots[id as usize],
            Slot::Vacant { next: self.free },
        );
        let Slot::Occupied(node) = slot else {
            unreachable!("released a vacant slot");
        };
        self.free = Some(id);
        self.occupied -= 1;
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.occupied = 0;
    }

    /// Sets `child` as `parent`'s left child and fixes the back-reference.
    /// The caller clears the child's previous parent link before moving it.
    pub(crate) fn attach_left(&mut self, parent: NodeId, child: Option<NodeId>) {
        self[parent].l = child;
        if let Some(c) = child {
            self[c].p = Some(parent);
        }
    }

    /// Mirror of [`Self::attach_left`] for the right slot.
    pub(crate) fn attach_right(&mut self, parent: NodeId, child: Option<NodeId>) {
        self[parent].r = child;
        if let Some(c) = child {
            self[c].p = Some(parent);
        }
    }

    pub(crate) fn is_root(&self, id: NodeId) -> bool {
        self[id].p.is_none()
    }

    /// Zig-zig test: `id` and its parent sit on the same side of their
    /// respective parents. Only meaningful when a grandparent exists.
    pub(crate) fn is_same_side_grandchild(&self, id: NodeId) -> bool {
        let Some(p) = self[id].p else { return false };
        let Some(g) = self[p].p else { return false };
        (self[p].l == Some(id)) == (self[g].l == Some(p))
    }

    /// Single elementary rotation: promotes `id` one level, demoting its
    /// former parent to be its child and handing the displaced subtree over.
    /// Rewires all three affected back-references and the grandparent's
    /// child slot in one step; a root node is left untouched.
    pub(crate) fn rotate(&mut self, id: NodeId) {
        let Some(p) = self[id].p else { return };
        let g = self[p].p;
        if self[p].l == Some(id) {
            let b = self[id].r;
            self[p].l = b;
            if let Some(b) = b {
                self[b].p = Some(p);
            }
            self[id].r = Some(p);
        } else {
            let b = self[id].l;
            self[p].r = b;
            if let Some(b) = b {
                self[b].p = Some(p);
            }
            self[id].l = Some(p);
        }
        self[p].p = Some(id);
        self[id].p = g;
        if let Some(g) = g {
            if self[g].l == Some(p) {
                self[g].l = Some(id);
            } else {
                self[g].r = Some(id);
            }
        }
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id as usize] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("indexed a vacant slot"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id as usize] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("indexed a vacant slot"),
        }
    }
}
