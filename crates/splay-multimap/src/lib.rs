//! Self-adjusting ordered multimap.
//!
//! [`SplayMultimap`] keeps one arena-allocated node per distinct key in a
//! binary search tree and restructures the tree on every key access: the
//! last node a search touches is splayed to the root, so frequently used
//! keys drift toward the top and access cost stays amortized logarithmic
//! without any balance metadata. Values that collide on a key stack up as
//! duplicates on the same node (multiset semantics, LIFO removal).
//!
//! All "pointers" are `Option<u32>` indices into a `Vec`-backed arena, so
//! the parent back-reference never forms an ownership cycle.
//!
//! Keys only need [`PartialOrd`]; comparing two keys that have no order
//! relative to each other surfaces as [`Error::KeyNotComparable`] instead
//! of silently picking a branch.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`tree`] | [`SplayMultimap`]: search, splay, insert/update/remove, neighbor queries |
//! | `node` | arena slots and O(1) link surgery (attach, rotate) |
//! | [`iter`] | non-splaying explicit-stack traversals ([`Iter`], [`Nodes`], [`Range`]) |
//! | [`print`] | debug rendering and the structural report |
//! | [`error`] | [`Error`] |
//!
//! # Example
//!
//! ```
//! use splay_multimap::SplayMultimap;
//!
//! let mut map = SplayMultimap::new();
//! map.insert(3, "c").unwrap();
//! map.insert(1, "a").unwrap();
//! map.insert(3, "c2").unwrap();
//!
//! assert_eq!(map.get(&3).unwrap(), Some(&"c2"));
//! assert_eq!(map.len(), 3);
//! assert_eq!(map.remove(&3).unwrap(), Some("c"));
//! assert_eq!(map.get(&3).unwrap(), Some(&"c2"));
//! ```

pub mod error;
pub mod iter;
mod node;
pub mod print;
pub mod tree;

pub use error::Error;
pub use iter::{Iter, Nodes, Range};
pub use print::StructureEntry;
pub use tree::SplayMultimap;
