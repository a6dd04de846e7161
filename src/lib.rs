//! # Ordered collections on AVL trees
//!
//! `avl-collections` provides [`AvlMap`], an ordered map, and [`AvlSet`], an
//! ordered set, both backed by an AVL-balanced binary search tree.  Keys are
//! ordered by a [`Compare`] chosen when the collection is built: any
//! `Fn(&K, &K) -> Ordering` works, and [`Natural`] (the default) uses `Ord`.
//!
//! Every insertion and removal restores the AVL balance on the way back up
//! the tree, so the height stays within `1.44 * log2(n + 2)` and lookups,
//! insertions and removals take `O(log n)` time.
//!
//! ```
//! use avl_collections::AvlMap;
//!
//! let mut m = AvlMap::new();
//! for (k, v) in [(3, "c"), (1, "a"), (2, "b")] {
//!     m.insert(k, v);
//! }
//! assert_eq!(m.get(&2), Some(&"b"));
//! assert_eq!(m.remove(&1), Some("a"));
//! assert_eq!(m.len(), 2);
//! assert_eq!(m.check(), Ok(()));
//! ```
//!
//! The collections are plain owned values.  They do no locking; share one
//! across threads by wrapping it in a mutex.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for the collections, and
//!   [`AvlMap::shape`] for dumping a tree's structure.
//! - `contracts`: checks the full tree invariant after every mutation and
//!   panics on a violation.  Meant for debugging; it makes every update
//!   linear in the size of the map.

#[macro_use]
mod contract;

mod avl;
mod comparator;
pub mod seq;

pub use avl::{AvlMap, IntoIter, Iter, IterMut, Traversal, Violation};
pub use avl::{AvlSet, SetIntoIter, SetIter};
pub use comparator::compare_by_sign;
pub use compare::{Compare, Natural};

#[cfg(feature = "serde")]
pub use avl::Shape;
