//! Small sequence predicates for stating what a mutation may change.
//!
//! These are not used by the maps themselves.  Tests snapshot a map's entries
//! (in key order) before and after an operation and use these helpers to
//! assert the operation's frame condition: apart from the targeted key, the
//! entries are exactly the same.
//!
//! ```
//! use avl_collections::{seq, AvlMap};
//!
//! let mut m: AvlMap<_, _> = (0..10).map(|i| (i, i * i)).collect();
//! let before: Vec<_> = m.iter().map(|(k, v)| (*k, *v)).collect();
//! m.remove(&4);
//! let after: Vec<_> = m.iter().map(|(k, v)| (*k, *v)).collect();
//!
//! assert!(seq::is_sorted_by(&after, |a, b| a.0.cmp(&b.0)));
//! assert!(seq::same_by(
//!     &seq::without(before, |e| e.0 == 4),
//!     &after,
//!     |a, b| a == b
//! ));
//! ```
use std::cmp::Ordering::{self, *};

/// Tests that each element is no greater than its successor.
pub fn is_sorted_by<T, F>(xs: &[T], mut cmp: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    xs.windows(2).all(|w| cmp(&w[0], &w[1]) != Greater)
}

/// Tests that no two neighbors compare equal.  For a sorted slice, this means
/// that all elements are distinct.
pub fn is_distinct_by<T, F>(xs: &[T], mut cmp: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    xs.windows(2).all(|w| cmp(&w[0], &w[1]) != Equal)
}

/// Tests that two slices have the same length and pairwise equal elements.
pub fn same_by<T, U, F>(xs: &[T], ys: &[U], mut eq: F) -> bool
where
    F: FnMut(&T, &U) -> bool,
{
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq(x, y))
}

/// Tests whether some element satisfies pred.
pub fn contains_by<T, F>(xs: &[T], pred: F) -> bool
where
    F: FnMut(&T) -> bool,
{
    xs.iter().any(pred)
}

/// Drops the elements that satisfy pred, keeping the order of the rest.
pub fn without<T, F>(xs: Vec<T>, mut pred: F) -> Vec<T>
where
    F: FnMut(&T) -> bool,
{
    xs.into_iter().filter(|x| !pred(x)).collect()
}
