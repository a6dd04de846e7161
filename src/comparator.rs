//! Comparator adapters.
//!
//! Maps and sets are ordered by any [`compare::Compare`].  Closures of type
//! `Fn(&K, &K) -> Ordering` already are comparators, and [`Natural`] (the
//! default) orders keys by `Ord`:
//!
//! ```
//! use avl_collections::AvlMap;
//! use compare::{natural, Compare};
//!
//! let mut m = AvlMap::with_comparator(natural().rev());
//! m.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
//! assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
//! ```
//!
//! The order must stay consistent while the container holds keys.  A
//! comparator whose answers change between calls leaves the tree in an
//! unspecified (but memory-safe) state.
//!
//! [`Natural`]: compare::Natural
use std::cmp::Ordering;

/// Adapts a comparator that answers with the sign of an integer (negative for
/// less, zero for equal, positive for greater).
///
/// # Examples
/// ```
/// use avl_collections::{compare_by_sign, AvlMap};
///
/// let sign = |a: &i64, b: &i64| (a > b) as i64 - (a < b) as i64;
/// let mut m = AvlMap::with_comparator(compare_by_sign(sign));
/// m.insert(i64::MAX, "max");
/// m.insert(i64::MIN, "min");
/// assert_eq!(m.first_key_value(), Some((&i64::MIN, &"min")));
/// ```
pub fn compare_by_sign<K, F>(
    f: F,
) -> impl Fn(&K, &K) -> Ordering + Clone
where
    K: ?Sized,
    F: Fn(&K, &K) -> i64 + Clone,
{
    move |lhs: &K, rhs: &K| f(lhs, rhs).cmp(&0)
}

#[cfg(test)]
mod test {
    use super::*;
    use compare::{natural, Compare};
    use std::cmp::Ordering::*;

    fn sign(a: &i64, b: &i64) -> i64 {
        (a > b) as i64 - (a < b) as i64
    }

    #[test]
    fn natural_follows_ord() {
        assert_eq!(natural().compare(&1, &2), Less);
        assert_eq!(natural::<str>().compare("b", "a"), Greater);
        assert_eq!(natural().compare(&7u8, &7u8), Equal);
    }

    #[test]
    fn closures_are_comparators() {
        let rev = |a: &u32, b: &u32| b.cmp(a);
        assert_eq!(rev.compare(&1, &2), Greater);
        assert_eq!(natural::<u32>().rev().compare(&1, &2), Greater);
    }

    #[test]
    fn sign_comparator() {
        let c = compare_by_sign(sign);
        assert_eq!(c.compare(&-5, &3), Less);
        assert_eq!(c.compare(&3, &3), Equal);
        assert_eq!(c.compare(&9, &3), Greater);
    }

    #[test]
    fn sign_comparator_at_the_extremes() {
        let c = compare_by_sign(sign);
        assert_eq!(c.compare(&i64::MIN, &1), Less);
        assert_eq!(c.compare(&i64::MAX, &i64::MIN), Greater);
        assert_eq!(c.compare(&i64::MIN, &i64::MIN), Equal);
    }
}
