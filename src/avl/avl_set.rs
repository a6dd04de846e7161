use super::{AvlMap, IntoIter, Iter, Violation};
use compare::{Compare, Natural};
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// A sorted set of values.
///
/// The implementation is a thin wrapper around [`AvlMap`] with `()` values, so
/// it shares the map's balancing and its comparator handling.
#[derive(Clone)]
pub struct AvlSet<T, C = Natural<T>> {
    pub(super) map: AvlMap<T, (), C>,
}

impl<T: Ord> AvlSet<T> {
    /// Creates a new, empty set ordered by `T`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self::with_comparator(compare::natural())
    }
}

impl<T, C> AvlSet<T, C> {
    /// Creates a new, empty set ordered by `cmp`.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
    /// let mut s = AvlSet::with_comparator(by_abs);
    /// assert!(s.insert(-3));
    /// assert!(!s.insert(3));
    /// assert_eq!(s.get(&3), Some(&-3));
    /// ```
    pub fn with_comparator(cmp: C) -> Self {
        AvlSet {
            map: AvlMap::with_comparator(cmp),
        }
    }

    /// Removes all the entries from self.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the least value in the set.
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(k, _)| k)
    }

    /// Returns the greatest value in the set.
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|(k, _)| k)
    }

    /// Returns true if self contains no values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of values in self.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns an iterator over the values in sorted order.
    pub fn iter(&self) -> SetIter<'_, T> {
        SetIter(self.map.iter())
    }
}

impl<T, C: Compare<T>> AvlSet<T, C> {
    /// Tests if self contains the given value.
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Returns a reference to the stored value that compares equal to value.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.get_key_value(value).map(|(k, _)| k)
    }

    /// Inserts the given value and returns true if self did not already have
    /// the value and returns false otherwise.  An already present value is
    /// not replaced.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut s = AvlSet::new();
    /// assert!(s.insert(7));
    /// assert!(!s.insert(7));
    /// assert_eq!(s.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Removes value from the set and reports whether it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the stored value that compares equal to value.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.map.remove_entry(value).map(|(k, _)| k)
    }

    /// Removes and returns the least value in the set.
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(k, _)| k)
    }

    /// Removes and returns the greatest value in the set.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(k, _)| k)
    }

    /// Verifies the structure of the underlying tree.  See
    /// [`AvlMap::check`].
    pub fn check(&self) -> Result<(), Violation> {
        self.map.check()
    }
}

impl<T: Debug, C> Debug for AvlSet<T, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for AvlSet<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: PartialEq, C> PartialEq for AvlSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, C> Eq for AvlSet<T, C> {}

impl<T, C: Compare<T>> Extend<T> for AvlSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for AvlSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = AvlSet::default();
        s.extend(iter);
        s
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlSet<T> {
    fn from(vs: [T; N]) -> Self {
        let mut s = AvlSet::new();
        s.extend(vs);
        s
    }
}

/// An in-order iterator over the values of an [`AvlSet`].
pub struct SetIter<'a, T>(Iter<'a, T, ()>);

impl<'a, T> Clone for SetIter<'a, T> {
    fn clone(&self) -> Self {
        SetIter(self.0.clone())
    }
}

impl<'a, T> Iterator for SetIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, T> ExactSizeIterator for SetIter<'a, T> {}

impl<'a, T> FusedIterator for SetIter<'a, T> {}

/// An owning in-order iterator over the values of an [`AvlSet`].
pub struct SetIntoIter<T>(IntoIter<T, ()>);

impl<T> Iterator for SetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> ExactSizeIterator for SetIntoIter<T> {}

impl<T> FusedIterator for SetIntoIter<T> {}

impl<T, C> IntoIterator for AvlSet<T, C> {
    type Item = T;
    type IntoIter = SetIntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        SetIntoIter(self.map.into_iter())
    }
}

impl<'a, T, C> IntoIterator for &'a AvlSet<T, C> {
    type Item = &'a T;
    type IntoIter = SetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
