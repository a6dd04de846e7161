#![warn(missing_docs)]
use compare::{Compare, Natural};
use log::trace;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::replace;

mod avl_set;
mod check;
#[cfg(feature = "serde")]
mod serialize;

pub use avl_set::{AvlSet, SetIntoIter, SetIter};
pub use check::Violation;
#[cfg(feature = "serde")]
pub use serialize::Shape;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    val: V,
    height: i8,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, val: V) -> Box<Self> {
        Box::new(Node {
            key,
            val,
            height: 1,
            left: None,
            right: None,
        })
    }

    // Returns the "balance factor" of the node, left height minus right height
    fn bal(&self) -> i8 {
        height(&self.left) - height(&self.right)
    }

    fn set_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    fn into_entry(self) -> (K, V) {
        (self.key, self.val)
    }

    fn traverse<F: FnMut(&K, &V)>(&self, order: Traversal, f: &mut F) {
        if order == Traversal::PreOrder {
            f(&self.key, &self.val);
        }

        if let Some(lf) = self.left.as_deref() {
            lf.traverse(order, f);
        }

        if order == Traversal::InOrder {
            f(&self.key, &self.val);
        }

        if let Some(rt) = self.right.as_deref() {
            rt.traverse(order, f);
        }

        if order == Traversal::PostOrder {
            f(&self.key, &self.val);
        }
    }
}

impl<K: Debug, V: Debug> Debug for Node<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "(ht: {} {{{:?}: {:?}}} ",
            self.height, self.key, self.val
        ))?;

        match &self.left {
            None => f.write_str(".")?,
            Some(lf) => lf.fmt(f)?,
        }

        f.write_str(" ")?;

        match &self.right {
            None => f.write_str(".")?,
            Some(rt) => rt.fmt(f)?,
        }

        f.write_str(")")
    }
}

fn height<K, V>(link: &Link<K, V>) -> i8 {
    link.as_ref().map_or(0, |n| n.height)
}

fn rot_lf<K, V>(mut a: Box<Node<K, V>>) -> Box<Node<K, V>> {
    // We want the following transformation:
    //    a(x, b(y, z)))   =>   b(a(x, y), z)
    // x and z retain the same parents.
    let mut b = a.right.take().expect("left rotation needs a right child");

    // move y from b to a
    a.right = b.left.take();
    a.set_height();

    // make a be b's left child
    b.left = Some(a);
    b.set_height();

    trace!("single rotation left");
    b
}

fn rot_rt_lf<K, V>(mut a: Box<Node<K, V>>) -> Box<Node<K, V>> {
    // We want the following transformation:
    //    a(x, b(c(y, z), w))   =>   c(a(x, y), b(z, w))
    // x and w retain the same parents.
    let mut b = a.right.take().expect("double rotation needs a right child");
    let mut c = b.left.take().expect("double rotation needs an inner child");

    // move c's children to a and b
    a.right = c.left.take();
    b.left = c.right.take();
    a.set_height();
    b.set_height();

    // move a and b into c
    c.left = Some(a);
    c.right = Some(b);
    c.set_height();

    trace!("double rotation right-left");
    c
}

fn rot_rt<K, V>(mut a: Box<Node<K, V>>) -> Box<Node<K, V>> {
    // We want the following transformation:
    //    a(b(x, y), z)   =>   b(x, a(y, z))
    // x and z retain the same parents.
    let mut b = a.left.take().expect("right rotation needs a left child");

    // move y from b to a
    a.left = b.right.take();
    a.set_height();

    // move a into b
    b.right = Some(a);
    b.set_height();

    trace!("single rotation right");
    b
}

fn rot_lf_rt<K, V>(mut a: Box<Node<K, V>>) -> Box<Node<K, V>> {
    // We want the following transformation:
    //    a(b(x, c(y, z)), w)   =>   c(b(x, y), a(z, w))
    // x and w retain the same parents.
    let mut b = a.left.take().expect("double rotation needs a left child");
    let mut c = b.right.take().expect("double rotation needs an inner child");

    b.right = c.left.take(); // => b(x, y), c(None, z)
    a.left = c.right.take(); // => a(z, w), c(None, None)
    b.set_height();
    a.set_height();

    c.left = Some(b);
    c.right = Some(a); // => c(b(x, y), a(z, w))
    c.set_height();

    trace!("double rotation left-right");
    c
}

// Restores balance at n after one of its subtrees grew or shrank by a level.
// Both subtrees must already be AVL trees.
fn rebal<K, V>(mut n: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let diff = n.bal();
    require!((-2..=2).contains(&diff), "imbalance is at most one level");

    let n = if diff < -1 {
        // right-heavy; a taller inner (left) grandchild needs a double rotation
        let inner_taller = n
            .right
            .as_ref()
            .map_or(false, |v| height(&v.left) > height(&v.right));

        if inner_taller {
            rot_rt_lf(n)
        } else {
            rot_lf(n)
        }
    } else if diff > 1 {
        let inner_taller = n
            .left
            .as_ref()
            .map_or(false, |v| height(&v.right) > height(&v.left));

        if inner_taller {
            rot_lf_rt(n)
        } else {
            rot_rt(n)
        }
    } else {
        n.set_height();
        n
    };

    ensure!((-1..=1).contains(&n.bal()), "rebalanced root is balanced");
    n
}

// Inserts (k, v) into the tree at link and returns the new root of the tree
// along with the value that (k, v) replaced, if any.
fn ins<K, V, C>(
    link: Link<K, V>,
    k: K,
    v: V,
    cmp: &C,
) -> (Box<Node<K, V>>, Option<V>)
where
    C: Compare<K>,
{
    let Some(mut n) = link else {
        return (Node::leaf(k, v), None); // *** EARLY RETURN ***
    };

    match cmp.compare(&k, &n.key) {
        Equal => {
            let old_v = replace(&mut n.val, v);
            (n, Some(old_v))
        }

        Less => {
            let (lf, old_v) = ins(n.left.take(), k, v, cmp);
            n.left = Some(lf);
            (rebal(n), old_v)
        }

        Greater => {
            let (rt, old_v) = ins(n.right.take(), k, v, cmp);
            n.right = Some(rt);
            (rebal(n), old_v)
        }
    }
}

// Removes the greatest entry of the tree rooted at n.  Returns what is left of
// the tree and the removed entry.
fn rm_max<K, V>(mut n: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match n.right.take() {
        None => {
            let lf = n.left.take();
            (lf, n.into_entry())
        }

        Some(rt) => {
            let (rest, max) = rm_max(rt);
            n.right = rest;
            (Some(rebal(n)), max)
        }
    }
}

// Mirror image of rm_max.
fn rm_min<K, V>(mut n: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match n.left.take() {
        None => {
            let rt = n.right.take();
            (rt, n.into_entry())
        }

        Some(lf) => {
            let (rest, min) = rm_min(lf);
            n.left = rest;
            (Some(rebal(n)), min)
        }
    }
}

// Removes k from the tree at link.  Returns the new root of the tree and the
// removed entry.  An absent key leaves the tree's entries untouched.
fn rm<K, V, C>(link: Link<K, V>, k: &K, cmp: &C) -> (Link<K, V>, Option<(K, V)>)
where
    C: Compare<K>,
{
    let Some(mut n) = link else {
        return (None, None); // *** EARLY RETURN ***
    };

    match cmp.compare(k, &n.key) {
        Less => {
            let (lf, old) = rm(n.left.take(), k, cmp);
            n.left = lf;
            (Some(rebal(n)), old)
        }

        Greater => {
            let (rt, old) = rm(n.right.take(), k, cmp);
            n.right = rt;
            (Some(rebal(n)), old)
        }

        Equal => {
            if let Some(lf) = n.left.take() {
                // replace our entry with our in-order predecessor
                let (rest, (pred_key, pred_val)) = rm_max(lf);
                n.left = rest;
                let old_key = replace(&mut n.key, pred_key);
                let old_val = replace(&mut n.val, pred_val);
                (Some(rebal(n)), Some((old_key, old_val)))
            } else if let Some(rt) = n.right.take() {
                let (rest, (succ_key, succ_val)) = rm_min(rt);
                n.right = rest;
                let old_key = replace(&mut n.key, succ_key);
                let old_val = replace(&mut n.val, succ_val);
                (Some(rebal(n)), Some((old_key, old_val)))
            } else {
                (None, Some(n.into_entry()))
            }
        }
    }
}

/// The order in which [`AvlMap::traverse`] visits entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Each node before its subtrees.
    PreOrder,
    /// Each node between its left and right subtrees; this is key order.
    InOrder,
    /// Each node after its subtrees.
    PostOrder,
}

/// A map from keys to values sorted by a comparator.
///
/// We aim for the API to resemble that of [`std::collections::BTreeMap`],
/// except that keys are ordered by the map's [`Compare`] instance rather than
/// by `Ord`.  The default comparator, [`Natural`], uses `Ord`.
///
/// Internally, the map is an [AVL tree]: a binary search tree that rotates
/// nodes after every insertion and removal so that the heights of the two
/// subtrees of any node differ by at most one.  Lookups, insertions and
/// removals therefore take time logarithmic in the size of the map.  Every
/// node is uniquely owned by its parent.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
#[derive(Clone)]
pub struct AvlMap<K, V, C = Natural<K>> {
    len: usize,
    root: Link<K, V>,
    cmp: C,
}

impl<K: Debug, V: Debug, C> Debug for AvlMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            None => f.write_str("AvlMap(EMPTY)"),
            Some(n) => {
                // use Node's Debug formatter
                f.write_fmt(format_args!("AvlMap(#{}, {:?})", self.len, n))
            }
        }
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Creates a new, empty map ordered by `K`'s [`Ord`] implementation.
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    /// let m: AvlMap<usize, usize> = AvlMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_comparator(compare::natural())
    }
}

impl<K, V, C> AvlMap<K, V, C> {
    /// Creates a new, empty map whose keys are ordered by `cmp`.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut m = AvlMap::with_comparator(|a: &&str, b: &&str| {
    ///     a.to_lowercase().cmp(&b.to_lowercase())
    /// });
    /// m.insert("Apple", 1);
    /// m.insert("APPLE", 2);
    /// assert_eq!(m.len(), 1);
    /// assert_eq!(m.get(&"apple"), Some(&2));
    /// ```
    pub fn with_comparator(cmp: C) -> Self {
        AvlMap {
            len: 0,
            root: None,
            cmp,
        }
    }

    /// Returns the comparator that orders the map's keys.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Drops all elements from the map.
    pub fn clear(&mut self) {
        self.len = 0;
        self.root = None;
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the underlying tree: zero for an empty map, one
    /// for a map with a single entry.
    ///
    /// The height never exceeds `1.44 * log2(len + 2)`.
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m = AvlMap::from([(0,1), (1,2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i+1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            work: Vec::new(),
            len: self.len,
        };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// Returns an iterator of the map's entries, sorted by key, with a mutable
    /// reference to each value (and an immutable reference to each key).
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut m = AvlMap::from([(0,0), (1,1), (2,2)]);
    /// for (k, v) in m.iter_mut() {
    ///     *v += k;
    /// }
    /// assert_eq!(m.get(&0), Some(&0));
    /// assert_eq!(m.get(&1), Some(&2));
    /// assert_eq!(m.get(&2), Some(&4));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let work = match self.root.as_deref_mut() {
            Some(n) => vec![IterMutAction::Descend(n)],
            None => Vec::new(),
        };

        IterMut {
            work,
            len: self.len,
        }
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m = AvlMap::from([(0,0), (1,1), (2,2)]);
    /// let sum_values: u32 = m.values().sum();
    /// assert_eq!(sum_values, 3);
    /// ```
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Returns an iterator of mutable references to the map's values, ordered
    /// by their associated keys.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|p| p.1)
    }

    /// Applies f to each entry of the map in the given order.
    ///
    /// [`Traversal::InOrder`] visits the entries in key order, like
    /// [`iter`](#method.iter).  The other orders expose the shape of the tree.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::{AvlMap, Traversal};
    ///
    /// let m = AvlMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let mut keys = Vec::new();
    /// m.traverse(Traversal::PreOrder, |k, _| keys.push(*k));
    /// assert_eq!(keys, vec![2, 1, 3]);
    /// ```
    pub fn traverse<F: FnMut(&K, &V)>(&self, order: Traversal, mut f: F) {
        if let Some(n) = self.root.as_deref() {
            n.traverse(order, &mut f);
        }
    }

    /// Returns the key-value pair for the least key in the map
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let fmap = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(fmap.first_key_value(), Some((&1, &0)));
    /// ```
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(lf) = curr.left.as_deref() {
            curr = lf;
        }
        Some((&curr.key, &curr.val))
    }

    /// Returns the key-value pair for the greatest key in the map
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let fmap = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(fmap.last_key_value(), Some((&2, &0)));
    /// ```
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(rt) = curr.right.as_deref() {
            curr = rt;
        }
        Some((&curr.key, &curr.val))
    }
}

impl<K, V, C: Compare<K>> AvlMap<K, V, C> {
    fn find(&self, k: &K) -> Option<&Node<K, V>> {
        let mut curr = self.root.as_deref();
        while let Some(n) = curr {
            match self.cmp.compare(k, &n.key) {
                Less => curr = n.left.as_deref(),
                Equal => return Some(n),
                Greater => curr = n.right.as_deref(),
            }
        }

        None
    }

    /// Returns a reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// fmap.insert(0, 100);
    ///
    /// assert_eq!(fmap.get(&0), Some(&100));
    /// assert_eq!(fmap.get(&1), None);
    /// ```
    pub fn get(&self, k: &K) -> Option<&V> {
        self.find(k).map(|n| &n.val)
    }

    /// Returns the stored key and its value for a key that compares equal to
    /// k.
    pub fn get_key_value(&self, k: &K) -> Option<(&K, &V)> {
        self.find(k).map(|n| (&n.key, &n.val))
    }

    /// Returns a mutable reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// fmap.insert(1, 7);
    ///
    /// *fmap.get_mut(&1).unwrap() = 2;
    /// assert_eq!(fmap.get(&1), Some(&2));
    /// ```
    pub fn get_mut(&mut self, k: &K) -> Option<&mut V> {
        let mut curr = self.root.as_deref_mut();
        while let Some(n) = curr {
            match self.cmp.compare(k, &n.key) {
                Less => curr = n.left.as_deref_mut(),
                Equal => return Some(&mut n.val),
                Greater => curr = n.right.as_deref_mut(),
            }
        }

        None
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains_key(&self, k: &K) -> bool {
        self.find(k).is_some()
    }

    /// Inserts a key-value pair in the map and returns the value it replaced.
    ///
    /// When the map already holds an equal key, only the value is replaced;
    /// the stored key and the shape of the tree are unchanged.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// assert_eq!(fmap.insert(0, "a"), None);
    /// assert_eq!(fmap.insert(0, "b"), Some("a"));
    /// assert_eq!(fmap.get(&0), Some(&"b"));
    /// assert_eq!(fmap.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let (root, old_v) = ins(self.root.take(), key, val, &self.cmp);
        self.root = Some(root);
        self.len += old_v.is_none() as usize;
        ensure!(self.check().is_ok(), "AVL invariant holds after insert");
        old_v
    }

    /// Removes a key from a map and returns the unmapped value.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut fmap = AvlMap::new();
    /// fmap.insert(1, 2);
    /// fmap.insert(2, 3);
    /// assert_eq!(fmap.remove(&2), Some(3));
    /// assert_eq!(fmap.remove(&2), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|e| e.1)
    }

    /// Removes a key from a map and returns the stored key and its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let (root, old) = rm(self.root.take(), key, &self.cmp);
        self.root = root;
        self.len -= old.is_some() as usize;
        ensure!(self.check().is_ok(), "AVL invariant holds after remove");
        ensure!(!self.contains_key(key), "removed key is absent");
        old
    }

    /// Removes and returns the entry with the least key.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut m = AvlMap::from([(3, 'c'), (1, 'a'), (2, 'b')]);
    /// assert_eq!(m.pop_first(), Some((1, 'a')));
    /// assert_eq!(m.pop_first(), Some((2, 'b')));
    /// assert_eq!(m.len(), 1);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let (root, min) = rm_min(self.root.take()?);
        self.root = root;
        self.len -= 1;
        ensure!(self.check().is_ok(), "AVL invariant holds after pop_first");
        Some(min)
    }

    /// Removes and returns the entry with the greatest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let (root, max) = rm_max(self.root.take()?);
        self.root = root;
        self.len -= 1;
        ensure!(self.check().is_ok(), "AVL invariant holds after pop_last");
        Some(max)
    }

    /// Verifies the structure of the tree: it is acyclic, its keys are
    /// ordered by the comparator, every cached height is correct, every node
    /// is balanced, and the recorded length matches the number of nodes.
    ///
    /// A map built through this API always passes; the check exists to
    /// validate the implementation.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m: AvlMap<_, _> = (0..100).map(|i| (i, i)).collect();
    /// assert_eq!(m.check(), Ok(()));
    /// ```
    pub fn check(&self) -> Result<(), Violation> {
        check::check_tree(&self.root, self.len, &self.cmp)
    }
}

impl<K, V, C: Default> Default for AvlMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlMap<K, V, C> {}

impl<K, V, C: Compare<K>> std::ops::Index<&K> for AvlMap<K, V, C> {
    type Output = V;

    fn index(&self, index: &K) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in AvlMap"),
        }
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for AvlMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C> FromIterator<(K, V)> for AvlMap<K, V, C>
where
    C: Compare<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fmap = AvlMap::default();
        fmap.extend(iter);
        fmap
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        let mut fmap = AvlMap::new();
        fmap.extend(vs);
        fmap
    }
}

impl<K, V, C> From<AvlMap<K, V, C>> for Vec<(K, V)> {
    fn from(value: AvlMap<K, V, C>) -> Self {
        value.into_iter().collect()
    }
}

/// An in-order iterator over the entries of an [`AvlMap`].
pub struct Iter<'a, K, V> {
    // the nodes whose entries and right subtrees are still to be visited
    work: Vec<&'a Node<K, V>>,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut curr: Option<&'a Node<K, V>>) {
        while let Some(n) = curr {
            self.work.push(n);
            curr = n.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let Some(n) = self.work.pop() else {
            invariant!(self.len == 0, "exhausted iterator is empty");
            return None;
        };

        self.len -= 1;
        self.push_left(n.right.as_deref());
        Some((&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            work: self.work.clone(),
            len: self.len,
        }
    }
}

enum IterMutAction<'a, K, V> {
    Descend(&'a mut Node<K, V>),
    Return((&'a K, &'a mut V)),
}

/// An in-order iterator over the entries of an [`AvlMap`] that allows values
/// to be modified.
pub struct IterMut<'a, K, V> {
    work: Vec<IterMutAction<'a, K, V>>,
    len: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        use IterMutAction::*;

        match self.work.pop() {
            Some(Descend(mut n)) => loop {
                let Node {
                    key,
                    val,
                    left,
                    right,
                    ..
                } = n;
                let key: &'a K = key;

                if let Some(rt) = right.as_deref_mut() {
                    self.work.push(Descend(rt));
                }

                match left.as_deref_mut() {
                    Some(lf) => {
                        self.work.push(Return((key, val)));
                        n = lf;
                    }

                    None => {
                        self.len -= 1;
                        return Some((key, val));
                    }
                }
            },

            Some(Return(ret)) => {
                self.len -= 1;
                Some(ret)
            }

            None => {
                invariant!(self.len == 0, "exhausted iterator is empty");
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for IterMut<'a, K, V> {}

/// An owning in-order iterator over the entries of an [`AvlMap`].
pub struct IntoIter<K, V> {
    work: Vec<Box<Node<K, V>>>,
    len: usize,
}

impl<K, V> IntoIter<K, V> {
    fn push_left(&mut self, mut link: Link<K, V>) {
        while let Some(mut n) = link {
            link = n.left.take();
            self.work.push(n);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut n = self.work.pop()?;
        self.len -= 1;
        self.push_left(n.right.take());
        Some(n.into_entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V, C> IntoIterator for AvlMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let mut iter = IntoIter {
            work: Vec::new(),
            len: self.len,
        };
        iter.push_left(self.root.take());
        iter
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut AvlMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod test {
    extern crate quickcheck;
    use super::*;
    use quickcheck::quickcheck;

    fn bal_test(vs: Vec<(u8, u32)>) {
        let mut fmap = AvlMap::new();
        for &(k, v) in vs.iter() {
            fmap.insert(k, v);
            fmap.check().unwrap();
        }
    }

    fn rm_test(vs: Vec<(i8, u32)>) {
        let mut fmap = AvlMap::new();
        let mut btree = std::collections::BTreeMap::new();

        for &(k, v) in vs.iter() {
            match k {
                1..=i8::MAX => {
                    let k = k % 32;
                    assert_eq!(fmap.insert(k, v), btree.insert(k, v));
                }

                0 | i8::MIN => (),

                _ => {
                    let k = -k % 32;
                    assert_eq!(fmap.remove(&k), btree.remove(&k));
                }
            }

            assert!(fmap.iter().cmp(btree.iter()).is_eq());
            fmap.check().unwrap();
        }
    }

    // systematically try deleting each element of fmap
    fn chk_all_removes(fmap: AvlMap<u8, u8>) {
        for (k, v) in fmap.clone().iter() {
            let mut fmap2 = fmap.clone();
            assert_eq!(fmap2.remove(k), Some(*v));
            assert!(!fmap2.contains_key(k));
            assert_eq!(fmap2.len(), fmap.len() - 1);
            fmap2.check().unwrap();
        }
    }

    // hand-built trees for exercising rebal directly; heights are computed
    // but balance is not enforced
    fn node(k: u8, left: Link<u8, ()>, right: Link<u8, ()>) -> Link<u8, ()> {
        let mut n = Node::leaf(k, ());
        n.left = left;
        n.right = right;
        n.set_height();
        Some(n)
    }

    fn leaf(k: u8) -> Link<u8, ()> {
        node(k, None, None)
    }

    fn pre_order(link: &Link<u8, ()>) -> Vec<u8> {
        let mut keys = Vec::new();
        if let Some(n) = link.as_deref() {
            n.traverse(Traversal::PreOrder, &mut |k, _| keys.push(*k));
        }
        keys
    }

    #[test]
    fn rebal_single_left() {
        // 1(., 2(., 3)) => 2(1, 3)
        let n = node(1, None, node(2, None, leaf(3))).unwrap();
        let n = rebal(n);
        assert_eq!(pre_order(&Some(n)), vec![2, 1, 3]);
    }

    #[test]
    fn rebal_double_right_left() {
        // 1(., 3(2, .)) => 2(1, 3)
        let n = node(1, None, node(3, leaf(2), None)).unwrap();
        let n = rebal(n);
        assert_eq!(n.height, 2);
        assert_eq!(pre_order(&Some(n)), vec![2, 1, 3]);
    }

    #[test]
    fn rebal_double_left_right() {
        // 3(1(., 2), .) => 2(1, 3)
        let n = node(3, node(1, None, leaf(2)), None).unwrap();
        assert_eq!(pre_order(&Some(rebal(n))), vec![2, 1, 3]);
    }

    #[test]
    fn rebal_tie_uses_single_rotation() {
        // After a deletion on the left, the right child can have subtrees of
        // equal height.  A single rotation handles it:
        //   2(1, 4(3, 5)) minus 1 => 4(2(., 3), 5)
        let n = node(2, None, node(4, leaf(3), leaf(5))).unwrap();
        let n = rebal(n);
        assert_eq!(n.height, 3);
        assert_eq!(pre_order(&Some(n)), vec![4, 2, 3, 5]);
    }

    #[test]
    fn rebal_balanced_only_fixes_height() {
        let mut n = node(2, leaf(1), leaf(3)).unwrap();
        n.height = 7;
        let n = rebal(n);
        assert_eq!(n.height, 2);
        assert_eq!(pre_order(&Some(n)), vec![2, 1, 3]);
    }

    #[test]
    fn rm_max_and_rm_min() {
        let root = node(4, node(2, leaf(1), leaf(3)), node(6, leaf(5), None));
        let (rest, (k, _)) = rm_max(root.unwrap());
        assert_eq!(k, 6);
        assert_eq!(pre_order(&rest), vec![4, 2, 1, 3, 5]);

        let (rest, (k, _)) = rm_min(rest.unwrap());
        assert_eq!(k, 1);
        assert_eq!(pre_order(&rest), vec![4, 2, 3, 5]);
    }

    #[test]
    fn remove_uses_predecessor_when_left_child_exists() {
        let mut m = AvlMap::from([(2, 'b'), (1, 'a'), (3, 'c')]);
        assert_eq!(m.remove(&2), Some('b'));
        let mut keys = Vec::new();
        m.traverse(Traversal::PreOrder, |k, _| keys.push(*k));
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn remove_uses_successor_when_only_right_child() {
        let mut m = AvlMap::from([(1, 'a'), (2, 'b')]);
        assert_eq!(m.remove(&1), Some('a'));
        assert_eq!(m.get(&2), Some(&'b'));
        assert_eq!(m.height(), 1);
    }

    #[test]
    fn rm_each_test() {
        // build map in order to encourage skewing
        let fmap: AvlMap<_, _> = (0..32).map(|x| (x, x + 100)).collect();
        chk_all_removes(fmap);

        // build map in reverse order to encourage opposite skewing
        let fmap: AvlMap<_, _> = (0..32).rev().map(|x| (x, x + 100)).collect();
        chk_all_removes(fmap);
    }

    #[test]
    fn iter_mut_test() {
        let mut m: AvlMap<_, _> = (0..8).map(|x| (x, 0)).collect();

        for (i, (k, v)) in m.iter_mut().enumerate() {
            assert_eq!(i, *k);
            assert_eq!(0, *v);
            *v = 1;
        }

        m.check().unwrap();

        for (i, (k, v)) in m.iter().enumerate() {
            assert_eq!(i, *k);
            assert_eq!(1, *v);
        }
    }

    #[test]
    fn iter_len_test() {
        let fmap: AvlMap<_, _> = (0..10).map(|i| (i, ())).collect();

        let mut iter = fmap.iter();
        let mut cnt = 10;
        while iter.next().is_some() {
            assert_eq!(iter.len(), cnt - 1);
            cnt -= 1;
        }
    }

    #[test]
    fn into_iter_test() {
        let fmap: AvlMap<_, _> = (0..10).rev().map(|i| (i, i * 2)).collect();
        let v: Vec<(i32, i32)> = fmap.into();
        assert_eq!(v, (0..10).map(|i| (i, i * 2)).collect::<Vec<_>>());
    }

    #[test]
    fn traversal_orders() {
        let m: AvlMap<_, _> = (1..=7).map(|i| (i, ())).collect();
        let collect = |order| {
            let mut keys = Vec::new();
            m.traverse(order, |k, _| keys.push(*k));
            keys
        };

        assert_eq!(collect(Traversal::PreOrder), vec![4, 2, 1, 3, 6, 5, 7]);
        assert_eq!(collect(Traversal::InOrder), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(collect(Traversal::PostOrder), vec![1, 3, 2, 5, 7, 6, 4]);
    }

    #[test]
    fn debug_shows_shape() {
        let m = AvlMap::from([(1, 'a'), (2, 'b')]);
        assert_eq!(
            format!("{:?}", m),
            "AvlMap(#2, (ht: 2 {1: 'a'} . (ht: 1 {2: 'b'} . .)))"
        );
        let empty: AvlMap<u8, u8> = AvlMap::new();
        assert_eq!(format!("{:?}", empty), "AvlMap(EMPTY)");
    }

    #[test]
    fn pop_first_and_last() {
        let mut m: AvlMap<_, _> = (0..20).map(|i| (i, -i)).collect();
        assert_eq!(m.pop_first(), Some((0, 0)));
        assert_eq!(m.pop_last(), Some((19, -19)));
        assert_eq!(m.len(), 18);
        m.check().unwrap();

        let mut empty: AvlMap<u8, u8> = AvlMap::new();
        assert_eq!(empty.pop_first(), None);
        assert_eq!(empty.pop_last(), None);
    }

    #[test]
    #[should_panic(expected = "Key not found")]
    fn index_missing_key() {
        let m = AvlMap::from([(1, 2)]);
        let _ = m[&3];
    }

    #[test]
    fn bal_test_regr1() {
        bal_test(vec![(4, 0), (0, 0), (5, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn bal_test_regr2() {
        bal_test(vec![(3, 0), (0, 0), (1, 0), (2, 0), (4, 0)]);
    }

    #[test]
    fn rm_test_regr1() {
        rm_test(vec![(101, 0), (100, 0), (1, 0), (-100, 0)]);
    }

    #[test]
    fn rm_test_regr2() {
        rm_test(vec![
            (31, 0),
            (14, 0),
            (1, 0),
            (15, 0),
            (32, 0),
            (16, 0),
            (17, 0),
            (-14, 0),
            (-31, 0),
        ]);
    }

    quickcheck! {
        fn qc_bal_test(vs: Vec<(u8, u32)>) -> () {
            bal_test(vs);
        }

        fn qc_rm_test(vs: Vec<(i8, u32)>) -> () {
            rm_test(vs);
        }

        fn qc_rm_test2(vs: Vec<(u8, u8)>) -> () {
            let fmap = vs.into_iter().collect();
            chk_all_removes(fmap);
        }

        fn qc_height_bound(vs: Vec<u16>) -> () {
            let fmap: AvlMap<_, _> = vs.into_iter().map(|k| (k, ())).collect();
            let n = (fmap.len() + 2) as f64;
            let bound = (1.44 * n.log2()).ceil() as usize;
            assert!(fmap.height() <= bound);
        }
    }
}
