use super::{Link, Node};
use compare::Compare;
use std::cmp::Ordering::Less;
use std::collections::HashSet;
use thiserror::Error;

/// A broken structural invariant found by
/// [`AvlMap::check`](super::AvlMap::check).
///
/// Depths count from zero at the root.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Violation {
    /// A node is reachable from itself.
    #[error("tree has a cycle")]
    Cycle,

    /// The map's length does not match the number of nodes in its tree.
    #[error("map records {recorded} entries but its tree has {counted}")]
    LenMismatch {
        /// The length the map reports.
        recorded: usize,
        /// The number of nodes reached before the walk stopped.
        counted: usize,
    },

    /// A key is not strictly between the keys of the ancestors that bound it.
    #[error("key at depth {depth} is out of order")]
    OutOfOrder {
        /// Depth of the misplaced node.
        depth: usize,
    },

    /// A node's cached height is stale.
    #[error("node at depth {depth} caches height {cached}, not {actual}")]
    BadHeight {
        /// Depth of the node.
        depth: usize,
        /// The height stored in the node.
        cached: i8,
        /// The height computed from its subtrees.
        actual: i8,
    },

    /// The heights of a node's subtrees differ by more than one.
    #[error("node at depth {depth} has balance factor {factor}")]
    Unbalanced {
        /// Depth of the node.
        depth: usize,
        /// Left subtree height minus right subtree height.
        factor: i8,
    },
}

pub(super) fn check_tree<K, V, C>(
    root: &Link<K, V>,
    len: usize,
    cmp: &C,
) -> Result<(), Violation>
where
    C: Compare<K>,
{
    // walk the tree first so that the recursive checks below terminate
    chk_acyclic(root, len)?;
    chk_node(root, cmp, None, None, 0)?;
    Ok(())
}

// Visits at most len + 1 nodes, failing on a revisit or on more nodes than the
// map claims to have.
fn chk_acyclic<K, V>(root: &Link<K, V>, len: usize) -> Result<(), Violation> {
    let mut seen: HashSet<*const Node<K, V>> = HashSet::new();
    let mut work: Vec<&Node<K, V>> = root.as_deref().into_iter().collect();

    while let Some(n) = work.pop() {
        if !seen.insert(n as *const _) {
            return Err(Violation::Cycle);
        }

        if seen.len() > len {
            return Err(Violation::LenMismatch {
                recorded: len,
                counted: seen.len(),
            });
        }

        work.extend(n.left.as_deref());
        work.extend(n.right.as_deref());
    }

    if seen.len() != len {
        return Err(Violation::LenMismatch {
            recorded: len,
            counted: seen.len(),
        });
    }

    Ok(())
}

// Checks order, cached heights and balance below link, where every key must
// lie strictly between lower and upper.  Returns the height of the subtree.
fn chk_node<'a, K, V, C>(
    link: &'a Link<K, V>,
    cmp: &C,
    lower: Option<&'a K>,
    upper: Option<&'a K>,
    depth: usize,
) -> Result<i8, Violation>
where
    C: Compare<K>,
{
    let Some(n) = link.as_deref() else {
        return Ok(0);
    };

    // is our node in order with our ancestors?
    let above_lower = lower.map_or(true, |lo| cmp.compare(lo, &n.key) == Less);
    let below_upper = upper.map_or(true, |hi| cmp.compare(&n.key, hi) == Less);
    if !(above_lower && below_upper) {
        return Err(Violation::OutOfOrder { depth });
    }

    let lf_ht = chk_node(&n.left, cmp, lower, Some(&n.key), depth + 1)?;
    let rt_ht = chk_node(&n.right, cmp, Some(&n.key), upper, depth + 1)?;

    let actual = lf_ht.max(rt_ht) + 1;
    if n.height != actual {
        return Err(Violation::BadHeight {
            depth,
            cached: n.height,
            actual,
        });
    }

    let factor = lf_ht - rt_ht;
    if !(-1..=1).contains(&factor) {
        return Err(Violation::Unbalanced { depth, factor });
    }

    Ok(actual)
}
