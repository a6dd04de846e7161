use avl_collections::{seq, AvlMap, Compare};
use proptest::prelude::*;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[allow(dead_code)]
pub(super) type SmallIntPairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

// keys from a small domain so that updates and removals hit present keys
#[allow(dead_code)]
pub(super) fn tiny_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..64u16, 0u16..1024u16), 0..96)
}

#[allow(dead_code)]
pub(super) fn small_int_seq() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..1024u16, 0..512)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-zA-Z]{0,3}", 0u16..1024u16), 0..256)
}

/// A map operation, generated by proptest.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub(super) enum Op {
    Insert(u16, u16),
    Remove(u16),
    PopFirst,
    PopLast,
}

#[allow(dead_code)]
pub(super) fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => (0u16..64, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => (0u16..64).prop_map(Op::Remove),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
    ];
    prop::collection::vec(op, 0..256)
}

/// Copies the entries of a map, in key order.
#[allow(dead_code)]
pub(super) fn entries<K, V, C>(m: &AvlMap<K, V, C>) -> Vec<(K, V)>
where
    K: Clone,
    V: Clone,
    C: Compare<K>,
{
    m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Asserts that `after` holds the same entries as `before`, ignoring those
/// with the given key.
#[allow(dead_code)]
pub(super) fn assert_frame<K, V>(
    before: Vec<(K, V)>,
    after: Vec<(K, V)>,
    key: &K,
)
where
    K: PartialEq + std::fmt::Debug,
    V: PartialEq + std::fmt::Debug,
{
    let before = seq::without(before, |e| &e.0 == key);
    let after = seq::without(after, |e| &e.0 == key);
    assert!(
        seq::same_by(&before, &after, |x, y| x == y),
        "entries other than {:?} changed: {:?} vs {:?}",
        key,
        before,
        after
    );
}
