use super::{AvlMap, AvlSet, Node};
use compare::Compare;
use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{
    Serialize, SerializeMap, SerializeSeq, SerializeStruct, Serializer,
};
use std::fmt::Formatter;
use std::marker::PhantomData;

impl<K, V, C> Serialize for AvlMap<K, V, C>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct MapVisitor<K, V, C> {
    marker: PhantomData<fn() -> AvlMap<K, V, C>>,
}

impl<'de, K, V, C> Visitor<'de> for MapVisitor<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Compare<K> + Default,
{
    type Value = AvlMap<K, V, C>;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("avl_collections::AvlMap")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = AvlMap::default();
        while let Some((k, v)) = access.next_entry()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

impl<'de, K, V, C> Deserialize<'de> for AvlMap<K, V, C>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
    C: Compare<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor {
            marker: PhantomData,
        })
    }
}

impl<T: Serialize, C> Serialize for AvlSet<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for x in self {
            seq.serialize_element(x)?;
        }
        seq.end()
    }
}

struct SetVisitor<T, C> {
    marker: PhantomData<fn() -> AvlSet<T, C>>,
}

impl<'de, T, C> Visitor<'de> for SetVisitor<T, C>
where
    T: Deserialize<'de>,
    C: Compare<T> + Default,
{
    type Value = AvlSet<T, C>;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("avl_collections::AvlSet")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = AvlSet::default();
        while let Some(x) = access.next_element()? {
            set.insert(x);
        }
        Ok(set)
    }
}

impl<'de, T, C> Deserialize<'de> for AvlSet<T, C>
where
    T: Deserialize<'de>,
    C: Compare<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SetVisitor {
            marker: PhantomData,
        })
    }
}

/// A serializable view of the shape of an [`AvlMap`]'s tree.
///
/// An empty tree serializes as a unit/none value.  Every node serializes as a
/// struct with `key`, `value` and `height` fields and, when present, `left`
/// and `right` subtrees.
pub struct Shape<'a, K, V> {
    root: Option<&'a Node<K, V>>,
}

impl<K, V, C> AvlMap<K, V, C> {
    /// Returns a serializable view of the tree's structure, for debugging.
    ///
    /// # Examples
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let m = AvlMap::from([(1, "a"), (2, "b")]);
    /// let json = serde_json::to_string(&m.shape()).unwrap();
    /// let right = r#"{"key":2,"value":"b","height":1}"#;
    /// assert_eq!(
    ///     json,
    ///     format!(r#"{{"key":1,"value":"a","height":2,"right":{right}}}"#)
    /// );
    /// ```
    pub fn shape(&self) -> Shape<'_, K, V> {
        Shape {
            root: self.root.as_deref(),
        }
    }
}

impl<'a, K: Serialize, V: Serialize> Serialize for Shape<'a, K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.root {
            None => serializer.serialize_none(),
            Some(n) => NodeShape(n).serialize(serializer),
        }
    }
}

struct NodeShape<'a, K, V>(&'a Node<K, V>);

impl<'a, K: Serialize, V: Serialize> Serialize for NodeShape<'a, K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let n = self.0;
        let fields = 3 + n.left.is_some() as usize + n.right.is_some() as usize;
        let mut st = serializer.serialize_struct("Node", fields)?;
        st.serialize_field("key", &n.key)?;
        st.serialize_field("value", &n.val)?;
        st.serialize_field("height", &n.height)?;

        match n.left.as_deref() {
            Some(lf) => st.serialize_field("left", &NodeShape(lf))?,
            None => st.skip_field("left")?,
        }

        match n.right.as_deref() {
            Some(rt) => st.serialize_field("right", &NodeShape(rt))?,
            None => st.skip_field("right")?,
        }

        st.end()
    }
}
