use super::{BucketMap, Key};

use serde::de::{Deserialize, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserializer;

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

/// Deserializes a map whose keys are `Option<K>`; `None` is the null key.
pub struct BucketMapVisitor<K, V, H> {
    #[allow(clippy::type_complexity)]
    marker: PhantomData<fn() -> BucketMap<K, V, H>>,
}

impl<K, V, H> BucketMapVisitor<K, V, H> {
    fn new() -> Self {
        BucketMapVisitor {
            marker: PhantomData,
        }
    }
}

impl<'de, K, V, H> Visitor<'de> for BucketMapVisitor<K, V, H>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    H: BuildHasher + Default,
{
    type Value = BucketMap<K, V, H>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a BucketMap")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = BucketMap::with_hasher(H::default());

        while let Some((key, value)) = access.next_entry::<Option<K>, V>()? {
            match key {
                Some(key) => map.insert(key, value),
                None => map.insert_null(value),
            };
        }

        Ok(map)
    }
}

impl<'de, K, V, H> Deserialize<'de> for BucketMap<K, V, H>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
    H: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(BucketMapVisitor::<K, V, H>::new())
    }
}

impl<K, V, H> Serialize for BucketMap<K, V, H>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(&Key::into_option(key), value)?;
        }
        map.end()
    }
}
