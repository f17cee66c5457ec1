//! [`BucketMap`] is a fixed-capacity hash map with separate chaining.

use super::chain::{self, Chain, Node};
use super::{Equivalent, Error, Key};
use log::{debug, warn};
use std::collections::hash_map::RandomState;
use std::fmt::{self, Debug, Display};
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FusedIterator;
use std::mem::replace;
use std::ops::Index;
use std::slice;

/// The number of buckets of a [`BucketMap`] created without an explicit capacity.
pub const DEFAULT_CAPACITY: usize = 16;

/// The smallest accepted number of buckets: the null slot plus one bucket for ordinary keys.
pub const MIN_CAPACITY: usize = 2;

/// Index of the bucket reserved for [`Key::Null`].
const NULL_BUCKET: usize = 0;

/// Fixed-capacity hash map with separate chaining.
///
/// [`BucketMap`] owns an array of buckets that never grows or shrinks. Every bucket owns a
/// singly-linked chain of entries whose keys hash to the bucket; colliding entries are appended to
/// the tail of the chain. Lookups degrade linearly with the chain length, since the bucket array
/// is never resized.
///
/// ## Bucket layout
///
/// * Bucket `0` is reserved for the null key, [`Key::Null`].
/// * An ordinary key is placed in bucket `1 + hash % (capacity - 1)`.
///
/// ## Ordering
///
/// [`BucketMap::keys`], [`BucketMap::values`], [`BucketMap::iter`] and the [`Display`]
/// representation visit buckets in ascending index order, and entries within a bucket in
/// insertion order.
pub struct BucketMap<K, V, H = RandomState> {
    buckets: Box<[Chain<K, V>]>,
    len: usize,
    build_hasher: H,
}

/// An iterator over the entries of a [`BucketMap`].
pub struct Iter<'m, K, V> {
    buckets: slice::Iter<'m, Chain<K, V>>,
    chain: Option<chain::Iter<'m, K, V>>,
    remaining: usize,
}

/// A mutable iterator over the entries of a [`BucketMap`].
pub struct IterMut<'m, K, V> {
    buckets: slice::IterMut<'m, Chain<K, V>>,
    chain: Option<chain::IterMut<'m, K, V>>,
    remaining: usize,
}

impl<K, V> BucketMap<K, V, RandomState> {
    /// Creates an empty [`BucketMap`] with [`DEFAULT_CAPACITY`] buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let map: BucketMap<u64, u32> = BucketMap::new();
    /// assert_eq!(map.capacity(), 16);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Creates an empty [`BucketMap`] with the specified number of buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is less than [`MIN_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::{BucketMap, Error};
    ///
    /// let map: BucketMap<u64, u32> = BucketMap::with_capacity(64).unwrap();
    /// assert_eq!(map.capacity(), 64);
    ///
    /// assert_eq!(
    ///     BucketMap::<u64, u32>::with_capacity(1).err(),
    ///     Some(Error::InvalidCapacity(1))
    /// );
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl<K, V, H> BucketMap<K, V, H> {
    /// Creates an empty [`BucketMap`] with [`DEFAULT_CAPACITY`] buckets and the given
    /// [`BuildHasher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let map: BucketMap<u64, u32, RandomState> = BucketMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub fn with_hasher(build_hasher: H) -> Self {
        debug!("creating a bucket map with {DEFAULT_CAPACITY} buckets");
        Self::allocate(DEFAULT_CAPACITY, build_hasher)
    }

    /// Creates an empty [`BucketMap`] with the specified number of buckets and the given
    /// [`BuildHasher`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is less than [`MIN_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let map: BucketMap<u64, u32, RandomState> =
    ///     BucketMap::with_capacity_and_hasher(2, RandomState::new()).unwrap();
    /// assert_eq!(map.capacity(), 2);
    /// ```
    #[inline]
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: H) -> Result<Self, Error> {
        if capacity < MIN_CAPACITY {
            warn!("rejecting bucket map capacity {capacity}");
            return Err(Error::InvalidCapacity(capacity));
        }
        debug!("creating a bucket map with {capacity} buckets");
        Ok(Self::allocate(capacity, build_hasher))
    }

    /// Returns the number of entries in the [`BucketMap`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(1, 0);
    /// map.insert_null(0);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the [`BucketMap`] is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets, including the null slot.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the ratio of entries to buckets.
    ///
    /// The bucket array never grows, so the load factor is unbounded.
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Returns a reference to its [`BuildHasher`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    /// use std::collections::hash_map::RandomState;
    /// use std::hash::{BuildHasher, Hash, Hasher};
    ///
    /// let map: BucketMap<u64, u32> = BucketMap::new();
    /// let hasher: &RandomState = map.hasher();
    ///
    /// let mut first = hasher.build_hasher();
    /// let mut second = map.hasher().build_hasher();
    /// 1_u64.hash(&mut first);
    /// 1_u64.hash(&mut second);
    /// assert_eq!(first.finish(), second.finish());
    /// ```
    #[inline]
    pub fn hasher(&self) -> &H {
        &self.build_hasher
    }

    /// Returns the value stored under the null key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    /// assert!(map.get_null().is_none());
    ///
    /// map.insert_null(5);
    /// assert_eq!(map.get_null(), Some(&5));
    /// ```
    #[inline]
    pub fn get_null(&self) -> Option<&V> {
        self.buckets[NULL_BUCKET]
            .find(|node| node.key.is_null())
            .map(|node| &node.value)
    }

    /// Returns a mutable reference to the value stored under the null key.
    #[inline]
    pub fn get_null_mut(&mut self) -> Option<&mut V> {
        self.buckets[NULL_BUCKET]
            .find_mut(|node| node.key.is_null())
            .map(|node| &mut node.value)
    }

    /// Inserts a value under the null key.
    ///
    /// Returns the previous value if the null key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// assert_eq!(map.insert_null(5), None);
    /// assert_eq!(map.insert_null(6), Some(5));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[inline]
    pub fn insert_null(&mut self, value: V) -> Option<V> {
        if let Some(node) = self.buckets[NULL_BUCKET].find_mut(|node| node.key.is_null()) {
            return Some(replace(&mut node.value, value));
        }
        self.buckets[NULL_BUCKET].push_back(Node::new(0, Key::Null, value));
        self.len += 1;
        None
    }

    /// Removes the null key and returns its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert_null(5);
    /// assert_eq!(map.remove_null(), Some(5));
    /// assert_eq!(map.remove_null(), None);
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub fn remove_null(&mut self) -> Option<V> {
        let node = self.buckets[NULL_BUCKET].remove(|node| node.key.is_null())?;
        self.len -= 1;
        Some(node.value)
    }

    /// Returns `true` if the null key is present.
    #[inline]
    pub fn contains_null_key(&self) -> bool {
        !self.buckets[NULL_BUCKET].is_empty()
    }

    /// Returns `true` if any entry holds a value equal to `value`.
    ///
    /// Every chain is scanned, the null slot included.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(1, 10);
    /// map.insert_null(7);
    /// assert!(map.contains_value(&10));
    /// assert!(map.contains_value(&7));
    /// assert!(!map.contains_value(&8));
    /// ```
    #[inline]
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.buckets
            .iter()
            .any(|chain| chain.find(|node| node.value == *value).is_some())
    }

    /// Returns all the keys, bucket by bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::{BucketMap, Key};
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(4, 0);
    /// map.insert_null(1);
    /// assert_eq!(map.keys(), vec![Key::Null, Key::Real(&4)]);
    /// ```
    #[inline]
    pub fn keys(&self) -> Vec<Key<&K>> {
        let mut keys = Vec::with_capacity(self.len);
        keys.extend(self.iter().map(|(k, _)| k));
        keys
    }

    /// Returns all the values, bucket by bucket.
    #[inline]
    pub fn values(&self) -> Vec<&V> {
        let mut values = Vec::with_capacity(self.len);
        values.extend(self.iter().map(|(_, v)| v));
        values
    }

    /// Returns an iterator over the entries, bucket by bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::{BucketMap, Key};
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(1, 2);
    /// assert_eq!(map.iter().next(), Some((Key::Real(&1), &2)));
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            remaining: self.len,
        }
    }

    /// Returns an iterator over the entries that allows modifying values.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(1, 2);
    /// map.iter_mut().for_each(|(_, v)| *v += 1);
    /// assert_eq!(map.get(&1), Some(&3));
    /// ```
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            remaining: self.len,
            buckets: self.buckets.iter_mut(),
            chain: None,
        }
    }

    /// Removes every entry; the number of buckets stays the same.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(1, 0);
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing {} entries", self.len);
        self.buckets.iter_mut().for_each(Chain::clear);
        self.len = 0;
    }

    /// Allocates `capacity` empty chains.
    fn allocate(capacity: usize, build_hasher: H) -> Self {
        debug_assert!(capacity >= MIN_CAPACITY);
        let buckets = (0..capacity).map(|_| Chain::new()).collect();
        Self {
            buckets,
            len: 0,
            build_hasher,
        }
    }
}

impl<K, V, H> BucketMap<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<String, u32> = BucketMap::new();
    ///
    /// assert!(map.get("a").is_none());
    /// map.insert("a".to_string(), 1);
    /// assert_eq!(map.get("a"), Some(&1));
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let (index, hash) = self.locate(key);
        self.buckets[index]
            .find(|node| Self::matches(node, hash, key))
            .map(|node| &node.value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// map.insert(1, 1);
    /// if let Some(v) = map.get_mut(&1) {
    ///     *v = 2;
    /// }
    /// assert_eq!(map.get(&1), Some(&2));
    /// ```
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let (index, hash) = self.locate(key);
        self.buckets[index]
            .find_mut(|node| Self::matches(node, hash, key))
            .map(|node| &mut node.value)
    }

    /// Inserts a key-value pair into the [`BucketMap`].
    ///
    /// If the key exists, the value is replaced in place and the old value is returned; otherwise
    /// the new entry is appended to the tail of its chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<&str, u32> = BucketMap::new();
    ///
    /// assert_eq!(map.insert("a", 1), None);
    /// assert_eq!(map.insert("b", 2), None);
    /// assert_eq!(map.insert("a", 3), Some(1));
    /// assert_eq!(map.get("a"), Some(&3));
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (index, hash) = self.locate(&key);
        let chain = &mut self.buckets[index];
        if let Some(node) = chain.find_mut(|node| Self::matches(node, hash, &key)) {
            return Some(replace(&mut node.value, value));
        }
        chain.push_back(Node::new(hash, Key::Real(key), value));
        self.len += 1;
        None
    }

    /// Removes a key from the [`BucketMap`] and returns its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    ///
    /// assert_eq!(map.remove(&1), None);
    /// map.insert(1, 0);
    /// assert_eq!(map.remove(&1), Some(0));
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let (index, hash) = self.locate(key);
        let node = self.buckets[index].remove(|node| Self::matches(node, hash, key))?;
        self.len -= 1;
        Some(node.value)
    }

    /// Returns `true` if the [`BucketMap`] contains the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, Option<u32>> = BucketMap::new();
    ///
    /// map.insert(1, None);
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        let (index, hash) = self.locate(key);
        self.buckets[index]
            .find(|node| Self::matches(node, hash, key))
            .is_some()
    }

    /// Returns the index of the bucket that holds or would hold the key.
    #[cfg(test)]
    pub(crate) fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        Q: Equivalent<K> + Hash + ?Sized,
    {
        self.locate(key).0
    }

    /// Returns the number of entries in the bucket at `index`.
    #[cfg(test)]
    pub(crate) fn chain_len(&self, index: usize) -> usize {
        self.buckets[index].iter().count()
    }

    /// Hashes the key and maps the hash onto the ordinary buckets `[1, capacity - 1]`.
    #[inline]
    fn locate<Q>(&self, key: &Q) -> (usize, u64)
    where
        Q: Hash + ?Sized,
    {
        let mut h = self.build_hasher.build_hasher();
        key.hash(&mut h);
        let hash = h.finish();

        // `u64 % n` is never negative, so the index cannot fall into the null slot.
        let ordinary = (self.buckets.len() - 1) as u64;
        let index = 1 + usize::try_from(hash % ordinary).unwrap_or_default();
        debug_assert!(index > NULL_BUCKET && index < self.buckets.len());
        (index, hash)
    }

    #[inline]
    fn matches<Q>(node: &Node<K, V>, hash: u64, key: &Q) -> bool
    where
        Q: Equivalent<K> + ?Sized,
    {
        node.hash == hash && matches!(&node.key, Key::Real(k) if key.equivalent(k))
    }
}

impl<K, V, H> Clone for BucketMap<K, V, H>
where
    K: Clone,
    V: Clone,
    H: Clone,
{
    #[inline]
    fn clone(&self) -> Self {
        let mut buckets: Box<[Chain<K, V>]> =
            (0..self.buckets.len()).map(|_| Chain::new()).collect();
        for (source, target) in self.buckets.iter().zip(buckets.iter_mut()) {
            for node in source.iter() {
                target.push_back(Node::new(node.hash, node.key.clone(), node.value.clone()));
            }
        }
        Self {
            buckets,
            len: self.len,
            build_hasher: self.build_hasher.clone(),
        }
    }
}

impl<K, V, H> Debug for BucketMap<K, V, H>
where
    K: Debug,
    V: Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H> Default for BucketMap<K, V, H>
where
    H: Default,
{
    /// Creates an empty [`BucketMap`] with [`DEFAULT_CAPACITY`] buckets.
    #[inline]
    fn default() -> Self {
        Self::with_hasher(H::default())
    }
}

impl<K, V, H> Display for BucketMap<K, V, H>
where
    K: Display,
    V: Display,
{
    /// Renders every entry as `{ key=K;value=V }`, bucket by bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use bucket_map::BucketMap;
    ///
    /// let mut map: BucketMap<u64, u32> = BucketMap::new();
    /// assert_eq!(map.to_string(), "[ ]");
    ///
    /// map.insert_null(5);
    /// assert_eq!(map.to_string(), "[ { key=null;value=5 } ]");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;
        for (key, value) in self {
            write!(f, "{{ key={key};value={value} }} ")?;
        }
        f.write_str("]")
    }
}

impl<K, V, H> Eq for BucketMap<K, V, H>
where
    K: Eq + Hash,
    V: Eq,
    H: BuildHasher,
{
}

impl<K, V, H> Extend<(K, V)> for BucketMap<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    #[inline]
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for BucketMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    #[inline]
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, Q, V, H> Index<&Q> for BucketMap<K, V, H>
where
    K: Eq + Hash,
    Q: Equivalent<K> + Hash + ?Sized,
    H: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present.
    #[inline]
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in BucketMap")
    }
}

impl<'m, K, V, H> IntoIterator for &'m BucketMap<K, V, H> {
    type Item = (Key<&'m K>, &'m V);
    type IntoIter = Iter<'m, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'m, K, V, H> IntoIterator for &'m mut BucketMap<K, V, H> {
    type Item = (Key<&'m K>, &'m mut V);
    type IntoIter = IterMut<'m, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, H> PartialEq for BucketMap<K, V, H>
where
    K: Eq + Hash,
    V: PartialEq,
    H: BuildHasher,
{
    /// Compares the entries of two maps, regardless of their bucket layouts.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.iter().all(|(key, value)| match key {
                Key::Null => other.get_null() == Some(value),
                Key::Real(key) => other.get(key) == Some(value),
            })
    }
}

impl<'m, K, V> Iterator for Iter<'m, K, V> {
    type Item = (Key<&'m K>, &'m V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((node.key.as_ref(), &node.value));
            }
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'m, K, V> Iterator for IterMut<'m, K, V> {
    type Item = (Key<&'m K>, &'m mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.chain.as_mut().and_then(Iterator::next) {
                self.remaining -= 1;
                return Some((key.as_ref(), value));
            }
            self.chain = Some(self.buckets.next()?.iter_mut());
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}
