use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use hashbrown::HashTable;

use crate::DefaultHashBuilder;
use crate::collection::ProbeBacked;
use crate::probe_table::ProbeTable;

/// A key-value pair that carries the hash of its key.
///
/// The hash is computed once, when the entry is created by a map or builder,
/// and reused for every probe and rebuild afterwards. Equality compares the
/// key and the value only, and hashing feeds the key and then the value, so
/// the cached hash never affects either.
#[derive(Clone)]
pub struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub(crate) fn new<S: BuildHasher>(key: K, value: V, hash_builder: &S) -> Self
    where
        K: Hash,
    {
        Self {
            hash: hash_builder.hash_one(&key),
            key,
            value,
        }
    }

    #[inline]
    pub(crate) fn with_hash(hash: u64, key: K, value: V) -> Self {
        Self { hash, key, value }
    }

    /// The key of this entry.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The value associated with the key.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The cached hash of the key, as computed by the owning collection's
    /// hasher builder.
    pub fn key_hash(&self) -> u64 {
        self.hash
    }

    /// Borrows the key and value as a pair.
    pub fn as_pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }

    /// Splits the entry into its key and value.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> PartialEq for Entry<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl<K: Eq, V: Eq> Eq for Entry<K, V> {}

impl<K: Hash, V: Hash> Hash for Entry<K, V> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
    }
}

impl<K: Debug, V: Debug> Debug for Entry<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?} => {:?}", self.key, self.value)
    }
}

#[inline]
fn build_table<K: Eq, V>(entries: Vec<Entry<K, V>>) -> ProbeTable<Entry<K, V>> {
    ProbeTable::build(entries, |e| e.hash, |a, b| a.key == b.key)
}

/// An immutable hash map that keeps its entries in first-seen order.
///
/// `ImmutableMap<K, V, S>` is built once from key-value pairs. Constructors
/// that take pairs directly ([`from_pairs`], [`FromIterator`]) keep the
/// *first* pair for a repeated key. [`MapBuilder`] instead lets the *last*
/// value inserted for a key win.
///
/// [`from_pairs`]: ImmutableMap::from_pairs
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_table::ImmutableMap;
///
/// let map = ImmutableMap::from_pairs(vec![(1, "x"), (2, "y"), (1, "z")]);
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&1), Some(&"x"));
/// assert_eq!(map.get(&2), Some(&"y"));
/// assert_eq!(map.get(&3), None);
/// # }
/// ```
#[derive(Clone)]
pub struct ImmutableMap<K, V, S = DefaultHashBuilder> {
    table: ProbeTable<Entry<K, V>>,
    hash_builder: S,
}

impl<K, V, S> Debug for ImmutableMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for e in self.table.iter() {
            map.entry(&e.key, &e.value);
        }
        map.finish()
    }
}

impl<K, V, S> PartialEq for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

/// Order-independent: maps holding the same pairs hash equally whatever
/// their iteration order or hasher builder.
#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V, S> Hash for ImmutableMap<K, V, S>
where
    K: Hash,
    V: Hash,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        crate::collection::hash_unordered(self.table.len(), self.table.iter(), state);
    }
}

impl<K, V, S> ProbeBacked for ImmutableMap<K, V, S> {
    type Entry = Entry<K, V>;

    fn probe_table(&self) -> &ProbeTable<Entry<K, V>> {
        &self.table
    }
}

impl<K, V, S> ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty map with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: ProbeTable::empty(),
            hash_builder,
        }
    }

    /// Creates a map from `pairs` using the given hasher builder.
    ///
    /// When a key repeats, the first pair for it is kept.
    pub fn from_pairs_with_hasher(pairs: Vec<(K, V)>, hash_builder: S) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| Entry::new(key, value, &hash_builder))
            .collect();
        Self::from_entries(entries, hash_builder)
    }

    /// Entries must have been hashed by `hash_builder`.
    pub(crate) fn from_entries(entries: Vec<Entry<K, V>>, hash_builder: S) -> Self {
        Self {
            table: build_table(entries),
            hash_builder,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the entry for `key`, if any.
    pub fn get_entry<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |e| e.hash == hash && e.key.borrow() == key)
    }

    /// Returns a reference to the value associated with `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_pairs(vec![("a".to_string(), 1)]);
    /// assert_eq!(map.get("a"), Some(&1));
    /// assert_eq!(map.get("b"), None);
    /// # }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(|e| &e.value)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(Entry::as_pair)
    }

    /// Returns `true` if the map contains a value for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).is_some()
    }

    /// Returns an iterator over `(key, value)` pairs in first-seen order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the keys in first-seen order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// The entries in first-seen order.
    pub fn entries(&self) -> &[Entry<K, V>] {
        self.table.as_slice()
    }

    /// Copies the pairs into a new vector.
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Returns a map with the same keys and `mapping` applied to each value.
    ///
    /// Cached key hashes carry over to the new map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ImmutableMap;
    ///
    /// let map = ImmutableMap::from_pairs(vec![("a", 1), ("b", 2)]);
    /// let doubled = map.map_values(|v| v * 2);
    /// assert_eq!(doubled.get("b"), Some(&4));
    /// # }
    /// ```
    pub fn map_values<W>(&self, mut mapping: impl FnMut(&V) -> W) -> ImmutableMap<K, W, S>
    where
        K: Clone,
        S: Clone,
    {
        let entries = self
            .table
            .iter()
            .map(|e| Entry::with_hash(e.hash, e.key.clone(), mapping(&e.value)))
            .collect();
        ImmutableMap::from_entries(entries, self.hash_builder.clone())
    }

    /// Counts entries by their distance from their home slot.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::probe_table::ProbeHistogram {
        self.table.probe_histogram(|e| e.hash)
    }

    /// Gathers occupancy and probe-length statistics.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::probe_table::DebugStats {
        self.table.debug_stats(|e| e.hash)
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> ImmutableMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty map using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a map from `pairs` using the default hasher builder.
    ///
    /// When a key repeats, the first pair for it is kept.
    pub fn from_pairs(pairs: Vec<(K, V)>) -> Self {
        Self::from_pairs_with_hasher(pairs, DefaultHashBuilder::default())
    }

    /// Creates a builder using the default hasher builder.
    pub fn builder() -> MapBuilder<K, V, DefaultHashBuilder> {
        MapBuilder::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Keeps the first pair for a repeated key, like
/// [`ImmutableMap::from_pairs`]. Use [`MapBuilder`] for last-write-wins.
impl<K, V, S> FromIterator<(K, V)> for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs_with_hasher(iter.into_iter().collect(), S::default())
    }
}

impl<K, V, S, const N: usize> From<[(K, V); N]> for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs_with_hasher(Vec::from(pairs), S::default())
    }
}

/// Collects key-value pairs for an [`ImmutableMap`], overwriting on repeated
/// keys.
///
/// Inserting a key that is already pending replaces its value but keeps the
/// key's original position, so the built map iterates keys in the order they
/// were first inserted while holding the value inserted last. The builder is
/// a plain mutable hash table; the probe table is only built by
/// [`build`](MapBuilder::build).
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_table::ImmutableMap;
///
/// let mut builder = ImmutableMap::builder();
/// builder.insert("a", 1);
/// builder.insert("b", 2);
/// assert_eq!(builder.insert("a", 3), Some(1));
///
/// let map = builder.build();
/// assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&"a", &3), (&"b", &2)]);
/// # }
/// ```
#[derive(Clone)]
pub struct MapBuilder<K, V, S = DefaultHashBuilder> {
    entries: Vec<Entry<K, V>>,
    index: HashTable<usize>,
    hash_builder: S,
}

impl<K, V, S> MapBuilder<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty builder with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    /// Creates an empty builder with room for `capacity` keys.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Associates `value` with `key`, returning the value it replaces.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        let entries = &mut self.entries;
        match self.index.find(hash, |&i| entries[i].key == key).copied() {
            Some(i) => Some(core::mem::replace(&mut entries[i].value, value)),
            None => {
                self.index
                    .insert_unique(hash, entries.len(), |&i| entries[i].hash);
                entries.push(Entry::with_hash(hash, key, value));
                None
            }
        }
    }

    /// Returns the pending value for `key`, inserting `default()` first if
    /// the key is new.
    pub(crate) fn value_mut_or_insert_with(
        &mut self,
        key: K,
        default: impl FnOnce() -> V,
    ) -> &mut V {
        let hash = self.hash_builder.hash_one(&key);
        let entries = &mut self.entries;
        let index = match self.index.find(hash, |&i| entries[i].key == key).copied() {
            Some(i) => i,
            None => {
                let i = entries.len();
                self.index.insert_unique(hash, i, |&j| entries[j].hash);
                entries.push(Entry::with_hash(hash, key, default()));
                i
            }
        };
        &mut entries[index].value
    }

    /// Number of distinct keys inserted so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freezes the pending entries into an [`ImmutableMap`].
    pub fn build(self) -> ImmutableMap<K, V, S> {
        debug_assert_eq!(self.index.len(), self.entries.len());
        ImmutableMap::from_entries(self.entries, self.hash_builder)
    }

    /// Builds a map from a copy of the pending entries, leaving the builder
    /// usable for further inserts and builds.
    pub fn to_map(&self) -> ImmutableMap<K, V, S>
    where
        K: Clone,
        V: Clone,
        S: Clone,
    {
        ImmutableMap::from_entries(self.entries.clone(), self.hash_builder.clone())
    }

    /// Freezes the pending entries, converting each value on the way.
    pub(crate) fn build_mapped<W>(
        self,
        mut mapping: impl FnMut(V, &S) -> W,
    ) -> ImmutableMap<K, W, S> {
        let hash_builder = self.hash_builder;
        let entries = self
            .entries
            .into_iter()
            .map(|e| Entry::with_hash(e.hash, e.key, mapping(e.value, &hash_builder)))
            .collect();
        ImmutableMap::from_entries(entries, hash_builder)
    }
}

impl<K, V, S> Extend<(K, V)> for MapBuilder<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// An iterator over the entries of an `ImmutableMap`.
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    inner: crate::probe_table::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::as_pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the keys of an `ImmutableMap`.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    inner: crate::probe_table::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| &e.key)
    }
}

/// An iterator over the values of an `ImmutableMap`.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    inner: crate::probe_table::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| &e.value)
    }
}

/// A consuming iterator over the pairs of an `ImmutableMap`.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::into_pair)
    }
}

impl<K, V, S> IntoIterator for ImmutableMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ImmutableMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.table.iter(),
        }
    }
}
