//! Multimaps store each key once, mapped to the group of values associated
//! with it. A [`SetMultimap`] keeps distinct values per key, in first-seen
//! order. A [`ListMultimap`] keeps every value in insertion order.
//!
//! Both are built through their builders, which collect groups in a mutable
//! index and freeze them into a single [`ImmutableMap`] of key-to-group
//! entries on [`build`](SetMultimapBuilder::build).
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(any(feature = "std", feature = "foldhash"))]
//! # {
//! use probe_table::SetMultimap;
//!
//! let mut builder = SetMultimap::builder();
//! builder
//!     .insert("key1", "AA")
//!     .insert("key2", "BB")
//!     .insert("key1", "AB")
//!     .insert("key2", "BB");
//! let multimap = builder.build();
//!
//! assert_eq!(multimap.key_len(), 2);
//! assert_eq!(multimap.len(), 3);
//! assert!(multimap.contains_entry("key1", "AB"));
//! assert!(!multimap.contains_entry("key1", "BB"));
//! assert_eq!(multimap.values_of("key3").count(), 0);
//! # }
//! ```

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::collection::ProbeBacked;
use crate::map::Entry;
use crate::map::ImmutableMap;
use crate::map::Keys;
use crate::map::MapBuilder;
use crate::probe_table::ProbeTable;
use crate::set::ImmutableSet;

/// An immutable multimap holding a set of distinct values per key.
#[derive(Clone)]
pub struct SetMultimap<K, V, S = DefaultHashBuilder> {
    groups: ImmutableMap<K, ImmutableSet<V, S>, S>,
    len: usize,
}

/// An immutable multimap holding a list of values per key.
#[derive(Clone)]
pub struct ListMultimap<K, V, S = DefaultHashBuilder> {
    groups: ImmutableMap<K, Vec<V>, S>,
    len: usize,
}

/// Collects associations for a [`SetMultimap`].
///
/// Repeated values under one key collapse into one, the first one kept.
#[derive(Clone)]
pub struct SetMultimapBuilder<K, V, S = DefaultHashBuilder> {
    groups: MapBuilder<K, Vec<V>, S>,
}

/// Collects associations for a [`ListMultimap`].
#[derive(Clone)]
pub struct ListMultimapBuilder<K, V, S = DefaultHashBuilder> {
    groups: MapBuilder<K, Vec<V>, S>,
}

impl<K, V, S> SetMultimapBuilder<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Creates an empty builder with the given hasher builder.
    ///
    /// The hasher builder is shared by the key table and every value set.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            groups: MapBuilder::with_hasher(hash_builder),
        }
    }

    /// Associates `value` with `key`.
    pub fn insert(&mut self, key: K, value: V) -> &mut Self {
        self.groups.value_mut_or_insert_with(key, Vec::new).push(value);
        self
    }

    /// Associates every value in `values` with `key`.
    ///
    /// Nothing is recorded for `key` when `values` is empty.
    pub fn insert_all(&mut self, key: K, values: impl IntoIterator<Item = V>) -> &mut Self {
        let mut values = values.into_iter().peekable();
        if values.peek().is_some() {
            self.groups.value_mut_or_insert_with(key, Vec::new).extend(values);
        }
        self
    }

    /// Number of distinct keys inserted so far.
    pub fn key_len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Freezes the collected associations into a [`SetMultimap`].
    pub fn build(self) -> SetMultimap<K, V, S> {
        let mut len = 0;
        let groups = self.groups.build_mapped(|values, hash_builder| {
            let set = ImmutableSet::from_vec_with_hasher(values, hash_builder.clone());
            len += set.len();
            set
        });
        SetMultimap { groups, len }
    }
}

impl<K, V, S> ListMultimapBuilder<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty builder with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            groups: MapBuilder::with_hasher(hash_builder),
        }
    }

    /// Appends `value` to the values of `key`.
    pub fn insert(&mut self, key: K, value: V) -> &mut Self {
        self.groups.value_mut_or_insert_with(key, Vec::new).push(value);
        self
    }

    /// Appends every value in `values` to the values of `key`.
    ///
    /// Nothing is recorded for `key` when `values` is empty.
    pub fn insert_all(&mut self, key: K, values: impl IntoIterator<Item = V>) -> &mut Self {
        let mut values = values.into_iter().peekable();
        if values.peek().is_some() {
            self.groups.value_mut_or_insert_with(key, Vec::new).extend(values);
        }
        self
    }

    /// Number of distinct keys inserted so far.
    pub fn key_len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Freezes the collected associations into a [`ListMultimap`].
    pub fn build(self) -> ListMultimap<K, V, S> {
        let mut len = 0;
        let groups = self.groups.build_mapped(|values, _| {
            len += values.len();
            values
        });
        ListMultimap { groups, len }
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> SetMultimapBuilder<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
    V: Hash + Eq,
{
    /// Creates an empty builder using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> ListMultimapBuilder<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty builder using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> Default for SetMultimapBuilder<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
    V: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> Default for ListMultimapBuilder<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Extend<(K, V)> for SetMultimapBuilder<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> Extend<(K, V)> for ListMultimapBuilder<K, V, S>
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

macro_rules! multimap_common {
    ($name:ident, $group:ty, [$($eq_bound:tt)*]) => {
        impl<K, V, S> $name<K, V, S>
        where
            K: Hash + Eq,
            S: BuildHasher,
        {
            /// Returns the values associated with `key`, or `None` if the key
            /// has none.
            pub fn get<Q>(&self, key: &Q) -> Option<&$group>
            where
                K: Borrow<Q>,
                Q: Hash + Eq + ?Sized,
            {
                self.groups.get(key)
            }

            /// Returns an iterator over the values associated with `key`.
            ///
            /// The iterator is empty when the key is absent.
            pub fn values_of<Q>(&self, key: &Q) -> ValuesOf<'_, V>
            where
                K: Borrow<Q>,
                Q: Hash + Eq + ?Sized,
            {
                let values: &[V] = match self.groups.get(key) {
                    Some(group) => AsRef::<[V]>::as_ref(group),
                    None => &[],
                };
                ValuesOf {
                    inner: values.iter(),
                }
            }

            /// Returns `true` if at least one value is associated with `key`.
            pub fn contains_key<Q>(&self, key: &Q) -> bool
            where
                K: Borrow<Q>,
                Q: Hash + Eq + ?Sized,
            {
                self.groups.contains_key(key)
            }

            /// Returns `true` if `value` is associated with `key`.
            pub fn contains_entry<Q, R>(&self, key: &Q, value: &R) -> bool
            where
                K: Borrow<Q>,
                Q: Hash + Eq + ?Sized,
                V: Borrow<R>,
                R: Hash + Eq + ?Sized,
            {
                self.values_of(key).any(|v| v.borrow() == value)
            }

            /// Number of distinct keys.
            pub fn key_len(&self) -> usize {
                self.groups.len()
            }

            /// Total number of key-value associations.
            pub fn len(&self) -> usize {
                self.len
            }

            /// Returns `true` if the multimap holds no associations.
            pub fn is_empty(&self) -> bool {
                self.len == 0
            }

            /// Returns an iterator over the distinct keys in first-seen order.
            pub fn keys(&self) -> Keys<'_, K, $group> {
                self.groups.keys()
            }

            /// Returns an iterator over every `(key, value)` association,
            /// grouped by key.
            pub fn iter(&self) -> Iter<'_, K, V, $group> {
                Iter {
                    groups: self.groups.entries().iter(),
                    current: None,
                    remaining: self.len,
                }
            }

            /// The key-to-group entries in first-seen key order.
            pub fn collection_entries(&self) -> &[Entry<K, $group>] {
                self.groups.entries()
            }

            /// Views the multimap as a map from keys to their groups.
            pub fn as_map(&self) -> &ImmutableMap<K, $group, S> {
                &self.groups
            }

            /// Counts keys by their distance from their home slot.
            #[cfg(feature = "stats")]
            pub fn probe_histogram(&self) -> crate::probe_table::ProbeHistogram {
                self.groups.probe_histogram()
            }

            /// Gathers occupancy and probe-length statistics for the key table.
            #[cfg(feature = "stats")]
            pub fn debug_stats(&self) -> crate::probe_table::DebugStats {
                self.groups.debug_stats()
            }
        }

        impl<K, V, S> PartialEq for $name<K, V, S>
        where
            K: Hash + Eq,
            S: BuildHasher,
            $($eq_bound)*
        {
            fn eq(&self, other: &Self) -> bool {
                self.len == other.len && self.groups == other.groups
            }
        }

        impl<K, V, S> Eq for $name<K, V, S>
        where
            K: Hash + Eq,
            S: BuildHasher,
            $($eq_bound)*
        {
        }

        impl<K: Debug, V: Debug, S> Debug for $name<K, V, S> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                self.groups.fmt(f)
            }
        }

        /// Order-independent over the `(key, value)` associations.
        #[cfg(any(feature = "std", feature = "foldhash"))]
        impl<K, V, S> Hash for $name<K, V, S>
        where
            K: Hash + Eq,
            V: Hash,
            S: BuildHasher,
        {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                crate::collection::hash_unordered(self.len, self.iter(), state);
            }
        }

        impl<K, V, S> ProbeBacked for $name<K, V, S> {
            type Entry = Entry<K, $group>;

            fn probe_table(&self) -> &ProbeTable<Self::Entry> {
                self.groups.probe_table()
            }
        }

        impl<'a, K, V, S> IntoIterator for &'a $name<K, V, S>
        where
            K: Hash + Eq,
            S: BuildHasher,
        {
            type IntoIter = Iter<'a, K, V, $group>;
            type Item = (&'a K, &'a V);

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }
    };
}

multimap_common!(SetMultimap, ImmutableSet<V, S>, [V: Hash + Eq,]);
multimap_common!(ListMultimap, Vec<V>, [V: Eq,]);

impl<K, V, S> SetMultimap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Creates an empty multimap with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            groups: ImmutableMap::with_hasher(hash_builder),
            len: 0,
        }
    }
}

impl<K, V, S> ListMultimap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty multimap with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            groups: ImmutableMap::with_hasher(hash_builder),
            len: 0,
        }
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> SetMultimap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
    V: Hash + Eq,
{
    /// Creates an empty multimap using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a builder using the default hasher builder.
    pub fn builder() -> SetMultimapBuilder<K, V, DefaultHashBuilder> {
        SetMultimapBuilder::new()
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<K, V> ListMultimap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates an empty multimap using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a builder using the default hasher builder.
    pub fn builder() -> ListMultimapBuilder<K, V, DefaultHashBuilder> {
        ListMultimapBuilder::new()
    }
}

impl<K, V, S> Default for SetMultimap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Default for ListMultimap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> FromIterator<(K, V)> for SetMultimap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = SetMultimapBuilder::with_hasher(S::default());
        builder.extend(iter);
        builder.build()
    }
}

impl<K, V, S> FromIterator<(K, V)> for ListMultimap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = ListMultimapBuilder::with_hasher(S::default());
        builder.extend(iter);
        builder.build()
    }
}

/// An iterator over the values associated with one key.
#[derive(Clone)]
pub struct ValuesOf<'a, V> {
    inner: core::slice::Iter<'a, V>,
}

impl<'a, V> Iterator for ValuesOf<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesOf<'_, V> {}

/// An iterator over every association of a multimap.
pub struct Iter<'a, K, V, G> {
    groups: core::slice::Iter<'a, Entry<K, G>>,
    current: Option<(&'a K, core::slice::Iter<'a, V>)>,
    remaining: usize,
}

impl<K, V, G> Clone for Iter<'_, K, V, G> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, G> Iterator for Iter<'a, K, V, G>
where
    G: AsRef<[V]>,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.current
                && let Some(value) = values.next()
            {
                self.remaining -= 1;
                return Some((*key, value));
            }
            let entry = self.groups.next()?;
            self.current = Some((entry.key(), entry.value().as_ref().iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, G: AsRef<[V]>> ExactSizeIterator for Iter<'_, K, V, G> {}
