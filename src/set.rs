use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::collection::ProbeBacked;
use crate::error::Error;
use crate::probe_table::ProbeTable;

/// An immutable hash set that remembers the order its elements were first
/// seen in.
///
/// `ImmutableSet<T, S>` is built once from a vector of elements; when the
/// input contains equal elements only the first is kept. Lookups hash with
/// the configurable hasher builder `S` and probe the underlying
/// [`ProbeTable`]; iteration walks the elements in first-seen order.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_table::ImmutableSet;
///
/// let set = ImmutableSet::from_vec(vec!["A", "B", "B", "C"]);
/// assert_eq!(set.len(), 3);
/// assert!(set.contains("B"));
/// assert!(!set.contains("D"));
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["A", "B", "C"]);
/// # }
/// ```
#[derive(Clone)]
pub struct ImmutableSet<T, S = DefaultHashBuilder> {
    table: ProbeTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for ImmutableSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for ImmutableSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

/// Order-independent: equal sets hash equally whatever their iteration
/// order or hasher builder.
#[cfg(any(feature = "std", feature = "foldhash"))]
impl<T, S> Hash for ImmutableSet<T, S>
where
    T: Hash,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        crate::collection::hash_unordered(self.table.len(), self.table.iter(), state);
    }
}

impl<T, S> Debug for ImmutableSet<T, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.table.iter()).finish()
    }
}

impl<T, S> ProbeBacked for ImmutableSet<T, S> {
    type Entry = T;

    fn probe_table(&self) -> &ProbeTable<T> {
        &self.table
    }
}

impl<T, S> ImmutableSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with the given hasher builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: ProbeTable::empty(),
            hash_builder,
        }
    }

    /// Creates a set from `elements` using the given hasher builder.
    ///
    /// When several elements are equal, the first one is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::hash::RandomState;
    ///
    /// use probe_table::ImmutableSet;
    ///
    /// let set = ImmutableSet::from_vec_with_hasher(vec![3, 1, 3, 2], RandomState::new());
    /// assert_eq!(set.as_slice(), &[3, 1, 2]);
    /// # }
    /// ```
    pub fn from_vec_with_hasher(elements: Vec<T>, hash_builder: S) -> Self {
        let table = ProbeTable::build(elements, |v| hash_builder.hash_one(v), |a, b| a == b);
        Self {
            table,
            hash_builder,
        }
    }

    /// Creates a set from elements that may be absent, using the given hasher
    /// builder.
    ///
    /// Fails with [`Error::MissingEntry`] at the first `None`.
    pub fn try_from_options_with_hasher<I>(elements: I, hash_builder: S) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let table =
            ProbeTable::try_build(elements, |v| hash_builder.hash_one(v), |a, b| a == b)?;
        Ok(Self {
            table,
            hash_builder,
        })
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns `true` if the set contains a value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ImmutableSet;
    ///
    /// let set = ImmutableSet::from_vec(vec![1, 2, 3]);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// # }
    /// ```
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(value).is_some()
    }

    /// Returns a reference to the stored element equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v.borrow() == value)
    }

    /// Returns an iterator over the elements in first-seen order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// The elements in first-seen order.
    pub fn as_slice(&self) -> &[T] {
        self.table.as_slice()
    }

    /// Copies the elements into a new vector.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.table.to_vec()
    }

    /// Clones the elements into `buffer[offset..offset + self.len()]`.
    pub fn fill_into(&self, buffer: &mut [T], offset: usize) -> Result<(), Error>
    where
        T: Clone,
    {
        self.table.fill_into(buffer, offset)
    }

    /// Returns `true` if every element of `other` is in this set.
    pub fn is_superset<S2>(&self, other: &ImmutableSet<T, S2>) -> bool
    where
        S2: BuildHasher,
    {
        other.iter().all(|v| self.contains(v))
    }

    /// Returns `true` if every element of this set is in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ImmutableSet;
    ///
    /// let small = ImmutableSet::from_vec(vec![1, 3]);
    /// let large = ImmutableSet::from_vec(vec![1, 2, 3]);
    /// assert!(small.is_subset(&large));
    /// assert!(!large.is_subset(&small));
    /// # }
    /// ```
    pub fn is_subset<S2>(&self, other: &ImmutableSet<T, S2>) -> bool
    where
        S2: BuildHasher,
    {
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if the two sets share at least one element.
    pub fn intersects<S2>(&self, other: &ImmutableSet<T, S2>) -> bool
    where
        S2: BuildHasher,
    {
        self.iter().any(|v| other.contains(v))
    }

    /// Returns a set holding the elements of this set followed by those of
    /// every set in `others`, each element kept once in first-seen order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ImmutableSet;
    ///
    /// let a = ImmutableSet::from_vec(vec![1, 2, 3]);
    /// let b = ImmutableSet::from_vec(vec![]);
    /// let c = ImmutableSet::from_vec(vec![1, 2, 4]);
    /// assert_eq!(a.union([&b, &c]).as_slice(), &[1, 2, 3, 4]);
    /// # }
    /// ```
    pub fn union<'a, I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
        T: Clone + 'a,
        S: Clone + 'a,
    {
        let others: Vec<&Self> = others.into_iter().filter(|s| !s.is_empty()).collect();
        if others.is_empty() {
            return self.clone();
        }
        if self.is_empty() && others.len() == 1 {
            return others[0].clone();
        }

        let total = self.len() + others.iter().map(|s| s.len()).sum::<usize>();
        let mut elements = Vec::with_capacity(total);
        elements.extend_from_slice(self.as_slice());
        for set in others {
            elements.extend_from_slice(set.as_slice());
        }
        Self::from_vec_with_hasher(elements, self.hash_builder.clone())
    }

    /// Returns a set holding the elements of both sets.
    pub fn unite(&self, other: &Self) -> Self
    where
        T: Clone,
        S: Clone,
    {
        self.union([other])
    }

    /// Returns a set holding the elements of this set that are also in
    /// `other`.
    pub fn intersect<S2>(&self, other: &ImmutableSet<T, S2>) -> Self
    where
        T: Clone,
        S: Clone,
        S2: BuildHasher,
    {
        if other.is_empty() {
            return Self::with_hasher(self.hash_builder.clone());
        }
        self.filtered(|v| other.contains(v))
    }

    /// Returns a set holding the elements of this set that are not in
    /// `other`.
    pub fn without<S2>(&self, other: &ImmutableSet<T, S2>) -> Self
    where
        T: Clone,
        S: Clone,
        S2: BuildHasher,
    {
        if other.is_empty() {
            return self.clone();
        }
        self.filtered(|v| !other.contains(v))
    }

    /// Returns a set holding the elements that satisfy `condition`, in their
    /// current order.
    pub fn filtered(&self, mut condition: impl FnMut(&T) -> bool) -> Self
    where
        T: Clone,
        S: Clone,
    {
        let elements: Vec<T> = self.iter().filter(|v| condition(v)).cloned().collect();
        Self::from_vec_with_hasher(elements, self.hash_builder.clone())
    }

    /// Returns a set holding `mapping` applied to every element.
    ///
    /// Elements that map to equal values collapse into the first of them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::ImmutableSet;
    ///
    /// let words = ImmutableSet::from_vec(vec!["a", "b", "cc"]);
    /// assert_eq!(words.mapped(|w| w.len()).as_slice(), &[1, 2]);
    /// # }
    /// ```
    pub fn mapped<R>(&self, mapping: impl FnMut(&T) -> R) -> ImmutableSet<R, S>
    where
        R: Hash + Eq,
        S: Clone,
    {
        let elements: Vec<R> = self.iter().map(mapping).collect();
        ImmutableSet::from_vec_with_hasher(elements, self.hash_builder.clone())
    }

    /// Counts elements by their distance from their home slot.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::probe_table::ProbeHistogram {
        self.table
            .probe_histogram(|v| self.hash_builder.hash_one(v))
    }

    /// Gathers occupancy and probe-length statistics.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::probe_table::DebugStats {
        self.table.debug_stats(|v| self.hash_builder.hash_one(v))
    }
}

#[cfg(any(feature = "std", feature = "foldhash"))]
impl<T> ImmutableSet<T, DefaultHashBuilder>
where
    T: Hash + Eq,
{
    /// Creates an empty set using the default hasher builder.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a set from `elements` using the default hasher builder.
    ///
    /// When several elements are equal, the first one is kept.
    pub fn from_vec(elements: Vec<T>) -> Self {
        Self::from_vec_with_hasher(elements, DefaultHashBuilder::default())
    }

    /// Creates a set from elements that may be absent, using the default
    /// hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_table::Error;
    /// use probe_table::ImmutableSet;
    ///
    /// let err = ImmutableSet::try_from_options(vec![Some(1), None]).unwrap_err();
    /// assert_eq!(err, Error::MissingEntry { index: 1 });
    /// # }
    /// ```
    pub fn try_from_options<I>(elements: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Option<T>>,
    {
        Self::try_from_options_with_hasher(elements, DefaultHashBuilder::default())
    }
}

impl<T, S> Default for ImmutableSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Keeps the first of several equal elements.
impl<T, S> FromIterator<T> for ImmutableSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec_with_hasher(iter.into_iter().collect(), S::default())
    }
}

impl<T, S, const N: usize> From<[T; N]> for ImmutableSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from(elements: [T; N]) -> Self {
        Self::from_vec_with_hasher(Vec::from(elements), S::default())
    }
}

impl<T, S> AsRef<[T]> for ImmutableSet<T, S> {
    fn as_ref(&self) -> &[T] {
        self.table.as_slice()
    }
}

/// An iterator over the elements of an `ImmutableSet`.
#[derive(Clone)]
pub struct Iter<'a, T> {
    inner: crate::probe_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A consuming iterator over the elements of an `ImmutableSet`.
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, S> IntoIterator for ImmutableSet<T, S> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a ImmutableSet<T, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.table.iter(),
        }
    }
}
