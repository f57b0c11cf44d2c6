//! An immutable open-addressing table built once from a known set of entries.
//!
//! `ProbeTable<E>` keeps two arrays:
//!
//! - the *origin*, the deduplicated entries in the order they were first seen,
//!   which backs iteration, `len` and export; and
//! - the *slots*, a linear-probing index into the origin sized to twice the
//!   number of input entries, which backs lookup.
//!
//! Like the rest of the crate's low-level API, the table is hasher-agnostic:
//! callers supply a hash for each entry and an equality predicate on keys.
//! Duplicate keys are resolved first-wins: the earliest entry for a key is
//! kept and later ones are dropped during construction.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Error;

/// Slot marker for "no entry".
const EMPTY: usize = usize::MAX;

/// Home slot of `hash` in a probe array of `len` slots.
///
/// Hashes are unsigned, so the plain remainder is already the floored modulo.
#[inline(always)]
fn home_slot(hash: u64, len: usize) -> usize {
    debug_assert!(len != 0);
    (hash % len as u64) as usize
}

#[inline(always)]
fn next_slot(slot: usize, len: usize) -> usize {
    let next = slot + 1;
    if next == len { 0 } else { next }
}

/// An immutable, insertion-ordered hash table using linear probing.
///
/// The probe array holds `2 * n` slots for `n` input entries (duplicates
/// included), so at most half of it is ever occupied and every probe sequence
/// reaches an empty slot. Inputs of zero or one entry skip the probe array
/// entirely.
///
/// ## Example
///
/// ```rust
/// # use core::hash::BuildHasher;
/// # use std::hash::RandomState;
/// #
/// # use probe_table::ProbeTable;
/// #
/// let state = RandomState::new();
/// let table = ProbeTable::build(
///     vec![("a", 1), ("b", 2), ("a", 3)],
///     |e| state.hash_one(e.0),
///     |x, y| x.0 == y.0,
/// );
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.find(state.hash_one("a"), |e| e.0 == "a"), Some(&("a", 1)));
/// assert_eq!(table.find(state.hash_one("z"), |e| e.0 == "z"), None);
/// ```
#[derive(Clone)]
pub struct ProbeTable<E> {
    origin: Vec<E>,
    slots: Box<[usize]>,
}

impl<E> Debug for ProbeTable<E>
where
    E: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        f.debug_struct("ProbeTable")
            .field("origin", &self.origin)
            .field(
                "slots",
                &self
                    .slots
                    .chunks(16)
                    .map(|chunk| {
                        chunk
                            .iter()
                            .map(|&slot| {
                                if slot == EMPTY {
                                    "..".to_string()
                                } else {
                                    format!("{:02}", slot)
                                }
                            })
                            .collect::<Vec<String>>()
                            .join(", ")
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<E> Default for ProbeTable<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E> ProbeTable<E> {
    /// Creates a table with no entries.
    pub fn empty() -> Self {
        Self {
            origin: Vec::new(),
            slots: Box::default(),
        }
    }

    /// Builds a table from `entries`, dropping every entry whose key equals
    /// the key of an earlier one.
    ///
    /// `hasher` must return the hash of an entry's key and `eq` must compare
    /// two entries by key; both must agree with the hashes and predicates
    /// later passed to [`find`](Self::find).
    ///
    /// The vector is used as scratch space: when it holds no duplicates it
    /// becomes the origin as-is, otherwise it is compacted in place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_table::ProbeTable;
    /// #
    /// let table = ProbeTable::build(vec![3u64, 1, 3, 2], |&v| v, |a, b| a == b);
    /// assert_eq!(table.as_slice(), &[3, 1, 2]);
    /// assert_eq!(table.capacity(), 8);
    /// ```
    pub fn build(
        mut entries: Vec<E>,
        hasher: impl Fn(&E) -> u64,
        eq: impl Fn(&E, &E) -> bool,
    ) -> Self {
        if entries.len() <= 1 {
            return Self {
                origin: entries,
                slots: Box::default(),
            };
        }

        let mut slots = vec![EMPTY; entries.len() * 2].into_boxed_slice();
        // Allocated on the first duplicate only.
        let mut discarded: Vec<bool> = Vec::new();

        for index in 0..entries.len() {
            let entry = &entries[index];
            let mut slot = home_slot(hasher(entry), slots.len());
            let duplicate = loop {
                let occupant = slots[slot];
                if occupant == EMPTY {
                    break false;
                }
                if eq(&entries[occupant], entry) {
                    break true;
                }
                slot = next_slot(slot, slots.len());
            };

            if duplicate {
                if discarded.is_empty() {
                    discarded = vec![false; entries.len()];
                }
                discarded[index] = true;
            } else {
                slots[slot] = index;
            }
        }

        if !discarded.is_empty() {
            // Slots were filled with input positions; survivors move left by
            // the number of duplicates in front of them.
            let mut rank = vec![EMPTY; entries.len()];
            let mut next = 0;
            for (index, &gone) in discarded.iter().enumerate() {
                if !gone {
                    rank[index] = next;
                    next += 1;
                }
            }
            for slot in slots.iter_mut().filter(|slot| **slot != EMPTY) {
                *slot = rank[*slot];
                debug_assert!(*slot != EMPTY);
            }

            let mut flags = discarded.iter();
            entries.retain(|_| matches!(flags.next(), Some(&false)));
            debug_assert_eq!(entries.len(), next);
        }

        Self {
            origin: entries,
            slots,
        }
    }

    /// Builds a table from a sequence that may contain absent entries.
    ///
    /// Fails with [`Error::MissingEntry`] at the first `None`; nothing is
    /// built in that case. Otherwise behaves like [`build`](Self::build).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_table::Error;
    /// # use probe_table::ProbeTable;
    /// #
    /// let err = ProbeTable::try_build([Some(1u64), None, Some(2)], |&v| v, |a, b| a == b);
    /// assert_eq!(err.unwrap_err(), Error::MissingEntry { index: 1 });
    /// ```
    pub fn try_build<I>(
        entries: I,
        hasher: impl Fn(&E) -> u64,
        eq: impl Fn(&E, &E) -> bool,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Option<E>>,
    {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.ok_or(Error::MissingEntry { index }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::build(entries, hasher, eq))
    }

    /// Walks the probe sequence for `hash`, returning the origin index of the
    /// match (if any) and the number of slots inspected.
    #[inline]
    fn probe(&self, hash: u64, eq: impl Fn(&E) -> bool) -> (Option<usize>, usize) {
        if self.slots.is_empty() {
            let found = self.origin.first().filter(|entry| eq(entry)).map(|_| 0);
            return (found, 0);
        }

        let len = self.slots.len();
        let mut slot = home_slot(hash, len);
        for inspected in 1..=len {
            let occupant = self.slots[slot];
            if occupant == EMPTY {
                return (None, inspected);
            }
            if eq(&self.origin[occupant]) {
                return (Some(occupant), inspected);
            }
            slot = next_slot(slot, len);
        }

        unreachable!("probe table with {} slots has no empty slot", len)
    }

    /// Returns the entry matching `eq` whose key hashes to `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_table::ProbeTable;
    /// #
    /// let table = ProbeTable::build(vec![10u64, 20, 30], |&v| v, |a, b| a == b);
    /// assert_eq!(table.find(20, |&v| v == 20), Some(&20));
    /// assert_eq!(table.find(40, |&v| v == 40), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&E) -> bool) -> Option<&E> {
        self.probe(hash, eq).0.map(|index| &self.origin[index])
    }

    /// Returns `true` if an entry matching `eq` is present.
    #[inline]
    pub fn contains(&self, hash: u64, eq: impl Fn(&E) -> bool) -> bool {
        self.probe(hash, eq).0.is_some()
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.origin.len()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.origin.is_empty()
    }

    /// Length of the probe array: twice the number of input entries, or zero
    /// when the input had fewer than two entries.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns an iterator over the entries in first-seen order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_table::ProbeTable;
    /// #
    /// let table = ProbeTable::build(vec![5u64, 4, 5, 3], |&v| v, |a, b| a == b);
    /// let values: Vec<u64> = table.iter().copied().collect();
    /// assert_eq!(values, vec![5, 4, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            inner: self.origin.iter(),
        }
    }

    /// The entries in first-seen order.
    pub fn as_slice(&self) -> &[E] {
        &self.origin
    }

    /// Copies the entries into a new vector.
    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.origin.clone()
    }

    /// Consumes the table and returns its entries in first-seen order.
    pub fn into_vec(self) -> Vec<E> {
        self.origin
    }

    /// Clones the entries into `buffer[offset..offset + self.len()]`.
    ///
    /// The buffer is left untouched if the range does not fit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_table::ProbeTable;
    /// #
    /// let table = ProbeTable::build(vec![1u64, 2], |&v| v, |a, b| a == b);
    /// let mut buffer = [0u64; 4];
    /// table.fill_into(&mut buffer, 1).unwrap();
    /// assert_eq!(buffer, [0, 1, 2, 0]);
    /// assert!(table.fill_into(&mut buffer, 3).is_err());
    /// ```
    pub fn fill_into(&self, buffer: &mut [E], offset: usize) -> Result<(), Error>
    where
        E: Clone,
    {
        let len = self.origin.len();
        match offset.checked_add(len) {
            Some(end) if end <= buffer.len() => {
                buffer[offset..end].clone_from_slice(&self.origin);
                Ok(())
            }
            _ => Err(Error::FillOutOfBounds {
                offset,
                len,
                buffer_len: buffer.len(),
            }),
        }
    }
}

#[cfg(feature = "stats")]
impl<E> ProbeTable<E> {
    /// Counts entries by their distance from their home slot.
    ///
    /// `hasher` must be the hasher the table was built with.
    pub fn probe_histogram(&self, hasher: impl Fn(&E) -> u64) -> ProbeHistogram {
        let mut counts = Vec::new();
        if self.slots.is_empty() {
            if !self.origin.is_empty() {
                counts.push(self.origin.len());
            }
            return ProbeHistogram { counts };
        }

        let len = self.slots.len();
        for (slot, &occupant) in self.slots.iter().enumerate() {
            if occupant == EMPTY {
                continue;
            }
            let home = home_slot(hasher(&self.origin[occupant]), len);
            let distance = (slot + len - home) % len;
            if counts.len() <= distance {
                counts.resize(distance + 1, 0);
            }
            counts[distance] += 1;
        }

        ProbeHistogram { counts }
    }

    /// Gathers occupancy and probe-length statistics.
    ///
    /// `hasher` must be the hasher the table was built with.
    pub fn debug_stats(&self, hasher: impl Fn(&E) -> u64) -> DebugStats {
        let histogram = self.probe_histogram(hasher);
        let probes: usize = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| (distance + 1) * count)
            .sum();

        DebugStats {
            populated: self.origin.len(),
            total_slots: self.slots.len(),
            load_factor: if self.slots.is_empty() {
                0.0
            } else {
                self.origin.len() as f64 / self.slots.len() as f64
            },
            max_probe_length: histogram.counts.len(),
            mean_probe_length: if self.origin.is_empty() {
                0.0
            } else {
                probes as f64 / self.origin.len() as f64
            },
            total_bytes: self.origin.capacity() * core::mem::size_of::<E>()
                + self.slots.len() * core::mem::size_of::<usize>(),
        }
    }
}

/// Number of entries stored at each distance from their home slot.
///
/// `counts[d]` is the number of entries found after `d + 1` probes.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// Entry counts indexed by displacement.
    pub counts: Vec<usize>,
}

#[cfg(feature = "stats")]
impl ProbeHistogram {
    /// Pretty-print the histogram as a bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        let total: usize = self.counts.iter().sum();
        println!("probe histogram ({} entries):", total);

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            match units % 8 {
                0 => {}
                1 => bar.push('▏'),
                2 => bar.push('▎'),
                3 => bar.push('▍'),
                4 => bar.push('▌'),
                5 => bar.push('▋'),
                6 => bar.push('▊'),
                _ => bar.push('▉'),
            }
            bar
        };

        for (distance, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// Debug statistics for probe table analysis.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of distinct entries
    pub populated: usize,
    /// Length of the probe array
    pub total_slots: usize,
    /// populated / total_slots
    pub load_factor: f64,
    /// Longest successful probe sequence, in slots
    pub max_probe_length: usize,
    /// Average successful probe sequence, in slots
    pub mean_probe_length: f64,
    /// Bytes held by the origin and the probe array
    pub total_bytes: usize,
}

#[cfg(feature = "stats")]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Probe Table Debug Statistics ===");
        println!(
            "Population: {}/{} slots ({:.2}% load factor)",
            self.populated,
            self.total_slots,
            self.load_factor * 100.0
        );
        println!(
            "Probe length: max {} / mean {:.2}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An iterator over the entries of a [`ProbeTable`] in first-seen order.
///
/// This struct is created by the [`iter`] method on [`ProbeTable`].
///
/// [`iter`]: ProbeTable::iter
#[derive(Clone)]
pub struct Iter<'a, E> {
    inner: core::slice::Iter<'a, E>,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> DoubleEndedIterator for Iter<'_, E> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

impl<'a, E> IntoIterator for &'a ProbeTable<E> {
    type IntoIter = Iter<'a, E>;
    type Item = &'a E;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E> IntoIterator for ProbeTable<E> {
    type IntoIter = alloc::vec::IntoIter<E>;
    type Item = E;

    fn into_iter(self) -> Self::IntoIter {
        self.origin.into_iter()
    }
}
