use alloc::vec::Vec;
#[cfg(any(feature = "std", feature = "foldhash"))]
use core::hash::BuildHasher;
#[cfg(any(feature = "std", feature = "foldhash"))]
use core::hash::Hash;
#[cfg(any(feature = "std", feature = "foldhash"))]
use core::hash::Hasher;

use crate::error::Error;
use crate::probe_table::ProbeTable;

/// A collection whose contents live in a single [`ProbeTable`].
///
/// Implementors only hand out their table; counting, slicing and exporting
/// the table entries are provided on top of it. What an entry is depends on
/// the collection: the element itself for sets, an [`Entry`] pair for maps,
/// and a key-to-group [`Entry`] for multimaps.
///
/// [`Entry`]: crate::map::Entry
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use probe_table::ImmutableSet;
/// use probe_table::ProbeBacked;
///
/// fn snapshot<C: ProbeBacked>(collection: &C) -> Vec<C::Entry>
/// where
///     C::Entry: Clone,
/// {
///     collection.export()
/// }
///
/// let set = ImmutableSet::from_vec(vec![3, 1, 3]);
/// assert_eq!(snapshot(&set), vec![3, 1]);
/// # }
/// ```
pub trait ProbeBacked {
    /// The type stored in each table entry.
    type Entry;

    /// The table holding this collection's entries.
    fn probe_table(&self) -> &ProbeTable<Self::Entry>;

    /// Number of table entries: distinct elements for sets, distinct keys for
    /// maps and multimaps.
    fn entry_count(&self) -> usize {
        self.probe_table().len()
    }

    /// The table entries in first-seen order.
    fn entry_slice(&self) -> &[Self::Entry] {
        self.probe_table().as_slice()
    }

    /// Copies the table entries out, for handing to a mutable collection.
    fn export(&self) -> Vec<Self::Entry>
    where
        Self::Entry: Clone,
    {
        self.probe_table().to_vec()
    }

    /// Clones the table entries into `buffer` starting at `offset`.
    fn export_into(&self, buffer: &mut [Self::Entry], offset: usize) -> Result<(), Error>
    where
        Self::Entry: Clone,
    {
        self.probe_table().fill_into(buffer, offset)
    }

    /// Length of the underlying probe array.
    fn table_capacity(&self) -> usize {
        self.probe_table().capacity()
    }
}

/// Feeds `len` and the wrapping sum of the items' fixed-seed hashes into
/// `state`, so equal collections hash equally whatever their order or hasher
/// builder.
#[cfg(any(feature = "std", feature = "foldhash"))]
pub(crate) fn hash_unordered<T: Hash, H: Hasher>(
    len: usize,
    items: impl Iterator<Item = T>,
    state: &mut H,
) {
    let fixed = crate::StructuralHashBuilder::default();
    let sum = items.fold(0u64, |acc, item| acc.wrapping_add(fixed.hash_one(item)));
    state.write_usize(len);
    state.write_u64(sum);
}
