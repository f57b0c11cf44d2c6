#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod probe_table;

/// Operations shared by every probe-table-backed collection.
pub mod collection;

/// Error type for fallible construction and export.
pub mod error;

/// An immutable hash set backed by a `ProbeTable`.
///
/// This module provides an `ImmutableSet` that stores its elements directly
/// as table entries and keeps them in first-seen order.
pub mod set;

/// An immutable hash map backed by a `ProbeTable`.
///
/// This module provides the hash-caching `Entry` pair, the `ImmutableMap`
/// built from such entries, and a `MapBuilder` with overwrite semantics.
pub mod map;

/// Immutable multimaps backed by a `ProbeTable` of key-to-group entries.
pub mod multimap;

pub use collection::ProbeBacked;
pub use error::Error;
pub use map::Entry;
pub use map::ImmutableMap;
pub use map::MapBuilder;
pub use multimap::ListMultimap;
pub use multimap::ListMultimapBuilder;
pub use multimap::SetMultimap;
pub use multimap::SetMultimapBuilder;
pub use probe_table::ProbeTable;
pub use set::ImmutableSet;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hash builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hash builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Stand-in default hash builder for builds without `std` or
        /// `foldhash`.
        ///
        /// It does not implement `BuildHasher`, so collections must be
        /// created through their `*_with_hasher` constructors.
        #[derive(Clone, Copy, Debug, Default)]
        pub struct DefaultHashBuilder {
            _private: (),
        }
    }
}

// Fixed-seed state for the order-independent `Hash` impls of the collections.
cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        type StructuralHashBuilder = foldhash::fast::FixedState;
    } else if #[cfg(feature = "std")] {
        type StructuralHashBuilder = std::hash::BuildHasherDefault<std::hash::DefaultHasher>;
    }
}
