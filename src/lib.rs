#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) };
}

#[cfg(feature = "tracing")]
macro_rules! debug_event {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_event {
    ($($arg:tt)*) => {};
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashSet`] when none is named.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashSet`] when none is named.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder default hasher when neither `foldhash` nor `std` is
        /// enabled. It cannot be constructed; name a hasher explicitly with
        /// [`HashSet::with_bits_and_hasher`].
        #[derive(Debug, Clone, Copy)]
        pub enum DefaultHashBuilder {}
    }
}

/// Error type shared by the table, the set and the cursor.
pub mod error;

pub mod hash_table;

/// A fixed-capacity hash set over the open-addressing [`HashTable`].
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

pub use error::Error;
pub use error::Result;
pub use hash_set::HashSet;
pub use hash_table::Cursor;
pub use hash_table::HashTable;
