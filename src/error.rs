/// Errors returned by the fallible operations of [`HashTable`] and
/// [`HashSet`].
///
/// Every error is raised before any slot is written, so a failed call leaves
/// the table exactly as it was.
///
/// [`HashTable`]: crate::HashTable
/// [`HashSet`]: crate::HashSet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested table size exponent lies outside `[2, 31]`.
    #[error("table bits must lie in [2, 31], got {bits}")]
    InvalidArgument {
        /// The rejected exponent.
        bits: u32,
    },
    /// An insert probed the whole ring without finding a slot to occupy.
    #[error("table of capacity {capacity} has no free slot")]
    TableFull {
        /// Capacity of the table that overflowed.
        capacity: usize,
    },
    /// [`Cursor::next`](crate::Cursor::next) was called after the cursor
    /// yielded every element it was created to visit.
    #[error("cursor has no more elements")]
    NoSuchElement,
    /// [`Cursor::remove`](crate::Cursor::remove) was called before any
    /// element was yielded, or twice without an intervening `next`.
    #[error("cursor has no current element to remove")]
    IllegalState,
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
