use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Result;
use crate::hash_table::Cursor;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;

/// A fixed-capacity hash set backed by the open-addressing [`HashTable`].
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values. The set holds
/// at most `2^bits` values and never grows; inserting into a set whose every
/// slot is live fails with [`Error::TableFull`](crate::Error::TableFull).
///
/// # Performance Characteristics
///
/// - **Lookups**: expected O(1 / (1 - load factor)), O(capacity) worst case.
/// - **Memory**: one discriminant per slot, plus the size of `T`.
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: HashTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
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

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty set with `2^bits` slots and the given hasher builder.
    ///
    /// Fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument)
    /// unless `bits` lies in `[2, 31]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_set::HashSet;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let set: HashSet<i32, _> = HashSet::with_bits_and_hasher(5, SimpleHasher)?;
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 32);
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn with_bits_and_hasher(bits: u32, hash_builder: S) -> Result<Self> {
        Ok(Self {
            table: HashTable::with_bits(bits)?,
            hash_builder,
        })
    }

    /// Returns a reference to the set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::with_bits(4)?;
    /// assert_eq!(set.len(), 0);
    /// set.insert(1)?;
    /// assert_eq!(set.len(), 1);
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the fixed number of slots, which is also the most elements the
    /// set can hold.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the size exponent the set was created with.
    pub fn bits(&self) -> u32 {
        self.table.bits()
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain this value, `true` is returned.
    /// - If the set already contained this value, `false` is returned.
    ///
    /// Fails with [`Error::TableFull`](crate::Error::TableFull), leaving the
    /// set unchanged, if the value is new and every slot is live.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::Error;
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::with_bits(2)?;
    /// assert_eq!(set.insert(37)?, true);
    /// assert_eq!(set.insert(37)?, false);
    /// assert_eq!(set.len(), 1);
    ///
    /// for v in 1..=3 {
    ///     set.insert(v)?;
    /// }
    /// assert_eq!(set.insert(99), Err(Error::TableFull { capacity: 4 }));
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn insert(&mut self, value: T) -> Result<bool> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value)? {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(true)
            }
        }
    }

    /// Returns `true` if the set contains a value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::with_bits(4)?;
    /// set.insert(1)?;
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn contains(&self, value: &T) -> bool {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value).is_some()
    }

    /// Removes a value from the set. Returns whether the value was
    /// present in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::with_bits(4)?;
    /// set.insert(1)?;
    /// assert_eq!(set.remove(&1), true);
    /// assert_eq!(set.remove(&1), false);
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the value in the set, if any, that is equal to the
    /// given one.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns a reference to the value in the set, if any, that is equal to
    /// the given value.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Adds a value to the set, replacing the existing value, if any, that is
    /// equal to the given one. Returns the replaced value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::with_bits(4)?;
    /// set.insert(1)?;
    /// assert_eq!(set.replace(1)?, Some(1));
    /// assert_eq!(set.replace(2)?, None);
    /// assert_eq!(set.len(), 2);
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn replace(&mut self, value: T) -> Result<Option<T>> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value)? {
            Entry::Occupied(mut entry) => Ok(Some(core::mem::replace(entry.get_mut(), value))),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(None)
            }
        }
    }

    /// Returns an iterator over the values of the set, in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a cursor over the values of the set that can remove the value
    /// it last yielded.
    ///
    /// The cursor yields exactly as many values as the set held when it was
    /// created. See [`Cursor`] for the full contract.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::Error;
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<&str> = HashSet::with_bits(4)?;
    /// set.insert("keep")?;
    /// set.insert("drop")?;
    ///
    /// let mut cursor = set.cursor();
    /// assert_eq!(cursor.remove(), Err(Error::IllegalState));
    /// while cursor.has_next() {
    ///     if *cursor.next()? == "drop" {
    ///         cursor.remove()?;
    ///     }
    /// }
    /// assert_eq!(cursor.next(), Err(Error::NoSuchElement));
    ///
    /// assert_eq!(set.len(), 1);
    /// assert!(set.contains(&"keep"));
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        self.table.cursor()
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all elements `e` for which `f(&e)` returns
    /// `false`. The elements are visited in slot order.
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.table.retain(f);
    }

    /// Inserts every value of `iter`, stopping at the first error.
    ///
    /// Returns `true` if at least one value was newly inserted. Values
    /// inserted before a [`TableFull`](crate::Error::TableFull) stay in the
    /// set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::with_bits(3)?;
    /// assert!(set.try_extend([1, 2, 3])?);
    /// assert!(!set.try_extend([2, 3])?);
    /// assert!(set.try_extend(0..9).is_err());
    /// assert_eq!(set.len(), 8);
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<bool> {
        let mut changed = false;
        for value in iter {
            changed |= self.insert(value)?;
        }
        Ok(changed)
    }

    /// Returns `true` if the set contains no elements in common with `other`.
    pub fn is_disjoint(&self, other: &HashSet<T, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if the set is a subset of another, i.e., `other`
    /// contains at least all the elements in `self`.
    pub fn is_subset(&self, other: &HashSet<T, S>) -> bool {
        if self.len() > other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if the set is a superset of another, i.e., `self`
    /// contains at least all the elements in `other`.
    pub fn is_superset(&self, other: &HashSet<T, S>) -> bool {
        other.is_subset(self)
    }

    /// Returns statistics about slot usage of the underlying table.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Counts elements by probe distance; see
    /// [`HashTable::probe_histogram`].
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table
            .probe_histogram(|v| self.hash_builder.hash_one(v))
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates an empty set with `2^bits` slots using the default hasher
    /// builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_set::Error;
    /// use probe_set::HashSet;
    ///
    /// let set: HashSet<i32> = HashSet::with_bits(10)?;
    /// assert_eq!(set.capacity(), 1024);
    /// assert_eq!(
    ///     HashSet::<i32>::with_bits(32).unwrap_err(),
    ///     Error::InvalidArgument { bits: 32 }
    /// );
    /// # }
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn with_bits(bits: u32) -> Result<Self> {
        Self::with_bits_and_hasher(bits, S::default())
    }
}

/// An iterator over the values of a `HashSet`.
#[derive(Clone)]
pub struct Iter<'a, T> {
    inner: crate::hash_table::Iter<'a, T>,
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

/// A consuming iterator over the values of a `HashSet`.
pub struct IntoIter<T> {
    inner: crate::hash_table::IntoIter<T>,
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

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T, S> IntoIterator for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
