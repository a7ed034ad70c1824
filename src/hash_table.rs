//! The raw open-addressing table.
//!
//! [`HashTable`] stores values in a power-of-two array of slots and resolves
//! collisions by linear probing. Removal leaves a tombstone behind so that
//! probe chains running through the removed slot stay intact. The table never
//! grows: once every slot holds a live value, inserts fail with
//! [`Error::TableFull`].
//!
//! Like `hashbrown::HashTable`, the table does not hash anything itself.
//! Every operation takes the precomputed `u64` hash of the value it is looking
//! for together with an equality predicate. [`HashSet`](crate::HashSet) wraps
//! this with a `BuildHasher`.

use alloc::boxed::Box;
#[cfg(feature = "stats")]
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;

use crate::error::Error;
use crate::error::Result;

/// Smallest accepted size exponent; the smallest table has four slots.
pub const MIN_BITS: u32 = 2;

/// Largest accepted size exponent.
pub const MAX_BITS: u32 = 31;

/// A single storage cell.
///
/// Slots move `Empty -> Occupied` on insert and `Occupied -> Tombstone` on
/// removal. A slot never returns to `Empty`; a later insert may overwrite a
/// `Tombstone`.
#[derive(Clone, Debug)]
enum Slot<V> {
    Empty,
    Occupied(V),
    Tombstone,
}

impl<V> Slot<V> {
    #[inline(always)]
    fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    #[inline(always)]
    fn fill(&mut self, value: V) -> &mut V {
        *self = Slot::Occupied(value);
        match self {
            Slot::Occupied(value) => value,
            Slot::Empty | Slot::Tombstone => unreachable!("slot was just filled"),
        }
    }
}

/// Outcome of walking a probe chain for insertion.
enum Probe {
    /// A live value matched the predicate at this index.
    Found(usize),
    /// No match; this is the slot an insert should write.
    Vacant(usize),
}

/// One full ring of slot indices starting at `start`.
#[inline(always)]
fn probe_sequence(start: usize, mask: usize) -> impl Iterator<Item = usize> {
    (0..=mask).map(move |step| start.wrapping_add(step) & mask)
}

/// Debug statistics for hash table analysis.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of live elements
    pub populated: usize,
    /// Total number of slots
    pub capacity: usize,
    /// Slots holding a tombstone
    pub tombstones: usize,
    /// Slots never written
    pub empty: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
}

#[cfg(feature = "stats")]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Tombstones: {} ({:.2}% of slots)",
            self.tombstones,
            self.tombstones as f64 / self.capacity as f64 * 100.0
        );
        println!("Never written: {}", self.empty);
    }
}

/// A fixed-capacity hash table using linear probing and tombstone deletion.
///
/// `HashTable<V>` holds `2^bits` slots. Each operation takes the hash of the
/// value it targets and an equality predicate; the probe starts at the low
/// `bits` bits of the hash and walks forward, wrapping at the end of storage.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use probe_set::hash_table::Entry;
/// # use probe_set::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_bits(4)?;
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123)? {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.len(), 1);
/// # Ok::<(), probe_set::Error>(())
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Box<[Slot<V>]>,
    bits: u32,
    populated: usize,
}

impl<V: Debug> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("bits", &self.bits)
            .field("populated", &self.populated)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates a table with `2^bits` empty slots.
    ///
    /// Fails with [`Error::InvalidArgument`] unless `bits` lies in
    /// [`MIN_BITS`]`..=`[`MAX_BITS`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_set::Error;
    /// # use probe_set::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_bits(8)?;
    /// assert_eq!(table.capacity(), 256);
    ///
    /// assert_eq!(
    ///     HashTable::<String>::with_bits(1).unwrap_err(),
    ///     Error::InvalidArgument { bits: 1 }
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_bits(bits: u32) -> Result<Self> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            debug_event!(bits, "rejected table size exponent");
            return Err(Error::InvalidArgument { bits });
        }

        let capacity = 1usize << bits;
        let slots = (0..capacity).map(|_| Slot::Empty).collect();
        trace_event!(bits, capacity, "allocated open-addressing table");

        Ok(Self {
            slots,
            bits,
            populated: 0,
        })
    }

    /// Returns the size exponent this table was created with.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Returns the number of slots. This never changes over the table's
    /// lifetime.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Probe start for `hash`: its low `bits` bits.
    #[inline(always)]
    fn starting_index(&self, hash: u64) -> usize {
        hash as usize & self.mask()
    }

    /// Walks the probe chain of `hash` and returns the index of the live
    /// value matching `eq`.
    ///
    /// Tombstones and non-matching values are stepped over. The walk ends at
    /// the first `Empty` slot or after one full ring.
    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        for index in probe_sequence(self.starting_index(hash), self.mask()) {
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(value) if eq(value) => return Some(index),
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
        }
        None
    }

    /// Like `find_index`, but also picks the slot an insert would use: the
    /// first tombstone on the chain, else the `Empty` slot ending it.
    fn locate(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Probe> {
        let mut reusable = None;
        for index in probe_sequence(self.starting_index(hash), self.mask()) {
            match &self.slots[index] {
                Slot::Empty => return Ok(Probe::Vacant(reusable.unwrap_or(index))),
                Slot::Occupied(value) if eq(value) => return Ok(Probe::Found(index)),
                Slot::Occupied(_) => {}
                Slot::Tombstone => {
                    reusable.get_or_insert(index);
                }
            }
        }

        match reusable {
            Some(index) => Ok(Probe::Vacant(index)),
            None => {
                debug_event!(
                    capacity = self.capacity(),
                    populated = self.populated,
                    "probe wrapped without finding a free slot"
                );
                Err(Error::TableFull {
                    capacity: self.capacity(),
                })
            }
        }
    }

    #[inline(always)]
    fn occupied(&self, index: usize) -> &V {
        match &self.slots[index] {
            Slot::Occupied(value) => value,
            Slot::Empty | Slot::Tombstone => unreachable!("index {index} is not a live slot"),
        }
    }

    #[inline(always)]
    fn occupied_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Slot::Occupied(value) => value,
            Slot::Empty | Slot::Tombstone => unreachable!("index {index} is not a live slot"),
        }
    }

    /// Replaces the live value at `index` with a tombstone and returns it.
    fn bury(&mut self, index: usize) -> V {
        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(value) => {
                self.populated -= 1;
                value
            }
            Slot::Empty | Slot::Tombstone => unreachable!("index {index} is not a live slot"),
        }
    }

    /// Finds the live value matching `eq` on the probe chain of `hash`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_bits(4)?;
    /// table.entry(7, |v: &u64| *v == 7)?.or_insert(7);
    ///
    /// assert_eq!(table.find(7, |v| *v == 7), Some(&7));
    /// assert_eq!(table.find(8, |v| *v == 8), None);
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        Some(self.occupied(index))
    }

    /// Finds the live value matching `eq` and returns a mutable reference.
    ///
    /// Changing the value in a way that changes its hash leaves it unreachable
    /// from its probe chain.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        Some(self.occupied_mut(index))
    }

    /// Gets the entry for the value matching `eq` on the probe chain of
    /// `hash`.
    ///
    /// The whole chain is checked for a match before a slot is chosen, so a
    /// value stored past a tombstone is still found. A vacant entry writes
    /// into the first tombstone on the chain if there is one, otherwise into
    /// the `Empty` slot that ends the chain.
    ///
    /// Fails with [`Error::TableFull`] when the probe covers every slot, finds
    /// no match, and every slot is live. The table is not modified on
    /// failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_set::Error;
    /// # use probe_set::hash_table::Entry;
    /// # use probe_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_bits(2)?;
    /// for v in 0..4u64 {
    ///     match table.entry(v, |x: &u64| *x == v)? {
    ///         Entry::Vacant(entry) => {
    ///             entry.insert(v);
    ///         }
    ///         Entry::Occupied(_) => unreachable!(),
    ///     }
    /// }
    ///
    /// assert!(matches!(table.entry(3, |x| *x == 3)?, Entry::Occupied(_)));
    /// assert_eq!(
    ///     table.entry(4, |x| *x == 4).err(),
    ///     Some(Error::TableFull { capacity: 4 })
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Entry<'_, V>> {
        Ok(match self.locate(hash, eq)? {
            Probe::Found(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Probe::Vacant(index) => Entry::Vacant(VacantEntry { table: self, index }),
        })
    }

    /// Removes the live value matching `eq` and returns it, leaving a
    /// tombstone in its slot.
    ///
    /// Returns `None`, without touching the table, if no value on the probe
    /// chain of `hash` matches.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_bits(4)?;
    /// table.entry(1, |v: &u64| *v == 1)?.or_insert(1);
    ///
    /// assert_eq!(table.remove(1, |v| *v == 1), Some(1));
    /// assert_eq!(table.remove(1, |v| *v == 1), None);
    /// assert!(table.is_empty());
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        Some(self.bury(index))
    }

    /// Returns an iterator over the live values in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns a cursor that walks the live values in slot order and can
    /// remove the value it last yielded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use probe_set::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_bits(3)?;
    /// for v in 0..6u64 {
    ///     table.entry(v, |x: &u64| *x == v)?.or_insert(v);
    /// }
    ///
    /// let mut cursor = table.cursor();
    /// while cursor.has_next() {
    ///     if cursor.next()? % 2 == 0 {
    ///         cursor.remove()?;
    ///     }
    /// }
    ///
    /// assert_eq!(table.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    /// # Ok::<(), probe_set::Error>(())
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, V> {
        Cursor {
            target: self.populated,
            table: self,
            raw_index: 0,
            yielded: 0,
            current: None,
        }
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// Removed values leave tombstones, exactly as [`remove`](Self::remove)
    /// does.
    pub fn retain(&mut self, mut f: impl FnMut(&V) -> bool) {
        let mut cursor = self.cursor();
        while let Ok(value) = cursor.next() {
            if !f(value) && cursor.remove().is_err() {
                break;
            }
        }
    }

    /// Returns statistics about slot usage.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> DebugStats {
        let tombstones = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Tombstone))
            .count();
        let empty = self.capacity() - self.populated - tombstones;

        DebugStats {
            populated: self.populated,
            capacity: self.capacity(),
            tombstones,
            empty,
            load_factor: self.populated as f64 / self.capacity() as f64,
        }
    }

    /// Counts live values by probe distance.
    ///
    /// Entry `d` of the result is the number of values stored `d` slots after
    /// their starting index. `hasher` must return the same hash that was used
    /// to insert each value.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self, hasher: impl Fn(&V) -> u64) -> Vec<usize> {
        let mut histogram = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied(value) = slot {
                let start = self.starting_index(hasher(value));
                let distance = index.wrapping_sub(start) & self.mask();
                if histogram.len() <= distance {
                    histogram.resize(distance + 1, 0);
                }
                histogram[distance] += 1;
            }
        }
        histogram
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            slots: self.slots.into_vec().into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single slot of a [`HashTable`], either live or vacant.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A live slot holding a matching value.
    Occupied(OccupiedEntry<'a, V>),
    /// A slot an insert may write.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

/// A vacant slot chosen by [`HashTable::entry`].
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Writes `value` into the slot and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let index = self.index;
        self.table.populated += 1;
        self.table.slots[index].fill(value)
    }
}

/// A live slot found by [`HashTable::entry`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.table.occupied(self.index)
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.occupied_mut(self.index)
    }

    /// Converts the entry into a mutable reference tied to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut V {
        let index = self.index;
        self.table.occupied_mut(index)
    }

    /// Removes the value, leaving a tombstone, and returns it.
    pub fn remove(self) -> V {
        self.table.bury(self.index)
    }
}

/// An iterator over the live values of a [`HashTable`], in slot order.
///
/// This struct is created by [`HashTable::iter`].
#[derive(Clone)]
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// An owning iterator over the values of a [`HashTable`], in slot order.
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied(value) = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

/// A removing cursor over the live values of a [`HashTable`].
///
/// The cursor makes a single pass over the slots in index order. The number
/// of values it yields is fixed when it is created: it is the table's length
/// at that moment, and removing through the cursor does not change it.
/// Removals only tombstone slots the scan has already passed, so the live
/// values ahead of the scan always account for the rest of that count.
///
/// The cursor holds the table's exclusive borrow, so nothing else can modify
/// the table during a traversal.
///
/// This struct is created by [`HashTable::cursor`].
pub struct Cursor<'a, V> {
    table: &'a mut HashTable<V>,
    target: usize,
    raw_index: usize,
    yielded: usize,
    current: Option<usize>,
}

impl<V> Cursor<'_, V> {
    /// Returns `true` while fewer values have been yielded than the table
    /// held when the cursor was created.
    pub fn has_next(&self) -> bool {
        self.target != 0 && self.yielded != self.target
    }

    /// Number of values still to be yielded.
    pub fn remaining(&self) -> usize {
        self.target - self.yielded
    }

    /// Advances to the next live slot and returns its value.
    ///
    /// Fails with [`Error::NoSuchElement`] once [`has_next`](Self::has_next)
    /// is `false`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&V> {
        if !self.has_next() {
            return Err(Error::NoSuchElement);
        }

        let offset = self.table.slots[self.raw_index..]
            .iter()
            .position(Slot::is_occupied)
            .ok_or(Error::NoSuchElement)?;
        let index = self.raw_index + offset;

        self.raw_index = index + 1;
        self.yielded += 1;
        self.current = Some(index);
        Ok(self.table.occupied(index))
    }

    /// Returns the value last yielded by [`next`](Self::next), unless it has
    /// since been removed.
    pub fn current(&self) -> Option<&V> {
        self.current.map(|index| self.table.occupied(index))
    }

    /// Removes the value last yielded by [`next`](Self::next), leaving a
    /// tombstone, and returns it.
    ///
    /// Fails with [`Error::IllegalState`] if `next` has not been called yet,
    /// or if the value it yielded was already removed.
    pub fn remove(&mut self) -> Result<V> {
        let index = self.current.take().ok_or(Error::IllegalState)?;
        Ok(self.table.bury(index))
    }
}
