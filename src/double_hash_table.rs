//! DoubleHashTable: fixed-capacity open addressing with a hash-derived stride.
//!
//! One contiguous slot array. A key's probe sequence is
//! `(h1 + i * h2) mod capacity` for `i in 0..capacity`, where both `h1` and
//! `h2` come from the same 32-bit hash (see [`DoubleProbe`]). The table never
//! grows: once `len() == capacity()` every insert of a new key fails with
//! [`TableError::TableFull`] and the caller decides whether to rebuild.
//!
//! Removal leaves a tombstone. Lookups probe past tombstones, so an entry
//! that was placed further along a collision chain stays reachable after an
//! earlier link of that chain is removed. Inserts reuse the first tombstone
//! they passed once they have proven the key is absent.
//!
//! With a prime capacity every stride is coprime to the capacity and the
//! probe sequence visits every slot. Other capacities may report
//! `TableFull` before every slot is used.

use crate::error::TableError;
use crate::guard::ProbeGuard;
use crate::hashing::{hash32, BuildFnv32, DoubleProbe, KeyBytes, DEFAULT_CAPACITY};
use crate::slot::{empty_slots, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::BuildHasher;

#[derive(Clone, Debug)]
pub struct DoubleHashTable<K, V, S = BuildFnv32> {
    slots: Vec<Slot<K, V>>,
    count: usize,
    hasher: S,
    guard: ProbeGuard,
}

/// Where a probe for a key ended.
enum Probe {
    Found(usize),
    /// Key absent; index of the slot an insert would use.
    Vacant(usize),
    /// Key absent and no usable slot on its probe path.
    Exhausted,
}

impl<K, V> DoubleHashTable<K, V>
where
    K: Eq + KeyBytes,
{
    /// Creates a table with `capacity` slots; zero selects the default (101).
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, BuildFnv32)
    }
}

impl<K, V> Default for DoubleHashTable<K, V>
where
    K: Eq + KeyBytes,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V, S> DoubleHashTable<K, V, S>
where
    K: Eq + KeyBytes,
    S: BuildHasher,
{
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Self {
            slots: empty_slots(capacity),
            count: 0,
            hasher,
            guard: ProbeGuard::new(),
        }
    }

    /// Builds a table and bulk-loads `pairs` into it.
    pub fn from_pairs<I>(capacity: usize, pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        S: Default,
    {
        let mut table = Self::with_hasher(capacity, S::default());
        table.load(pairs)?;
        Ok(table)
    }

    fn probe<Q>(&self, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let capacity = self.capacity();
        let path = DoubleProbe::new(hash32(&self.hasher, q), capacity);
        let mut reusable = None;
        for index in path.sequence(capacity) {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(index)),
                Slot::Deleted => {
                    reusable.get_or_insert(index);
                }
                Slot::Occupied(e) if e.key.borrow() == q => return Probe::Found(index),
                Slot::Occupied(_) => {}
            }
        }
        match reusable {
            Some(index) => Probe::Vacant(index),
            None => Probe::Exhausted,
        }
    }

    /// Inserts `key`, or overwrites its value in place if it is already
    /// present. Returns the previous value on overwrite.
    ///
    /// Fails with `TableFull` whenever the table already holds `capacity`
    /// entries, even if `key` is one of them.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let _g = self.guard.enter("put");
        let capacity = self.capacity();
        if self.count >= capacity {
            log::debug!("double-hash table full: {} of {} slots", self.count, capacity);
            return Err(TableError::TableFull { capacity });
        }
        match self.probe(&key) {
            Probe::Found(index) => {
                let entry = self.slots[index]
                    .entry_mut()
                    .ok_or(TableError::KeyNotFound)?;
                Ok(Some(core::mem::replace(&mut entry.value, value)))
            }
            Probe::Vacant(index) => {
                self.slots[index] = Slot::occupied(key, value);
                self.count += 1;
                Ok(None)
            }
            Probe::Exhausted => {
                log::debug!(
                    "double-hash probe exhausted after {} slots with {} live entries",
                    capacity,
                    self.count
                );
                Err(TableError::TableFull { capacity })
            }
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("get");
        match self.probe(q) {
            Probe::Found(index) => self.slots[index]
                .entry()
                .map(|e| &e.value)
                .ok_or(TableError::KeyNotFound),
            Probe::Vacant(_) | Probe::Exhausted => Err(TableError::KeyNotFound),
        }
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("get_mut");
        match self.probe(q) {
            Probe::Found(index) => self.slots[index]
                .entry_mut()
                .map(|e| &mut e.value)
                .ok_or(TableError::KeyNotFound),
            Probe::Vacant(_) | Probe::Exhausted => Err(TableError::KeyNotFound),
        }
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("contains");
        matches!(self.probe(q), Probe::Found(_))
    }

    /// Removes `q` if present, leaving a tombstone. Returns whether an entry
    /// was removed.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("remove");
        match self.probe(q) {
            Probe::Found(index) => {
                self.slots[index] = Slot::Deleted;
                self.count -= 1;
                true
            }
            Probe::Vacant(_) | Probe::Exhausted => false,
        }
    }

    /// Empties every slot (tombstones included) without shrinking storage.
    pub fn clear(&mut self) {
        let _g = self.guard.enter("clear");
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.count = 0;
    }

    /// Re-inserts each pair through [`put`](Self::put). Placement is
    /// recomputed, so the source order and slot layout do not matter.
    /// Stops at the first failure; pairs loaded before it stay.
    pub fn load<I>(&mut self, pairs: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.put(key, value)?;
        }
        Ok(())
    }
}

impl<K, V, S> DoubleHashTable<K, V, S> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Live entries in slot order. The order is stable while the table is
    /// not modified.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Live entries with the slot index each one occupies.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &K, &V)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.entry().map(|e| (i, &e.key, &e.value)))
    }
}

/// Iterator over live entries of a [`DoubleHashTable`].
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|s| s.entry().map(|e| (&e.key, &e.value)))
    }
}

impl<'a, K, V, S> IntoIterator for &'a DoubleHashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Display for DoubleHashTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DoubleHashTable {{")?;
        for (index, key, value) in self.iter_indexed() {
            writeln!(f, "  [{index}] {key} => {value}")?;
        }
        write!(f, "}} (size: {})", self.count)
    }
}
