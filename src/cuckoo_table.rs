//! CuckooTable: two fixed-size slot arrays with bounded eviction chains.
//!
//! Every key has exactly two canonical homes, `first[h1(key)]` and
//! `second[h2(key)]` (see [`CuckooHomes`]). Lookups inspect those two slots
//! and nothing else. An insert that finds its first home taken evicts the
//! occupant, which moves to its own second home, possibly evicting again.
//!
//! Invariants
//! - A stored key sits at one of its two homes, never both, never elsewhere.
//! - `len() <= 2 * capacity()`.
//! - A failed `put` leaves both arrays exactly as they were: the eviction
//!   chain records every slot it swapped and replays the swaps in reverse
//!   before reporting [`TableError::EvictionCycle`].
//!
//! The chain is a loop, not recursion. Its length is bounded by
//! [`CuckooConfig::max_evictions`] rounds (one round = one eviction from
//! each array).

use crate::error::TableError;
use crate::guard::ProbeGuard;
use crate::hashing::{hash32, BuildFnv32, CuckooHomes, KeyBytes, DEFAULT_CAPACITY};
use crate::slot::{empty_slots, Entry, Slot};
use core::borrow::Borrow;
use core::fmt;
use core::hash::BuildHasher;
use serde::{Deserialize, Serialize};

/// Eviction rounds allowed before an insert gives up.
pub const DEFAULT_MAX_EVICTIONS: usize = 500;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuckooConfig {
    /// Slots per array; zero selects the default.
    pub capacity: usize,
    /// Rounds of the eviction chain; zero is treated as one.
    pub max_evictions: usize,
}

impl Default for CuckooConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_evictions: DEFAULT_MAX_EVICTIONS,
        }
    }
}

/// Which array, and which slot of it, holds a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Location {
    First(usize),
    Second(usize),
}

impl Location {
    #[inline]
    fn split(self) -> (usize, usize) {
        match self {
            Location::First(i) => (0, i),
            Location::Second(i) => (1, i),
        }
    }

    #[inline]
    fn join(side: usize, index: usize) -> Self {
        if side == 0 {
            Location::First(index)
        } else {
            Location::Second(index)
        }
    }
}

#[derive(Clone, Debug)]
pub struct CuckooTable<K, V, S = BuildFnv32> {
    tables: [Vec<Slot<K, V>>; 2],
    count: usize,
    config: CuckooConfig,
    hasher: S,
    guard: ProbeGuard,
}

impl<K, V> CuckooTable<K, V>
where
    K: Eq + KeyBytes,
{
    /// Two arrays of `capacity` slots each, default eviction bound.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(CuckooConfig {
            capacity,
            ..CuckooConfig::default()
        })
    }

    pub fn with_config(config: CuckooConfig) -> Self {
        Self::with_config_and_hasher(config, BuildFnv32)
    }
}

impl<K, V> Default for CuckooTable<K, V>
where
    K: Eq + KeyBytes,
{
    fn default() -> Self {
        Self::with_config(CuckooConfig::default())
    }
}

impl<K, V, S> CuckooTable<K, V, S>
where
    K: Eq + KeyBytes,
    S: BuildHasher,
{
    pub fn with_config_and_hasher(config: CuckooConfig, hasher: S) -> Self {
        let config = CuckooConfig {
            capacity: if config.capacity == 0 {
                DEFAULT_CAPACITY
            } else {
                config.capacity
            },
            max_evictions: config.max_evictions.max(1),
        };
        Self {
            tables: [empty_slots(config.capacity), empty_slots(config.capacity)],
            count: 0,
            config,
            hasher,
            guard: ProbeGuard::new(),
        }
    }

    /// Builds a table and bulk-loads `pairs` into it.
    pub fn from_pairs<I>(config: CuckooConfig, pairs: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        S: Default,
    {
        let mut table = Self::with_config_and_hasher(config, S::default());
        table.load(pairs)?;
        Ok(table)
    }

    /// The two canonical homes of `q` in this table.
    pub fn homes<Q>(&self, q: &Q) -> CuckooHomes
    where
        Q: ?Sized + KeyBytes,
    {
        CuckooHomes::new(hash32(&self.hasher, q), self.capacity())
    }

    fn find<Q>(&self, q: &Q) -> Option<Location>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let homes = self.homes(q);
        if self.tables[0][homes.first].holds(q) {
            Some(Location::First(homes.first))
        } else if self.tables[1][homes.second].holds(q) {
            Some(Location::Second(homes.second))
        } else {
            None
        }
    }

    /// Where `q` is stored, if anywhere.
    pub fn locate<Q>(&self, q: &Q) -> Option<Location>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("locate");
        self.find(q)
    }

    /// Inserts `key`, or overwrites its value in place if it is already at
    /// one of its homes. Returns the previous value on overwrite.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let _g = self.guard.enter("put");
        let limit = 2 * self.capacity();
        if self.count >= limit {
            log::debug!("cuckoo table full: {} of {} slots", self.count, limit);
            return Err(TableError::TableFull { capacity: limit });
        }
        if let Some(loc) = self.find(&key) {
            let (side, index) = loc.split();
            let entry = self.tables[side][index]
                .entry_mut()
                .ok_or(TableError::KeyNotFound)?;
            return Ok(Some(core::mem::replace(&mut entry.value, value)));
        }
        let added = evict_chain(
            &mut self.tables,
            &self.hasher,
            self.config.max_evictions,
            Entry { key, value },
        )?;
        if added {
            self.count += 1;
        }
        Ok(None)
    }

    pub fn get<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("get");
        let (side, index) = self.find(q).ok_or(TableError::KeyNotFound)?.split();
        self.tables[side][index]
            .entry()
            .map(|e| &e.value)
            .ok_or(TableError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("get_mut");
        let (side, index) = self.find(q).ok_or(TableError::KeyNotFound)?.split();
        self.tables[side][index]
            .entry_mut()
            .map(|e| &mut e.value)
            .ok_or(TableError::KeyNotFound)
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("contains");
        self.find(q).is_some()
    }

    /// Clears whichever home holds `q`. Returns whether an entry was removed.
    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        let _g = self.guard.enter("remove");
        match self.find(q) {
            Some(loc) => {
                let (side, index) = loc.split();
                self.tables[side][index] = Slot::Empty;
                self.count -= 1;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        let _g = self.guard.enter("clear");
        for slot in self.tables.iter_mut().flat_map(|t| t.iter_mut()) {
            *slot = Slot::Empty;
        }
        self.count = 0;
    }

    /// Re-inserts each pair through [`put`](Self::put); stops at the first
    /// failure.
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

/// Pushes `entry` into `tables`, evicting occupants until one lands in an
/// empty slot. Returns `Ok(true)` when a new entry was added and `Ok(false)`
/// when the chain ended on a slot already holding the carried key.
fn evict_chain<K, V, S>(
    tables: &mut [Vec<Slot<K, V>>; 2],
    hasher: &S,
    max_rounds: usize,
    entry: Entry<K, V>,
) -> Result<bool, TableError>
where
    K: Eq + KeyBytes,
    S: BuildHasher,
{
    let capacity = tables[0].len();
    let mut carried = entry;
    let mut trail: Vec<(usize, usize)> = Vec::new();

    for round in 0..max_rounds {
        for side in 0..2 {
            let homes = CuckooHomes::new(hash32(hasher, &carried.key), capacity);
            let index = if side == 0 { homes.first } else { homes.second };
            let slot = &mut tables[side][index];
            match slot.entry_mut() {
                Some(occupant) if occupant.key == carried.key => {
                    occupant.value = carried.value;
                    return Ok(false);
                }
                Some(occupant) => {
                    core::mem::swap(occupant, &mut carried);
                    trail.push((side, index));
                }
                None => {
                    *slot = Slot::Occupied(carried);
                    return Ok(true);
                }
            }
        }
        log::trace!("cuckoo eviction round {} displaced {} entries", round + 1, trail.len());
    }

    // Undo: each recorded swap is its own inverse.
    for &(side, index) in trail.iter().rev() {
        if let Some(occupant) = tables[side][index].entry_mut() {
            core::mem::swap(occupant, &mut carried);
        }
    }
    log::debug!(
        "cuckoo eviction chain exceeded {} rounds; rolled back {} swaps",
        max_rounds,
        trail.len()
    );
    Err(TableError::EvictionCycle { limit: max_rounds })
}

impl<K, V, S> CuckooTable<K, V, S> {
    /// Slots per array; the table holds at most twice this many entries.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> CuckooConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Live entries, first array then second, each in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.tables[0].iter().chain(self.tables[1].iter()),
        }
    }

    /// Live entries with their location.
    pub fn iter_located(&self) -> impl Iterator<Item = (Location, &K, &V)> + '_ {
        self.tables.iter().enumerate().flat_map(|(side, table)| {
            table.iter().enumerate().filter_map(move |(index, slot)| {
                slot.entry()
                    .map(|e| (Location::join(side, index), &e.key, &e.value))
            })
        })
    }
}

pub struct Iter<'a, K, V> {
    slots: core::iter::Chain<core::slice::Iter<'a, Slot<K, V>>, core::slice::Iter<'a, Slot<K, V>>>,
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

impl<'a, K, V, S> IntoIterator for &'a CuckooTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Display for CuckooTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CuckooTable {{")?;
        for (title, table) in ["Table 1", "Table 2"].iter().zip(self.tables.iter()) {
            writeln!(f, "  {title}:")?;
            for (index, slot) in table.iter().enumerate() {
                if let Some(e) = slot.entry() {
                    writeln!(f, "    [{index}] {} => {}", e.key, e.value)?;
                }
            }
        }
        write!(f, "}} (size: {})", self.count)
    }
}
