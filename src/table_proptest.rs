#![cfg(test)]

// Property tests for both hash tables kept inside the crate so they can
// check slot placement through internal accessors.

use crate::cuckoo_table::{CuckooConfig, CuckooTable, Location};
use crate::double_hash_table::DoubleHashTable;
use crate::error::TableError;
use crate::hashing::KeyBytes;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl KeyBytes for Key {
    fn write_key<H: Hasher>(&self, state: &mut H) {
        self.0.write_key(state)
    }
}

// Pool-indexed operations so shrinking moves towards earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// The operations both tables share, so one state machine drives either.
trait Sut {
    fn put(&mut self, k: Key, v: i32) -> Result<Option<i32>, TableError>;
    fn get(&self, k: &str) -> Result<&i32, TableError>;
    fn get_mut(&mut self, k: &str) -> Result<&mut i32, TableError>;
    fn contains(&self, k: &str) -> bool;
    fn remove(&mut self, k: &str) -> bool;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn keys(&self) -> BTreeSet<Key>;
    /// Checks structural placement of every stored key.
    fn check_layout(&self) -> Result<(), TestCaseError>;
    /// Whether a rejected put is consistent with the model.
    fn check_rejection(&self, err: TableError, model_len: usize) -> Result<(), TestCaseError>;
}

impl<S: BuildHasher> Sut for DoubleHashTable<Key, i32, S> {
    fn put(&mut self, k: Key, v: i32) -> Result<Option<i32>, TableError> {
        DoubleHashTable::put(self, k, v)
    }
    fn get(&self, k: &str) -> Result<&i32, TableError> {
        DoubleHashTable::get(self, k)
    }
    fn get_mut(&mut self, k: &str) -> Result<&mut i32, TableError> {
        DoubleHashTable::get_mut(self, k)
    }
    fn contains(&self, k: &str) -> bool {
        DoubleHashTable::contains(self, k)
    }
    fn remove(&mut self, k: &str) -> bool {
        DoubleHashTable::remove(self, k)
    }
    fn clear(&mut self) {
        DoubleHashTable::clear(self)
    }
    fn len(&self) -> usize {
        DoubleHashTable::len(self)
    }
    fn keys(&self) -> BTreeSet<Key> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
    fn check_layout(&self) -> Result<(), TestCaseError> {
        let slots: BTreeSet<usize> = self.iter_indexed().map(|(i, _, _)| i).collect();
        prop_assert_eq!(slots.len(), self.len());
        prop_assert!(self.len() <= self.capacity());
        Ok(())
    }
    fn check_rejection(&self, err: TableError, model_len: usize) -> Result<(), TestCaseError> {
        // Prime capacity: every slot is on every probe path.
        prop_assert_eq!(err, TableError::TableFull { capacity: self.capacity() });
        prop_assert_eq!(model_len, self.capacity());
        Ok(())
    }
}

impl<S: BuildHasher> Sut for CuckooTable<Key, i32, S> {
    fn put(&mut self, k: Key, v: i32) -> Result<Option<i32>, TableError> {
        CuckooTable::put(self, k, v)
    }
    fn get(&self, k: &str) -> Result<&i32, TableError> {
        CuckooTable::get(self, k)
    }
    fn get_mut(&mut self, k: &str) -> Result<&mut i32, TableError> {
        CuckooTable::get_mut(self, k)
    }
    fn contains(&self, k: &str) -> bool {
        CuckooTable::contains(self, k)
    }
    fn remove(&mut self, k: &str) -> bool {
        CuckooTable::remove(self, k)
    }
    fn clear(&mut self) {
        CuckooTable::clear(self)
    }
    fn len(&self) -> usize {
        CuckooTable::len(self)
    }
    fn keys(&self) -> BTreeSet<Key> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
    fn check_layout(&self) -> Result<(), TestCaseError> {
        // Every key sits at one of its two canonical homes.
        for (loc, k, _) in self.iter_located() {
            let homes = self.homes(k.0.as_str());
            let at_home = match loc {
                Location::First(i) => i == homes.first,
                Location::Second(i) => i == homes.second,
            };
            prop_assert!(at_home, "{:?} stored at {:?}, homes {:?}", k, loc, homes);
        }
        Ok(())
    }
    fn check_rejection(&self, err: TableError, model_len: usize) -> Result<(), TestCaseError> {
        match err {
            TableError::TableFull { capacity } => {
                prop_assert_eq!(capacity, 2 * self.capacity());
                prop_assert!(model_len >= capacity);
            }
            TableError::EvictionCycle { .. } => {}
            TableError::KeyNotFound => prop_assert!(false, "put never reports a miss"),
        }
        Ok(())
    }
}

// Property: state-machine equivalence against std::collections::HashMap.
// - A successful put stores or overwrites; a rejected put changes nothing.
// - `get`/`contains` parity with the model, for pool keys and strangers.
// - `remove` reports presence and the key is unreachable afterwards.
// - `iter` yields each live entry exactly once.
// - Layout stays valid and `len` matches the model after each op.
fn run_state_machine<T: Sut>(
    sut: &mut T,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = key_from(pool, i);
                let before = sut.keys();
                match sut.put(k.clone(), v) {
                    Ok(prev) => {
                        prop_assert_eq!(prev, model.insert(k, v));
                    }
                    Err(e) => {
                        sut.check_rejection(e, model.len())?;
                        prop_assert_eq!(sut.keys(), before, "rejected put must not move keys");
                    }
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.get(&k.0), Ok(v)),
                    None => prop_assert_eq!(sut.get(&k.0), Err(TableError::KeyNotFound)),
                }
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k.0), model.remove(&k).is_some());
                prop_assert!(!sut.contains(&k.0));
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains(&s), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match model.get_mut(&k) {
                    Some(mv) => {
                        let v = sut.get_mut(&k.0);
                        prop_assert!(v.is_ok(), "live key should resolve");
                        if let Ok(v) = v {
                            *v = v.saturating_add(d);
                        }
                        *mv = mv.saturating_add(d);
                    }
                    None => prop_assert!(sut.get_mut(&k.0).is_err()),
                }
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::Iterate => {
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(sut.keys(), m_keys);
            }
        }

        sut.check_layout()?;
        prop_assert_eq!(sut.len(), model.len());
    }
    Ok(())
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    // Capacity 7 so the pool regularly fills the table.
    #[test]
    fn prop_double_hash_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: DoubleHashTable<Key, i32> = DoubleHashTable::new(7);
        run_state_machine(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_double_hash_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: DoubleHashTable<Key, i32, ConstBuildHasher> =
            DoubleHashTable::with_hasher(11, ConstBuildHasher);
        run_state_machine(&mut sut, &pool, ops)?;
    }

    #[test]
    fn prop_cuckoo_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: CuckooTable<Key, i32> = CuckooTable::new(5);
        run_state_machine(&mut sut, &pool, ops)?;
    }

    // Every key shares both homes, so a third distinct key must be refused
    // and the refusal must leave the table intact.
    #[test]
    fn prop_cuckoo_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let config = CuckooConfig { capacity: 3, max_evictions: 4 };
        let mut sut: CuckooTable<Key, i32, ConstBuildHasher> =
            CuckooTable::with_config_and_hasher(config, ConstBuildHasher);
        run_state_machine(&mut sut, &pool, ops)?;
    }
}
