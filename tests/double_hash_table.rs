use keyed_containers::{DoubleHashTable, TableError};
use proptest::prelude::*;
use std::hash::{BuildHasher, Hasher};

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

// Every key hashes to the same fixed value.
#[derive(Clone)]
struct FixedBuildHasher(u64);
struct FixedHasher(u64);
impl BuildHasher for FixedBuildHasher {
    type Hasher = FixedHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FixedHasher(self.0)
    }
}
impl Hasher for FixedHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        self.0
    }
}

fn s(v: &str) -> String {
    v.to_string()
}

#[test]
fn capacity_five_holds_five_keys() {
    let mut t = DoubleHashTable::new(5);
    for k in ["a", "b", "c", "d"] {
        assert_eq!(t.put(s(k), s(k)), Ok(None));
    }
    for k in ["a", "b", "c", "d"] {
        assert_eq!(t.get(k), Ok(&s(k)));
    }
    assert_eq!(t.put(s("e"), s("e")), Ok(None));
    assert_eq!(t.len(), 5);
    assert_eq!(
        t.put(s("f"), s("f")),
        Err(TableError::TableFull { capacity: 5 })
    );
    assert!(!t.contains("f"));
    assert_eq!(t.len(), 5);
}

// FNV-1a of "a" is 0xe40c292c, which is 10 mod 101.
#[test]
fn default_hasher_places_by_plain_fnv1a() {
    let mut t = DoubleHashTable::new(101);
    t.put(s("a"), 1).unwrap();
    assert_eq!(t.iter_indexed().next().map(|(i, _, _)| i), Some(10));
}

// Capacity 10 with hash 5: the path starts at 5 and strides by 5, so it
// only ever visits slots 5 and 0.
#[test]
fn non_prime_capacity_reports_full_early() {
    let mut t: DoubleHashTable<String, i32, FixedBuildHasher> =
        DoubleHashTable::with_hasher(10, FixedBuildHasher(5));
    assert_eq!(t.put(s("a"), 1), Ok(None));
    assert_eq!(t.put(s("b"), 2), Ok(None));
    assert_eq!(t.put(s("c"), 3), Err(TableError::TableFull { capacity: 10 }));
    assert_eq!(t.len(), 2);
    assert!(!t.contains("c"));
    let slots: Vec<usize> = t.iter_indexed().map(|(i, _, _)| i).collect();
    assert_eq!(slots, [0, 5]);
    // Keys already on the path can still be updated.
    assert_eq!(t.put(s("a"), 10), Ok(Some(1)));
}

#[test]
fn put_get_remove_cycle() {
    let mut t = DoubleHashTable::new(101);
    t.put(s("k"), s("v")).unwrap();
    assert_eq!(t.len(), 1);
    assert_eq!(t.put(s("k"), s("w")), Ok(Some(s("v"))));
    assert_eq!(t.len(), 1);
    assert_eq!(t.get("k").map(String::as_str), Ok("w"));
    assert!(t.remove("k"));
    assert!(!t.contains("k"));
    assert!(t.is_empty());
}

// A, B and C share one probe path. Removing A must not hide C.
#[test]
fn removal_keeps_later_chain_members_reachable() {
    let mut t: DoubleHashTable<String, i32, ConstBuildHasher> =
        DoubleHashTable::with_hasher(7, ConstBuildHasher);
    t.put(s("A"), 1).unwrap();
    t.put(s("B"), 2).unwrap();
    t.put(s("C"), 3).unwrap();
    assert!(t.remove("A"));
    assert_eq!(t.get("C"), Ok(&3));
    assert_eq!(t.get("B"), Ok(&2));

    // Re-inserting C must update it rather than claim A's old slot twice.
    assert_eq!(t.put(s("C"), 30), Ok(Some(3)));
    assert_eq!(t.len(), 2);
    assert_eq!(t.put(s("D"), 4), Ok(None));
    assert_eq!(t.iter_indexed().next().map(|(i, k, _)| (i, k.as_str())), Some((0, "D")));
}

#[test]
fn bulk_load_recomputes_placement() {
    let src: Vec<(String, String)> = (0..40).map(|i| (format!("k{i}"), format!("v{i}"))).collect();
    let small = DoubleHashTable::<String, String>::from_pairs(41, src.clone()).unwrap();
    let large = DoubleHashTable::<String, String>::from_pairs(211, small.iter().map(|(k, v)| (k.clone(), v.clone()))).unwrap();
    assert_eq!(large.len(), 40);
    for (k, v) in &src {
        assert_eq!(large.get(k.as_str()), Ok(v));
    }
}

#[test]
fn load_stops_at_first_failure() {
    let mut t: DoubleHashTable<String, i32> = DoubleHashTable::new(2);
    let err = t.load([(s("a"), 1), (s("b"), 2), (s("c"), 3)]).unwrap_err();
    assert_eq!(err, TableError::TableFull { capacity: 2 });
    assert_eq!(t.len(), 2);
}

fn prime_capacity() -> impl Strategy<Value = usize> {
    proptest::sample::select(vec![2usize, 3, 5, 7, 11, 13, 17, 31, 53])
}

// Property: a table of prime capacity accepts exactly `capacity` distinct
// keys, then refuses the next one.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_capacity_bound(cap in prime_capacity(), seed in any::<u32>()) {
        let mut t: DoubleHashTable<String, usize> = DoubleHashTable::new(cap);
        for i in 0..cap {
            prop_assert_eq!(t.put(format!("{seed}-{i}"), i), Ok(None));
        }
        prop_assert_eq!(t.len(), cap);
        prop_assert_eq!(
            t.put(format!("{seed}-extra"), 0),
            Err(TableError::TableFull { capacity: cap })
        );
        for i in 0..cap {
            prop_assert_eq!(t.get(format!("{seed}-{i}").as_str()), Ok(&i));
        }
    }

    // Property: removals interleaved with inserts never lose a live key.
    #[test]
    fn prop_remove_then_reinsert(keys in proptest::collection::btree_set("[a-z]{1,4}", 1..12)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut t: DoubleHashTable<String, usize, ConstBuildHasher> =
            DoubleHashTable::with_hasher(13, ConstBuildHasher);
        for (i, k) in keys.iter().enumerate() {
            t.put(k.clone(), i).unwrap();
        }
        for k in keys.iter().step_by(2) {
            prop_assert!(t.remove(k.as_str()));
        }
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.contains(k.as_str()), i % 2 == 1);
        }
        for (i, k) in keys.iter().enumerate().step_by(2) {
            prop_assert_eq!(t.put(k.clone(), i), Ok(None));
        }
        prop_assert_eq!(t.len(), keys.len());
    }
}
