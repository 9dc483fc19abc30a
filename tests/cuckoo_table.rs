use keyed_containers::{CuckooConfig, CuckooTable, Location, TableError};
use proptest::prelude::*;

fn s(v: &str) -> String {
    v.to_string()
}

#[test]
fn update_takes_no_eviction() {
    let mut t = CuckooTable::new(10);
    t.put(s("a"), s("1")).unwrap();
    t.put(s("a"), s("2")).unwrap();
    assert_eq!(t.get("a").map(String::as_str), Ok("2"));
    assert_eq!(t.len(), 1);
}

#[test]
fn removed_key_is_absent() {
    let mut t = CuckooTable::new(101);
    t.put(s("k"), 1).unwrap();
    assert!(t.remove("k"));
    assert!(!t.contains("k"));
    assert_eq!(t.get("k"), Err(TableError::KeyNotFound));
    assert!(t.is_empty());
}

#[test]
fn full_check_precedes_eviction() {
    let config = CuckooConfig {
        capacity: 1,
        max_evictions: 1,
    };
    let mut t = CuckooTable::with_config(config);
    t.put(s("a"), 1).unwrap();
    t.put(s("b"), 2).unwrap();
    let err = t.put(s("c"), 3).unwrap_err();
    assert_eq!(err, TableError::TableFull { capacity: 2 });
    assert_eq!(t.len(), 2);
}

// Property: after any sequence of puts, each stored key is at exactly one
// of its homes and every successful put is retrievable.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_each_key_at_one_home(
        cap in 1usize..24,
        bound in 1usize..16,
        keys in proptest::collection::vec("[a-z0-9]{0,6}", 0..48),
    ) {
        let mut t = CuckooTable::with_config(CuckooConfig { capacity: cap, max_evictions: bound });
        let mut stored = std::collections::BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            match t.put(k.clone(), i) {
                Ok(_) => {
                    stored.insert(k.clone(), i);
                }
                Err(TableError::TableFull { capacity }) => prop_assert_eq!(capacity, 2 * cap),
                Err(TableError::EvictionCycle { limit }) => prop_assert_eq!(limit, bound),
                Err(TableError::KeyNotFound) => prop_assert!(false, "put never misses"),
            }
        }
        prop_assert_eq!(t.len(), stored.len());
        let mut seen = std::collections::BTreeSet::new();
        for (loc, k, _) in t.iter_located() {
            prop_assert!(seen.insert(k.clone()), "{} stored twice", k);
            let homes = t.homes(k.as_str());
            match loc {
                Location::First(i) => prop_assert_eq!(i, homes.first),
                Location::Second(i) => prop_assert_eq!(i, homes.second),
            }
        }
        for (k, v) in &stored {
            prop_assert_eq!(t.get(k.as_str()), Ok(v));
        }
    }
}
