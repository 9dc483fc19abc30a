use keyed_containers::{Set, TableError};

#[test]
fn add_is_idempotent() {
    let mut set = Set::new(101);
    assert_eq!(set.add("x".to_string()), Ok(true));
    assert_eq!(set.add("x".to_string()), Ok(false));
    assert_eq!(set.len(), 1);
    assert!(set.remove("x"));
    assert!(!set.contains("x"));
    assert!(set.is_empty());
}

#[test]
fn full_set_rejects_new_members() {
    let mut set = Set::new(3);
    for k in ["a", "b", "c"] {
        set.add(k).unwrap();
    }
    assert_eq!(set.add("d"), Err(TableError::TableFull { capacity: 3 }));
    assert_eq!(set.to_string().matches(", ").count(), 2);
}

#[test]
fn json_projection_uses_empty_values() {
    let mut set = Set::new(11);
    set.add("only".to_string()).unwrap();
    assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"only":""}"#);
}
