use keyed_containers::{CommandError, ContainerManager, CuckooConfig, ManagerConfig, Outcome, TableError};

fn out(m: &mut ContainerManager, line: &str) -> String {
    match m.execute(line) {
        Ok(Outcome::Output(s)) => s,
        other => panic!("{line}: unexpected {other:?}"),
    }
}

fn path_str(dir: &tempfile::TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[test]
fn sequences_through_commands() {
    let mut m = ContainerManager::default();
    out(&mut m, "MPUSH a 1");
    out(&mut m, "MPUSH a 3");
    assert_eq!(out(&mut m, "MINSERT a 1 2"), "inserted 2 at 1");
    assert_eq!(out(&mut m, "MPRINT a"), "[1, 2, 3]");
    assert_eq!(out(&mut m, "MSET a 0 9"), "replaced 1 with 9");
    assert_eq!(out(&mut m, "MDEL a 2"), "removed 3");
    assert_eq!(out(&mut m, "MGET a 1"), "2");

    out(&mut m, "SPUSH s 1");
    out(&mut m, "SPUSH s 2");
    assert_eq!(out(&mut m, "SPEEK s"), "2");
    assert_eq!(out(&mut m, "SPOP s"), "2");

    out(&mut m, "QPUSH q 1");
    out(&mut m, "QPUSH q 2");
    assert_eq!(out(&mut m, "QPOP q"), "1");
    assert_eq!(out(&mut m, "QPRINT q"), "[2]");

    out(&mut m, "LPUSHT l 2");
    out(&mut m, "LPUSHH l 1");
    out(&mut m, "LPUSHT l 3");
    assert_eq!(out(&mut m, "LFIND l 3"), "true");
    assert_eq!(out(&mut m, "LDEL l 2"), "removed 2");
    assert_eq!(out(&mut m, "LDEL l 2"), "not found");
    assert_eq!(out(&mut m, "LPRINT l"), "[1, 3]");

    out(&mut m, "DPUSHH d 5");
    out(&mut m, "DPUSHH d 4");
    assert_eq!(out(&mut m, "DPRINT d"), "[4, 5]");
    assert_eq!(out(&mut m, "DFIND d 6"), "false");
}

#[test]
fn keyed_containers_through_commands() {
    let mut m = ContainerManager::default();
    assert_eq!(out(&mut m, "HPUT h k v"), "added k => v");
    assert_eq!(out(&mut m, "HPUT h k w"), "updated k => w");
    assert_eq!(out(&mut m, "HGET h k"), "w");
    assert_eq!(out(&mut m, "HDEL h k"), "removed k");
    assert!(matches!(
        m.execute("HGET h k"),
        Err(CommandError::Table(TableError::KeyNotFound))
    ));

    assert_eq!(out(&mut m, "CPUT c a 1"), "added a => 1");
    assert_eq!(out(&mut m, "CPUT c a 2"), "updated a => 2");
    assert_eq!(out(&mut m, "CGET c a"), "2");
    assert_eq!(m.cuckoo("c").map(|t| t.len()), Some(1));

    assert_eq!(out(&mut m, "SETADD s x"), "added x");
    assert_eq!(out(&mut m, "SETADD s x"), "x already present");
    assert_eq!(out(&mut m, "SET_AT s x"), "true");
    assert_eq!(out(&mut m, "SETDEL s x"), "removed x");
    assert_eq!(out(&mut m, "SET_AT s x"), "false");
    assert_eq!(out(&mut m, "SETPRINT s"), "{} (size: 0)");
}

#[test]
fn errors_leave_manager_usable() {
    let mut m = ContainerManager::default();
    assert!(matches!(m.execute("FROB x"), Err(CommandError::UnknownCommand(_))));
    assert!(matches!(m.execute("MPUSH a"), Err(CommandError::Usage(_))));
    assert!(matches!(m.execute("MPUSH a one"), Err(CommandError::InvalidNumber(_))));
    assert!(matches!(
        m.execute("SPOP nothing"),
        Err(CommandError::UnknownContainer { kind: "stack", .. })
    ));
    out(&mut m, "SPUSH s 1");
    out(&mut m, "SPOP s");
    assert!(matches!(m.execute("SPOP s"), Err(CommandError::Container(_))));
    assert!(matches!(m.execute("MGET s 0"), Err(CommandError::UnknownContainer { .. })));
    assert_eq!(out(&mut m, "MPUSH a 1"), "added 1");
}

#[test]
fn configured_sizes_apply_on_first_use() {
    let config = ManagerConfig {
        table_capacity: 3,
        cuckoo: CuckooConfig {
            capacity: 7,
            max_evictions: 4,
        },
        ..ManagerConfig::default()
    };
    let mut m = ContainerManager::new(config);
    out(&mut m, "HPUT h a 1");
    out(&mut m, "CPUT c a 1");
    assert_eq!(m.hashmap("h").map(|t| t.capacity()), Some(3));
    assert_eq!(m.cuckoo("c").map(|t| t.config().max_evictions), Some(4));
    out(&mut m, "HPUT h b 1");
    out(&mut m, "HPUT h c 1");
    assert!(matches!(
        m.execute("HPUT h d 1"),
        Err(CommandError::Table(TableError::TableFull { capacity: 3 }))
    ));
}

#[test]
fn save_all_and_load_all_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let file = path_str(&dir, "all.json");

    let mut m = ContainerManager::default();
    for line in [
        "MPUSH arr 1", "MPUSH arr 2", "QPUSH q 7", "DPUSHT d 3",
        "HPUT h k v", "CPUT c x y", "SETADD s m",
    ] {
        out(&mut m, line);
    }
    out(&mut m, &format!("SAVE_ALL {file}"));

    let mut fresh = ContainerManager::default();
    out(&mut fresh, &format!("LOAD_ALL {file}"));
    assert_eq!(fresh.snapshot(), m.snapshot());
    assert_eq!(out(&mut fresh, "HGET h k"), "v");
    assert_eq!(out(&mut fresh, "CGET c x"), "y");
    assert_eq!(out(&mut fresh, "SET_AT s m"), "true");
    assert_eq!(out(&mut fresh, "MPRINT arr"), "[1, 2]");
}

#[test]
fn load_all_grows_small_configured_tables() {
    let dir = tempfile::tempdir().unwrap();
    let file = path_str(&dir, "big.json");
    let mut m = ContainerManager::default();
    for i in 0..20 {
        out(&mut m, &format!("HPUT h k{i} v{i}"));
    }
    m.save_all(&file).unwrap();

    let small = ManagerConfig {
        table_capacity: 5,
        ..ManagerConfig::default()
    };
    let mut fresh = ContainerManager::new(small);
    fresh.load_all(&file).unwrap();
    assert_eq!(fresh.hashmap("h").map(|t| t.len()), Some(20));
}

#[test]
fn json_projection_and_load_json() {
    let mut m = ContainerManager::default();
    out(&mut m, "HPUT h a 1");
    assert_eq!(out(&mut m, "SAVE_JSON HASHMAP h"), r#"{"a":"1"}"#);
    out(&mut m, r#"LOAD_JSON cuckoo c {"x": "1", "y": "two words"}"#);
    assert_eq!(out(&mut m, "CGET c y"), "two words");
    out(&mut m, "LOAD_JSON queue q [4, 5]");
    assert_eq!(out(&mut m, "QPOP q"), "4");
    assert!(matches!(
        m.execute("SAVE_JSON GRAPH g"),
        Err(CommandError::UnknownKind(_))
    ));
    assert!(matches!(
        m.execute("SAVE_JSON TREE t"),
        Err(CommandError::UnknownContainer { kind: "tree", .. })
    ));
    out(&mut m, "LOAD_JSON tree t [5, 1, 3, 1]");
    assert_eq!(out(&mut m, "SAVE_JSON TREE t"), "[1,3,5]");
    assert!(matches!(
        m.execute("LOAD_JSON set s [1"),
        Err(CommandError::Json(_))
    ));
}

#[test]
fn binary_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let tfile = path_str(&dir, "h.bin");
    let afile = path_str(&dir, "a.bin");

    let mut m = ContainerManager::default();
    out(&mut m, "HPUT h k v");
    out(&mut m, "HPUT h k2 v2");
    out(&mut m, "MPUSH a -5");
    out(&mut m, &format!("BSAVE HASHMAP h {tfile}"));
    out(&mut m, &format!("BSAVE ARRAY a {afile}"));

    let mut fresh = ContainerManager::default();
    out(&mut fresh, &format!("BLOAD CUCKOO c {tfile}"));
    out(&mut fresh, &format!("BLOAD STACK s {afile}"));
    assert_eq!(out(&mut fresh, "CGET c k2"), "v2");
    assert_eq!(out(&mut fresh, "SPOP s"), "-5");

    assert!(matches!(
        fresh.execute(&format!("BLOAD SET x {}", path_str(&dir, "missing.bin"))),
        Err(CommandError::Io(_))
    ));
}

#[test]
fn size_clear_and_pop_verbs() {
    let mut m = ContainerManager::default();
    for line in ["MPUSH a 1", "MPUSH a 2", "SPUSH s 1", "QPUSH q 1", "QPUSH q 2"] {
        out(&mut m, line);
    }
    assert_eq!(out(&mut m, "MSIZE a"), "2");
    assert_eq!(out(&mut m, "MCLEAR a"), "cleared a");
    assert_eq!(out(&mut m, "MSIZE a"), "0");
    assert_eq!(out(&mut m, "SSIZE s"), "1");
    out(&mut m, "SCLEAR s");
    assert_eq!(out(&mut m, "SPRINT s"), "[]");
    assert_eq!(out(&mut m, "QSIZE q"), "2");
    out(&mut m, "QCLEAR q");
    assert_eq!(out(&mut m, "QSIZE q"), "0");

    for line in ["LPUSHT l 1", "LPUSHT l 2", "DPUSHT d 1", "DPUSHT d 2", "DPUSHT d 3"] {
        out(&mut m, line);
    }
    assert_eq!(out(&mut m, "LPOPH l"), "1");
    assert_eq!(out(&mut m, "LSIZE l"), "1");
    out(&mut m, "LCLEAR l");
    assert!(matches!(m.execute("LPOPH l"), Err(CommandError::Container(_))));
    assert_eq!(out(&mut m, "DPOPH d"), "1");
    assert_eq!(out(&mut m, "DPOPT d"), "3");
    assert_eq!(out(&mut m, "DSIZE d"), "1");
    out(&mut m, "DCLEAR d");
    assert_eq!(out(&mut m, "DPRINT d"), "[]");

    for line in ["HPUT h a 1", "HPUT h b 2", "CPUT c a 1", "SETADD t x", "SETADD t y"] {
        out(&mut m, line);
    }
    assert_eq!(out(&mut m, "HCONTAINS h a"), "true");
    assert_eq!(out(&mut m, "HCONTAINS h z"), "false");
    assert_eq!(out(&mut m, "HSIZE h"), "2");
    assert_eq!(out(&mut m, "HCLEAR h"), "cleared h");
    assert_eq!(out(&mut m, "HSIZE h"), "0");
    assert_eq!(m.hashmap("h").map(|t| t.capacity()), Some(101));
    assert_eq!(out(&mut m, "CCONTAINS c a"), "true");
    assert_eq!(out(&mut m, "CSIZE c"), "1");
    out(&mut m, "CCLEAR c");
    assert_eq!(out(&mut m, "CCONTAINS c a"), "false");
    assert_eq!(out(&mut m, "SETSIZE t"), "2");
    out(&mut m, "SETCLEAR t");
    assert_eq!(out(&mut m, "SETSIZE t"), "0");

    assert!(matches!(
        m.execute("HSIZE nothing"),
        Err(CommandError::UnknownContainer { kind: "hashmap", .. })
    ));
    assert!(matches!(m.execute("CCONTAINS c"), Err(CommandError::Usage(_))));
}

#[test]
fn tree_verbs() {
    let mut m = ContainerManager::default();
    for v in 1..=7 {
        assert_eq!(out(&mut m, &format!("TINSERT t {v}")), format!("added {v}"));
    }
    assert_eq!(out(&mut m, "TINSERT t 4"), "4 already present");
    assert_eq!(out(&mut m, "TSIZE t"), "7");
    assert_eq!(out(&mut m, "THEIGHT t"), "3");
    assert_eq!(out(&mut m, "TSEARCH t 6"), "true");
    assert_eq!(out(&mut m, "TSEARCH t 9"), "false");
    assert_eq!(out(&mut m, "TREMOVE t 4"), "removed 4");
    assert_eq!(out(&mut m, "TREMOVE t 4"), "not found");
    assert_eq!(out(&mut m, "TPRINT t"), "[1, 2, 3, 5, 6, 7]");
    assert_eq!(out(&mut m, "TCLEAR t"), "cleared t");
    assert_eq!(out(&mut m, "THEIGHT t"), "0");
    assert!(matches!(
        m.execute("TSEARCH u 1"),
        Err(CommandError::UnknownContainer { kind: "tree", .. })
    ));
    assert!(matches!(m.execute("TINSERT t x"), Err(CommandError::InvalidNumber(_))));
}

#[test]
fn trees_survive_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let all = path_str(&dir, "all.json");
    let bin = path_str(&dir, "t.bin");

    let mut m = ContainerManager::default();
    for v in [8, 3, 10, 1, 6] {
        out(&mut m, &format!("TINSERT t {v}"));
    }
    out(&mut m, &format!("SAVE_ALL {all}"));
    out(&mut m, &format!("BSAVE TREE t {bin}"));
    assert_eq!(m.snapshot().trees["t"], [1, 3, 6, 8, 10]);

    let mut fresh = ContainerManager::default();
    out(&mut fresh, &format!("LOAD_ALL {all}"));
    assert_eq!(out(&mut fresh, "TPRINT t"), "[1, 3, 6, 8, 10]");
    out(&mut fresh, &format!("BLOAD TREE u {bin}"));
    assert_eq!(out(&mut fresh, "TSIZE u"), "5");
    assert_eq!(fresh.tree("u").map(|t| t.height()), Some(3));
}

#[test]
fn create_delete_and_list() {
    let mut m = ContainerManager::default();
    assert_eq!(out(&mut m, "LIST"), "no containers");
    assert_eq!(out(&mut m, "CREATE TREE t"), "created tree t");
    assert_eq!(out(&mut m, "CREATE hashmap h"), "created hashmap h");
    assert_eq!(out(&mut m, "CREATE hashmap h"), "hashmap h already exists");
    assert_eq!(out(&mut m, "CREATE QUEUE q"), "created queue q");
    assert_eq!(out(&mut m, "CREATE SET s"), "created set s");
    assert_eq!(out(&mut m, "TSIZE t"), "0");
    assert_eq!(out(&mut m, "HSIZE h"), "0");
    out(&mut m, "HPUT h k v");
    out(&mut m, "QPUSH b 1");
    assert_eq!(
        out(&mut m, "LIST"),
        "queue b (size 1)\nqueue q (size 0)\ntree t (size 0)\nhashmap h (size 1)\nset s (size 0)"
    );

    assert_eq!(out(&mut m, "DELETE hashmap h"), "deleted hashmap h");
    assert_eq!(out(&mut m, "DELETE hashmap h"), "not found");
    assert!(matches!(
        m.execute("HGET h k"),
        Err(CommandError::UnknownContainer { .. })
    ));
    assert!(matches!(m.execute("CREATE BLOB x"), Err(CommandError::UnknownKind(_))));
    assert!(matches!(m.execute("DELETE TREE"), Err(CommandError::Usage(_))));
}

#[test]
fn bload_grows_small_configured_tables() {
    let dir = tempfile::tempdir().unwrap();
    let file = path_str(&dir, "big.bin");
    let mut m = ContainerManager::default();
    for i in 0..20 {
        out(&mut m, &format!("HPUT h k{i} v{i}"));
    }
    out(&mut m, &format!("BSAVE HASHMAP h {file}"));

    let small = ManagerConfig {
        table_capacity: 5,
        set_capacity: 5,
        cuckoo: CuckooConfig {
            capacity: 3,
            ..CuckooConfig::default()
        },
        ..ManagerConfig::default()
    };
    let mut fresh = ContainerManager::new(small);
    out(&mut fresh, &format!("BLOAD HASHMAP h {file}"));
    out(&mut fresh, &format!("BLOAD CUCKOO c {file}"));
    out(&mut fresh, &format!("BLOAD SET s {file}"));
    assert_eq!(fresh.hashmap("h").map(|t| t.len()), Some(20));
    assert_eq!(fresh.cuckoo("c").map(|t| t.len()), Some(20));
    assert_eq!(fresh.set("s").map(|s| s.len()), Some(20));
    assert_eq!(out(&mut fresh, "HGET h k19"), "v19");

    // Few records keep the configured size.
    let mut tiny = ContainerManager::default();
    out(&mut tiny, "HPUT h a 1");
    let one = path_str(&dir, "one.bin");
    out(&mut tiny, &format!("BSAVE HASHMAP h {one}"));
    out(&mut fresh, &format!("BLOAD HASHMAP h {one}"));
    assert_eq!(fresh.hashmap("h").map(|t| t.capacity()), Some(5));
}

#[test]
fn help_and_exit() {
    let mut m = ContainerManager::default();
    let help = out(&mut m, "HELP");
    assert!(help.contains("BSAVE"));
    assert!(help.contains("TINSERT"));
    assert!(help.contains("CREATE <kind> <name>"));
    assert_eq!(m.execute("EXIT").unwrap(), Outcome::Exit);
}
