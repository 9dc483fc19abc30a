//! ContainerManager: named container registries and the command front end.
//!
//! The manager is an ordinary value. Each command line names a verb, a
//! container and its arguments; push-style verbs create the container on
//! first use with sizes from [`ManagerConfig`], every other verb requires it
//! to exist. `CREATE` and `DELETE` manage containers explicitly. Errors are
//! returned to the caller and leave the manager usable.

use crate::array::DynArray;
use crate::avl_tree::AvlTree;
use crate::codec::{read_pairs, BinaryCodec};
use crate::config::ManagerConfig;
use crate::cuckoo_table::{CuckooConfig, CuckooTable};
use crate::double_hash_table::DoubleHashTable;
use crate::double_list::DoubleList;
use crate::error::CommandError;
use crate::hashing::capacity_for;
use crate::queue::Queue;
use crate::set::Set;
use crate::single_list::SingleList;
use crate::snapshot::{Pairs, Snapshot};
use crate::stack::Stack;
use hashbrown::HashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub type Table = DoubleHashTable<String, String>;
pub type Cuckoo = CuckooTable<String, String>;
pub type KeySet = Set<String>;

/// What the caller should do after a command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Output(String),
    Silent,
    Exit,
}

impl Outcome {
    fn text(s: impl Into<String>) -> Self {
        Outcome::Output(s.into())
    }
}

/// Container kinds accepted by the management and snapshot verbs, in
/// `LIST` order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Kind {
    Array,
    Stack,
    Queue,
    List,
    DList,
    Tree,
    HashMap,
    Cuckoo,
    Set,
}

impl Kind {
    pub fn parse(word: &str) -> Result<Self, CommandError> {
        Ok(match word.to_ascii_uppercase().as_str() {
            "ARRAY" => Kind::Array,
            "STACK" => Kind::Stack,
            "QUEUE" => Kind::Queue,
            "LIST" => Kind::List,
            "DLIST" => Kind::DList,
            "TREE" => Kind::Tree,
            "HASHMAP" => Kind::HashMap,
            "CUCKOO" => Kind::Cuckoo,
            "SET" => Kind::Set,
            _ => return Err(CommandError::UnknownKind(word.to_string())),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Array => "array",
            Kind::Stack => "stack",
            Kind::Queue => "queue",
            Kind::List => "list",
            Kind::DList => "dlist",
            Kind::Tree => "tree",
            Kind::HashMap => "hashmap",
            Kind::Cuckoo => "cuckoo",
            Kind::Set => "set",
        }
    }
}

pub const HELP: &str = "\
Arrays:      MPUSH <name> <int> | MGET <name> <index> | MINSERT <name> <index> <int>
             MDEL <name> <index> | MSET <name> <index> <int> | MPRINT <name>
             MSIZE <name> | MCLEAR <name>
Stacks:      SPUSH <name> <int> | SPOP <name> | SPEEK <name> | SPRINT <name>
             SSIZE <name> | SCLEAR <name>
Queues:      QPUSH <name> <int> | QPOP <name> | QPEEK <name> | QPRINT <name>
             QSIZE <name> | QCLEAR <name>
Lists:       LPUSHH|LPUSHT <name> <int> | LPOPH <name> | LDEL <name> <int>
             LFIND <name> <int> | LPRINT <name> | LSIZE <name> | LCLEAR <name>
Dlists:      DPUSHH|DPUSHT <name> <int> | DPOPH|DPOPT <name> | DDEL <name> <int>
             DFIND <name> <int> | DPRINT <name> | DSIZE <name> | DCLEAR <name>
Trees:       TINSERT <name> <int> | TSEARCH <name> <int> | TREMOVE <name> <int>
             TSIZE <name> | THEIGHT <name> | TPRINT <name> | TCLEAR <name>
Hash tables: HPUT <name> <key> <value> | HGET <name> <key> | HDEL <name> <key>
             HCONTAINS <name> <key> | HPRINT <name> | HSIZE <name> | HCLEAR <name>
Cuckoo:      CPUT <name> <key> <value> | CGET <name> <key> | CDEL <name> <key>
             CCONTAINS <name> <key> | CPRINT <name> | CSIZE <name> | CCLEAR <name>
Sets:        SETADD <name> <key> | SETDEL <name> <key> | SET_AT <name> <key>
             SETPRINT <name> | SETSIZE <name> | SETCLEAR <name>
Containers:  CREATE <kind> <name> | DELETE <kind> <name> | LIST
Snapshots:   SAVE_ALL <file> | LOAD_ALL <file>
             SAVE_JSON <kind> <name> | LOAD_JSON <kind> <name> <json>
             BSAVE <kind> <name> <file> | BLOAD <kind> <name> <file>
             kinds: ARRAY STACK QUEUE LIST DLIST TREE HASHMAP CUCKOO SET
Other:       HELP | EXIT";

#[derive(Debug, Default)]
pub struct ContainerManager {
    config: ManagerConfig,
    arrays: HashMap<String, DynArray<i64>>,
    stacks: HashMap<String, Stack<i64>>,
    queues: HashMap<String, Queue<i64>>,
    lists: HashMap<String, SingleList<i64>>,
    dlists: HashMap<String, DoubleList<i64>>,
    trees: HashMap<String, AvlTree<i64>>,
    hashmaps: HashMap<String, Table>,
    cuckoo: HashMap<String, Cuckoo>,
    sets: HashMap<String, KeySet>,
}

fn arg<'a>(args: &[&'a str], i: usize, usage: &'static str) -> Result<&'a str, CommandError> {
    args.get(i).copied().ok_or(CommandError::Usage(usage))
}

fn int(word: &str) -> Result<i64, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn index(word: &str) -> Result<usize, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn existing<'m, T>(
    map: &'m mut HashMap<String, T>,
    kind: Kind,
    name: &str,
) -> Result<&'m mut T, CommandError> {
    map.get_mut(name).ok_or_else(|| CommandError::UnknownContainer {
        kind: kind.name(),
        name: name.to_string(),
    })
}

/// The text after the first `n` whitespace-separated words.
fn tail_after(line: &str, n: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..n {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest.trim_end()
}

fn found(hit: bool, yes: String) -> Outcome {
    if hit {
        Outcome::Output(yes)
    } else {
        Outcome::text("not found")
    }
}

/// Capacity for a rebuilt keyed container: the configured size unless the
/// data would not fit in it.
fn rebuilt_capacity(configured: usize, len: usize) -> usize {
    if len < configured {
        configured
    } else {
        capacity_for(len)
    }
}

fn to_json<T: Serialize>(
    map: &mut HashMap<String, T>,
    kind: Kind,
    name: &str,
) -> Result<Outcome, CommandError> {
    let container = existing(map, kind, name)?;
    Ok(Outcome::Output(serde_json::to_string(container)?))
}

fn save_binary<T: BinaryCodec>(
    map: &mut HashMap<String, T>,
    kind: Kind,
    name: &str,
    path: &Path,
) -> Result<(), CommandError> {
    let container = existing(map, kind, name)?;
    let mut w = BufWriter::new(File::create(path)?);
    container.encode(&mut w)?;
    w.flush()?;
    Ok(())
}

fn load_binary<T: BinaryCodec>(
    map: &mut HashMap<String, T>,
    name: String,
    path: &Path,
    make: impl FnOnce() -> T,
) -> Result<(), CommandError> {
    let mut r = BufReader::new(File::open(path)?);
    let mut container = make();
    container.decode_into(&mut r)?;
    map.insert(name, container);
    Ok(())
}

/// Inserts `make()` under `name` unless the name is taken.
fn create_in<T>(map: &mut HashMap<String, T>, name: &str, make: impl FnOnce() -> T) -> bool {
    if map.contains_key(name) {
        return false;
    }
    map.insert(name.to_string(), make());
    true
}

/// One `kind name (size n)` line per container, names ascending.
fn list_group<T>(
    lines: &mut Vec<String>,
    map: &HashMap<String, T>,
    kind: Kind,
    len: impl Fn(&T) -> usize,
) {
    let mut entries: Vec<(&String, usize)> = map.iter().map(|(n, c)| (n, len(c))).collect();
    entries.sort();
    lines.extend(
        entries
            .into_iter()
            .map(|(name, len)| format!("{} {name} (size {len})", kind.name())),
    );
}

fn json_ints(text: &str) -> Result<Vec<i64>, CommandError> {
    Ok(serde_json::from_str(text)?)
}

fn collect_pairs<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> Pairs {
    pairs.map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn collect_ints<'a>(items: impl Iterator<Item = &'a i64>) -> Vec<i64> {
    items.copied().collect()
}

impl ContainerManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn hashmap(&self, name: &str) -> Option<&Table> {
        self.hashmaps.get(name)
    }

    pub fn cuckoo(&self, name: &str) -> Option<&Cuckoo> {
        self.cuckoo.get(name)
    }

    pub fn set(&self, name: &str) -> Option<&KeySet> {
        self.sets.get(name)
    }

    pub fn array(&self, name: &str) -> Option<&DynArray<i64>> {
        self.arrays.get(name)
    }

    pub fn tree(&self, name: &str) -> Option<&AvlTree<i64>> {
        self.trees.get(name)
    }

    fn new_table(&self, len: usize) -> Table {
        Table::new(rebuilt_capacity(self.config.table_capacity, len))
    }

    fn new_cuckoo(&self, len: usize) -> Cuckoo {
        Cuckoo::with_config(CuckooConfig {
            capacity: rebuilt_capacity(self.config.cuckoo.capacity, len),
            ..self.config.cuckoo
        })
    }

    fn new_set(&self, len: usize) -> KeySet {
        KeySet::new(rebuilt_capacity(self.config.set_capacity, len))
    }

    /// Runs one command line.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = args.split_first() else {
            return Ok(Outcome::Silent);
        };
        if verb.starts_with('#') {
            return Ok(Outcome::Silent);
        }
        let verb = verb.to_ascii_uppercase();
        log::debug!("command {verb} {args:?}");
        let seq_cap = self.config.sequence_capacity;

        match verb.as_str() {
            "HELP" => Ok(Outcome::text(HELP)),
            "EXIT" => Ok(Outcome::Exit),

            "MPUSH" => {
                const U: &str = "MPUSH <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                self.arrays
                    .entry(arg(args, 0, U)?.to_string())
                    .or_insert_with(|| DynArray::with_capacity(seq_cap))
                    .push(value);
                Ok(Outcome::Output(format!("added {value}")))
            }
            "MGET" => {
                const U: &str = "MGET <name> <index>";
                let i = index(arg(args, 1, U)?)?;
                let a = existing(&mut self.arrays, Kind::Array, arg(args, 0, U)?)?;
                Ok(Outcome::Output(a.get(i)?.to_string()))
            }
            "MINSERT" => {
                const U: &str = "MINSERT <name> <index> <int>";
                let i = index(arg(args, 1, U)?)?;
                let value = int(arg(args, 2, U)?)?;
                let a = existing(&mut self.arrays, Kind::Array, arg(args, 0, U)?)?;
                a.insert(i, value)?;
                Ok(Outcome::Output(format!("inserted {value} at {i}")))
            }
            "MDEL" => {
                const U: &str = "MDEL <name> <index>";
                let i = index(arg(args, 1, U)?)?;
                let a = existing(&mut self.arrays, Kind::Array, arg(args, 0, U)?)?;
                Ok(Outcome::Output(format!("removed {}", a.remove(i)?)))
            }
            "MSET" => {
                const U: &str = "MSET <name> <index> <int>";
                let i = index(arg(args, 1, U)?)?;
                let value = int(arg(args, 2, U)?)?;
                let a = existing(&mut self.arrays, Kind::Array, arg(args, 0, U)?)?;
                let old = a.replace(i, value)?;
                Ok(Outcome::Output(format!("replaced {old} with {value}")))
            }
            "MPRINT" => {
                let a = existing(&mut self.arrays, Kind::Array, arg(args, 0, "MPRINT <name>")?)?;
                Ok(Outcome::Output(a.to_string()))
            }
            "MSIZE" => {
                let a = existing(&mut self.arrays, Kind::Array, arg(args, 0, "MSIZE <name>")?)?;
                Ok(Outcome::Output(a.len().to_string()))
            }
            "MCLEAR" => {
                let name = arg(args, 0, "MCLEAR <name>")?;
                existing(&mut self.arrays, Kind::Array, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "SPUSH" => {
                const U: &str = "SPUSH <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                self.stacks
                    .entry(arg(args, 0, U)?.to_string())
                    .or_insert_with(|| Stack::with_capacity(seq_cap))
                    .push(value);
                Ok(Outcome::Output(format!("added {value}")))
            }
            "SPOP" => {
                let s = existing(&mut self.stacks, Kind::Stack, arg(args, 0, "SPOP <name>")?)?;
                Ok(Outcome::Output(s.pop()?.to_string()))
            }
            "SPEEK" => {
                let s = existing(&mut self.stacks, Kind::Stack, arg(args, 0, "SPEEK <name>")?)?;
                Ok(Outcome::Output(s.peek()?.to_string()))
            }
            "SPRINT" => {
                let s = existing(&mut self.stacks, Kind::Stack, arg(args, 0, "SPRINT <name>")?)?;
                Ok(Outcome::Output(s.to_string()))
            }
            "SSIZE" => {
                let s = existing(&mut self.stacks, Kind::Stack, arg(args, 0, "SSIZE <name>")?)?;
                Ok(Outcome::Output(s.len().to_string()))
            }
            "SCLEAR" => {
                let name = arg(args, 0, "SCLEAR <name>")?;
                existing(&mut self.stacks, Kind::Stack, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "QPUSH" => {
                const U: &str = "QPUSH <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                self.queues
                    .entry(arg(args, 0, U)?.to_string())
                    .or_insert_with(|| Queue::new(seq_cap))
                    .enqueue(value);
                Ok(Outcome::Output(format!("added {value}")))
            }
            "QPOP" => {
                let q = existing(&mut self.queues, Kind::Queue, arg(args, 0, "QPOP <name>")?)?;
                Ok(Outcome::Output(q.dequeue()?.to_string()))
            }
            "QPEEK" => {
                let q = existing(&mut self.queues, Kind::Queue, arg(args, 0, "QPEEK <name>")?)?;
                Ok(Outcome::Output(q.peek()?.to_string()))
            }
            "QPRINT" => {
                let q = existing(&mut self.queues, Kind::Queue, arg(args, 0, "QPRINT <name>")?)?;
                Ok(Outcome::Output(q.to_string()))
            }
            "QSIZE" => {
                let q = existing(&mut self.queues, Kind::Queue, arg(args, 0, "QSIZE <name>")?)?;
                Ok(Outcome::Output(q.len().to_string()))
            }
            "QCLEAR" => {
                let name = arg(args, 0, "QCLEAR <name>")?;
                existing(&mut self.queues, Kind::Queue, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "LPUSHH" | "LPUSHT" => {
                const U: &str = "LPUSHH|LPUSHT <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let l = self.lists.entry(arg(args, 0, U)?.to_string()).or_default();
                if verb == "LPUSHH" {
                    l.push_front(value);
                } else {
                    l.push_back(value);
                }
                Ok(Outcome::Output(format!("added {value}")))
            }
            "LPOPH" => {
                let l = existing(&mut self.lists, Kind::List, arg(args, 0, "LPOPH <name>")?)?;
                Ok(Outcome::Output(l.pop_front()?.to_string()))
            }
            "LDEL" => {
                const U: &str = "LDEL <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let l = existing(&mut self.lists, Kind::List, arg(args, 0, U)?)?;
                Ok(found(l.remove(&value), format!("removed {value}")))
            }
            "LFIND" => {
                const U: &str = "LFIND <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let l = existing(&mut self.lists, Kind::List, arg(args, 0, U)?)?;
                Ok(Outcome::Output(l.contains(&value).to_string()))
            }
            "LPRINT" => {
                let l = existing(&mut self.lists, Kind::List, arg(args, 0, "LPRINT <name>")?)?;
                Ok(Outcome::Output(l.to_string()))
            }
            "LSIZE" => {
                let l = existing(&mut self.lists, Kind::List, arg(args, 0, "LSIZE <name>")?)?;
                Ok(Outcome::Output(l.len().to_string()))
            }
            "LCLEAR" => {
                let name = arg(args, 0, "LCLEAR <name>")?;
                existing(&mut self.lists, Kind::List, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "DPUSHH" | "DPUSHT" => {
                const U: &str = "DPUSHH|DPUSHT <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let l = self.dlists.entry(arg(args, 0, U)?.to_string()).or_default();
                if verb == "DPUSHH" {
                    l.push_front(value);
                } else {
                    l.push_back(value);
                }
                Ok(Outcome::Output(format!("added {value}")))
            }
            "DPOPH" | "DPOPT" => {
                let l = existing(&mut self.dlists, Kind::DList, arg(args, 0, "DPOPH|DPOPT <name>")?)?;
                let value = if verb == "DPOPH" { l.pop_front()? } else { l.pop_back()? };
                Ok(Outcome::Output(value.to_string()))
            }
            "DDEL" => {
                const U: &str = "DDEL <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let l = existing(&mut self.dlists, Kind::DList, arg(args, 0, U)?)?;
                Ok(found(l.remove(&value), format!("removed {value}")))
            }
            "DFIND" => {
                const U: &str = "DFIND <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let l = existing(&mut self.dlists, Kind::DList, arg(args, 0, U)?)?;
                Ok(Outcome::Output(l.contains(&value).to_string()))
            }
            "DPRINT" => {
                let l = existing(&mut self.dlists, Kind::DList, arg(args, 0, "DPRINT <name>")?)?;
                Ok(Outcome::Output(l.to_string()))
            }
            "DSIZE" => {
                let l = existing(&mut self.dlists, Kind::DList, arg(args, 0, "DSIZE <name>")?)?;
                Ok(Outcome::Output(l.len().to_string()))
            }
            "DCLEAR" => {
                let name = arg(args, 0, "DCLEAR <name>")?;
                existing(&mut self.dlists, Kind::DList, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "TINSERT" => {
                const U: &str = "TINSERT <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let t = self.trees.entry(arg(args, 0, U)?.to_string()).or_default();
                if t.insert(value) {
                    Ok(Outcome::Output(format!("added {value}")))
                } else {
                    Ok(Outcome::Output(format!("{value} already present")))
                }
            }
            "TSEARCH" => {
                const U: &str = "TSEARCH <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let t = existing(&mut self.trees, Kind::Tree, arg(args, 0, U)?)?;
                Ok(Outcome::Output(t.contains(&value).to_string()))
            }
            "TREMOVE" => {
                const U: &str = "TREMOVE <name> <int>";
                let value = int(arg(args, 1, U)?)?;
                let t = existing(&mut self.trees, Kind::Tree, arg(args, 0, U)?)?;
                Ok(found(t.remove(&value), format!("removed {value}")))
            }
            "TSIZE" => {
                let t = existing(&mut self.trees, Kind::Tree, arg(args, 0, "TSIZE <name>")?)?;
                Ok(Outcome::Output(t.len().to_string()))
            }
            "THEIGHT" => {
                let t = existing(&mut self.trees, Kind::Tree, arg(args, 0, "THEIGHT <name>")?)?;
                Ok(Outcome::Output(t.height().to_string()))
            }
            "TPRINT" => {
                let t = existing(&mut self.trees, Kind::Tree, arg(args, 0, "TPRINT <name>")?)?;
                Ok(Outcome::Output(t.to_string()))
            }
            "TCLEAR" => {
                let name = arg(args, 0, "TCLEAR <name>")?;
                existing(&mut self.trees, Kind::Tree, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "HPUT" => {
                const U: &str = "HPUT <name> <key> <value>";
                let (name, key, value) = (arg(args, 0, U)?, arg(args, 1, U)?, arg(args, 2, U)?);
                if !self.hashmaps.contains_key(name) {
                    let t = self.new_table(0);
                    self.hashmaps.insert(name.to_string(), t);
                }
                let t = existing(&mut self.hashmaps, Kind::HashMap, name)?;
                let verb = match t.put(key.to_string(), value.to_string())? {
                    Some(_) => "updated",
                    None => "added",
                };
                Ok(Outcome::Output(format!("{verb} {key} => {value}")))
            }
            "HGET" => {
                const U: &str = "HGET <name> <key>";
                let t = existing(&mut self.hashmaps, Kind::HashMap, arg(args, 0, U)?)?;
                Ok(Outcome::Output(t.get(arg(args, 1, U)?)?.clone()))
            }
            "HDEL" => {
                const U: &str = "HDEL <name> <key>";
                let key = arg(args, 1, U)?;
                let t = existing(&mut self.hashmaps, Kind::HashMap, arg(args, 0, U)?)?;
                Ok(found(t.remove(key), format!("removed {key}")))
            }
            "HCONTAINS" => {
                const U: &str = "HCONTAINS <name> <key>";
                let key = arg(args, 1, U)?;
                let t = existing(&mut self.hashmaps, Kind::HashMap, arg(args, 0, U)?)?;
                Ok(Outcome::Output(t.contains(key).to_string()))
            }
            "HPRINT" => {
                let t = existing(&mut self.hashmaps, Kind::HashMap, arg(args, 0, "HPRINT <name>")?)?;
                Ok(Outcome::Output(t.to_string()))
            }
            "HSIZE" => {
                let t = existing(&mut self.hashmaps, Kind::HashMap, arg(args, 0, "HSIZE <name>")?)?;
                Ok(Outcome::Output(t.len().to_string()))
            }
            "HCLEAR" => {
                let name = arg(args, 0, "HCLEAR <name>")?;
                existing(&mut self.hashmaps, Kind::HashMap, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "CPUT" => {
                const U: &str = "CPUT <name> <key> <value>";
                let (name, key, value) = (arg(args, 0, U)?, arg(args, 1, U)?, arg(args, 2, U)?);
                if !self.cuckoo.contains_key(name) {
                    let t = self.new_cuckoo(0);
                    self.cuckoo.insert(name.to_string(), t);
                }
                let t = existing(&mut self.cuckoo, Kind::Cuckoo, name)?;
                let verb = match t.put(key.to_string(), value.to_string())? {
                    Some(_) => "updated",
                    None => "added",
                };
                Ok(Outcome::Output(format!("{verb} {key} => {value}")))
            }
            "CGET" => {
                const U: &str = "CGET <name> <key>";
                let t = existing(&mut self.cuckoo, Kind::Cuckoo, arg(args, 0, U)?)?;
                Ok(Outcome::Output(t.get(arg(args, 1, U)?)?.clone()))
            }
            "CDEL" => {
                const U: &str = "CDEL <name> <key>";
                let key = arg(args, 1, U)?;
                let t = existing(&mut self.cuckoo, Kind::Cuckoo, arg(args, 0, U)?)?;
                Ok(found(t.remove(key), format!("removed {key}")))
            }
            "CCONTAINS" => {
                const U: &str = "CCONTAINS <name> <key>";
                let key = arg(args, 1, U)?;
                let t = existing(&mut self.cuckoo, Kind::Cuckoo, arg(args, 0, U)?)?;
                Ok(Outcome::Output(t.contains(key).to_string()))
            }
            "CPRINT" => {
                let t = existing(&mut self.cuckoo, Kind::Cuckoo, arg(args, 0, "CPRINT <name>")?)?;
                Ok(Outcome::Output(t.to_string()))
            }
            "CSIZE" => {
                let t = existing(&mut self.cuckoo, Kind::Cuckoo, arg(args, 0, "CSIZE <name>")?)?;
                Ok(Outcome::Output(t.len().to_string()))
            }
            "CCLEAR" => {
                let name = arg(args, 0, "CCLEAR <name>")?;
                existing(&mut self.cuckoo, Kind::Cuckoo, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "SETADD" => {
                const U: &str = "SETADD <name> <key>";
                let (name, key) = (arg(args, 0, U)?, arg(args, 1, U)?);
                if !self.sets.contains_key(name) {
                    let s = self.new_set(0);
                    self.sets.insert(name.to_string(), s);
                }
                let s = existing(&mut self.sets, Kind::Set, name)?;
                if s.add(key.to_string())? {
                    Ok(Outcome::Output(format!("added {key}")))
                } else {
                    Ok(Outcome::Output(format!("{key} already present")))
                }
            }
            "SETDEL" => {
                const U: &str = "SETDEL <name> <key>";
                let key = arg(args, 1, U)?;
                let s = existing(&mut self.sets, Kind::Set, arg(args, 0, U)?)?;
                Ok(found(s.remove(key), format!("removed {key}")))
            }
            "SET_AT" => {
                const U: &str = "SET_AT <name> <key>";
                let key = arg(args, 1, U)?;
                let s = existing(&mut self.sets, Kind::Set, arg(args, 0, U)?)?;
                Ok(Outcome::Output(s.contains(key).to_string()))
            }
            "SETPRINT" => {
                let s = existing(&mut self.sets, Kind::Set, arg(args, 0, "SETPRINT <name>")?)?;
                Ok(Outcome::Output(s.to_string()))
            }
            "SETSIZE" => {
                let s = existing(&mut self.sets, Kind::Set, arg(args, 0, "SETSIZE <name>")?)?;
                Ok(Outcome::Output(s.len().to_string()))
            }
            "SETCLEAR" => {
                let name = arg(args, 0, "SETCLEAR <name>")?;
                existing(&mut self.sets, Kind::Set, name)?.clear();
                Ok(Outcome::Output(format!("cleared {name}")))
            }

            "CREATE" => {
                const U: &str = "CREATE <kind> <name>";
                let kind = Kind::parse(arg(args, 0, U)?)?;
                let name = arg(args, 1, U)?;
                if self.create(kind, name) {
                    Ok(Outcome::Output(format!("created {} {name}", kind.name())))
                } else {
                    Ok(Outcome::Output(format!("{} {name} already exists", kind.name())))
                }
            }
            "DELETE" => {
                const U: &str = "DELETE <kind> <name>";
                let kind = Kind::parse(arg(args, 0, U)?)?;
                let name = arg(args, 1, U)?;
                Ok(found(self.delete(kind, name), format!("deleted {} {name}", kind.name())))
            }
            "LIST" => Ok(Outcome::Output(self.listing())),

            "SAVE_ALL" => {
                let path = arg(args, 0, "SAVE_ALL <file>")?;
                self.save_all(path)?;
                Ok(Outcome::Output(format!("saved to {path}")))
            }
            "LOAD_ALL" => {
                let path = arg(args, 0, "LOAD_ALL <file>")?;
                self.load_all(path)?;
                Ok(Outcome::Output(format!("loaded from {path}")))
            }
            "SAVE_JSON" => {
                const U: &str = "SAVE_JSON <kind> <name>";
                let kind = Kind::parse(arg(args, 0, U)?)?;
                self.projection(kind, arg(args, 1, U)?)
            }
            "LOAD_JSON" => {
                const U: &str = "LOAD_JSON <kind> <name> <json>";
                let kind = Kind::parse(arg(args, 0, U)?)?;
                let name = arg(args, 1, U)?;
                let text = tail_after(line, 3);
                if text.is_empty() {
                    return Err(CommandError::Usage(U));
                }
                self.load_json(kind, name, text)?;
                Ok(Outcome::Output(format!("loaded {} {name}", kind.name())))
            }
            "BSAVE" => {
                const U: &str = "BSAVE <kind> <name> <file>";
                let kind = Kind::parse(arg(args, 0, U)?)?;
                let (name, path) = (arg(args, 1, U)?, arg(args, 2, U)?);
                self.save_binary(kind, name, Path::new(path))?;
                log::info!("wrote {} {name} to {path}", kind.name());
                Ok(Outcome::Output(format!("saved {} {name} to {path}", kind.name())))
            }
            "BLOAD" => {
                const U: &str = "BLOAD <kind> <name> <file>";
                let kind = Kind::parse(arg(args, 0, U)?)?;
                let (name, path) = (arg(args, 1, U)?, arg(args, 2, U)?);
                self.load_binary(kind, name, Path::new(path))?;
                log::info!("read {} {name} from {path}", kind.name());
                Ok(Outcome::Output(format!("loaded {} {name} from {path}", kind.name())))
            }

            _ => Err(CommandError::UnknownCommand(verb)),
        }
    }

    /// Adds an empty container; false if the name is already taken for
    /// that kind.
    pub fn create(&mut self, kind: Kind, name: &str) -> bool {
        let seq_cap = self.config.sequence_capacity;
        match kind {
            Kind::Array => create_in(&mut self.arrays, name, || DynArray::with_capacity(seq_cap)),
            Kind::Stack => create_in(&mut self.stacks, name, || Stack::with_capacity(seq_cap)),
            Kind::Queue => create_in(&mut self.queues, name, || Queue::new(seq_cap)),
            Kind::List => create_in(&mut self.lists, name, SingleList::new),
            Kind::DList => create_in(&mut self.dlists, name, DoubleList::new),
            Kind::Tree => create_in(&mut self.trees, name, AvlTree::new),
            Kind::HashMap => {
                let t = self.new_table(0);
                create_in(&mut self.hashmaps, name, || t)
            }
            Kind::Cuckoo => {
                let t = self.new_cuckoo(0);
                create_in(&mut self.cuckoo, name, || t)
            }
            Kind::Set => {
                let s = self.new_set(0);
                create_in(&mut self.sets, name, || s)
            }
        }
    }

    /// Drops a container; false if there was none.
    pub fn delete(&mut self, kind: Kind, name: &str) -> bool {
        match kind {
            Kind::Array => self.arrays.remove(name).is_some(),
            Kind::Stack => self.stacks.remove(name).is_some(),
            Kind::Queue => self.queues.remove(name).is_some(),
            Kind::List => self.lists.remove(name).is_some(),
            Kind::DList => self.dlists.remove(name).is_some(),
            Kind::Tree => self.trees.remove(name).is_some(),
            Kind::HashMap => self.hashmaps.remove(name).is_some(),
            Kind::Cuckoo => self.cuckoo.remove(name).is_some(),
            Kind::Set => self.sets.remove(name).is_some(),
        }
    }

    /// Every container as `kind name (size n)`, grouped by kind.
    pub fn listing(&self) -> String {
        let mut lines = Vec::new();
        list_group(&mut lines, &self.arrays, Kind::Array, DynArray::len);
        list_group(&mut lines, &self.stacks, Kind::Stack, Stack::len);
        list_group(&mut lines, &self.queues, Kind::Queue, Queue::len);
        list_group(&mut lines, &self.lists, Kind::List, SingleList::len);
        list_group(&mut lines, &self.dlists, Kind::DList, DoubleList::len);
        list_group(&mut lines, &self.trees, Kind::Tree, AvlTree::len);
        list_group(&mut lines, &self.hashmaps, Kind::HashMap, Table::len);
        list_group(&mut lines, &self.cuckoo, Kind::Cuckoo, Cuckoo::len);
        list_group(&mut lines, &self.sets, Kind::Set, KeySet::len);
        if lines.is_empty() {
            return "no containers".to_string();
        }
        lines.join("\n")
    }

    /// JSON projection of one container.
    pub fn projection(&mut self, kind: Kind, name: &str) -> Result<Outcome, CommandError> {
        match kind {
            Kind::Array => to_json(&mut self.arrays, kind, name),
            Kind::Stack => to_json(&mut self.stacks, kind, name),
            Kind::Queue => to_json(&mut self.queues, kind, name),
            Kind::List => to_json(&mut self.lists, kind, name),
            Kind::DList => to_json(&mut self.dlists, kind, name),
            Kind::Tree => to_json(&mut self.trees, kind, name),
            Kind::HashMap => to_json(&mut self.hashmaps, kind, name),
            Kind::Cuckoo => to_json(&mut self.cuckoo, kind, name),
            Kind::Set => to_json(&mut self.sets, kind, name),
        }
    }

    /// Replaces (or creates) one container from its JSON projection.
    pub fn load_json(&mut self, kind: Kind, name: &str, text: &str) -> Result<(), CommandError> {
        let name = name.to_string();
        match kind {
            Kind::Array => {
                self.arrays.insert(name, json_ints(text)?.into_iter().collect());
            }
            Kind::Stack => {
                self.stacks.insert(name, json_ints(text)?.into_iter().collect());
            }
            Kind::Queue => {
                self.queues.insert(name, json_ints(text)?.into_iter().collect());
            }
            Kind::List => {
                self.lists.insert(name, json_ints(text)?.into_iter().collect());
            }
            Kind::DList => {
                self.dlists.insert(name, json_ints(text)?.into_iter().collect());
            }
            Kind::Tree => {
                self.trees.insert(name, json_ints(text)?.into_iter().collect());
            }
            Kind::HashMap => {
                let pairs: Pairs = serde_json::from_str(text)?;
                let mut t = self.new_table(pairs.len());
                t.load(pairs)?;
                self.hashmaps.insert(name, t);
            }
            Kind::Cuckoo => {
                let pairs: Pairs = serde_json::from_str(text)?;
                let mut t = self.new_cuckoo(pairs.len());
                t.load(pairs)?;
                self.cuckoo.insert(name, t);
            }
            Kind::Set => {
                let pairs: Pairs = serde_json::from_str(text)?;
                let mut s = self.new_set(pairs.len());
                s.load(pairs.into_keys())?;
                self.sets.insert(name, s);
            }
        }
        Ok(())
    }

    pub fn save_binary(&mut self, kind: Kind, name: &str, path: &Path) -> Result<(), CommandError> {
        match kind {
            Kind::Array => save_binary(&mut self.arrays, kind, name, path),
            Kind::Stack => save_binary(&mut self.stacks, kind, name, path),
            Kind::Queue => save_binary(&mut self.queues, kind, name, path),
            Kind::List => save_binary(&mut self.lists, kind, name, path),
            Kind::DList => save_binary(&mut self.dlists, kind, name, path),
            Kind::Tree => save_binary(&mut self.trees, kind, name, path),
            Kind::HashMap => save_binary(&mut self.hashmaps, kind, name, path),
            Kind::Cuckoo => save_binary(&mut self.cuckoo, kind, name, path),
            Kind::Set => save_binary(&mut self.sets, kind, name, path),
        }
    }

    /// Reads one container from the binary layout, replacing any container
    /// of the same kind and name. Keyed containers are sized like a
    /// snapshot rebuild: the configured capacity unless the records need
    /// more.
    pub fn load_binary(&mut self, kind: Kind, name: &str, path: &Path) -> Result<(), CommandError> {
        let name = name.to_string();
        match kind {
            Kind::Array => load_binary(&mut self.arrays, name, path, DynArray::new),
            Kind::Stack => load_binary(&mut self.stacks, name, path, Stack::new),
            Kind::Queue => load_binary(&mut self.queues, name, path, Queue::default),
            Kind::List => load_binary(&mut self.lists, name, path, SingleList::new),
            Kind::DList => load_binary(&mut self.dlists, name, path, DoubleList::new),
            Kind::Tree => load_binary(&mut self.trees, name, path, AvlTree::new),
            Kind::HashMap => {
                let pairs = read_pairs(&mut BufReader::new(File::open(path)?))?;
                let mut t = self.new_table(pairs.len());
                t.load(pairs)?;
                self.hashmaps.insert(name, t);
                Ok(())
            }
            Kind::Cuckoo => {
                let pairs = read_pairs(&mut BufReader::new(File::open(path)?))?;
                let mut t = self.new_cuckoo(pairs.len());
                t.load(pairs)?;
                self.cuckoo.insert(name, t);
                Ok(())
            }
            Kind::Set => {
                let pairs = read_pairs(&mut BufReader::new(File::open(path)?))?;
                let mut s = self.new_set(pairs.len());
                s.load(pairs.into_iter().map(|(k, _)| k))?;
                self.sets.insert(name, s);
                Ok(())
            }
        }
    }

    /// Every container, by kind and name.
    pub fn snapshot(&self) -> Snapshot {
        fn group<T, U>(map: &HashMap<String, T>, f: impl Fn(&T) -> U) -> BTreeMap<String, U> {
            map.iter().map(|(n, c)| (n.clone(), f(c))).collect()
        }
        Snapshot {
            arrays: group(&self.arrays, |a| collect_ints(a.iter())),
            stacks: group(&self.stacks, |s| collect_ints(s.iter())),
            queues: group(&self.queues, |q| collect_ints(q.iter())),
            lists: group(&self.lists, |l| collect_ints(l.iter())),
            dlists: group(&self.dlists, |l| collect_ints(l.iter())),
            trees: group(&self.trees, |t| collect_ints(t.iter())),
            hashmaps: group(&self.hashmaps, |t| collect_pairs(t.iter())),
            cuckoo: group(&self.cuckoo, |t| collect_pairs(t.iter())),
            sets: group(&self.sets, |s| {
                s.iter().map(|k| (k.clone(), String::new())).collect()
            }),
        }
    }

    /// Adds every container of `snapshot`, replacing same-named ones. All
    /// keyed containers are rebuilt before any registry is touched, so a
    /// failure leaves the manager unchanged.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), CommandError> {
        let mut hashmaps = Vec::with_capacity(snapshot.hashmaps.len());
        for (name, pairs) in snapshot.hashmaps {
            let mut t = self.new_table(pairs.len());
            t.load(pairs)?;
            hashmaps.push((name, t));
        }
        let mut cuckoo = Vec::with_capacity(snapshot.cuckoo.len());
        for (name, pairs) in snapshot.cuckoo {
            let mut t = self.new_cuckoo(pairs.len());
            t.load(pairs)?;
            cuckoo.push((name, t));
        }
        let mut sets = Vec::with_capacity(snapshot.sets.len());
        for (name, pairs) in snapshot.sets {
            let mut s = self.new_set(pairs.len());
            s.load(pairs.into_keys())?;
            sets.push((name, s));
        }

        self.hashmaps.extend(hashmaps);
        self.cuckoo.extend(cuckoo);
        self.sets.extend(sets);
        for (name, items) in snapshot.arrays {
            self.arrays.insert(name, items.into_iter().collect());
        }
        for (name, items) in snapshot.stacks {
            self.stacks.insert(name, items.into_iter().collect());
        }
        for (name, items) in snapshot.queues {
            self.queues.insert(name, items.into_iter().collect());
        }
        for (name, items) in snapshot.lists {
            self.lists.insert(name, items.into_iter().collect());
        }
        for (name, items) in snapshot.dlists {
            self.dlists.insert(name, items.into_iter().collect());
        }
        for (name, items) in snapshot.trees {
            self.trees.insert(name, items.into_iter().collect());
        }
        Ok(())
    }

    pub fn save_all<P: AsRef<Path>>(&self, path: P) -> Result<(), CommandError> {
        let snapshot = self.snapshot();
        let mut w = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut w, &snapshot)?;
        w.flush()?;
        log::info!("saved all containers to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_all<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CommandError> {
        let r = BufReader::new(File::open(path.as_ref())?);
        let snapshot: Snapshot = serde_json::from_reader(r)?;
        self.restore(snapshot)?;
        log::info!("loaded containers from {}", path.as_ref().display());
        Ok(())
    }
}
