//! JSON projection of every container and the manager-wide snapshot
//! document.
//!
//! Keyed containers serialize as a key→value object (sets use `""` for
//! every value); sequences serialize as arrays, front to back. A round trip
//! preserves the key/value set, not slot positions: loading re-inserts
//! through `put`. Trees serialize as arrays in ascending order.

use crate::array::DynArray;
use crate::avl_tree::AvlTree;
use crate::cuckoo_table::CuckooTable;
use crate::double_hash_table::DoubleHashTable;
use crate::double_list::DoubleList;
use crate::queue::Queue;
use crate::set::Set;
use crate::single_list::SingleList;
use crate::stack::Stack;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Key→value form of a keyed container, ordered for stable output.
pub type Pairs = BTreeMap<String, String>;

fn serialize_pairs<'a, K, V, I, Ser>(s: Ser, len: usize, pairs: I) -> Result<Ser::Ok, Ser::Error>
where
    K: Serialize + 'a,
    V: Serialize + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
    Ser: Serializer,
{
    let mut map = s.serialize_map(Some(len))?;
    for (k, v) in pairs {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

fn serialize_items<'a, T, I, Ser>(s: Ser, len: usize, items: I) -> Result<Ser::Ok, Ser::Error>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    Ser: Serializer,
{
    let mut seq = s.serialize_seq(Some(len))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

impl<K: Serialize, V: Serialize, S> Serialize for DoubleHashTable<K, V, S> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_pairs(s, self.len(), self.iter())
    }
}

impl<K: Serialize, V: Serialize, S> Serialize for CuckooTable<K, V, S> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_pairs(s, self.len(), self.iter())
    }
}

impl<K: Serialize, S> Serialize for Set<K, S> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_pairs(s, self.len(), self.iter().map(|k| (k, "")))
    }
}

impl<T: Serialize> Serialize for DynArray<T> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_items(s, self.len(), self.iter())
    }
}

impl<T: Serialize> Serialize for Stack<T> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_items(s, self.len(), self.iter())
    }
}

impl<T: Serialize> Serialize for Queue<T> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_items(s, self.len(), self.iter())
    }
}

impl<T: Serialize> Serialize for SingleList<T> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_items(s, self.len(), self.iter())
    }
}

impl<T: Serialize> Serialize for DoubleList<T> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_items(s, self.len(), self.iter())
    }
}

impl<T: Serialize> Serialize for AvlTree<T> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_items(s, self.len(), self.iter())
    }
}

/// Every named container of a manager, grouped by kind. Missing groups
/// deserialize as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub arrays: BTreeMap<String, Vec<i64>>,
    pub stacks: BTreeMap<String, Vec<i64>>,
    pub queues: BTreeMap<String, Vec<i64>>,
    pub lists: BTreeMap<String, Vec<i64>>,
    pub dlists: BTreeMap<String, Vec<i64>>,
    pub trees: BTreeMap<String, Vec<i64>>,
    pub hashmaps: BTreeMap<String, Pairs>,
    pub cuckoo: BTreeMap<String, Pairs>,
    pub sets: BTreeMap<String, Pairs>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
            && self.stacks.is_empty()
            && self.queues.is_empty()
            && self.lists.is_empty()
            && self.dlists.is_empty()
            && self.trees.is_empty()
            && self.hashmaps.is_empty()
            && self.cuckoo.is_empty()
            && self.sets.is_empty()
    }
}
