//! keyed-containers: fixed-capacity hash tables (double hashing and
//! two-table cuckoo), a set built on the first, a handful of linear
//! containers, an AVL tree, and a command front end that drives all of them by name.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: small, predictable containers whose placement rules are easy to
//!   check from the outside, with snapshots in two formats.
//! - Layers:
//!   - `hashing`: FNV-1a (32-bit) as a `BuildHasher`, the double-hashing
//!     probe path and the two cuckoo homes derived from one hash.
//!   - `DoubleHashTable<K, V, S>`: one slot array, open addressing with a
//!     hash-derived stride. Removal leaves a tombstone.
//!   - `CuckooTable<K, V, S>`: two slot arrays, every key at one of its two
//!     homes, bounded eviction chains.
//!   - `Set<K, S>`: a `DoubleHashTable<K, ()>`.
//!   - `DynArray`, `Stack`, `Queue`, `SingleList`, `DoubleList`: linear
//!     containers over `i64` in the front end.
//!   - `AvlTree`: a height-balanced ordered set in a slot arena.
//!   - `ContainerManager`: named registries plus the command dispatcher,
//!     JSON snapshots and the binary layout.
//!
//! Constraints
//! - Table capacity is fixed at construction; there is no resizing. A full
//!   table, or a cuckoo eviction chain that runs past its bound, is
//!   reported as an error and leaves the table unchanged.
//! - Probing, lookup and eviction do not allocate.
//! - Single-threaded: the tables carry a debug-only access guard that is
//!   `!Send`.
//!
//! Placement rules
//! - Double hashing: with `h` the 32-bit hash and `cap` the capacity, the
//!   probe path starts at `h % cap` and advances by
//!   `max(h % (cap - 1), 1)`, wrapping, for at most `cap` steps. With a
//!   prime capacity every slot is on every path.
//! - Cuckoo: first home `h % cap` in the first array, second home
//!   `(h / cap) % cap` in the second. A new key takes an empty home if it
//!   can, otherwise displaces an occupant which moves to its other home.
//!   If the chain exceeds `max_evictions` rounds the displacements are
//!   undone and the insert fails with `EvictionCycle`.
//!
//! Removal
//! - Double hashing writes a tombstone so keys further along a probe path
//!   stay reachable. Lookups skip tombstones; inserts reuse the first
//!   tombstone on the path once the key is known to be absent.
//! - Cuckoo removal simply empties the slot: lookups only ever read the
//!   two homes.
//!
//! Reentrancy policy
//! - Table methods only call into user code through `K: Eq + KeyBytes`. In
//!   debug builds each public method enters a `ProbeGuard`; calling back
//!   into the same table from `Eq` or `KeyBytes` panics instead of
//!   observing a table mid-update.
//!
//! Snapshots
//! - JSON: keyed containers serialize as objects (sets use `""` values),
//!   sequences and trees as arrays. Loading re-inserts through `put`, so slot
//!   positions are recomputed.
//! - Binary: little-endian `u32` counts and lengths, `i32` elements.
//!
//! Notes and non-goals
//! - No rehashing or growth for the hash tables.
//! - No concurrent access.
//! - The front end is line-oriented text; it is a thin shell over
//!   `ContainerManager::execute`.

pub mod array;
pub mod avl_tree;
pub mod codec;
pub mod config;
pub mod cuckoo_table;
pub mod double_hash_table;
pub mod double_list;
pub mod error;
mod guard;
pub mod hashing;
pub mod manager;
pub mod queue;
pub mod set;
pub mod single_list;
mod slot;
pub mod snapshot;
pub mod stack;
mod table_proptest;

// Public surface
pub use array::DynArray;
pub use avl_tree::AvlTree;
pub use codec::BinaryCodec;
pub use config::ManagerConfig;
pub use cuckoo_table::{CuckooConfig, CuckooTable, Location};
pub use double_hash_table::DoubleHashTable;
pub use double_list::DoubleList;
pub use error::{CodecError, CommandError, ContainerError, TableError};
pub use hashing::{BuildFnv32, Fnv32Hasher, KeyBytes};
pub use manager::{ContainerManager, Kind, Outcome};
pub use queue::Queue;
pub use set::Set;
pub use single_list::SingleList;
pub use snapshot::Snapshot;
pub use stack::Stack;
