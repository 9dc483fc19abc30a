//! Set: keys only, stored in a [`DoubleHashTable`] with `()` values.

use crate::double_hash_table::{self, DoubleHashTable};
use crate::error::TableError;
use crate::hashing::{BuildFnv32, KeyBytes, DEFAULT_CAPACITY};
use core::borrow::Borrow;
use core::fmt;
use core::hash::BuildHasher;

#[derive(Clone, Debug)]
pub struct Set<K, S = BuildFnv32> {
    table: DoubleHashTable<K, (), S>,
}

impl<K> Set<K>
where
    K: Eq + KeyBytes,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            table: DoubleHashTable::new(capacity),
        }
    }
}

impl<K> Default for Set<K>
where
    K: Eq + KeyBytes,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, S> Set<K, S>
where
    K: Eq + KeyBytes,
    S: BuildHasher,
{
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: DoubleHashTable::with_hasher(capacity, hasher),
        }
    }

    /// Adds `key`. Returns `true` if it was not present before; re-adding is
    /// a successful no-op.
    pub fn add(&mut self, key: K) -> Result<bool, TableError> {
        Ok(self.table.put(key, ())?.is_none())
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        self.table.contains(q)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + KeyBytes + Eq,
    {
        self.table.remove(q)
    }

    pub fn clear(&mut self) {
        self.table.clear()
    }

    pub fn load<I>(&mut self, keys: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = K>,
    {
        self.table.load(keys.into_iter().map(|k| (k, ())))
    }
}

impl<K, S> Set<K, S> {
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }
}

pub struct Iter<'a, K> {
    inner: double_hash_table::Iter<'a, K, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }
}

impl<'a, K, S> IntoIterator for &'a Set<K, S> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, S> fmt::Display for Set<K, S>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, k) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}")?;
        }
        write!(f, "}} (size: {})", self.table.len())
    }
}
