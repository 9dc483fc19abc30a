//! Slot cells shared by both tables.

/// An owned key/value pair stored in a slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// Occupancy is an explicit tag, so every key value (the empty string
/// included) is storable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum Slot<K, V> {
    #[default]
    Empty,
    /// Tombstone left by a removal; probing continues past it.
    Deleted,
    Occupied(Entry<K, V>),
}

impl<K, V> Slot<K, V> {
    #[inline]
    pub fn occupied(key: K, value: V) -> Self {
        Slot::Occupied(Entry { key, value })
    }

    #[inline]
    pub fn entry(&self) -> Option<&Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn entry_mut(&mut self) -> Option<&mut Entry<K, V>> {
        match self {
            Slot::Occupied(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn holds<Q>(&self, q: &Q) -> bool
    where
        K: core::borrow::Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entry().map(|e| e.key.borrow() == q).unwrap_or(false)
    }
}

pub(crate) fn empty_slots<K, V>(n: usize) -> Vec<Slot<K, V>> {
    core::iter::repeat_with(|| Slot::Empty).take(n).collect()
}
