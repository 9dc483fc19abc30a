//! DynArray: growable indexed sequence with checked positional edits.

use crate::error::ContainerError;
use core::fmt;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DynArray<T> {
    items: Vec<T>,
}

impl<T> DynArray<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    fn check(&self, index: usize, len: usize) -> Result<(), ContainerError> {
        if index < len {
            Ok(())
        } else {
            Err(ContainerError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    pub fn get(&self, index: usize) -> Result<&T, ContainerError> {
        self.check(index, self.items.len())?;
        Ok(&self.items[index])
    }

    /// Inserts before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), ContainerError> {
        self.check(index, self.items.len() + 1)?;
        self.items.insert(index, value);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<T, ContainerError> {
        self.check(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Overwrites the element at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, value: T) -> Result<T, ContainerError> {
        self.check(index, self.items.len())?;
        Ok(core::mem::replace(&mut self.items[index], value))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.iter())
    }
}

/// `[a, b, c]` rendering shared by the sequence containers.
pub(crate) fn write_list<'a, T, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    T: fmt::Display + 'a,
    I: IntoIterator<Item = &'a T>,
{
    f.write_str("[")?;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}
