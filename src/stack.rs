//! Stack: LIFO over a contiguous buffer.

use crate::array::write_list;
use crate::error::ContainerError;
use core::fmt;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
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

    pub fn pop(&mut self) -> Result<T, ContainerError> {
        self.items.pop().ok_or(ContainerError::Empty)
    }

    pub fn peek(&self) -> Result<&T, ContainerError> {
        self.items.last().ok_or(ContainerError::Empty)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Bottom to top.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    /// Pushes in iteration order; the last item ends on top.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.iter())
    }
}
