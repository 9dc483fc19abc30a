//! SingleList: forward-linked list whose nodes live in a slot arena.
//!
//! Links are arena keys rather than pointers; head and tail are optional
//! keys. Removing a node returns its slot to the arena.

use crate::array::write_list;
use crate::error::ContainerError;
use core::fmt;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeKey;
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    next: Option<NodeKey>,
}

#[derive(Clone, Debug)]
pub struct SingleList<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
}

impl<T> SingleList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push_front(&mut self, value: T) {
        let key = self.nodes.insert(Node {
            value,
            next: self.head,
        });
        self.head = Some(key);
        if self.tail.is_none() {
            self.tail = Some(key);
        }
    }

    pub fn push_back(&mut self, value: T) {
        let key = self.nodes.insert(Node { value, next: None });
        match self.tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(last) => last.next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    pub fn pop_front(&mut self) -> Result<T, ContainerError> {
        let key = self.head.ok_or(ContainerError::Empty)?;
        let node = self.nodes.remove(key).ok_or(ContainerError::Empty)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Ok(node.value)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

impl<T: PartialEq> SingleList<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|v| v == value)
    }

    /// Unlinks the first node equal to `value`. Returns whether one was found.
    pub fn remove(&mut self, value: &T) -> bool {
        let mut prev: Option<NodeKey> = None;
        let mut cursor = self.head;
        while let Some(key) = cursor {
            let Some(node) = self.nodes.get(key) else {
                return false;
            };
            if &node.value != value {
                prev = Some(key);
                cursor = node.next;
                continue;
            }
            let next = node.next;
            match prev.and_then(|p| self.nodes.get_mut(p)) {
                Some(p) => p.next = next,
                None => self.head = next,
            }
            if self.tail == Some(key) {
                self.tail = prev;
            }
            self.nodes.remove(key);
            return true;
        }
        false
    }
}

impl<T> Default for SingleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for SingleList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = SingleList::new();
        for item in iter {
            list.push_back(item);
        }
        list
    }
}

pub struct Iter<'a, T> {
    list: &'a SingleList<T>,
    cursor: Option<NodeKey>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.list.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}

impl<T: fmt::Display> fmt::Display for SingleList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.iter())
    }
}
