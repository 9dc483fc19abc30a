//! DoubleList: doubly linked list over a slot arena.
//!
//! `prev`/`next` are arena keys, so unlinking a node is a handful of key
//! updates on its neighbours rather than pointer surgery. Stale keys can
//! never alias a reused slot because the arena's keys are generational.

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
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

#[derive(Clone, Debug)]
pub struct DoubleList<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
}

impl<T> DoubleList<T> {
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
            prev: None,
            next: self.head,
        });
        match self.head.and_then(|h| self.nodes.get_mut(h)) {
            Some(first) => first.prev = Some(key),
            None => self.tail = Some(key),
        }
        self.head = Some(key);
    }

    pub fn push_back(&mut self, value: T) {
        let key = self.nodes.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(last) => last.next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    pub fn pop_front(&mut self) -> Result<T, ContainerError> {
        let key = self.head.ok_or(ContainerError::Empty)?;
        self.unlink(key).ok_or(ContainerError::Empty)
    }

    pub fn pop_back(&mut self) -> Result<T, ContainerError> {
        let key = self.tail.ok_or(ContainerError::Empty)?;
        self.unlink(key).ok_or(ContainerError::Empty)
    }

    fn unlink(&mut self, key: NodeKey) -> Option<T> {
        let node = self.nodes.remove(key)?;
        match node.prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.nodes.get_mut(n)) {
            Some(n) => n.prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.value)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            forward: true,
        }
    }

    /// Tail to head.
    pub fn iter_rev(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.tail,
            forward: false,
        }
    }
}

impl<T: PartialEq> DoubleList<T> {
    fn position(&self, value: &T) -> Option<NodeKey> {
        let mut cursor = self.head;
        while let Some(key) = cursor {
            let node = self.nodes.get(key)?;
            if &node.value == value {
                return Some(key);
            }
            cursor = node.next;
        }
        None
    }

    pub fn contains(&self, value: &T) -> bool {
        self.position(value).is_some()
    }

    /// Unlinks the first node equal to `value`.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.position(value) {
            Some(key) => self.unlink(key).is_some(),
            None => false,
        }
    }
}

impl<T> Default for DoubleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for DoubleList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = DoubleList::new();
        for item in iter {
            list.push_back(item);
        }
        list
    }
}

pub struct Iter<'a, T> {
    list: &'a DoubleList<T>,
    cursor: Option<NodeKey>,
    forward: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.list.nodes.get(self.cursor?)?;
        self.cursor = if self.forward { node.next } else { node.prev };
        Some(&node.value)
    }
}

impl<T: fmt::Display> fmt::Display for DoubleList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both_ways(l: &DoubleList<i32>) -> (Vec<i32>, Vec<i32>) {
        (l.iter().copied().collect(), l.iter_rev().copied().collect())
    }

    /// Invariant: forward and backward traversals mirror each other after
    /// every kind of edit.
    #[test]
    fn links_stay_symmetric() {
        let mut l = DoubleList::new();
        l.push_back(2);
        l.push_front(1);
        l.push_back(3);
        l.push_back(4);
        assert_eq!(both_ways(&l), (vec![1, 2, 3, 4], vec![4, 3, 2, 1]));

        assert!(l.remove(&3));
        assert_eq!(both_ways(&l), (vec![1, 2, 4], vec![4, 2, 1]));
        assert_eq!(l.pop_back(), Ok(4));
        assert_eq!(l.pop_front(), Ok(1));
        assert_eq!(both_ways(&l), (vec![2], vec![2]));
        assert!(l.remove(&2));
        assert!(l.is_empty());
        assert_eq!(l.pop_back(), Err(ContainerError::Empty));
    }

    #[test]
    fn remove_first_occurrence_only() {
        let mut l: DoubleList<i32> = [7, 8, 7].into_iter().collect();
        assert!(l.remove(&7));
        assert_eq!(both_ways(&l), (vec![8, 7], vec![7, 8]));
        assert!(l.contains(&7));
        assert!(!l.remove(&9));
        assert_eq!(l.len(), 2);
        l.clear();
        assert_eq!(l.to_string(), "[]");
    }
}
