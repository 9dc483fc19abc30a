//! AvlTree: ordered set kept height-balanced, over a slot arena.
//!
//! Children are arena keys. Insert and remove walk down recursively and
//! rebalance each node on the way back up, so every subtree's heights
//! differ by at most one. Equal values are stored once.

use crate::array::write_list;
use core::cmp::Ordering;
use core::fmt;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeKey;
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    height: u32,
    left: Option<NodeKey>,
    right: Option<NodeKey>,
}

#[derive(Clone, Debug)]
pub struct AvlTree<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    root: Option<NodeKey>,
}

impl<T> AvlTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Levels on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut it = Iter {
            tree: self,
            stack: Vec::new(),
        };
        it.descend(self.root);
        it
    }

    fn height_of(&self, key: Option<NodeKey>) -> u32 {
        key.and_then(|k| self.nodes.get(k)).map_or(0, |n| n.height)
    }

    /// Left height minus right height.
    fn balance_of(&self, key: Option<NodeKey>) -> i64 {
        match key.and_then(|k| self.nodes.get(k)) {
            Some(n) => i64::from(self.height_of(n.left)) - i64::from(self.height_of(n.right)),
            None => 0,
        }
    }

    fn left(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.left)
    }

    fn right(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.right)
    }

    fn set_left(&mut self, key: NodeKey, child: Option<NodeKey>) {
        if let Some(n) = self.nodes.get_mut(key) {
            n.left = child;
        }
    }

    fn set_right(&mut self, key: NodeKey, child: Option<NodeKey>) {
        if let Some(n) = self.nodes.get_mut(key) {
            n.right = child;
        }
    }

    fn refresh(&mut self, key: NodeKey) {
        let height = 1 + self
            .height_of(self.left(key))
            .max(self.height_of(self.right(key)));
        if let Some(n) = self.nodes.get_mut(key) {
            n.height = height;
        }
    }

    fn rotate_right(&mut self, top: NodeKey) -> NodeKey {
        let Some(pivot) = self.left(top) else {
            return top;
        };
        self.set_left(top, self.right(pivot));
        self.set_right(pivot, Some(top));
        self.refresh(top);
        self.refresh(pivot);
        pivot
    }

    fn rotate_left(&mut self, top: NodeKey) -> NodeKey {
        let Some(pivot) = self.right(top) else {
            return top;
        };
        self.set_right(top, self.left(pivot));
        self.set_left(pivot, Some(top));
        self.refresh(top);
        self.refresh(pivot);
        pivot
    }

    /// Restores the height bound at `key` and returns the subtree's new root.
    fn rebalance(&mut self, key: NodeKey) -> NodeKey {
        self.refresh(key);
        let balance = self.balance_of(Some(key));
        if balance > 1 {
            if let Some(l) = self.left(key) {
                if self.balance_of(Some(l)) < 0 {
                    let l = self.rotate_left(l);
                    self.set_left(key, Some(l));
                }
            }
            return self.rotate_right(key);
        }
        if balance < -1 {
            if let Some(r) = self.right(key) {
                if self.balance_of(Some(r)) > 0 {
                    let r = self.rotate_right(r);
                    self.set_right(key, Some(r));
                }
            }
            return self.rotate_left(key);
        }
        key
    }

    /// Detaches the smallest node under `key`. Returns the new subtree root
    /// and the detached value.
    fn take_min(&mut self, key: NodeKey) -> (Option<NodeKey>, Option<T>) {
        match self.left(key) {
            Some(l) => {
                let (rest, min) = self.take_min(l);
                self.set_left(key, rest);
                (Some(self.rebalance(key)), min)
            }
            None => {
                let right = self.right(key);
                (right, self.nodes.remove(key).map(|n| n.value))
            }
        }
    }
}

impl<T: Ord> AvlTree<T> {
    /// Adds `value`; returns false if an equal value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        let (root, added) = self.insert_at(self.root, value);
        self.root = Some(root);
        added
    }

    fn insert_at(&mut self, at: Option<NodeKey>, value: T) -> (NodeKey, bool) {
        let Some((key, node)) = at.and_then(|k| Some((k, self.nodes.get(k)?))) else {
            let leaf = self.nodes.insert(Node {
                value,
                height: 1,
                left: None,
                right: None,
            });
            return (leaf, true);
        };
        let (left, right) = (node.left, node.right);
        let added = match value.cmp(&node.value) {
            Ordering::Less => {
                let (child, added) = self.insert_at(left, value);
                self.set_left(key, Some(child));
                added
            }
            Ordering::Greater => {
                let (child, added) = self.insert_at(right, value);
                self.set_right(key, Some(child));
                added
            }
            Ordering::Equal => false,
        };
        if added {
            (self.rebalance(key), true)
        } else {
            (key, false)
        }
    }

    pub fn remove(&mut self, value: &T) -> bool {
        let (root, removed) = self.remove_at(self.root, value);
        self.root = root;
        removed
    }

    fn remove_at(&mut self, at: Option<NodeKey>, value: &T) -> (Option<NodeKey>, bool) {
        let Some((key, node)) = at.and_then(|k| Some((k, self.nodes.get(k)?))) else {
            return (at, false);
        };
        let (left, right) = (node.left, node.right);
        match value.cmp(&node.value) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(left, value);
                self.set_left(key, child);
                if !removed {
                    return (Some(key), false);
                }
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(right, value);
                self.set_right(key, child);
                if !removed {
                    return (Some(key), false);
                }
            }
            Ordering::Equal => match (left, right) {
                (Some(_), Some(r)) => {
                    // The in-order successor takes this node's place.
                    let (rest, successor) = self.take_min(r);
                    self.set_right(key, rest);
                    if let (Some(successor), Some(n)) = (successor, self.nodes.get_mut(key)) {
                        n.value = successor;
                    }
                }
                (child, None) | (None, child) => {
                    self.nodes.remove(key);
                    return (child, true);
                }
            },
        }
        (Some(self.rebalance(key)), true)
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut cursor = self.root;
        while let Some(node) = cursor.and_then(|k| self.nodes.get(k)) {
            cursor = match value.cmp(&node.value) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return true,
            };
        }
        false
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        for item in iter {
            tree.insert(item);
        }
        tree
    }
}

/// In-order iterator; the stack holds the pending ancestors.
pub struct Iter<'a, T> {
    tree: &'a AvlTree<T>,
    stack: Vec<NodeKey>,
}

impl<'a, T> Iter<'a, T> {
    fn descend(&mut self, mut cursor: Option<NodeKey>) {
        while let Some(key) = cursor {
            self.stack.push(key);
            cursor = self.tree.left(key);
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let tree = self.tree;
        let node = tree.nodes.get(self.stack.pop()?)?;
        self.descend(node.right);
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Display> fmt::Display for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, self.iter())
    }
}
