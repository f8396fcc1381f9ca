use core::cmp::Ordering;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::policy::KeyPolicy;

/// Keys a well-formed node may hold. One more is allowed transiently (a 4-node).
pub(crate) const MAX_KEYS: usize = 2;
/// Children a well-formed internal node may hold.
pub(crate) const MAX_CHILDREN: usize = MAX_KEYS + 1;

// 2-3 tree node: 1-2 keys and, when internal, one more child than keys.
// A leaf has no children. Zero keys marks a hole during removal; three keys
// marks a 4-node during insertion.
pub(crate) struct Node<K> {
    // +1 leaves room for the overflow key before a split.
    keys: SmallVec<[K; MAX_KEYS + 1]>,
    children: SmallVec<[Handle; MAX_CHILDREN + 1]>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child to descend into (or the slot to
    /// insert into, for a leaf).
    GoDown(usize),
}

impl<K> Node<K> {
    /// Creates a leaf holding a single key.
    pub(crate) fn leaf(key: K) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        Self {
            keys,
            children: SmallVec::new(),
        }
    }

    /// Creates a node from already-ordered keys and (possibly no) children.
    pub(crate) fn from_parts(
        keys: SmallVec<[K; MAX_KEYS + 1]>,
        children: SmallVec<[Handle; MAX_CHILDREN + 1]>,
    ) -> Self {
        debug_assert!(children.is_empty() || children.len() == keys.len() + 1);
        Self { keys, children }
    }

    /// Creates a root above a split: `left`, `separator`, `right`.
    pub(crate) fn root(left: Handle, separator: K, right: Handle) -> Self {
        let mut keys = SmallVec::new();
        keys.push(separator);
        let mut children = SmallVec::new();
        children.push(left);
        children.push(right);
        Self { keys, children }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// A node with no keys left after a removal.
    #[inline]
    pub(crate) fn is_hole(&self) -> bool {
        self.keys.is_empty()
    }

    /// A node holding one key more than allowed.
    #[inline]
    pub(crate) fn is_overfull(&self) -> bool {
        self.keys.len() > MAX_KEYS
    }

    /// True for a 3-node, which can give a key to a neighbouring hole.
    #[inline]
    pub(crate) fn can_lend(&self) -> bool {
        self.keys.len() == MAX_KEYS
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Compares `key` against at most two keys, left to right.
    #[inline]
    pub(crate) fn search<P: KeyPolicy<K>>(&self, policy: &P, key: &K) -> SearchResult {
        for (index, probe) in self.keys.iter().enumerate() {
            match policy.compare(key, probe) {
                Ordering::Less => return SearchResult::GoDown(index),
                Ordering::Equal => return SearchResult::Found(index),
                Ordering::Greater => {}
            }
        }
        SearchResult::GoDown(self.keys.len())
    }

    /// Inserts a key into a leaf at `index`.
    pub(crate) fn insert_key(&mut self, index: usize, key: K) {
        debug_assert!(self.is_leaf());
        self.keys.insert(index, key);
    }

    /// Inserts `separator` at `index` with `right` as the child that follows it.
    pub(crate) fn insert_child(&mut self, index: usize, separator: K, right: Handle) {
        self.keys.insert(index, separator);
        self.children.insert(index + 1, right);
    }

    /// Removes a key from a leaf.
    pub(crate) fn remove_key(&mut self, index: usize) -> K {
        debug_assert!(self.is_leaf());
        self.keys.remove(index)
    }

    /// Removes the separator at `index` and the child that follows it.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    /// Replaces the key at `index`, returning the previous one.
    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Splits a 4-node. Keeps the first key and first two children, returns
    /// the middle key and a node with the last key and last two children.
    pub(crate) fn split(&mut self) -> (K, Node<K>) {
        debug_assert!(self.is_overfull());

        let keys: SmallVec<_> = self.keys.drain(MAX_KEYS..).collect();
        let children: SmallVec<_> = if self.is_leaf() {
            SmallVec::new()
        } else {
            self.children.drain(MAX_KEYS..).collect()
        };
        let median = self.keys.pop().expect("`Node::split()` - node has no median key!");

        (median, Node { keys, children })
    }

    /// Takes the first key (and first child) of a 3-node for a right-hand neighbour.
    pub(crate) fn lend_first(&mut self) -> (K, Option<Handle>) {
        debug_assert!(self.can_lend());
        let key = self.keys.remove(0);
        let child = if self.is_leaf() { None } else { Some(self.children.remove(0)) };
        (key, child)
    }

    /// Takes the last key (and last child) of a 3-node for a left-hand neighbour.
    pub(crate) fn lend_last(&mut self) -> (K, Option<Handle>) {
        debug_assert!(self.can_lend());
        let key = self.keys.pop().expect("`Node::lend_last()` - node is empty!");
        let child = if self.is_leaf() { None } else { self.children.pop() };
        (key, child)
    }

    /// Fills a hole from its left: the key becomes the first key and the
    /// child becomes the first child.
    pub(crate) fn accept_front(&mut self, key: K, child: Option<Handle>) {
        debug_assert!(self.is_hole());
        self.keys.insert(0, key);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Fills a hole from its right: the key and child go at the end.
    pub(crate) fn accept_back(&mut self, key: K, child: Option<Handle>) {
        debug_assert!(self.is_hole());
        self.keys.push(key);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Merges a right sibling into this node, pulling `separator` down between them.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: Node<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
        debug_assert!(self.keys.len() <= MAX_KEYS);
    }

    /// Removes the only child of an empty root.
    pub(crate) fn take_only_child(&mut self) -> Option<Handle> {
        debug_assert!(self.is_hole() && self.children.len() <= 1);
        self.children.pop()
    }

    /// Takes every key, leaving an empty node.
    pub(crate) fn take_keys(&mut self) -> SmallVec<[K; MAX_KEYS + 1]> {
        core::mem::take(&mut self.keys)
    }
}
