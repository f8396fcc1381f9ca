use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};
use crate::error::DuplicateKey;
use crate::policy::KeyPolicy;

/// The 2-3 tree backing `TreeMap`.
pub(crate) struct RawTreeMap<K, P: KeyPolicy<K>> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of keys in the tree.
    len: usize,
    /// Ordering and release policy, fixed at construction.
    policy: P,
}

/// One step of a descent: the node visited and the child taken from it.
struct PathElement {
    node: Handle,
    child_index: usize,
}

/// Ancestors of the node being modified, root first.
type Path = SmallVec<[PathElement; 16]>;

impl<K, P: KeyPolicy<K>> RawTreeMap<K, P> {
    pub(crate) const fn new(policy: P) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            policy,
        }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(policy: P, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
            policy,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn policy(&self) -> &P {
        &self.policy
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Number of levels; 0 for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            height += 1;
            let node = self.nodes.get(handle);
            current = node.children().first().copied();
        }
        height
    }

    /// Installs a tree built elsewhere (the bulk loader) into an empty map.
    pub(crate) fn install(&mut self, root: Option<Handle>, len: usize) {
        debug_assert!(self.root.is_none() && self.len == 0);
        self.root = root;
        self.len = len;
    }

    pub(crate) fn alloc(&mut self, node: Node<K>) -> Handle {
        self.nodes.alloc(node)
    }

    /// Discards every key through the release hook and frees all nodes.
    pub(crate) fn clear(&mut self) {
        self.root = None;
        self.len = 0;
        for mut node in self.nodes.drain() {
            for key in node.take_keys() {
                drop(self.policy.release(key));
            }
        }
        debug_assert!(self.nodes.is_empty());
    }

    /// Searches for a key and returns the node handle and slot if found.
    pub(crate) fn search(&self, key: &K) -> Option<(Handle, usize)> {
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            match node.search(&self.policy, key) {
                SearchResult::Found(index) => return Some((current, index)),
                SearchResult::GoDown(_) if node.is_leaf() => return None,
                SearchResult::GoDown(index) => current = node.child(index),
            }
        }
    }

    /// Returns the stored key equal to `key`.
    pub(crate) fn get(&self, key: &K) -> Option<&K> {
        let (handle, index) = self.search(key)?;
        Some(self.nodes.get(handle).key(index))
    }

    pub(crate) fn first(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return node.keys().first();
            }
            current = node.child(0);
        }
    }

    pub(crate) fn last(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return node.keys().last();
            }
            current = node.child(node.child_count() - 1);
        }
    }

    /// Inserts a key, handing it back if an equal key is already stored.
    ///
    /// The tree is not touched before the descent has ruled out a duplicate.
    pub(crate) fn insert(&mut self, key: K) -> Result<(), DuplicateKey<K>> {
        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(key)));
            self.len = 1;
            return Ok(());
        };

        let mut path: Path = SmallVec::new();
        let mut current = root;

        let slot = loop {
            let node = self.nodes.get(current);
            match node.search(&self.policy, &key) {
                SearchResult::Found(_) => return Err(DuplicateKey(key)),
                SearchResult::GoDown(index) if node.is_leaf() => break index,
                SearchResult::GoDown(index) => {
                    path.push(PathElement {
                        node: current,
                        child_index: index,
                    });
                    current = node.child(index);
                }
            }
        };

        self.nodes.get_mut(current).insert_key(slot, key);
        self.len += 1;
        self.split_upwards(current, &mut path);
        Ok(())
    }

    /// Splits 4-nodes from `current` towards the root until one absorbs the
    /// promoted key without overflowing.
    fn split_upwards(&mut self, mut current: Handle, path: &mut Path) {
        while self.nodes.get(current).is_overfull() {
            let (median, right) = self.nodes.get_mut(current).split();
            let right = self.nodes.alloc(right);

            if let Some(parent) = path.pop() {
                self.nodes.get_mut(parent.node).insert_child(parent.child_index, median, right);
                current = parent.node;
            } else {
                let root = self.nodes.alloc(Node::root(current, median, right));
                self.root = Some(root);
                trace!(height = self.height(), len = self.len, "2-3 tree root split");
                return;
            }
        }
    }

    /// Removes the key equal to `key` and returns it. The caller applies the
    /// release hook.
    pub(crate) fn remove(&mut self, key: &K) -> Option<K> {
        let mut path: Path = SmallVec::new();
        let mut current = self.root?;

        let index = loop {
            let node = self.nodes.get(current);
            match node.search(&self.policy, key) {
                SearchResult::Found(index) => break index,
                SearchResult::GoDown(_) if node.is_leaf() => return None,
                SearchResult::GoDown(index) => {
                    path.push(PathElement {
                        node: current,
                        child_index: index,
                    });
                    current = node.child(index);
                }
            }
        };

        Some(self.remove_found(current, index, &mut path))
    }

    /// Removes and returns the smallest key.
    pub(crate) fn pop_first(&mut self) -> Option<K> {
        let mut path: Path = SmallVec::new();
        let mut current = self.root?;

        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                break;
            }
            path.push(PathElement {
                node: current,
                child_index: 0,
            });
            current = node.child(0);
        }

        Some(self.remove_found(current, 0, &mut path))
    }

    /// Removes and returns the largest key.
    pub(crate) fn pop_last(&mut self) -> Option<K> {
        let mut path: Path = SmallVec::new();
        let mut current = self.root?;

        let index = loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                break node.key_count() - 1;
            }
            let last = node.child_count() - 1;
            path.push(PathElement {
                node: current,
                child_index: last,
            });
            current = node.child(last);
        };

        Some(self.remove_found(current, index, &mut path))
    }

    /// Removes the key in slot `index` of `node`, whose ancestors are `path`.
    ///
    /// An internal key is replaced by its in-order successor, which is taken
    /// from the leftmost leaf of the subtree to its right. Either way a key
    /// leaves a leaf, and a leaf left empty is repaired.
    fn remove_found(&mut self, node: Handle, index: usize, path: &mut Path) -> K {
        let (leaf, removed) = if self.nodes.get(node).is_leaf() {
            (node, self.nodes.get_mut(node).remove_key(index))
        } else {
            path.push(PathElement {
                node,
                child_index: index + 1,
            });
            let mut current = self.nodes.get(node).child(index + 1);
            loop {
                let n = self.nodes.get(current);
                if n.is_leaf() {
                    break;
                }
                path.push(PathElement {
                    node: current,
                    child_index: 0,
                });
                current = n.child(0);
            }

            let successor = self.nodes.get_mut(current).remove_key(0);
            (current, self.nodes.get_mut(node).replace_key(index, successor))
        };

        self.len -= 1;
        if self.nodes.get(leaf).is_hole() {
            self.repair(leaf, path);
        }
        removed
    }

    /// Resolves a hole, moving up one level per merge.
    ///
    /// Every handle in `path` stays valid while this runs: fixing a hole only
    /// touches the hole, its parent and the parent's other children, and a
    /// merge frees one of those children, never an ancestor.
    fn repair(&mut self, mut hole: Handle, path: &mut Path) {
        loop {
            let Some(PathElement { node: parent, child_index }) = path.pop() else {
                let only_child = self.nodes.get_mut(hole).take_only_child();
                self.nodes.free(hole);
                self.root = only_child;
                trace!(height = self.height(), len = self.len, "2-3 tree root collapsed");
                return;
            };

            if self.borrow_from_sibling(hole, parent, child_index) {
                return;
            }

            self.merge_with_sibling(parent, child_index);
            if !self.nodes.get(parent).is_hole() {
                return;
            }
            hole = parent;
        }
    }

    /// Rotates a key through the parent from an adjacent 3-node, right
    /// sibling first. Returns `false` when both neighbours are 2-nodes.
    fn borrow_from_sibling(&mut self, hole: Handle, parent: Handle, index: usize) -> bool {
        let p = self.nodes.get(parent);
        let right = (index < p.key_count()).then(|| p.child(index + 1));
        let left = index.checked_sub(1).map(|i| p.child(i));

        if let Some(right) = right
            && self.nodes.get(right).can_lend()
        {
            let (key, child) = self.nodes.get_mut(right).lend_first();
            let separator = self.nodes.get_mut(parent).replace_key(index, key);
            self.nodes.get_mut(hole).accept_back(separator, child);
            return true;
        }

        if let Some(left) = left
            && self.nodes.get(left).can_lend()
        {
            let (key, child) = self.nodes.get_mut(left).lend_last();
            let separator = self.nodes.get_mut(parent).replace_key(index - 1, key);
            self.nodes.get_mut(hole).accept_front(separator, child);
            return true;
        }

        false
    }

    /// Merges the hole at `index` with a 2-node neighbour, pulling the
    /// separator down and freeing the right-hand node of the pair. The
    /// parent loses one key and may become a hole.
    fn merge_with_sibling(&mut self, parent: Handle, index: usize) {
        let separator_index = index.saturating_sub(1);
        let (separator, right) = self.nodes.get_mut(parent).remove_child(separator_index);
        let left = self.nodes.get(parent).child(separator_index);

        let right = self.nodes.take(right);
        self.nodes.get_mut(left).merge_with_right(separator, right);
    }
}

impl<K, P: KeyPolicy<K>> Drop for RawTreeMap<K, P> {
    fn drop(&mut self) {
        self.clear();
    }
}
