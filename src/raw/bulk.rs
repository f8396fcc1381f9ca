//! Bottom-up construction of a packed 2-3 tree from a key set.

use alloc::vec::Vec;
use core::cmp::Ordering;

use smallvec::SmallVec;
use tracing::trace;

use super::handle::Handle;
use super::node::{MAX_KEYS, Node};
use super::raw_tree_map::RawTreeMap;
use crate::policy::KeyPolicy;

type Group<K> = SmallVec<[K; MAX_KEYS + 1]>;

impl<K, P: KeyPolicy<K>> RawTreeMap<K, P> {
    /// Builds a tree holding one copy of every distinct key.
    ///
    /// Surplus copies of equal keys are returned in sorted order. They are
    /// neither stored nor released.
    pub(crate) fn bulk_load(policy: P, mut keys: Vec<K>) -> (Self, Vec<K>) {
        keys.sort_by(|a, b| policy.compare(a, b));
        let (unique, duplicates) = partition_duplicates(&policy, keys);

        // A packed tree has at most one node per key.
        let mut tree = Self::with_capacity(policy, unique.len());
        let len = unique.len();
        let root = tree.build_levels(unique);
        tree.install(root, len);

        trace!(len, duplicates = duplicates.len(), height = tree.height(), "2-3 tree bulk loaded");
        (tree, duplicates)
    }

    /// Allocates the nodes for `keys` (sorted, distinct) and returns the root.
    fn build_levels(&mut self, keys: Vec<K>) -> Option<Handle> {
        if keys.is_empty() {
            return None;
        }

        // Leaves first; the last level holds the root alone.
        let mut levels: Vec<Vec<Group<K>>> = Vec::new();
        let mut keys = keys;
        loop {
            let (groups, separators) = group_level(keys);
            levels.push(groups);
            if separators.is_empty() {
                break;
            }
            keys = separators;
        }

        // `staged` holds the handles of the level just built, left to right.
        // Each node of the next level claims `keys + 1` of them as children;
        // at the leaf level it is empty and nodes get no children.
        let mut staged: Vec<Handle> = Vec::new();
        for groups in levels {
            let mut below = staged.into_iter();
            let mut level = Vec::with_capacity(groups.len());
            for keys in groups {
                let children = below.by_ref().take(keys.len() + 1).collect();
                level.push(self.alloc(Node::from_parts(keys, children)));
            }
            debug_assert!(below.next().is_none(), "bulk load left children unclaimed");
            staged = level;
        }

        debug_assert_eq!(staged.len(), 1);
        staged.pop()
    }
}

/// Keeps the first of every run of equal keys in `sorted`; the rest are
/// returned separately, in order.
fn partition_duplicates<K, P: KeyPolicy<K>>(policy: &P, sorted: Vec<K>) -> (Vec<K>, Vec<K>) {
    let mut unique: Vec<K> = Vec::with_capacity(sorted.len());
    let mut duplicates = Vec::new();

    for key in sorted {
        let repeated = unique.last().is_some_and(|last| policy.compare(last, &key) == Ordering::Equal);
        if repeated {
            duplicates.push(key);
        } else {
            unique.push(key);
        }
    }
    (unique, duplicates)
}

/// Whether the key at `index` of a level of `len` keys moves up as a separator.
///
/// Every second key of each triple is promoted, leaving groups of one or two
/// keys between separators. When two keys would be left over at the end, the
/// first of them is promoted instead so no group is empty. A level of one or
/// two keys is the root and promotes nothing.
const fn promotes(index: usize, len: usize) -> bool {
    if len <= MAX_KEYS {
        return false;
    }
    (index % 3 == 1 && index + 1 < len) || (len % 3 == 2 && index == len - 2)
}

/// Splits one level into node groups and the separators for the level above.
fn group_level<K>(keys: Vec<K>) -> (Vec<Group<K>>, Vec<K>) {
    let len = keys.len();
    let mut groups = Vec::with_capacity(len / 3 + 2);
    let mut separators = Vec::with_capacity(len / 3 + 1);
    let mut current = Group::new();

    for (index, key) in keys.into_iter().enumerate() {
        if promotes(index, len) {
            separators.push(key);
            groups.push(core::mem::take(&mut current));
        } else {
            current.push(key);
        }
    }
    groups.push(current);

    (groups, separators)
}
