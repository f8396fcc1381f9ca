use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::policy::{KeyPolicy, Natural};
use crate::raw::{Handle, RawTreeMap};

/// An iterator over the keys of a `TreeMap`, in order.
///
/// This `struct` is created by the [`iter`] method on [`TreeMap`]. See its
/// documentation for more.
///
/// Each node is entered once: its first child is walked, then each key is
/// yielded followed by the child to its right.
///
/// [`iter`]: crate::TreeMap::iter
/// [`TreeMap`]: crate::TreeMap
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, P: KeyPolicy<K> = Natural> {
    tree: &'a RawTreeMap<K, P>,
    // Nodes on the way down from the root, each with the index of the next
    // key to yield from it.
    stack: SmallVec<[(Handle, usize); 16]>,
    remaining: usize,
}

impl<'a, K, P: KeyPolicy<K>> Iter<'a, K, P> {
    pub(super) fn new(tree: &'a RawTreeMap<K, P>) -> Self {
        let mut iter = Iter {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        if let Some(root) = tree.root() {
            iter.descend(root);
        }
        iter
    }

    /// Pushes `handle` and its leftmost descendants.
    fn descend(&mut self, mut handle: Handle) {
        let tree = self.tree;
        loop {
            self.stack.push((handle, 0));
            let node = tree.node(handle);
            if node.is_leaf() {
                return;
            }
            handle = node.child(0);
        }
    }
}

impl<'a, K, P: KeyPolicy<K>> Iterator for Iter<'a, K, P> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        loop {
            let (handle, next_key) = self.stack.last_mut()?;
            let node = tree.node(*handle);

            if *next_key < node.key_count() {
                let key = node.key(*next_key);
                *next_key += 1;
                let right = (!node.is_leaf()).then(|| node.child(*next_key));
                if let Some(right) = right {
                    self.descend(right);
                }
                self.remaining -= 1;
                return Some(key);
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, P: KeyPolicy<K>> ExactSizeIterator for Iter<'_, K, P> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, P: KeyPolicy<K>> FusedIterator for Iter<'_, K, P> {}

impl<K, P: KeyPolicy<K>> Clone for Iter<'_, K, P> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, P: KeyPolicy<K>> fmt::Debug for Iter<'_, K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}
