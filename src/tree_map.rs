use alloc::vec::Vec;
use core::fmt;

use crate::error::DuplicateKey;
use crate::policy::{KeyPolicy, Natural};
use crate::raw::RawTreeMap;

mod capacity;
mod iter;

pub use iter::Iter;

/// An ordered map of keys backed by a [2-3 tree].
///
/// Keys are ordered by the map's [`KeyPolicy`], which is fixed when the map is
/// created. [`TreeMap::new`] uses [`Natural`] (the key's [`Ord`]); any other
/// ordering, or a release hook, is supplied through [`TreeMap::with_policy`].
///
/// The map stores keys only. Anything that should travel with a key (a value,
/// a payload) lives inside the key type and is ignored by the ordering, as
/// with [`StringKey`](crate::StringKey).
///
/// Every node holds one or two keys, every internal node has one child more
/// than it has keys, and all leaves sit at the same depth, so lookups, inserts
/// and removals visit O(log n) nodes.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the map. The
/// behavior resulting from such a logic error is not specified, but will be
/// encapsulated to the `TreeMap` that observed it and not result in undefined
/// behavior.
///
/// # Examples
///
/// ```
/// use trine::TreeMap;
///
/// let mut map = TreeMap::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     map.insert(key).unwrap();
/// }
///
/// // Equal keys are refused and handed back.
/// assert_eq!(map.insert(5).unwrap_err().into_key(), 5);
/// assert_eq!(map.len(), 7);
///
/// assert_eq!(map.get(&4), Some(&4));
/// assert!(map.iter().copied().eq([1, 3, 4, 5, 7, 8, 9]));
/// assert_eq!(map.filter_count(|key| key % 2 == 0), 2);
/// ```
///
/// [2-3 tree]: https://en.wikipedia.org/wiki/2%E2%80%933_tree
pub struct TreeMap<K, P: KeyPolicy<K> = Natural> {
    raw: RawTreeMap<K, P>,
}

/// What [`TreeMap::remove`] did with the key it took out of the map.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Removed<K> {
    /// The policy's release hook consumed the key.
    Released,
    /// The policy has no release hook; the key belongs to the caller again.
    Returned(K),
}

impl<K> Removed<K> {
    /// Returns the key if it was handed back.
    pub fn into_key(self) -> Option<K> {
        match self {
            Removed::Released => None,
            Removed::Returned(key) => Some(key),
        }
    }

    /// Returns `true` if the release hook consumed the key.
    pub const fn is_released(&self) -> bool {
        matches!(self, Removed::Released)
    }
}

impl<K: Ord> TreeMap<K> {
    /// Makes a new, empty `TreeMap` ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert("a").unwrap();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        TreeMap {
            raw: RawTreeMap::new(Natural),
        }
    }

    /// Builds a map ordered by [`Ord`] from unsorted keys. See
    /// [`bulk_load`](TreeMap::bulk_load).
    #[must_use]
    pub fn from_keys(keys: Vec<K>) -> (Self, Vec<K>) {
        TreeMap::bulk_load(Natural, keys)
    }
}

impl<K, P: KeyPolicy<K>> TreeMap<K, P> {
    /// Makes a new, empty `TreeMap` bound to `policy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::{CompareWith, TreeMap};
    ///
    /// let mut by_len = TreeMap::with_policy(CompareWith(|a: &&str, b: &&str| a.len().cmp(&b.len())));
    /// by_len.insert("ccc").unwrap();
    /// by_len.insert("a").unwrap();
    /// assert!(by_len.insert("zzz").is_err());
    /// assert_eq!(by_len.first(), Some(&"a"));
    /// ```
    #[must_use]
    pub const fn with_policy(policy: P) -> Self {
        TreeMap {
            raw: RawTreeMap::new(policy),
        }
    }

    /// Builds a map from unsorted keys in one pass instead of one insertion
    /// per key.
    ///
    /// The keys are sorted by `policy`, equal keys are collapsed to the first
    /// of each run, and the tree is assembled bottom-up, level by level. The
    /// surplus copies are returned, sorted, alongside the map; they are never
    /// passed to the release hook.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::{Natural, TreeMap};
    ///
    /// let (map, unused) = TreeMap::bulk_load(Natural, vec![3, 1, 3, 2, 1, 4, 3]);
    /// assert!(map.iter().copied().eq([1, 2, 3, 4]));
    /// assert_eq!(unused, [1, 3, 3]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) for the sort, O(n) to build.
    #[must_use]
    pub fn bulk_load(policy: P, keys: Vec<K>) -> (Self, Vec<K>) {
        let (raw, duplicates) = RawTreeMap::bulk_load(policy, keys);
        (TreeMap { raw }, duplicates)
    }

    /// Returns the map's policy.
    pub const fn policy(&self) -> &P {
        self.raw.policy()
    }

    /// Adds a key to the map.
    ///
    /// If an equal key is already present the map is left unchanged and the
    /// key is returned inside the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// assert!(map.insert(37).is_ok());
    /// assert!(map.insert(37).is_err());
    /// assert_eq!(map.len(), 1);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKey`] when an equal key is already stored.
    ///
    /// # Panics
    ///
    /// Panics if the node arena is exhausted. The map may then be left
    /// mid-split and should be discarded.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K) -> Result<(), DuplicateKey<K>> {
        self.raw.insert(key)
    }

    /// Returns a reference to the stored key equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::TreeMap;
    ///
    /// let map = TreeMap::from([1, 2]);
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.get(&3), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get(&self, key: &K) -> Option<&K> {
        self.raw.get(key)
    }

    /// Returns `true` if the map holds a key equal to `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.raw.search(key).is_some()
    }

    /// Removes the key equal to `key`.
    ///
    /// The removed key goes through the policy's release hook. Returns `None`
    /// if no such key is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::{Removed, TreeMap};
    ///
    /// let mut map = TreeMap::from([1, 2, 3]);
    /// assert_eq!(map.remove(&2), Some(Removed::Returned(2)));
    /// assert_eq!(map.remove(&2), None);
    /// assert!(map.iter().copied().eq([1, 3]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, key: &K) -> Option<Removed<K>> {
        let removed = self.raw.remove(key)?;
        Some(self.release(removed))
    }

    /// Removes the smallest key.
    pub fn pop_first(&mut self) -> Option<Removed<K>> {
        let removed = self.raw.pop_first()?;
        Some(self.release(removed))
    }

    /// Removes the largest key.
    pub fn pop_last(&mut self) -> Option<Removed<K>> {
        let removed = self.raw.pop_last()?;
        Some(self.release(removed))
    }

    fn release(&self, key: K) -> Removed<K> {
        self.raw.policy().release(key).map_or(Removed::Released, Removed::Returned)
    }

    /// Returns the smallest key.
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the largest key.
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Removes every key, passing each one to the release hook.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::TreeMap;
    ///
    /// let mut map = TreeMap::from([1, 2, 3]);
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the keys of the map, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::TreeMap;
    ///
    /// let map = TreeMap::from([3, 1, 2]);
    /// let keys: Vec<_> = map.iter().collect();
    /// assert_eq!(keys, [&1, &2, &3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, P> {
        Iter::new(&self.raw)
    }

    /// Calls `visit` on every key, in order.
    pub fn traverse_inorder<F>(&self, visit: F)
    where
        F: FnMut(&K),
    {
        self.iter().for_each(visit);
    }

    /// Counts the keys for which `predicate` returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::TreeMap;
    ///
    /// let map = TreeMap::from([5, 3, 8, 1, 4, 7, 9]);
    /// assert_eq!(map.filter_count(|key| key % 2 == 0), 2);
    /// ```
    pub fn filter_count<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        self.iter().filter(|key| predicate(key)).count()
    }

    /// Returns the number of keys in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree; 0 when empty.
    ///
    /// This is an extension for inspecting balance and is not part of the
    /// usual map API.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }
}

impl<K: fmt::Debug, P: KeyPolicy<K>> fmt::Debug for TreeMap<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> Default for TreeMap<K> {
    fn default() -> Self {
        TreeMap::new()
    }
}

/// Collects keys through the bulk loader; duplicates are dropped.
impl<K: Ord> FromIterator<K> for TreeMap<K> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let (map, _duplicates) = TreeMap::from_keys(iter.into_iter().collect());
        map
    }
}

/// Inserts every key; keys already present are dropped.
impl<K, P: KeyPolicy<K>> Extend<K> for TreeMap<K, P> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            let _ = self.insert(key);
        }
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for TreeMap<K> {
    fn from(arr: [K; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, P: KeyPolicy<K>> IntoIterator for &'a TreeMap<K, P> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, P>;

    fn into_iter(self) -> Iter<'a, K, P> {
        self.iter()
    }
}
