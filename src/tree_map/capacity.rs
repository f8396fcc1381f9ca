use super::TreeMap;
use crate::policy::KeyPolicy;
use crate::raw::RawTreeMap;

impl<K, P: KeyPolicy<K>> TreeMap<K, P> {
    /// Creates an empty map bound to `policy` that can take at least
    /// `capacity` keys before its node storage has to grow.
    ///
    /// This is an extension and is not part of the usual map API.
    ///
    /// # Examples
    ///
    /// ```
    /// use trine::{Natural, TreeMap};
    ///
    /// let map: TreeMap<i32> = TreeMap::with_capacity(Natural, 32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(policy: P, capacity: usize) -> Self {
        TreeMap {
            raw: RawTreeMap::with_capacity(policy, capacity),
        }
    }

    /// Returns how many keys the map can hold before its node storage grows.
    ///
    /// This is an extension and is not part of the usual map API.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
