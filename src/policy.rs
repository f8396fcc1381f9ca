//! Key ordering and release policies.
//!
//! A [`TreeMap`](crate::TreeMap) is bound to one [`KeyPolicy`] when it is
//! constructed. The policy decides how two keys compare and what happens to a
//! key once the map lets go of it.

use core::cmp::Ordering;
use core::fmt;

/// The ordering contract and release hook of a [`TreeMap`](crate::TreeMap).
///
/// # Contract
///
/// [`compare`](KeyPolicy::compare) must be a total order and must not change
/// for keys that are already in the map. Violating this is a logic error: the
/// map may return wrong answers or panic, but it stays memory safe.
///
/// [`release`](KeyPolicy::release) is called exactly once for every key the map
/// discards: on [`remove`](crate::TreeMap::remove), [`clear`](crate::TreeMap::clear)
/// and when the map is dropped. It is never called by lookups, by a rejected
/// [`insert`](crate::TreeMap::insert), or for the duplicates set aside by
/// [`bulk_load`](crate::TreeMap::bulk_load).
pub trait KeyPolicy<K> {
    /// Compares two keys.
    fn compare(&self, left: &K, right: &K) -> Ordering;

    /// Disposes of a key the map no longer owns.
    ///
    /// Returning `Some` declines ownership: `remove` hands the key back to its
    /// caller and teardown drops it normally. The default declines.
    #[inline]
    fn release(&self, key: K) -> Option<K> {
        Some(key)
    }
}

/// Orders keys by their [`Ord`] implementation. Never consumes keys.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

impl<K: Ord> KeyPolicy<K> for Natural {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders keys with a comparison closure. Never consumes keys.
///
/// # Examples
///
/// ```
/// use trine::{CompareWith, TreeMap};
///
/// let mut map = TreeMap::with_policy(CompareWith(|a: &i32, b: &i32| b.cmp(a)));
/// for key in [1, 3, 2] {
///     map.insert(key).unwrap();
/// }
/// assert!(map.iter().copied().eq([3, 2, 1]));
/// ```
#[derive(Clone, Copy, Default)]
pub struct CompareWith<F>(pub F);

impl<K, F> KeyPolicy<K> for CompareWith<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.0)(left, right)
    }
}

impl<F> fmt::Debug for CompareWith<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompareWith").finish_non_exhaustive()
    }
}

/// Adds a release hook to another policy.
///
/// The map passes every discarded key to the hook, so
/// [`remove`](crate::TreeMap::remove) reports
/// [`Removed::Released`](crate::Removed::Released) instead of returning the key.
///
/// # Examples
///
/// ```
/// use core::cell::Cell;
/// use trine::{Natural, Releasing, Removed, TreeMap};
///
/// let released = Cell::new(0);
/// let mut map = TreeMap::with_policy(Releasing::new(Natural, |_key: u32| released.set(released.get() + 1)));
/// map.insert(7).unwrap();
/// map.insert(8).unwrap();
///
/// assert_eq!(map.remove(&7), Some(Removed::Released));
/// drop(map);
/// assert_eq!(released.get(), 2);
/// ```
#[derive(Clone, Copy, Default)]
pub struct Releasing<P, R> {
    order: P,
    hook: R,
}

impl<P, R> Releasing<P, R> {
    /// Wraps `order`, sending discarded keys to `hook`.
    pub const fn new(order: P, hook: R) -> Self {
        Self { order, hook }
    }

    /// Returns the wrapped ordering policy.
    pub const fn order(&self) -> &P {
        &self.order
    }
}

impl<K, P, R> KeyPolicy<K> for Releasing<P, R>
where
    P: KeyPolicy<K>,
    R: Fn(K),
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        self.order.compare(left, right)
    }

    #[inline]
    fn release(&self, key: K) -> Option<K> {
        (self.hook)(key);
        None
    }
}

impl<P: fmt::Debug, R> fmt::Debug for Releasing<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Releasing").field("order", &self.order).finish_non_exhaustive()
    }
}
