use thiserror::Error;

/// The error returned by [`TreeMap::insert`](crate::TreeMap::insert) when an
/// equal key is already stored.
///
/// The map is left untouched and the rejected key is handed back, so the
/// caller decides what to do with it.
///
/// # Examples
///
/// ```
/// use trine::TreeMap;
///
/// let mut map = TreeMap::new();
/// map.insert(String::from("a")).unwrap();
///
/// let err = map.insert(String::from("a")).unwrap_err();
/// assert_eq!(err.to_string(), "key is already present in the map");
/// assert_eq!(err.into_key(), "a");
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("key is already present in the map")]
pub struct DuplicateKey<K>(pub K);

impl<K> DuplicateKey<K> {
    /// Returns a reference to the rejected key.
    pub const fn key(&self) -> &K {
        &self.0
    }

    /// Gives the rejected key back to the caller.
    pub fn into_key(self) -> K {
        self.0
    }
}
