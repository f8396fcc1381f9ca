//! A ready-made string key carrying an optional payload.

use alloc::string::String;
use core::cmp::Ordering;

use crate::policy::KeyPolicy;

/// An owned string key with an optional payload riding along.
///
/// The payload takes no part in ordering; two keys with the same text are
/// equal to the map whatever they carry. Dropping the key drops the payload.
///
/// # Examples
///
/// ```
/// use trine::{CaseInsensitive, StringKey, TreeMap};
///
/// let mut colors = TreeMap::with_policy(CaseInsensitive);
/// colors.insert(StringKey::new("Red", 0xff0000)).unwrap();
/// colors.insert(StringKey::new("green", 0x00ff00)).unwrap();
///
/// let found = colors.get(&StringKey::probe("RED")).unwrap();
/// assert_eq!(found.key(), "Red");
/// assert_eq!(found.payload(), Some(&0xff0000));
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StringKey<T> {
    key: String,
    payload: Option<T>,
}

impl<T> StringKey<T> {
    /// Creates a key carrying `payload`.
    pub fn new(key: impl Into<String>, payload: T) -> Self {
        StringKey {
            key: key.into(),
            payload: Some(payload),
        }
    }

    /// Creates a key without a payload, for lookups and removals.
    pub fn probe(key: impl Into<String>) -> Self {
        StringKey {
            key: key.into(),
            payload: None,
        }
    }

    /// Returns the key text.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the payload, if the key carries one.
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// The payload may be changed in place; the key text may not.
    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }

    /// Splits the key into its text and payload.
    pub fn into_parts(self) -> (String, Option<T>) {
        (self.key, self.payload)
    }
}

/// Orders [`StringKey`]s byte by byte.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CaseSensitive;

impl<T> KeyPolicy<StringKey<T>> for CaseSensitive {
    fn compare(&self, left: &StringKey<T>, right: &StringKey<T>) -> Ordering {
        left.key.as_bytes().cmp(right.key.as_bytes())
    }
}

/// Orders [`StringKey`]s byte by byte with ASCII letters folded to lower case.
///
/// Non-ASCII text is compared as is.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CaseInsensitive;

impl<T> KeyPolicy<StringKey<T>> for CaseInsensitive {
    fn compare(&self, left: &StringKey<T>, right: &StringKey<T>) -> Ordering {
        let left = left.key.bytes().map(|b| b.to_ascii_lowercase());
        let right = right.key.bytes().map(|b| b.to_ascii_lowercase());
        left.cmp(right)
    }
}
