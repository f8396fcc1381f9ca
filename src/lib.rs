//! An ordered map backed by a 2-3 tree.
//!
//! [`TreeMap`] keeps its keys in a height-balanced search tree in which every
//! node holds one or two keys and every leaf sits at the same depth. Keys are
//! ordered by a [`KeyPolicy`] fixed when the map is built, which can also take
//! ownership of keys as the map discards them.
//!
//! # Example
//!
//! ```
//! use trine::{Removed, TreeMap};
//!
//! let mut map = TreeMap::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key).unwrap();
//! }
//!
//! assert_eq!(map.get(&7), Some(&7));
//! assert_eq!(map.remove(&5), Some(Removed::Returned(5)));
//! assert!(map.iter().copied().eq([1, 3, 4, 7, 8, 9]));
//!
//! // Build a whole map at once from unsorted input.
//! let (map, duplicates) = TreeMap::from_keys(vec![4, 2, 2, 1, 3, 1]);
//! assert_eq!(map.len(), 4);
//! assert_eq!(duplicates, [1, 2]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Pluggable ordering** - Comparison and release hook bound once through [`KeyPolicy`]
//! - **Bulk loading** - [`TreeMap::bulk_load`] builds a packed tree bottom-up from unsorted keys
//! - **Arena storage** - Nodes live in one slot vector and are addressed by index
//!
//! # Implementation
//!
//! Insertion descends to a leaf, recording the path, and splits any node that
//! reaches three keys on the way back up. Removal swaps an internal key with
//! its in-order successor so that a key always leaves a leaf, then repairs an
//! emptied node by borrowing from a sibling 3-node or merging with a sibling
//! 2-node, one level at a time.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod policy;
pub mod string_key;
pub mod tree_map;

pub use error::DuplicateKey;
pub use policy::{CompareWith, KeyPolicy, Natural, Releasing};
pub use string_key::{CaseInsensitive, CaseSensitive, StringKey};
pub use tree_map::{Removed, TreeMap};
