use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use trine::{CompareWith, DuplicateKey, Releasing, Removed, TreeMap};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 10_000;

/// Keys drawn from a range narrow enough to collide often.
fn key_strategy() -> impl Strategy<Value = i64> {
    -20_000i64..20_000i64
}

fn keys_of<P: trine::KeyPolicy<i64>>(map: &TreeMap<i64, P>) -> Vec<i64> {
    map.iter().copied().collect()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => key_strategy().prop_map(MapOp::Insert),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Contains),
        1 => Just(MapOp::First),
        1 => Just(MapOp::Last),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core operations against BTreeSet ────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both TreeMap and BTreeSet and
    /// asserts identical results at every step.
    #[test]
    fn map_ops_match_btreeset(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map: TreeMap<i64> = TreeMap::new();
        let mut set: BTreeSet<i64> = BTreeSet::new();

        for op in &ops {
            match op {
                MapOp::Insert(k) => {
                    let inserted = map.insert(*k);
                    let expected = set.insert(*k);
                    prop_assert_eq!(inserted.is_ok(), expected, "insert({})", k);
                    if let Err(rejected) = inserted {
                        prop_assert_eq!(rejected.into_key(), *k);
                    }
                }
                MapOp::Remove(k) => {
                    let removed = map.remove(k);
                    let expected = set.remove(k).then_some(Removed::Returned(*k));
                    prop_assert_eq!(removed, expected, "remove({})", k);
                }
                MapOp::Contains(k) => {
                    prop_assert_eq!(map.contains(k), set.contains(k), "contains({})", k);
                    prop_assert_eq!(map.get(k), set.get(k), "get({})", k);
                }
                MapOp::First => {
                    prop_assert_eq!(map.first(), set.first());
                }
                MapOp::Last => {
                    prop_assert_eq!(map.last(), set.last());
                }
                MapOp::PopFirst => {
                    let popped = map.pop_first().and_then(Removed::into_key);
                    prop_assert_eq!(popped, set.pop_first());
                }
                MapOp::PopLast => {
                    let popped = map.pop_last().and_then(Removed::into_key);
                    prop_assert_eq!(popped, set.pop_last());
                }
            }
            prop_assert_eq!(map.len(), set.len());
        }

        prop_assert!(map.iter().eq(set.iter()));
    }

    /// Bulk loading and one-by-one insertion yield the same key sequence.
    #[test]
    fn bulk_load_matches_sequential_inserts(keys in proptest::collection::vec(key_strategy(), 0..3_000)) {
        let (bulk, duplicates) = TreeMap::from_keys(keys.clone());

        let mut sequential = TreeMap::new();
        let mut rejected = 0;
        for &key in &keys {
            if sequential.insert(key).is_err() {
                rejected += 1;
            }
        }

        prop_assert_eq!(duplicates.len(), rejected);
        prop_assert_eq!(bulk.len(), sequential.len());
        prop_assert!(bulk.iter().eq(sequential.iter()));
    }

    /// A bulk-loaded map keeps behaving like a set under later mutation.
    #[test]
    fn bulk_loaded_map_matches_btreeset(
        initial in proptest::collection::vec(key_strategy(), 0..2_000),
        ops in proptest::collection::vec(map_op_strategy(), 0..2_000),
    ) {
        let (mut map, _) = TreeMap::from_keys(initial.clone());
        let mut set: BTreeSet<i64> = initial.into_iter().collect();

        for op in ops {
            match op {
                MapOp::Insert(k) => {
                    prop_assert_eq!(map.insert(k).is_ok(), set.insert(k));
                }
                MapOp::Remove(k) | MapOp::Contains(k) => {
                    prop_assert_eq!(map.remove(&k).is_some(), set.remove(&k));
                }
                MapOp::First | MapOp::PopFirst => {
                    prop_assert_eq!(map.pop_first().and_then(Removed::into_key), set.pop_first());
                }
                MapOp::Last | MapOp::PopLast => {
                    prop_assert_eq!(map.pop_last().and_then(Removed::into_key), set.pop_last());
                }
            }
        }

        prop_assert!(map.iter().eq(set.iter()));
    }

    #[test]
    fn filter_count_matches_iterator_filter(keys in proptest::collection::vec(key_strategy(), 0..1_000), modulus in 1i64..10) {
        let map: TreeMap<i64> = keys.iter().copied().collect();
        let set: BTreeSet<i64> = keys.into_iter().collect();
        let expected = set.iter().filter(|k| k.rem_euclid(modulus) == 0).count();
        prop_assert_eq!(map.filter_count(|k| k.rem_euclid(modulus) == 0), expected);
    }
}

// ─── Release hook ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Every key that leaves the map through removal or drop reaches the hook
    /// exactly once; keys refused as duplicates never do.
    #[test]
    fn release_hook_sees_each_stored_key_once(
        keys in proptest::collection::vec(0i64..500, 0..1_000),
        removals in proptest::collection::vec(0i64..500, 0..500),
    ) {
        let released = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&released);
        let mut map = TreeMap::with_policy(Releasing::new(trine::Natural, move |key: i64| sink.borrow_mut().push(key)));

        let mut stored = BTreeSet::new();
        for key in keys {
            let accepted = map.insert(key).is_ok();
            prop_assert_eq!(accepted, stored.insert(key));
        }
        prop_assert!(released.borrow().is_empty());

        let mut live = stored.clone();
        for key in removals {
            let removed = map.remove(&key);
            prop_assert_eq!(removed.is_some(), live.remove(&key), "remove({})", key);
            prop_assert!(!matches!(removed, Some(Removed::Returned(_))), "remove({}) handed the key back", key);
        }
        drop(map);

        let mut released = released.borrow().clone();
        released.sort_unstable();
        prop_assert_eq!(released, stored.into_iter().collect::<Vec<_>>());
    }
}

#[test]
fn clear_releases_every_key() {
    let released = RefCell::new(Vec::new());
    let mut map = TreeMap::with_policy(Releasing::new(trine::Natural, |key: u32| released.borrow_mut().push(key)));
    map.extend(0..100);
    assert!(map.height() > 1);

    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(released.borrow().len(), 100);

    // The map is usable again after clearing.
    map.insert(7).unwrap();
    assert_eq!(map.first(), Some(&7));
    drop(map);
    assert_eq!(released.borrow().len(), 101);
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn seven_inserts_build_a_three_level_tree() {
    let mut map = TreeMap::new();
    for key in [5, 3, 8, 1, 4, 7, 9] {
        map.insert(key).unwrap();
    }

    assert_eq!(keys_of(&map), [1, 3, 4, 5, 7, 8, 9]);
    assert_eq!(map.len(), 7);
    // Inserting 9 splits [7, 8, 9] and then the root [3, 5, 8].
    assert_eq!(map.height(), 3);
}

#[test]
fn duplicate_insert_leaves_map_unchanged() {
    let mut map = TreeMap::from([5, 3, 8, 1, 4, 7, 9]);
    let before = keys_of(&map);

    assert_eq!(map.insert(5), Err(DuplicateKey(5)));
    assert_eq!(keys_of(&map), before);
    assert_eq!(map.len(), 7);
}

#[test]
fn removing_an_internal_key() {
    let mut map = TreeMap::new();
    map.extend([5, 3, 8, 1, 4, 7, 9]);

    assert_eq!(map.remove(&5), Some(Removed::Returned(5)));
    assert_eq!(keys_of(&map), [1, 3, 4, 7, 8, 9]);
    assert!(!map.contains(&5));
}

#[test]
fn removing_a_leaf_key() {
    let mut map = TreeMap::new();
    map.extend([5, 3, 8, 1, 4, 7, 9]);
    map.remove(&5).unwrap();

    assert_eq!(map.remove(&1), Some(Removed::Returned(1)));
    assert_eq!(keys_of(&map), [3, 4, 7, 8, 9]);
}

#[test]
fn removing_a_missing_key() {
    let mut map = TreeMap::from([5, 3, 8, 1, 4, 7, 9]);
    assert_eq!(map.remove(&6), None);
    assert_eq!(map.len(), 7);

    let mut empty: TreeMap<i32> = TreeMap::new();
    assert_eq!(empty.remove(&6), None);
    assert_eq!(empty.pop_first(), None);
}

#[test]
fn removing_every_key_in_ascending_order() {
    let mut map = TreeMap::from([5, 3, 8, 1, 4, 7, 9]);
    let mut expected = vec![1, 3, 4, 5, 7, 8, 9];

    while let Some(&smallest) = expected.first() {
        assert_eq!(map.remove(&smallest), Some(Removed::Returned(smallest)));
        expected.remove(0);
        assert_eq!(keys_of_i32(&map), expected);
    }
    assert!(map.is_empty());
}

#[test]
fn bulk_load_hands_back_surplus_copies() {
    let (map, left_over) = TreeMap::from_keys(vec![1, 1, 2, 3, 3, 3, 4]);
    assert_eq!(keys_of_i32(&map), [1, 2, 3, 4]);
    assert_eq!(left_over, [1, 3, 3]);
}

#[test]
fn counting_even_keys() {
    let mut map = TreeMap::new();
    map.extend([5, 3, 8, 1, 4, 7, 9]);
    assert_eq!(map.filter_count(|key| key % 2 == 0), 2);
    assert_eq!(map.filter_count(|_| false), 0);
    assert_eq!(map.filter_count(|_| true), 7);
}

#[test]
fn draining_to_empty_and_refilling() {
    let mut map: TreeMap<i32> = (0..50).collect();
    for key in (0..50).rev() {
        assert_eq!(map.remove(&key), Some(Removed::Returned(key)));
    }
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
    assert_eq!(map.first(), None);
    assert_eq!(map.iter().next(), None);

    map.extend([2, 1]);
    assert_eq!(keys_of_i32(&map), [1, 2]);
}

fn keys_of_i32(map: &TreeMap<i32>) -> Vec<i32> {
    map.iter().copied().collect()
}

#[test]
fn traverse_inorder_visits_every_key_once() {
    let map: TreeMap<i32> = (0..200).rev().collect();
    let mut visited = Vec::new();
    map.traverse_inorder(|key| visited.push(*key));
    assert_eq!(visited, (0..200).collect::<Vec<_>>());
}

#[test]
fn custom_ordering_is_honored() {
    let mut map = TreeMap::with_policy(CompareWith(|a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b))));
    map.extend(["pear", "fig", "banana", "kiwi", "apple"]);

    let keys: Vec<_> = map.iter().copied().collect();
    assert_eq!(keys, ["fig", "kiwi", "pear", "apple", "banana"]);
    assert_eq!(map.first(), Some(&"fig"));
    assert_eq!(map.last(), Some(&"banana"));
}

#[test]
fn iterator_reports_exact_length() {
    let map: TreeMap<u8> = (0..=255).collect();
    let mut iter = map.iter();
    assert_eq!(iter.len(), 256);
    let _ = iter.nth(99);
    assert_eq!(iter.len(), 156);
    assert_eq!(iter.count(), 156);
}

#[test]
fn debug_lists_keys_in_order() {
    let map = TreeMap::from([3, 1, 2]);
    assert_eq!(format!("{map:?}"), "{1, 2, 3}");
}

#[test]
fn capacity_is_reserved_up_front() {
    let map: TreeMap<i32> = TreeMap::with_capacity(trine::Natural, 64);
    assert!(map.capacity() >= 64);
    assert!(map.is_empty());
}
