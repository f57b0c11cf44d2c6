use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::BuildHasher;
use std::hash::Hash;
use std::hash::Hasher;

use probe_table::ImmutableMap;
use probe_table::ImmutableSet;
use probe_table::ListMultimapBuilder;
use probe_table::MapBuilder;
use probe_table::ProbeTable;
use probe_table::SetMultimapBuilder;
use proptest::prelude::*;
use siphasher::sip::SipHasher;

#[derive(Clone, Copy, Default)]
struct FixedSip;

impl BuildHasher for FixedSip {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210)
    }
}

// Tagged entries: `key` identifies the entry, `position` records where it
// appeared in the input.
#[derive(Clone, Debug, PartialEq)]
struct Tagged {
    key: u16,
    position: usize,
}

fn sip_hash(key: u16) -> u64 {
    let mut hasher = FixedSip.build_hasher();
    key.hash(&mut hasher);
    hasher.finish()
}

// Few distinct hash values, so most entries share a home slot.
fn clustered_hash(key: u16) -> u64 {
    u64::from(key % 5) * 3
}

fn tag(keys: &[u16]) -> Vec<Tagged> {
    keys.iter()
        .enumerate()
        .map(|(position, &key)| Tagged { key, position })
        .collect()
}

fn first_occurrences(keys: &[u16]) -> Vec<Tagged> {
    let mut seen = HashSet::new();
    tag(keys)
        .into_iter()
        .filter(|t| seen.insert(t.key))
        .collect()
}

fn check_table(keys: &[u16], hash: fn(u16) -> u64) -> Result<(), TestCaseError> {
    let table = ProbeTable::build(tag(keys), |t| hash(t.key), |a, b| a.key == b.key);
    let expected = first_occurrences(keys);

    prop_assert_eq!(table.as_slice(), expected.as_slice());
    prop_assert_eq!(table.len(), expected.len());
    if keys.len() > 1 {
        prop_assert_eq!(table.capacity(), 2 * keys.len());
    } else {
        prop_assert_eq!(table.capacity(), 0);
    }

    for t in &expected {
        let found = table.find(hash(t.key), |e| e.key == t.key);
        prop_assert_eq!(found, Some(t));
    }

    for absent in (0u16..64).map(|k| k + 1000) {
        prop_assert!(!table.contains(hash(absent), |e| e.key == absent));
    }

    let rebuilt = ProbeTable::build(table.to_vec(), |t| hash(t.key), |a, b| a.key == b.key);
    prop_assert_eq!(rebuilt.as_slice(), table.as_slice());
    Ok(())
}

proptest! {
    #[test]
    fn prop_table_matches_first_occurrence_model(
        keys in proptest::collection::vec(0u16..200, 0..300)
    ) {
        check_table(&keys, sip_hash)?;
    }

    #[test]
    fn prop_table_with_clustered_hashes(
        keys in proptest::collection::vec(0u16..40, 0..120)
    ) {
        check_table(&keys, clustered_hash)?;
    }

    #[test]
    fn prop_set_behaves_like_model(
        elements in proptest::collection::vec(any::<i32>(), 0..200),
        probes in proptest::collection::vec(any::<i32>(), 0..50),
    ) {
        let set = ImmutableSet::from_vec_with_hasher(elements.clone(), FixedSip);
        let model: HashSet<i32> = elements.iter().copied().collect();

        prop_assert_eq!(set.len(), model.len());
        for value in elements.iter().chain(probes.iter()) {
            prop_assert_eq!(set.contains(value), model.contains(value));
        }

        let mut seen = HashSet::new();
        let expected: Vec<i32> = elements.iter().copied().filter(|v| seen.insert(*v)).collect();
        prop_assert_eq!(set.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_set_algebra(
        left in proptest::collection::vec(0u8..30, 0..40),
        right in proptest::collection::vec(0u8..30, 0..40),
    ) {
        let a = ImmutableSet::from_vec_with_hasher(left.clone(), FixedSip);
        let b = ImmutableSet::from_vec_with_hasher(right.clone(), FixedSip);
        let model_a: HashSet<u8> = left.into_iter().collect();
        let model_b: HashSet<u8> = right.into_iter().collect();

        let union = a.unite(&b);
        prop_assert_eq!(union.len(), model_a.union(&model_b).count());
        let intersection = a.intersect(&b);
        prop_assert_eq!(intersection.len(), model_a.intersection(&model_b).count());
        let difference = a.without(&b);
        prop_assert_eq!(difference.len(), model_a.difference(&model_b).count());

        prop_assert_eq!(a.is_subset(&b), model_a.is_subset(&model_b));
        prop_assert_eq!(a.intersects(&b), !model_a.is_disjoint(&model_b));
        prop_assert!(union.is_superset(&a) && union.is_superset(&b));
    }

    #[test]
    fn prop_map_first_pair_wins(
        pairs in proptest::collection::vec((0u8..50, any::<u32>()), 0..150)
    ) {
        let map = ImmutableMap::from_pairs_with_hasher(pairs.clone(), FixedSip);
        let mut model = HashMap::new();
        for (k, v) in &pairs {
            model.entry(*k).or_insert(*v);
        }

        prop_assert_eq!(map.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
        prop_assert_eq!(map.get(&200), None);
    }

    #[test]
    fn prop_map_builder_last_write_wins(
        pairs in proptest::collection::vec((0u8..50, any::<u32>()), 0..150)
    ) {
        let mut builder = MapBuilder::with_hasher(FixedSip);
        let mut model = HashMap::new();
        for (k, v) in &pairs {
            builder.insert(*k, *v);
            model.insert(*k, *v);
        }
        let map = builder.build();

        prop_assert_eq!(map.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
    }

    #[test]
    fn prop_multimaps_match_model(
        pairs in proptest::collection::vec((0u8..10, 0u8..10), 0..100)
    ) {
        let mut set_builder = SetMultimapBuilder::with_hasher(FixedSip);
        let mut list_builder = ListMultimapBuilder::with_hasher(FixedSip);
        let mut set_model: HashMap<u8, HashSet<u8>> = HashMap::new();
        let mut list_model: HashMap<u8, Vec<u8>> = HashMap::new();
        for &(k, v) in &pairs {
            set_builder.insert(k, v);
            list_builder.insert(k, v);
            set_model.entry(k).or_default().insert(v);
            list_model.entry(k).or_default().push(v);
        }
        let set_multimap = set_builder.build();
        let list_multimap = list_builder.build();

        prop_assert_eq!(list_multimap.len(), pairs.len());
        prop_assert_eq!(
            set_multimap.len(),
            set_model.values().map(HashSet::len).sum::<usize>()
        );
        prop_assert_eq!(set_multimap.key_len(), set_model.len());
        prop_assert_eq!(list_multimap.key_len(), list_model.len());

        for (k, values) in &list_model {
            prop_assert_eq!(list_multimap.get(k), Some(values));
            for v in values {
                prop_assert!(set_multimap.contains_entry(k, v));
            }
            prop_assert_eq!(set_multimap.values_of(k).count(), set_model[k].len());
        }
        prop_assert_eq!(set_multimap.iter().count(), set_multimap.len());
        prop_assert_eq!(list_multimap.iter().count(), list_multimap.len());
    }
}

#[test]
fn scenario_set_from_duplicated_sequence() {
    let set = ImmutableSet::from_vec_with_hasher(vec![3, 1, 3, 2, 1], FixedSip);
    assert_eq!(set.len(), 3);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
    assert!(set.contains(&2));
    assert!(!set.contains(&4));
}

#[test]
fn scenario_map_first_pair_wins() {
    let map = ImmutableMap::from_pairs_with_hasher(vec![(1, "x"), (2, "y"), (1, "z")], FixedSip);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"x"));
    assert_eq!(map.get(&2), Some(&"y"));
    assert_eq!(map.get(&3), None);
}

#[test]
fn scenario_entries_with_equal_hashes() {
    // "Aa" and "BB" collide under the classic polynomial string hash; here
    // the hash is forced equal to exercise the same path.
    let table = ProbeTable::build(
        vec!["Aa", "BB", "Aa"],
        |_| 42,
        |a, b| a == b,
    );
    assert_eq!(table.as_slice(), &["Aa", "BB"]);
    assert_eq!(table.find(42, |e| *e == "BB"), Some(&"BB"));
    assert_eq!(table.find(42, |e| *e == "Cc"), None);
}
