//! Cross-module property and scenario tests (spec.md §8): lexicoder laws,
//! key ordering, patch laws, partition invariants, and data-tree
//! invariants, all driven against the public crate surface rather than
//! any one module's internals.

use std::collections::BTreeMap;

use proptest::prelude::*;

use merkledb::config::Config;
use merkledb::key::{unsigned_lex_compare, Key};
use merkledb::lexicoder::{BytesCoder, DoubleCoder, Lexicoder, LongCoder, StringCoder, Value as LValue};
use merkledb::patch::{patch_seq, remove_tombstones, PatchEntry};
use merkledb::store::MemNodeStore;
use merkledb::value::{FieldMap, Value};
use merkledb::{Root, Table};

fn init_tracing() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt().with_env_filter("merkledb=trace").try_init();
    });
}

fn key(b: u8) -> Key {
    Key::new(vec![b]).unwrap()
}

fn fields(n: i64) -> FieldMap {
    let mut m = BTreeMap::new();
    m.insert("n".to_string(), Value::I64(n));
    m
}

fn config(limit: usize, branching: usize) -> Config {
    Config::new()
        .unwrap()
        .set_partition_limit(limit)
        .unwrap()
        .set_branching_factor(branching)
        .unwrap()
}

// --- Lexicoder laws -------------------------------------------------------

proptest! {
    #[test]
    fn long_coder_round_trips_and_preserves_order(a in any::<i64>(), b in any::<i64>()) {
        let c = LongCoder;
        let ea = c.encode(&LValue::Long(a)).unwrap();
        let eb = c.encode(&LValue::Long(b)).unwrap();
        prop_assert_eq!(c.decode(&ea).unwrap(), LValue::Long(a));
        prop_assert_eq!(a.cmp(&b), unsigned_lex_compare(&ea, &eb));
    }

    #[test]
    fn double_coder_round_trips_and_preserves_order(a in any::<f64>().prop_filter("finite", |v| v.is_finite()), b in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let c = DoubleCoder;
        let ea = c.encode(&LValue::Double(a)).unwrap();
        let eb = c.encode(&LValue::Double(b)).unwrap();
        prop_assert_eq!(c.decode(&ea).unwrap(), LValue::Double(a));
        prop_assert_eq!(a.partial_cmp(&b).unwrap(), unsigned_lex_compare(&ea, &eb));
    }

    #[test]
    fn string_coder_round_trips_and_preserves_order(a in "[ -~]{1,16}", b in "[ -~]{1,16}") {
        let c = StringCoder::utf8();
        let ea = c.encode(&LValue::Str(a.clone())).unwrap();
        let eb = c.encode(&LValue::Str(b.clone())).unwrap();
        prop_assert_eq!(c.decode(&ea).unwrap(), LValue::Str(a.clone()));
        prop_assert_eq!(a.cmp(&b), unsigned_lex_compare(&ea, &eb));
    }

    #[test]
    fn bytes_coder_round_trips_non_empty(bs in prop::collection::vec(any::<u8>(), 1..32)) {
        let c = BytesCoder;
        let encoded = c.encode(&LValue::Bytes(bs.clone())).unwrap();
        prop_assert_eq!(c.decode(&encoded).unwrap(), LValue::Bytes(bs));
    }
}

#[test]
fn coders_reject_empty_input() {
    assert!(BytesCoder.encode(&LValue::Bytes(vec![])).is_err());
    assert!(StringCoder::utf8().encode(&LValue::Str(String::new())).is_err());
    assert!(LongCoder.decode(&[0u8; 7]).is_err());
}

// --- Key ordering ----------------------------------------------------------

#[test]
fn key_ordering_matches_spec_examples() {
    assert!(unsigned_lex_compare(&[1, 2, 3], &[1, 2, 3, 4]) == std::cmp::Ordering::Less);
    assert!(unsigned_lex_compare(&[1, 3, 2], &[1, 2, 3]) == std::cmp::Ordering::Greater);
    assert_eq!(unsigned_lex_compare(&[], &[]), std::cmp::Ordering::Equal);
}

// --- Patch laws -------------------------------------------------------------

proptest! {
    #[test]
    fn patch_seq_with_no_changes_is_identity(bs in prop::collection::btree_set(any::<u8>(), 0..12)) {
        let records: Vec<_> = bs.into_iter().map(|b| (key(b), fields(b as i64))).collect();
        prop_assert_eq!(patch_seq(&[], &records), records);
    }

    #[test]
    fn patch_seq_against_empty_is_remove_tombstones(
        puts in prop::collection::btree_set(any::<u8>(), 0..8),
        tombs in prop::collection::btree_set(any::<u8>(), 0..8),
    ) {
        let mut changes: Vec<PatchEntry> = puts
            .iter()
            .filter(|b| !tombs.contains(b))
            .map(|&b| PatchEntry::put(key(b), fields(b as i64)))
            .collect();
        changes.extend(tombs.iter().map(|&b| PatchEntry::tombstone(key(b))));
        changes.sort_by(|a, b| a.key.cmp(&b.key));
        prop_assert_eq!(patch_seq(&changes, &[]), remove_tombstones(&changes));
    }

    #[test]
    fn remove_tombstones_output_is_sorted_and_tombstone_free(
        puts in prop::collection::btree_set(any::<u8>(), 0..8),
        tombs in prop::collection::btree_set(any::<u8>(), 0..8),
    ) {
        let mut changes: Vec<PatchEntry> = puts
            .iter()
            .filter(|b| !tombs.contains(b))
            .map(|&b| PatchEntry::put(key(b), fields(b as i64)))
            .collect();
        changes.extend(tombs.iter().map(|&b| PatchEntry::tombstone(key(b))));
        changes.sort_by(|a, b| a.key.cmp(&b.key));
        let survivors = remove_tombstones(&changes);
        let mut keys: Vec<Key> = survivors.iter().map(|(k, _)| k.clone()).collect();
        let sorted = { let mut k2 = keys.clone(); k2.sort(); k2 };
        prop_assert_eq!(&keys, &sorted);
        keys.dedup();
        prop_assert_eq!(keys.len(), survivors.len());
    }
}

// --- Partition invariants ----------------------------------------------------

proptest! {
    #[test]
    fn from_records_respects_limit_and_bounds(
        bs in prop::collection::btree_set(any::<u8>(), 1..40),
        limit in 2usize..64,
    ) {
        prop_assume!(bs.len() <= limit);
        let store = MemNodeStore::new();
        let cfg = config(limit, 4);
        let records: Vec<_> = bs.into_iter().map(|b| (key(b), fields(b as i64))).collect();
        let partition = merkledb::partition::Partition::from_records(&store, &cfg, records.clone()).unwrap();
        prop_assert!(partition.count() <= limit);
        prop_assert_eq!(partition.first_key(), &records.first().unwrap().0);
        prop_assert_eq!(partition.last_key(), &records.last().unwrap().0);
        for (k, _) in &records {
            prop_assert!(partition.maybe_contains(k));
        }
        let back = partition.read_all(&store, None).unwrap();
        prop_assert_eq!(back, records);
    }

    #[test]
    fn partition_records_splits_without_overlap(
        bs in prop::collection::btree_set(any::<u8>(), 1..60),
        limit in 2usize..16,
    ) {
        let store = MemNodeStore::new();
        let cfg = config(limit, 4);
        let records: Vec<_> = bs.into_iter().map(|b| (key(b), fields(b as i64))).collect();
        let parts = merkledb::partition::partition_records(&store, &cfg, records.clone()).unwrap();
        let mut seen = Vec::new();
        for p in &parts {
            prop_assert!(p.count() >= 1);
            seen.extend(p.read_all(&store, None).unwrap());
        }
        prop_assert_eq!(seen, records);
        for pair in parts.windows(2) {
            prop_assert!(pair[0].last_key() < pair[1].first_key());
        }
    }
}

// --- Tree invariants ----------------------------------------------------------

proptest! {
    #[test]
    fn scan_after_update_equals_patch_seq_over_prior_scan(
        initial in prop::collection::btree_set(any::<u8>(), 0..20),
        changes in prop::collection::btree_map(any::<u8>(), any::<bool>(), 0..20),
    ) {
        let store = MemNodeStore::new();
        let table = Table::new(&store, config(4, 4));

        let seed: Vec<PatchEntry> = initial.iter().map(|&b| PatchEntry::put(key(b), fields(b as i64))).collect();
        let prior_root = table.update(Root::Nil, seed).unwrap();
        let prior_scan = table.scan_all(prior_root, None).unwrap();

        let mut change_entries: Vec<PatchEntry> = changes
            .into_iter()
            .map(|(b, is_put)| {
                if is_put {
                    PatchEntry::put(key(b), fields(100 + b as i64))
                } else {
                    PatchEntry::tombstone(key(b))
                }
            })
            .collect();
        change_entries.sort_by(|a, b| a.key.cmp(&b.key));

        let new_root = table.update(prior_root, change_entries.clone()).unwrap();
        let new_scan = table.scan_all(new_root, None).unwrap();

        prop_assert_eq!(new_scan, patch_seq(&change_entries, &prior_scan));
    }

    #[test]
    fn tree_sizes_stay_within_bounds_after_random_updates(
        batches in prop::collection::vec(prop::collection::btree_set(any::<u8>(), 0..15), 1..6),
    ) {
        let store = MemNodeStore::new();
        let table = Table::new(&store, config(4, 4));
        let mut root = Root::Nil;
        for batch in batches {
            let changes: Vec<PatchEntry> = batch.into_iter().map(|b| PatchEntry::put(key(b), fields(b as i64))).collect();
            root = table.update(root, changes).unwrap();
        }
        let scanned = table.scan_all(root, None).unwrap();
        let mut keys: Vec<Key> = scanned.iter().map(|(k, _)| k.clone()).collect();
        let sorted = { let mut k2 = keys.clone(); k2.sort(); k2 };
        prop_assert_eq!(&keys, &sorted);
        keys.dedup();
        prop_assert_eq!(keys.len(), scanned.len());
    }
}

// --- Concrete scenarios (spec.md §8) ------------------------------------------

#[test]
fn empty_to_single_record() {
    init_tracing();
    let store = MemNodeStore::new();
    let table = Table::new(&store, config(1000, 256));
    let root = table.update(Root::Nil, vec![PatchEntry::put(key(1), fields(1))]).unwrap();
    assert!(matches!(root, Root::Partition(_)));
    assert_eq!(table.scan_all(root, None).unwrap(), vec![(key(1), fields(1))]);
}

#[test]
fn overflow_with_l4_b4_builds_an_index_root_of_height_one() {
    let store = MemNodeStore::new();
    let table = Table::new(&store, config(4, 4));
    let changes: Vec<PatchEntry> = (1..=10u8).map(|b| PatchEntry::put(key(b), fields(b as i64))).collect();
    let root = table.update(Root::Nil, changes).unwrap();
    assert!(matches!(root, Root::Index(_)));
    let scanned = table.scan_all(root, None).unwrap();
    assert_eq!(scanned, (1..=10u8).map(|b| (key(b), fields(b as i64))).collect::<Vec<_>>());
}

#[test]
fn tombstoning_most_keys_collapses_toward_a_partition() {
    let store = MemNodeStore::new();
    let table = Table::new(&store, config(4, 4));
    let build: Vec<PatchEntry> = (1..=10u8).map(|b| PatchEntry::put(key(b), fields(b as i64))).collect();
    let root = table.update(Root::Nil, build).unwrap();

    let drop: Vec<PatchEntry> = (3..=10u8).map(|b| PatchEntry::tombstone(key(b))).collect();
    let root = table.update(root, drop).unwrap();

    let scanned = table.scan_all(root, None).unwrap();
    assert_eq!(scanned, vec![(key(1), fields(1)), (key(2), fields(2))]);
    assert!(matches!(root, Root::Partition(_)));
}
