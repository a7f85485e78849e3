use std::ops::Bound;

use super::*;
use crate::config::Config;
use crate::patch::PatchEntry;
use crate::store::MemNodeStore;
use crate::tree::build::bulk_update;
use crate::value::Value;

fn key(b: u8) -> Key {
    Key::new(vec![b]).unwrap()
}

fn fields(n: i64) -> FieldMap {
    let mut m = FieldMap::new();
    m.insert("n".to_string(), Value::I64(n));
    m
}

fn build_tree(limit: usize, branching: usize, bs: &[u8]) -> (MemNodeStore, Root) {
    let store = MemNodeStore::new();
    let config = Config::new()
        .unwrap()
        .set_partition_limit(limit)
        .unwrap()
        .set_branching_factor(branching)
        .unwrap();
    let changes: Vec<PatchEntry> = bs.iter().map(|&b| PatchEntry::put(key(b), fields(b as i64))).collect();
    let root = bulk_update(&store, &config, Root::Nil, changes).unwrap();
    (store, root)
}

#[test]
fn get_on_nil_root_is_none() {
    let store = MemNodeStore::new();
    assert_eq!(get(&store, Root::Nil, &key(1), None).unwrap(), None);
}

#[test]
fn get_finds_keys_across_index_levels() {
    let bs: Vec<u8> = (1..=20).collect();
    let (store, root) = build_tree(4, 4, &bs);
    assert!(matches!(root, Root::Index(_)));
    for &b in &bs {
        assert_eq!(get(&store, root, &key(b), None).unwrap(), Some(fields(b as i64)));
    }
    assert_eq!(get(&store, root, &key(200), None).unwrap(), None);
}

#[test]
fn get_batch_returns_present_keys_in_order() {
    let bs: Vec<u8> = (1..=20).collect();
    let (store, root) = build_tree(4, 4, &bs);
    let wanted = vec![key(15), key(3), key(100), key(9)];
    let out = get_batch(&store, root, &wanted, None).unwrap();
    assert_eq!(out, vec![(key(3), fields(3)), (key(9), fields(9)), (key(15), fields(15))]);
}

#[test]
fn scan_range_is_inclusive_and_spans_children() {
    let bs: Vec<u8> = (1..=20).collect();
    let (store, root) = build_tree(4, 4, &bs);
    let k5 = key(5);
    let k12 = key(12);
    let out = scan_range(&store, root, Bound::Included(&k5), Bound::Included(&k12), None).unwrap();
    let expect: Vec<_> = (5..=12u8).map(|b| (key(b), fields(b as i64))).collect();
    assert_eq!(out, expect);
}

#[test]
fn scan_all_recovers_every_record_in_order() {
    let bs: Vec<u8> = (1..=20).collect();
    let (store, root) = build_tree(4, 4, &bs);
    let out = scan_all(&store, root, None).unwrap();
    let expect: Vec<_> = bs.iter().map(|&b| (key(b), fields(b as i64))).collect();
    assert_eq!(out, expect);
}

#[test]
fn scan_all_on_single_partition_root() {
    let (store, root) = build_tree(8, 4, &[1, 2, 3]);
    assert!(matches!(root, Root::Partition(_)));
    let out = scan_all(&store, root, None).unwrap();
    assert_eq!(out, vec![(key(1), fields(1)), (key(2), fields(2)), (key(3), fields(3))]);
}
