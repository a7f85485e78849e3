use super::*;
use crate::store::MemNodeStore;
use crate::store::MemRootTracker;
use crate::value::Value;

fn key(b: u8) -> Key {
    Key::new(vec![b]).unwrap()
}

fn fields(n: i64) -> FieldMap {
    let mut m = FieldMap::new();
    m.insert("n".to_string(), Value::I64(n));
    m
}

fn small_config() -> Config {
    Config::new()
        .unwrap()
        .set_partition_limit(4)
        .unwrap()
        .set_branching_factor(4)
        .unwrap()
}

#[test]
fn open_on_unknown_name_starts_at_nil() {
    let store = MemNodeStore::new();
    let refs = MemRootTracker::new();
    let (table, root) = Table::open(&store, &refs, "orders", small_config()).unwrap();
    assert_eq!(root, Root::Nil);
    assert_eq!(table.get(root, &key(1), None).unwrap(), None);
}

#[test]
fn update_then_get_round_trips_a_record() {
    let store = MemNodeStore::new();
    let table = Table::new(&store, small_config());
    let root = table
        .update(Root::Nil, vec![PatchEntry::put(key(1), fields(10))])
        .unwrap();
    assert_eq!(table.get(root, &key(1), None).unwrap(), Some(fields(10)));
    assert_eq!(table.get(root, &key(2), None).unwrap(), None);
}

#[test]
fn update_does_not_touch_root_tracker() {
    let store = MemNodeStore::new();
    let refs = MemRootTracker::new();
    let (table, root) = Table::open(&store, &refs, "orders", small_config()).unwrap();
    let new_root = table
        .update(root, vec![PatchEntry::put(key(1), fields(1))])
        .unwrap();
    assert_ne!(new_root, root);
    assert_eq!(refs.get("orders").unwrap(), None);
}

#[test]
fn open_resolves_a_root_already_committed_through_the_tracker() {
    let store = MemNodeStore::new();
    let refs = MemRootTracker::new();
    let table = Table::new(&store, small_config());
    let root = table
        .update(Root::Nil, vec![PatchEntry::put(key(1), fields(1))])
        .unwrap();
    let digest = root.digest().unwrap();
    assert!(refs.compare_and_set("orders", None, Some(digest)).unwrap());

    let (_table, reopened) = Table::open(&store, &refs, "orders", small_config()).unwrap();
    assert_eq!(reopened, root);
}

#[test]
fn scan_all_returns_every_record_after_overflow() {
    let store = MemNodeStore::new();
    let table = Table::new(&store, small_config());
    let changes: Vec<PatchEntry> = (1..=10u8).map(|b| PatchEntry::put(key(b), fields(b as i64))).collect();
    let root = table.update(Root::Nil, changes).unwrap();
    let records = table.scan_all(root, None).unwrap();
    let keys: Vec<Key> = records.into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, (1..=10u8).map(key).collect::<Vec<_>>());
}

#[test]
fn encode_key_uses_the_configured_lexicoder() {
    use crate::lexicoder::Value as LexValue;

    let store = MemNodeStore::new();
    let table = Table::new(&store, small_config());
    let encoded = table.encode_key(&LexValue::Bytes(vec![7])).unwrap();
    assert_eq!(encoded, key(7));

    let store = MemNodeStore::new();
    let table = Table::new(&store, small_config().set_key_lexicoder("long").unwrap());
    let lo = table.encode_key(&LexValue::Long(-1)).unwrap();
    let hi = table.encode_key(&LexValue::Long(1)).unwrap();
    assert!(lo < hi, "long coder must preserve signed order as byte order");
}

#[test]
fn get_batch_returns_only_present_keys() {
    let store = MemNodeStore::new();
    let table = Table::new(&store, small_config());
    let root = table
        .update(
            Root::Nil,
            vec![PatchEntry::put(key(1), fields(1)), PatchEntry::put(key(3), fields(3))],
        )
        .unwrap();
    let records = table.get_batch(root, &[key(3), key(2), key(1)], None).unwrap();
    assert_eq!(records, vec![(key(1), fields(1)), (key(3), fields(3))]);
}
