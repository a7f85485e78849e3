//! Read paths over a data tree (spec §4.7): point, batch, and range reads
//! all descend the same way -- binary search the split keys, recurse into
//! the selected child or children, stop at a partition.
//!
//! Grounded on the teacher's `src/robt/reader.rs`/`src/robt/scans.rs`
//! (index-guided descent into a leaf block, range scans selecting a
//! contiguous run of blocks).

use std::ops::Bound;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::partition::Partition;
use crate::patch::Record;
use crate::store::{Digest, NodeStore, NodeValue};
use crate::tree::node::IndexMeta;
use crate::tree::Root;
use crate::value::FieldMap;

/// Point read: the field-map at `key`, or `None` if absent.
pub(crate) fn get(store: &dyn NodeStore, root: Root, key: &Key, fields: Option<&[String]>) -> Result<Option<FieldMap>> {
    match root.digest() {
        Some(digest) => get_at(store, &digest, key, fields),
        None => Ok(None),
    }
}

fn get_at(store: &dyn NodeStore, digest: &Digest, key: &Key, fields: Option<&[String]>) -> Result<Option<FieldMap>> {
    match store.get(digest)? {
        NodeValue::Partition(node) => {
            let partition = Partition::from_node(node)?;
            if !partition.maybe_contains(key) {
                return Ok(None);
            }
            let out = partition.read_batch(store, std::slice::from_ref(key), fields)?;
            Ok(out.into_iter().next().map(|(_, f)| f))
        }
        NodeValue::Index(node) => {
            let meta = IndexMeta::from_node(node)?;
            let idx = meta.keys.partition_point(|split| split <= key);
            get_at(store, &meta.children[idx], key, fields)
        }
        NodeValue::Tablet(_) => Err(Error::TypeMismatch {
            reference: digest.to_string(),
            expected: "partition or index",
            found: "tablet".to_string(),
        }),
    }
}

/// Batch read: the records present among `keys` (which need not be
/// sorted), in ascending key order.
pub(crate) fn get_batch(store: &dyn NodeStore, root: Root, keys: &[Key], fields: Option<&[String]>) -> Result<Vec<Record>> {
    let mut sorted: Vec<Key> = keys.to_vec();
    sorted.sort();
    sorted.dedup();
    match root.digest() {
        Some(digest) => get_batch_at(store, &digest, &sorted, fields),
        None => Ok(Vec::new()),
    }
}

fn get_batch_at(store: &dyn NodeStore, digest: &Digest, keys: &[Key], fields: Option<&[String]>) -> Result<Vec<Record>> {
    match store.get(digest)? {
        NodeValue::Partition(node) => {
            let partition = Partition::from_node(node)?;
            partition.read_batch(store, keys, fields)
        }
        NodeValue::Index(node) => {
            let meta = IndexMeta::from_node(node)?;
            let buckets = bucket_keys(&meta.keys, keys, meta.children.len());
            let mut out = Vec::new();
            for (child, bucket) in meta.children.iter().zip(buckets.into_iter()) {
                if bucket.is_empty() {
                    continue;
                }
                out.extend(get_batch_at(store, child, &bucket, fields)?);
            }
            Ok(out)
        }
        NodeValue::Tablet(_) => Err(Error::TypeMismatch {
            reference: digest.to_string(),
            expected: "partition or index",
            found: "tablet".to_string(),
        }),
    }
}

fn bucket_keys(split_keys: &[Key], keys: &[Key], n_children: usize) -> Vec<Vec<Key>> {
    let mut buckets: Vec<Vec<Key>> = (0..n_children).map(|_| Vec::new()).collect();
    for k in keys {
        let idx = split_keys.partition_point(|split| split <= k);
        buckets[idx].push(k.clone());
    }
    buckets
}

/// Range read over `[min, max]` (by the given bound kinds), in ascending
/// key order.
pub(crate) fn scan_range(
    store: &dyn NodeStore,
    root: Root,
    min: Bound<&Key>,
    max: Bound<&Key>,
    fields: Option<&[String]>,
) -> Result<Vec<Record>> {
    match root.digest() {
        Some(digest) => scan_range_at(store, &digest, min, max, fields),
        None => Ok(Vec::new()),
    }
}

/// Full left-to-right scan of every record in the tree.
pub(crate) fn scan_all(store: &dyn NodeStore, root: Root, fields: Option<&[String]>) -> Result<Vec<Record>> {
    scan_range(store, root, Bound::Unbounded, Bound::Unbounded, fields)
}

fn scan_range_at(
    store: &dyn NodeStore,
    digest: &Digest,
    min: Bound<&Key>,
    max: Bound<&Key>,
    fields: Option<&[String]>,
) -> Result<Vec<Record>> {
    match store.get(digest)? {
        NodeValue::Partition(node) => {
            let partition = Partition::from_node(node)?;
            partition.read_range(store, min, max, fields)
        }
        NodeValue::Index(node) => {
            let meta = IndexMeta::from_node(node)?;
            let start = match min {
                Bound::Unbounded => 0,
                Bound::Included(k) | Bound::Excluded(k) => meta.keys.partition_point(|split| split <= k),
            };
            let end = match max {
                Bound::Unbounded => meta.children.len() - 1,
                Bound::Included(k) | Bound::Excluded(k) => meta.keys.partition_point(|split| split <= k),
            };
            let mut out = Vec::new();
            for child in &meta.children[start..=end] {
                out.extend(scan_range_at(store, child, min, max, fields)?);
            }
            Ok(out)
        }
        NodeValue::Tablet(_) => Err(Error::TypeMismatch {
            reference: digest.to_string(),
            expected: "partition or index",
            found: "tablet".to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod reader_test;
