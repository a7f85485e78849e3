//! Shared node-level plumbing for the data tree: the in-memory index-node
//! shape, and the `(digest, first-key, count)` handle the bulk-update
//! algorithm threads between levels.
//!
//! Grounded on the teacher's `src/robt/index.rs` (`MBlock`/`ZBlock`
//! assembly of child references plus split keys).

use crate::error::{Error, Result};
use crate::key::Key;
use crate::partition::Partition;
use crate::store::{Digest, IndexNode, NodeStore, NodeValue};

/// An index node held in memory during the bulk-update algorithm, before
/// (or just after) it is written to the node store. Attributes per spec §3.
#[derive(Clone, Debug)]
pub(crate) struct IndexMeta {
    pub height: u32,
    pub keys: Vec<Key>,
    pub children: Vec<Digest>,
    pub count: usize,
}

impl IndexMeta {
    pub fn to_node(&self) -> IndexNode {
        IndexNode {
            height: self.height,
            keys: self.keys.iter().map(|k| k.as_bytes().to_vec()).collect(),
            children: self.children.iter().map(|d| d.to_vec()).collect(),
            count: self.count as u64,
        }
    }

    pub fn from_node(node: IndexNode) -> Result<IndexMeta> {
        let keys = node
            .keys
            .into_iter()
            .map(Key::new)
            .collect::<Result<Vec<_>>>()?;
        let children = node
            .children
            .into_iter()
            .map(Digest::from_vec)
            .collect::<Result<Vec<_>>>()?;
        Ok(IndexMeta {
            height: node.height,
            keys,
            children,
            count: node.count as usize,
        })
    }

    pub fn store(&self, store: &dyn NodeStore) -> Result<Digest> {
        store.put(NodeValue::Index(self.to_node()))
    }

    pub fn load(store: &dyn NodeStore, digest: &Digest) -> Result<IndexMeta> {
        match store.get(digest)? {
            NodeValue::Index(node) => IndexMeta::from_node(node),
            other => Err(Error::TypeMismatch {
                reference: digest.to_string(),
                expected: "index",
                found: other.type_tag().to_string(),
            }),
        }
    }
}

/// A child reference threaded through reassembly: its stored digest, its
/// first key (used to compute this level's split keys), and its record
/// count (used to roll counts up).
#[derive(Clone, Debug)]
pub(crate) struct ChildHandle {
    pub digest: Digest,
    pub first_key: Key,
    pub count: usize,
}

impl ChildHandle {
    pub fn from_partition(store: &dyn NodeStore, partition: &Partition) -> Result<ChildHandle> {
        let digest = partition.store(store)?;
        Ok(ChildHandle {
            digest,
            first_key: partition.first_key().clone(),
            count: partition.count(),
        })
    }

    /// `first_key` is the first key of `index`'s own leftmost child -- an
    /// index node's `keys` are split keys between children, not its own
    /// first key, so the caller (which just assembled `index` from a
    /// `Vec<ChildHandle>`) passes its leftmost child's first key through.
    pub fn from_index(store: &dyn NodeStore, index: &IndexMeta, first_key: Key) -> Result<ChildHandle> {
        let digest = index.store(store)?;
        Ok(ChildHandle {
            digest,
            first_key,
            count: index.count,
        })
    }
}

/// Resolve the first key reachable from `digest`, descending through index
/// nodes to their leftmost child until a partition is reached.
pub(crate) fn first_key_of(store: &dyn NodeStore, digest: &Digest) -> Result<Key> {
    match store.get(digest)? {
        NodeValue::Partition(node) => Partition::from_node(node).map(|p| p.first_key().clone()),
        NodeValue::Index(node) => {
            let meta = IndexMeta::from_node(node)?;
            let left = meta
                .children
                .first()
                .ok_or_else(|| Error::CorruptNode {
                    reference: digest.to_string(),
                    attribute: "children",
                    detail: "index node has no children".to_string(),
                })?;
            first_key_of(store, left)
        }
        NodeValue::Tablet(_) => Err(Error::TypeMismatch {
            reference: digest.to_string(),
            expected: "partition or index",
            found: "tablet".to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
