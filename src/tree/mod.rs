//! The data tree: a copy-on-write B+-tree of content-addressed nodes,
//! rooted at a single digest (or nil), rebuilt in whole subtrees per
//! update rather than mutated node-by-node (spec §4).

pub(crate) mod build;
pub(crate) mod node;
pub(crate) mod reader;

use crate::error::{Error, Result};
use crate::store::{Digest, NodeStore, NodeValue};

pub use build::bulk_update;

/// The root of a data tree: absent, a single partition, or an index node.
/// Distinct from a bare `Option<Digest>` because callers (and the
/// bulk-update algorithm) need to know a non-nil root's height without an
/// extra store lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Root {
    Nil,
    Partition(Digest),
    Index(Digest),
}

impl Root {
    /// Resolve a stored digest into a [Root], reading just enough of the
    /// node to classify it.
    pub(crate) fn of_digest(store: &dyn NodeStore, digest: Digest) -> Result<Root> {
        match store.get(&digest)? {
            NodeValue::Partition(_) => Ok(Root::Partition(digest)),
            NodeValue::Index(_) => Ok(Root::Index(digest)),
            NodeValue::Tablet(_) => Err(Error::TypeMismatch {
                reference: digest.to_string(),
                expected: "partition or index",
                found: "tablet".to_string(),
            }),
        }
    }

    /// The digest this root points at, or `None` for [Root::Nil].
    pub(crate) fn digest(&self) -> Option<Digest> {
        match self {
            Root::Nil => None,
            Root::Partition(d) | Root::Index(d) => Some(*d),
        }
    }
}
