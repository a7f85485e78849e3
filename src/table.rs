//! The table API (spec §6): a thin binder of a node store and a
//! configuration over the data tree's read/update operations, working
//! entirely in terms of table-root values the caller threads through.
//!
//! Grounded on the teacher's `src/bogn.rs`/`src/mvcc.rs` (a named index
//! wrapper around `mem`/`disk` that exposes `get`/`scan`/write without
//! owning commit semantics itself). This crate's `Table` plays the same
//! role over `store`/`tree`, but -- per spec.md's explicit "the
//! new-table-root is committed by the caller through the reference
//! tracker" -- it never advances a [RootTracker] itself; `update` only
//! returns the candidate root.

use std::ops::Bound;

use crate::config::Config;
use crate::error::Result;
use crate::key::Key;
use crate::lexicoder::Value as LexValue;
use crate::patch::{PatchEntry, Record};
use crate::store::{NodeStore, RootTracker};
use crate::tree::{self, reader, Root};
use crate::value::FieldMap;

/// A table: a node store plus the configuration its tree was built under.
/// Holds no root of its own -- every operation takes the table-root it
/// applies to and, for `update`, returns the new one.
pub struct Table<'a> {
    store: &'a dyn NodeStore,
    config: Config,
}

impl<'a> Table<'a> {
    /// Resolve `name`'s current root through `refs` and bind a table to
    /// `store` under `config`. A name never seen by `refs` opens at
    /// [Root::Nil].
    pub fn open(store: &'a dyn NodeStore, refs: &dyn RootTracker, name: &str, config: Config) -> Result<(Table<'a>, Root)> {
        let root = match refs.get(name)? {
            Some(digest) => Root::of_digest(store, digest)?,
            None => Root::Nil,
        };
        Ok((Table { store, config }, root))
    }

    /// Bind a table directly to `store` under `config`, without going
    /// through a [RootTracker]. Useful for tests and for callers that
    /// track roots themselves.
    pub fn new(store: &'a dyn NodeStore, config: Config) -> Table<'a> {
        Table { store, config }
    }

    /// Encode a typed value into a [Key] through this table's configured
    /// key lexicoder (spec §2). The one producer of keys a caller should
    /// use when the key domain is anything richer than raw bytes --
    /// `get`/`get_batch`/`scan`/`update` all take an already-encoded [Key]
    /// so that callers free to build keys some other way (tests, a
    /// pre-sorted bulk load) are never forced through a coder they don't
    /// need.
    pub fn encode_key(&self, value: &LexValue) -> Result<Key> {
        Key::new(self.config.key_lexicoder.encode(value)?)
    }

    /// Point read: the field-map at `key` under `root`, projected to
    /// `fields` if given, or `None` if the key is absent.
    pub fn get(&self, root: Root, key: &Key, fields: Option<&[String]>) -> Result<Option<FieldMap>> {
        reader::get(self.store, root, key, fields)
    }

    /// Batch read: the records present among `keys` under `root`, in
    /// ascending key order. `keys` need not be sorted or deduplicated.
    pub fn get_batch(&self, root: Root, keys: &[Key], fields: Option<&[String]>) -> Result<Vec<Record>> {
        reader::get_batch(self.store, root, keys, fields)
    }

    /// Range read over `[start, end]` under `root`, in ascending key
    /// order. Either bound may be `Bound::Unbounded`.
    pub fn scan(&self, root: Root, start: Bound<&Key>, end: Bound<&Key>, fields: Option<&[String]>) -> Result<Vec<Record>> {
        reader::scan_range(self.store, root, start, end, fields)
    }

    /// Full left-to-right scan of every record under `root`.
    pub fn scan_all(&self, root: Root, fields: Option<&[String]>) -> Result<Vec<Record>> {
        reader::scan_all(self.store, root, fields)
    }

    /// Apply `changes` to `root`, returning the new table-root. Does not
    /// touch any [RootTracker]; on success the caller is responsible for
    /// advancing the tracked root with a compare-and-set, and on error
    /// `root` is untouched and any partially written nodes are simply
    /// unreferenced garbage.
    pub fn update(&self, root: Root, changes: Vec<PatchEntry>) -> Result<Root> {
        tree::bulk_update(self.store, &self.config, root, changes)
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;
