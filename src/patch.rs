//! Change-set semantics: ordered puts and tombstones applied to a record
//! stream.
//!
//! Grounded on the teacher's `src/db/diff.rs`/`src/db/compact.rs` (`Cutoff`
//! -- bound-based filtering of a change stream) and `src/lsm.rs` (merge two
//! sorted streams with one side taking precedence at equal keys).

use std::cmp::Ordering;
use std::ops::Bound;

use crate::key::Key;
use crate::value::FieldMap;

/// A single patch entry: either a full replacement of the record at `key`,
/// or a tombstone marking it for deletion.
#[derive(Clone, Debug, PartialEq)]
pub enum PatchOp {
    Put(FieldMap),
    Tombstone,
}

/// A `(key, op)` pair. A change-set is a `Vec<PatchEntry>` ordered by key,
/// strictly ascending, with at most one op per key (callers coalesce
/// duplicates before submitting a batch).
#[derive(Clone, Debug, PartialEq)]
pub struct PatchEntry {
    pub key: Key,
    pub op: PatchOp,
}

impl PatchEntry {
    pub fn put(key: Key, fields: FieldMap) -> PatchEntry {
        PatchEntry {
            key,
            op: PatchOp::Put(fields),
        }
    }

    pub fn tombstone(key: Key) -> PatchEntry {
        PatchEntry {
            key,
            op: PatchOp::Tombstone,
        }
    }
}

/// A stored record: a key paired with its (possibly empty) field-map.
pub type Record = (Key, FieldMap);

/// Merge `changes` into `records` (both already key-ascending), with
/// change-set entries winning at equal keys. A put-entry replaces the
/// record entirely; a tombstone removes it; unmatched change-set puts are
/// inserted, unmatched tombstones are discarded.
///
/// `patch_seq([], records) == records`.
/// `patch_seq(changes, []) == remove_tombstones(changes)`.
pub fn patch_seq(changes: &[PatchEntry], records: &[Record]) -> Vec<Record> {
    let mut out = Vec::with_capacity(changes.len() + records.len());
    let mut ci = 0usize;
    let mut ri = 0usize;

    while ci < changes.len() && ri < records.len() {
        match changes[ci].key.cmp(&records[ri].0) {
            Ordering::Less => {
                push_change(&mut out, &changes[ci]);
                ci += 1;
            }
            Ordering::Greater => {
                out.push(records[ri].clone());
                ri += 1;
            }
            Ordering::Equal => {
                push_change(&mut out, &changes[ci]);
                ci += 1;
                ri += 1;
            }
        }
    }
    while ci < changes.len() {
        push_change(&mut out, &changes[ci]);
        ci += 1;
    }
    while ri < records.len() {
        out.push(records[ri].clone());
        ri += 1;
    }
    out
}

fn push_change(out: &mut Vec<Record>, entry: &PatchEntry) {
    if let PatchOp::Put(fields) = &entry.op {
        out.push((entry.key.clone(), fields.clone()));
    }
}

/// Drop tombstones from a change-set, leaving only puts (as records).
pub fn remove_tombstones(changes: &[PatchEntry]) -> Vec<Record> {
    changes
        .iter()
        .filter_map(|e| match &e.op {
            PatchOp::Put(fields) => Some((e.key.clone(), fields.clone())),
            PatchOp::Tombstone => None,
        })
        .collect()
}

/// Options narrowing a [filter_changes] call.
pub struct FilterOpts<'a> {
    /// inclusive lower bound
    pub start_key: Bound<&'a Key>,
    /// exclusive (by convention) upper bound; `Bound::Included` is honored
    /// literally if the caller supplies it
    pub end_key: Bound<&'a Key>,
    /// project puts onto this field subset; `None` means no projection
    pub fields: Option<&'a [String]>,
}

impl<'a> Default for FilterOpts<'a> {
    fn default() -> Self {
        FilterOpts {
            start_key: Bound::Unbounded,
            end_key: Bound::Unbounded,
            fields: None,
        }
    }
}

/// Narrow `changes` by key bounds and an optional field projection. Puts
/// are projected to the requested fields; tombstones pass through
/// unchanged (there is nothing to project).
pub fn filter_changes(changes: &[PatchEntry], opts: &FilterOpts) -> Vec<PatchEntry> {
    changes
        .iter()
        .filter(|e| in_bounds(&e.key, opts.start_key, opts.end_key))
        .map(|e| project(e, opts.fields))
        .collect()
}

fn in_bounds(key: &Key, start: Bound<&Key>, end: Bound<&Key>) -> bool {
    let above_start = match start {
        Bound::Unbounded => true,
        Bound::Included(s) => key >= s,
        Bound::Excluded(s) => key > s,
    };
    let below_end = match end {
        Bound::Unbounded => true,
        Bound::Included(e) => key <= e,
        Bound::Excluded(e) => key < e,
    };
    above_start && below_end
}

fn project(entry: &PatchEntry, fields: Option<&[String]>) -> PatchEntry {
    match (&entry.op, fields) {
        (PatchOp::Put(map), Some(wanted)) => {
            let projected = map
                .iter()
                .filter(|(name, _)| wanted.iter().any(|w| w == *name))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            PatchEntry::put(entry.key.clone(), projected)
        }
        _ => entry.clone(),
    }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod patch_test;
