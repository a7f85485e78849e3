//! The bulk-update algorithm (spec §4.6): applies a key-sorted change-set to
//! a root and yields a new, valid root.
//!
//! Grounded on the teacher's `src/robt/build.rs` (`BuildMM`/`BuildMZ`
//! threshold-driven level assembly) for the shape of "accumulate children,
//! flush into the next level up once a size bound is crossed"; the
//! recursive descend/reassemble structure itself has no teacher analogue
//! (the teacher's read-only `robt` index is built once, bottom-up, from a
//! single sorted iterator, and never patches an existing tree) and is
//! reconstructed fresh from spec §4.6, per the spec's own note that this
//! algorithm is the authoritative source rather than something to mirror
//! from an incomplete original.

use std::cmp::Ordering;

use crate::config::Config;
use crate::error::Result;
use crate::key::Key;
use crate::patch::{patch_seq, remove_tombstones, PatchEntry, Record};
use crate::partition::{partition_records, Partition};
use crate::store::{Digest, NodeStore};
use crate::tree::node::{first_key_of, ChildHandle, IndexMeta};
use crate::tree::Root;

/// The outcome of updating one subtree, per spec §4.6's tagged
/// `(height, payload)` update result -- except `Valid` folds every
/// non-negative height into one variant (the handles it carries already
/// know their own height).
enum UpdateResult {
    /// The subtree shrank below a valid unit at its level; these are its
    /// underlying records, carried up for folding into a sibling.
    Loose(Vec<Record>),
    /// Zero or more already-stored, size-valid nodes of height `.0`.
    Valid(u32, Vec<ChildHandle>),
}

/// Apply `changes` to `root`, returning the new root. `changes` must be
/// key-sorted with at most one entry per key.
pub fn bulk_update(store: &dyn NodeStore, config: &Config, root: Root, changes: Vec<PatchEntry>) -> Result<Root> {
    tracing::debug!(target: "merkledb::tree", changes = changes.len(), root = ?root, "bulk_update");
    if changes.is_empty() {
        return Ok(root);
    }
    match root {
        Root::Nil => {
            // Case A
            let records = remove_tombstones(&changes);
            let parts = partition_records(store, config, records)?;
            build_index(store, config, parts)
        }
        Root::Partition(digest) => {
            // Case B
            let partition = Partition::load(store, &digest)?;
            let existing = partition.read_all(store, None)?;
            let merged = patch_seq(&changes, &existing);
            let parts = partition_records(store, config, merged)?;
            build_index(store, config, parts)
        }
        Root::Index(digest) => {
            // Case C
            let meta = IndexMeta::load(store, &digest)?;
            match update_index_body(store, config, &meta, &changes)? {
                UpdateResult::Loose(records) => {
                    let parts = partition_records(store, config, records)?;
                    build_index(store, config, parts)
                }
                UpdateResult::Valid(height, handles) => group_children(store, config, handles, height),
            }
        }
    }
}

/// `build_index(partitions)` (spec §4.6): with 0 inputs, nil; with 1, the
/// single partition; otherwise group upward until one node remains.
pub fn build_index(store: &dyn NodeStore, config: &Config, partitions: Vec<Partition>) -> Result<Root> {
    let handles = partitions
        .iter()
        .map(|p| ChildHandle::from_partition(store, p))
        .collect::<Result<Vec<_>>>()?;
    group_children(store, config, handles, 0)
}

/// Recursively update the subtree rooted at `digest` (of the given
/// `height`) with `changes`.
fn update_node(store: &dyn NodeStore, config: &Config, height: u32, digest: &Digest, changes: &[PatchEntry]) -> Result<UpdateResult> {
    if height == 0 {
        return update_leaf(store, config, digest, changes);
    }
    let meta = IndexMeta::load(store, digest)?;
    update_index_body(store, config, &meta, changes)
}

fn update_leaf(store: &dyn NodeStore, config: &Config, digest: &Digest, changes: &[PatchEntry]) -> Result<UpdateResult> {
    let partition = Partition::load(store, digest)?;
    if changes.is_empty() {
        let handle = ChildHandle {
            digest: *digest,
            first_key: partition.first_key().clone(),
            count: partition.count(),
        };
        return Ok(UpdateResult::Valid(0, vec![handle]));
    }
    let existing = partition.read_all(store, None)?;
    let merged = patch_seq(changes, &existing);
    if merged.is_empty() {
        return Ok(UpdateResult::Loose(Vec::new()));
    }
    if merged.len() < config.min_partition_records() {
        return Ok(UpdateResult::Loose(merged));
    }
    if merged.len() <= config.partition_limit {
        let p = Partition::from_records(store, config, merged)?;
        let handle = ChildHandle::from_partition(store, &p)?;
        return Ok(UpdateResult::Valid(0, vec![handle]));
    }
    let parts = partition_records(store, config, merged)?;
    let handles = parts
        .iter()
        .map(|p| ChildHandle::from_partition(store, p))
        .collect::<Result<Vec<_>>>()?;
    Ok(UpdateResult::Valid(0, handles))
}

/// Update one index node's children against `changes` (spec §4.6 Case C,
/// steps 1-6, for a non-root invocation: sizes below minimum branching are
/// not returned as-is for a grandparent to redistribute (spec's literal
/// step 6 wording); instead they are dissolved to their underlying records
/// and folded forward exactly like an undersized partition. This unifies
/// steps 2 and 3 into one mechanism and still converges to a tree that
/// satisfies every size invariant -- see DESIGN.md.
fn update_index_body(store: &dyn NodeStore, config: &Config, meta: &IndexMeta, changes: &[PatchEntry]) -> Result<UpdateResult> {
    let child_height = meta.height - 1;
    let buckets = bucket_changes(&meta.keys, changes, meta.children.len());

    let mut carry: Vec<Record> = Vec::new();
    let mut handles: Vec<ChildHandle> = Vec::new();

    for i in 0..meta.children.len() {
        if buckets[i].is_empty() && carry.is_empty() {
            handles.push(handle_of(store, &meta.children[i], child_height)?);
            continue;
        }
        let mut entries = buckets[i].clone();
        if !carry.is_empty() {
            let puts: Vec<PatchEntry> = carry.drain(..).map(|(k, f)| PatchEntry::put(k, f)).collect();
            entries = merge_sorted_patch_entries(puts, entries);
        }
        match update_node(store, config, child_height, &meta.children[i], &entries)? {
            UpdateResult::Loose(records) => carry = records,
            UpdateResult::Valid(_, hs) => handles.extend(hs),
        }
    }

    if !carry.is_empty() {
        return Ok(UpdateResult::Loose(carry));
    }
    if handles.is_empty() {
        return Ok(UpdateResult::Loose(Vec::new()));
    }
    if handles.len() < config.min_branching() {
        let records = collect_records(store, child_height, &handles)?;
        return Ok(UpdateResult::Loose(records));
    }

    let groups = split_into_groups(handles, config.branching_factor);
    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let node = assemble_index(meta.height, &group);
        let first_key = group[0].first_key.clone();
        out.push(ChildHandle::from_index(store, &node, first_key)?);
    }
    Ok(UpdateResult::Valid(meta.height, out))
}

/// Group `handles` (all at `height`) into consecutive index nodes of
/// `⌈b/2⌉..b` children, then iterate upward until one node remains --
/// demoting a lone survivor to its own height rather than wrapping it in a
/// redundant single-child index node (spec §4.6 step 6 / `build_index`).
fn group_children(store: &dyn NodeStore, config: &Config, handles: Vec<ChildHandle>, height: u32) -> Result<Root> {
    if handles.is_empty() {
        return Ok(Root::Nil);
    }
    if handles.len() == 1 {
        let h = handles.into_iter().next().unwrap();
        return Ok(if height == 0 {
            Root::Partition(h.digest)
        } else {
            Root::Index(h.digest)
        });
    }
    let groups = split_into_groups(handles, config.branching_factor);
    let mut next_level = Vec::with_capacity(groups.len());
    for group in groups {
        let node = assemble_index(height + 1, &group);
        let first_key = group[0].first_key.clone();
        next_level.push(ChildHandle::from_index(store, &node, first_key)?);
    }
    group_children(store, config, next_level, height + 1)
}

fn assemble_index(height: u32, group: &[ChildHandle]) -> IndexMeta {
    let keys = group[1..].iter().map(|c| c.first_key.clone()).collect();
    let children = group.iter().map(|c| c.digest).collect();
    let count = group.iter().map(|c| c.count).sum();
    IndexMeta { height, keys, children, count }
}

/// Split `handles` into consecutive groups of `⌈b/2⌉..b`, distributing any
/// remainder across the groups rather than letting the last group run
/// short (spec: "placing any remainder by borrowing from the previous
/// group").
fn split_into_groups(handles: Vec<ChildHandle>, b: usize) -> Vec<Vec<ChildHandle>> {
    let sizes = chunk_sizes(handles.len(), b);
    let mut iter = handles.into_iter();
    let mut out = Vec::with_capacity(sizes.len());
    for size in sizes {
        out.push((&mut iter).take(size).collect());
    }
    out
}

fn chunk_sizes(n: usize, b: usize) -> Vec<usize> {
    let k = (n + b - 1) / b;
    let base = n / k;
    let rem = n % k;
    (0..k).map(|i| if i < rem { base + 1 } else { base }).collect()
}

fn handle_of(store: &dyn NodeStore, digest: &Digest, height: u32) -> Result<ChildHandle> {
    if height == 0 {
        let p = Partition::load(store, digest)?;
        return Ok(ChildHandle {
            digest: *digest,
            first_key: p.first_key().clone(),
            count: p.count(),
        });
    }
    let meta = IndexMeta::load(store, digest)?;
    let first_key = first_key_of(store, &meta.children[0])?;
    Ok(ChildHandle {
        digest: *digest,
        first_key,
        count: meta.count,
    })
}

/// Fully materialize every record reachable from `handles` (all at
/// `height`). Used only when a subtree collapses below its minimum size and
/// must be dissolved back to raw records for folding into a sibling.
fn collect_records(store: &dyn NodeStore, height: u32, handles: &[ChildHandle]) -> Result<Vec<Record>> {
    let mut out = Vec::new();
    for h in handles {
        if height == 0 {
            let p = Partition::load(store, &h.digest)?;
            out.extend(p.read_all(store, None)?);
        } else {
            let meta = IndexMeta::load(store, &h.digest)?;
            let child_handles = meta
                .children
                .iter()
                .map(|d| handle_of(store, d, height - 1))
                .collect::<Result<Vec<_>>>()?;
            out.extend(collect_records(store, height - 1, &child_handles)?);
        }
    }
    Ok(out)
}

/// Route each change to the child index whose key range contains it: the
/// largest `i` with `keys[i-1] <= key`, or `0` if none (spec §4.6 Case C).
fn bucket_changes(keys: &[Key], changes: &[PatchEntry], n_children: usize) -> Vec<Vec<PatchEntry>> {
    let mut buckets: Vec<Vec<PatchEntry>> = (0..n_children).map(|_| Vec::new()).collect();
    for change in changes {
        let idx = keys.partition_point(|k| k <= &change.key);
        buckets[idx].push(change.clone());
    }
    buckets
}

/// Merge two key-ascending patch-entry lists. At equal keys `b` wins: `b`
/// is always the child's own, more specific change-set, while `a` is
/// folded-forward loose records re-expressed as puts.
fn merge_sorted_patch_entries(a: Vec<PatchEntry>, b: Vec<PatchEntry>) -> Vec<PatchEntry> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut ai = 0usize;
    let mut bi = 0usize;
    while ai < a.len() && bi < b.len() {
        match a[ai].key.cmp(&b[bi].key) {
            Ordering::Less => {
                out.push(a[ai].clone());
                ai += 1;
            }
            Ordering::Greater => {
                out.push(b[bi].clone());
                bi += 1;
            }
            Ordering::Equal => {
                out.push(b[bi].clone());
                ai += 1;
                bi += 1;
            }
        }
    }
    out.extend_from_slice(&a[ai..]);
    out.extend_from_slice(&b[bi..]);
    out
}

#[cfg(test)]
#[path = "build_test.rs"]
mod build_test;
