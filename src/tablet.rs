//! Sorted `(key, partial-field-map)` chunk for one column family, within one
//! partition.
//!
//! Grounded on the teacher's `src/robt/entry.rs` (leaf entry shape) and
//! `src/robt/vlog.rs` (array-of-entries handling) -- a tablet is this
//! crate's leaf entry array, scoped to a single family.

use std::ops::Bound;

use crate::error::{Error, Result};
use crate::key::Key;
use crate::value::FieldMap;

/// An ordered sequence of `(key, partial-field-map)` entries for exactly
/// one family within exactly one partition. Keys are strictly ascending.
/// A tablet never contains an entry whose partial-field-map is empty,
/// except for the `base` family, which preserves empty maps as presence
/// markers.
#[derive(Clone, Debug, PartialEq)]
pub struct Tablet {
    entries: Vec<(Key, FieldMap)>,
}

impl Tablet {
    /// Build a tablet from entries the caller has already projected onto
    /// the family's fields. Asserts strictly ascending keys.
    pub fn from_records(entries: Vec<(Key, FieldMap)>) -> Result<Tablet> {
        for w in entries.windows(2) {
            if w[0].0 >= w[1].0 {
                return Err(Error::invalid_argument(
                    "tablet entries must be strictly ascending by key",
                ));
            }
        }
        Ok(Tablet { entries })
    }

    /// Remove entries whose partial-field-map is empty. Not applied to the
    /// `base` family by the caller (partition construction skips this call
    /// for `base`).
    pub fn prune(self) -> Tablet {
        Tablet {
            entries: self.entries.into_iter().filter(|(_, m)| !m.is_empty()).collect(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazy, in-key-order iteration over every entry.
    pub fn read_all(&self) -> impl Iterator<Item = &(Key, FieldMap)> {
        self.entries.iter()
    }

    /// Return only the requested keys that are present, in ascending order
    /// (caller-provided key order is irrelevant).
    pub fn read_batch(&self, keys: &[Key]) -> Vec<(Key, FieldMap)> {
        let mut wanted: Vec<&Key> = keys.iter().collect();
        wanted.sort();
        wanted.dedup();
        let mut out = Vec::with_capacity(wanted.len());
        let mut wi = 0usize;
        for (k, m) in &self.entries {
            while wi < wanted.len() && wanted[wi] < k {
                wi += 1;
            }
            if wi < wanted.len() && wanted[wi] == k {
                out.push((k.clone(), m.clone()));
                wi += 1;
            }
        }
        out
    }

    /// Entries whose key falls within `[min, max]`, key-ascending.
    pub fn read_range(&self, min: Bound<&Key>, max: Bound<&Key>) -> Vec<(Key, FieldMap)> {
        self.entries
            .iter()
            .filter(|(k, _)| {
                let above = match min {
                    Bound::Unbounded => true,
                    Bound::Included(m) => k >= m,
                    Bound::Excluded(m) => k > m,
                };
                let below = match max {
                    Bound::Unbounded => true,
                    Bound::Included(m) => k <= m,
                    Bound::Excluded(m) => k < m,
                };
                above && below
            })
            .cloned()
            .collect()
    }

    pub fn first_key(&self) -> Option<&Key> {
        self.entries.first().map(|(k, _)| k)
    }

    pub fn last_key(&self) -> Option<&Key> {
        self.entries.last().map(|(k, _)| k)
    }
}

#[cfg(test)]
#[path = "tablet_test.rs"]
mod tablet_test;
