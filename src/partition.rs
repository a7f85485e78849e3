//! The leaf node of the data tree: records grouped into a size-bounded
//! partition, split across column-family tablets plus a membership filter.
//!
//! Grounded on the teacher's `src/robt/build.rs` (`BuildMM`/`BuildMZ`
//! threshold-accumulation over a sorted input stream) for `partition_records`,
//! and `src/robt/index.rs`'s leaf-block assembly for `Partition` itself.

use std::collections::BTreeMap;
use std::ops::Bound;

use rayon::prelude::*;

use crate::bloom::{BloomFilter, DEFAULT_FALSE_POSITIVE_RATE};
use crate::config::{Config, Families};
use crate::error::{Error, Result};
use crate::key::Key;
use crate::patch::Record;
use crate::store::{Digest, FamilyDef, NodeStore, NodeValue, PartitionNode, TabletNode, TabletRef};
use crate::tablet::Tablet;
use crate::value::FieldMap;
use crate::workers;

/// A fully assembled leaf node, already written to the node store. Attribute
/// names follow spec §3.
#[derive(Clone, Debug)]
pub struct Partition {
    tablets: BTreeMap<String, Digest>,
    membership: BloomFilter,
    count: usize,
    families: Families,
    first_key: Key,
    last_key: Key,
}

impl Partition {
    /// Build a partition from already patched, tombstone-free,
    /// strictly-ascending records, store its tablets and its own metadata,
    /// and return the in-memory handle. Rejects more than `config.partition_limit`
    /// records.
    pub fn from_records(
        store: &dyn NodeStore,
        config: &Config,
        entries: Vec<(Key, FieldMap)>,
    ) -> Result<Partition> {
        if entries.len() > config.partition_limit {
            return Err(Error::PartitionOverflow {
                have: entries.len(),
                limit: config.partition_limit,
            });
        }
        for w in entries.windows(2) {
            if w[0].0 >= w[1].0 {
                return Err(Error::invalid_argument(
                    "partition entries must be strictly ascending by key",
                ));
            }
        }

        let first_key = entries
            .first()
            .map(|(k, _)| k.clone())
            .ok_or_else(|| Error::invalid_argument("partition must hold at least one record"))?;
        let last_key = entries.last().map(|(k, _)| k.clone()).unwrap();

        let mut membership = BloomFilter::new(entries.len(), DEFAULT_FALSE_POSITIVE_RATE);
        for (k, _) in &entries {
            membership.insert(k.as_bytes());
        }

        let names: Vec<String> = config
            .families
            .names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let family_tablets: Vec<(String, Tablet)> = names
            .iter()
            .map(|name| {
                let projected: Vec<(Key, FieldMap)> = entries
                    .iter()
                    .map(|(k, fields)| {
                        let projected_fields: FieldMap = fields
                            .iter()
                            .filter(|(fname, _)| config.families.family_of(fname) == name)
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect();
                        (k.clone(), projected_fields)
                    })
                    .collect();
                let tablet = Tablet::from_records(projected)?;
                let tablet = if name == crate::config::BASE_FAMILY {
                    tablet
                } else {
                    tablet.prune()
                };
                Ok((name.clone(), tablet))
            })
            .collect::<Result<Vec<_>>>()?;

        let stored: Vec<(String, Digest)> = workers::install(|| {
            family_tablets
                .into_par_iter()
                .filter(|(_, tablet)| !tablet.is_empty())
                .map(|(name, tablet)| {
                    let digest = store.put(NodeValue::Tablet(TabletNode::from_tablet(&tablet)))?;
                    Ok((name, digest))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let tablets: BTreeMap<String, Digest> = stored.into_iter().collect();

        Ok(Partition {
            tablets,
            membership,
            count: entries.len(),
            families: config.families.clone(),
            first_key,
            last_key,
        })
    }

    pub fn first_key(&self) -> &Key {
        &self.first_key
    }

    pub fn last_key(&self) -> &Key {
        &self.last_key
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Fast negative membership check (spec §4.4 point-read optimization).
    pub fn maybe_contains(&self, key: &Key) -> bool {
        self.membership.contains(key.as_bytes())
    }

    /// Store this partition's own metadata node, returning its digest.
    /// Tablets are already stored by [Partition::from_records].
    pub fn store(&self, store: &dyn NodeStore) -> Result<Digest> {
        store.put(NodeValue::Partition(self.to_node()))
    }

    pub(crate) fn to_node(&self) -> PartitionNode {
        let tablets = self
            .tablets
            .iter()
            .map(|(family, digest)| TabletRef {
                family: family.clone(),
                digest: digest.to_vec(),
            })
            .collect();
        let mut families: Vec<FamilyDef> = self
            .families
            .names()
            .into_iter()
            .filter(|n| *n != crate::config::BASE_FAMILY)
            .map(|name| {
                let fields = self
                    .families
                    .fields_of(name)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default();
                FamilyDef {
                    name: name.to_string(),
                    fields,
                }
            })
            .collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        PartitionNode {
            tablets,
            membership: self.membership.to_bytes(),
            count: self.count as u64,
            families,
            first_key: self.first_key.as_bytes().to_vec(),
            last_key: self.last_key.as_bytes().to_vec(),
        }
    }

    /// Reconstruct a [Partition] handle from its stored node value. Tablets
    /// remain referenced by digest; they are only loaded on demand by reads.
    pub(crate) fn from_node(node: PartitionNode) -> Result<Partition> {
        let tablets = node
            .tablets
            .into_iter()
            .map(|t| Ok((t.family, Digest::from_vec(t.digest)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let membership = BloomFilter::from_bytes(&node.membership)?;
        let first_key = Key::new(node.first_key)?;
        let last_key = Key::new(node.last_key)?;
        let mut named = BTreeMap::new();
        for f in node.families {
            named.insert(f.name, f.fields.into_iter().collect());
        }
        Ok(Partition {
            tablets,
            membership,
            count: node.count as usize,
            families: Families::new(named)?,
            first_key,
            last_key,
        })
    }

    pub fn load(store: &dyn NodeStore, digest: &Digest) -> Result<Partition> {
        match store.get(digest)? {
            NodeValue::Partition(node) => Partition::from_node(node),
            other => Err(Error::TypeMismatch {
                reference: digest.to_string(),
                expected: "partition",
                found: other.type_tag().to_string(),
            }),
        }
    }

    fn tablets_for_fields(&self, fields: Option<&[String]>) -> Vec<(&str, &Digest)> {
        let wants_all = fields.is_none();
        self.tablets
            .iter()
            .filter(|(name, _)| {
                wants_all
                    || name.as_str() == crate::config::BASE_FAMILY
                    || fields
                        .unwrap()
                        .iter()
                        .any(|f| self.families.family_of(f) == name.as_str())
            })
            .map(|(name, digest)| (name.as_str(), digest))
            .collect()
    }

    fn load_tablets(
        &self,
        store: &dyn NodeStore,
        fields: Option<&[String]>,
    ) -> Result<Vec<Tablet>> {
        self.tablets_for_fields(fields)
            .into_iter()
            .map(|(_, digest)| match store.get(digest)? {
                NodeValue::Tablet(node) => node.into_tablet(),
                other => Err(Error::TypeMismatch {
                    reference: digest.to_string(),
                    expected: "tablet",
                    found: other.type_tag().to_string(),
                }),
            })
            .collect()
    }

    fn merge_by_key(tablets: &[Tablet], keep: impl Fn(&Key) -> bool) -> Vec<Record> {
        let mut merged: BTreeMap<Key, FieldMap> = BTreeMap::new();
        for tablet in tablets {
            for (k, fields) in tablet.read_all() {
                if keep(k) {
                    merged.entry(k.clone()).or_default().extend(fields.clone());
                }
            }
        }
        merged.into_iter().collect()
    }

    /// Read every record in the partition, merged across the tablets needed
    /// to satisfy `fields` (spec §4.4 "select the minimum set of tablets").
    pub fn read_all(&self, store: &dyn NodeStore, fields: Option<&[String]>) -> Result<Vec<Record>> {
        let tablets = self.load_tablets(store, fields)?;
        Ok(Partition::merge_by_key(&tablets, |_| true))
    }

    /// Read the requested keys that are present, skipping ones the
    /// membership filter reports as definitely absent.
    pub fn read_batch(
        &self,
        store: &dyn NodeStore,
        keys: &[Key],
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        let wanted: Vec<Key> = keys
            .iter()
            .filter(|k| self.maybe_contains(k))
            .cloned()
            .collect();
        if wanted.is_empty() {
            return Ok(vec![]);
        }
        let tablets = self.load_tablets(store, fields)?;
        Ok(Partition::merge_by_key(&tablets, |k| wanted.contains(k)))
    }

    /// Read records whose key falls within `[min, max]`.
    pub fn read_range(
        &self,
        store: &dyn NodeStore,
        min: Bound<&Key>,
        max: Bound<&Key>,
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>> {
        let tablets = self.load_tablets(store, fields)?;
        let in_range = |k: &Key| {
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
        };
        Ok(Partition::merge_by_key(&tablets, in_range))
    }
}

/// Consume a key-ordered stream of patched records and emit zero or more
/// size-bounded, non-overlapping partitions (spec §4.4 `partition_records`).
pub fn partition_records(
    store: &dyn NodeStore,
    config: &Config,
    records: Vec<Record>,
) -> Result<Vec<Partition>> {
    let limit = config.partition_limit;
    let threshold = limit + config.min_partition_records();
    let mut out = Vec::new();
    let mut offset = 0usize;

    while records.len() - offset >= threshold {
        let chunk: Vec<Record> = records[offset..offset + limit].to_vec();
        out.push(Partition::from_records(store, config, chunk)?);
        offset += limit;
    }
    let remainder = &records[offset..];
    if remainder.len() > limit {
        let mid = remainder.len() / 2;
        let left = remainder[..mid].to_vec();
        let right = remainder[mid..].to_vec();
        out.push(Partition::from_records(store, config, left)?);
        out.push(Partition::from_records(store, config, right)?);
    } else if !remainder.is_empty() {
        out.push(Partition::from_records(store, config, remainder.to_vec())?);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "partition_test.rs"]
mod partition_test;
