//! Table configuration: branching factor, partition limit, family layout,
//! key lexicoder.
//!
//! Grounded on the teacher's `src/robt/config.rs` `Config` struct: a plain,
//! publicly-fielded struct with doc-commented defaults, no file-format
//! parsing (TOML parsing is a CLI concern, out of scope per spec.md §1).

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::lexicoder::{self, Lexicoder};

/// Name of the family every otherwise-unassigned field belongs to.
pub const BASE_FAMILY: &str = "base";

/// Minimum legal branching factor.
pub const MIN_BRANCHING_FACTOR: usize = 4;
/// Default branching factor.
pub const DEFAULT_BRANCHING_FACTOR: usize = 256;
/// Default partition limit (`L`).
pub const DEFAULT_PARTITION_LIMIT: usize = 1000;

/// A named subset of field names. Every field belongs to at most one
/// family; all fields not otherwise assigned belong to the implicit
/// `base` family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Families {
    named: BTreeMap<String, BTreeSet<String>>,
}

impl Families {
    /// Build a family layout from `name -> field-set` pairs. `base` is
    /// reserved and must not be supplied explicitly; fields must be
    /// disjoint across families.
    pub fn new(named: BTreeMap<String, BTreeSet<String>>) -> Result<Families> {
        if named.contains_key(BASE_FAMILY) {
            return Err(Error::invalid_argument("'base' family name is reserved"));
        }
        let mut seen = BTreeSet::new();
        for (name, fields) in &named {
            for f in fields {
                if !seen.insert(f.clone()) {
                    return Err(Error::invalid_argument(format!(
                        "field '{}' assigned to more than one family (duplicate in '{}')",
                        f, name
                    )));
                }
            }
        }
        Ok(Families { named })
    }

    /// The family a field belongs to: its explicitly configured family, or
    /// `base` if unassigned.
    pub fn family_of<'a>(&'a self, field: &str) -> &'a str {
        for (name, fields) in &self.named {
            if fields.contains(field) {
                return name.as_str();
            }
        }
        BASE_FAMILY
    }

    /// All configured family names, plus `base`.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(|s| s.as_str()).collect();
        names.push(BASE_FAMILY);
        names
    }

    /// The explicitly assigned field set for a non-`base` family, or `None`
    /// for `base` (whose members are everything no other family claimed,
    /// not a fixed set).
    pub fn fields_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.named.get(name)
    }
}

/// Table-level configuration. Construction-only: parameters are fixed once
/// a tree is built from them and are not varied mid-lifetime.
#[derive(Clone)]
pub struct Config {
    /// Upper bound on children per index node (>= 4).
    ///
    /// Default: [DEFAULT_BRANCHING_FACTOR]
    pub branching_factor: usize,
    /// Upper bound on records per non-root partition (`L`).
    ///
    /// Default: [DEFAULT_PARTITION_LIMIT]
    pub partition_limit: usize,
    /// Column-family layout.
    pub families: Families,
    /// Lexicoder applied to keys before they reach the tree.
    pub key_lexicoder: std::sync::Arc<dyn Lexicoder>,
}

impl Config {
    /// A configuration with default branching factor and partition limit,
    /// no families beyond `base`, and the identity `bytes` key lexicoder.
    pub fn new() -> Result<Config> {
        Ok(Config {
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            partition_limit: DEFAULT_PARTITION_LIMIT,
            families: Families::default(),
            key_lexicoder: std::sync::Arc::from(lexicoder::from_config("bytes")?),
        })
    }

    /// Override the branching factor; rejects values below
    /// [MIN_BRANCHING_FACTOR].
    pub fn set_branching_factor(mut self, b: usize) -> Result<Config> {
        if b < MIN_BRANCHING_FACTOR {
            return Err(Error::invalid_argument(format!(
                "branching factor must be >= {}, got {}",
                MIN_BRANCHING_FACTOR, b
            )));
        }
        self.branching_factor = b;
        Ok(self)
    }

    /// Override the partition limit; rejects zero.
    pub fn set_partition_limit(mut self, l: usize) -> Result<Config> {
        if l == 0 {
            return Err(Error::invalid_argument("partition limit must be >= 1"));
        }
        self.partition_limit = l;
        Ok(self)
    }

    pub fn set_families(mut self, families: Families) -> Config {
        self.families = families;
        self
    }

    pub fn set_key_lexicoder(mut self, tag: &str) -> Result<Config> {
        self.key_lexicoder = std::sync::Arc::from(lexicoder::from_config(tag)?);
        Ok(self)
    }

    /// ⌈L/2⌉: the minimum record count of a non-singleton partition.
    pub fn min_partition_records(&self) -> usize {
        (self.partition_limit + 1) / 2
    }

    /// ⌈b/2⌉: the minimum child count of a non-root index node.
    pub fn min_branching(&self) -> usize {
        (self.branching_factor + 1) / 2
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
