//! Field-map value type.
//!
//! spec.md §3 leaves a record's field values abstract ("arbitrary value").
//! This crate fixes a small closed enum rather than a generic type
//! parameter: node bodies must be self-describing for CBOR round-tripping
//! (spec.md §6), and a closed enum keeps that self-description local to
//! this crate instead of leaking a third-party wire type through the
//! public API.

use std::collections::BTreeMap;

use cbordata::Cborize;

const VALUE_VER: u32 = 0x00010001;

/// A single field's value.
#[derive(Clone, Debug, PartialEq, Cborize)]
pub enum Value {
    Bytes(Vec<u8>),
    I64(i64),
    F64(f64),
    Str(String),
    Bool(bool),
    /// Explicit null, distinct from a field simply being absent from the map.
    Null {},
}

impl Value {
    const ID: u32 = VALUE_VER;
}

/// Field name -> value. `BTreeMap` keeps field names canonically ordered,
/// which spec.md §4.6 requires for deterministic node serialization.
pub type FieldMap = BTreeMap<String, Value>;
