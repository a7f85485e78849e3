//! Opaque, immutable key bytes with unsigned lexicographic ordering.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};

/// An immutable byte sequence of length >= 1.
///
/// Equality is byte-wise; ordering is unsigned lexicographic -- the same
/// ordering `[u8]`'s own `Ord` impl already gives us, since Rust never treats
/// `u8` as signed. Keys are opaque to the tree: lexicoders are the only
/// producers (see `crate::lexicoder`).
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Key(Vec<u8>);

impl Key {
    /// Wrap `bytes` as a `Key`. Rejects the empty sequence.
    pub fn new(bytes: Vec<u8>) -> Result<Key> {
        if bytes.is_empty() {
            return Err(Error::invalid_argument("key must be non-empty"));
        }
        Ok(Key(bytes))
    }

    /// Borrow the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume `self`, returning the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Key) -> Ordering {
        // `[u8]::cmp` already compares bytes as unsigned values.
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Key) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", hex_preview(&self.0))
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    const MAX: usize = 16;
    let mut s = String::with_capacity(bytes.len().min(MAX) * 2 + 3);
    for b in bytes.iter().take(MAX) {
        s.push_str(&format!("{:02x}", b));
    }
    if bytes.len() > MAX {
        s.push_str("..");
    }
    s
}

/// Unsigned lexicographic compare, exposed standalone for callers that only
/// have raw byte slices (e.g. tests exercising spec.md's ordering law
/// directly rather than through `Key`).
pub fn unsigned_lex_compare(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
#[path = "key_test.rs"]
mod key_test;
