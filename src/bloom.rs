//! Probabilistic per-partition membership filter.
//!
//! Fixed-size bit array of `m` bits with `k` hash functions, both derived
//! from a requested expected-element count and a target false-positive
//! rate. Used only as a fast negative check in point lookups; never
//! authoritative (false ⇒ definitely absent; true ⇒ probably present).
//!
//! Grounded on the `db::Bloom` trait shape visible in the teacher's
//! `src/bitmaps/{xor8,nobitmap}.rs` adapters (`add_key`/`contains`/
//! `to_bytes`/`from_bytes`/`or`), reimplemented as a classic bit-array
//! Bloom filter rather than the teacher's XOR filter, per spec.md §4.2.

use std::convert::TryInto;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// City-hash based [std::hash::Hasher], grounded on the teacher's own
/// `src/hash/mod.rs` `CityHasher` adapter. Kept as a 128-bit digest (rather
/// than folded down to 64 bits via `finish()`) so the Bloom filter can split
/// it into two independent 64-bit halves for Kirsch-Mitzenmacher double
/// hashing without computing the hash twice.
#[derive(Clone, Copy, Default)]
struct CityHasher128 {
    digest: u128,
}

impl Hasher for CityHasher128 {
    fn finish(&self) -> u64 {
        ((self.digest >> 64) as u64) ^ (self.digest as u64)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.digest = cityhash_rs::cityhash_110_128(bytes);
    }
}

/// Default target false-positive rate when none is requested.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// A fixed-size Bloom filter over some key type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter {
    m_bits: usize,
    k_hashes: usize,
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Size a filter for `expected_items` elements at `false_positive_rate`
    /// (e.g. 0.01 for 1%).
    pub fn new(expected_items: usize, false_positive_rate: f64) -> BloomFilter {
        let n = expected_items.max(1) as f64;
        let p = false_positive_rate.clamp(f64::MIN_POSITIVE, 0.5);
        let m_bits = (-(n * p.ln()) / (std::f64::consts::LN_2.powi(2)))
            .ceil()
            .max(8.0) as usize;
        let k_hashes = ((m_bits as f64 / n) * std::f64::consts::LN_2)
            .round()
            .clamp(1.0, 30.0) as usize;
        BloomFilter {
            m_bits,
            k_hashes,
            bits: vec![0u8; (m_bits + 7) / 8],
        }
    }

    /// Number of bits in the underlying array.
    pub fn m(&self) -> usize {
        self.m_bits
    }

    /// Number of hash functions (probe count).
    pub fn k(&self) -> usize {
        self.k_hashes
    }

    fn hashes<Q: ?Sized + Hash>(&self, element: &Q) -> (u64, u64) {
        let mut hasher = CityHasher128::default();
        element.hash(&mut hasher);
        let digest = hasher.digest;
        ((digest >> 64) as u64, digest as u64)
    }

    fn positions<Q: ?Sized + Hash>(&self, element: &Q) -> impl Iterator<Item = usize> + '_ {
        let (h1, h2) = self.hashes(element);
        let m = self.m_bits as u64;
        (0..self.k_hashes).map(move |i| {
            let combined = h1.wrapping_add((i as u64).wrapping_mul(h2));
            (combined % m) as usize
        })
    }

    /// Insert `element` into the filter.
    pub fn insert<Q: ?Sized + Hash>(&mut self, element: &Q) {
        for pos in self.positions(element).collect::<Vec<_>>() {
            self.set_bit(pos);
        }
    }

    /// `false` means definitely absent; `true` means probably present.
    pub fn contains<Q: ?Sized + Hash>(&self, element: &Q) -> bool {
        self.positions(element).all(|pos| self.get_bit(pos))
    }

    /// Bitwise-OR two filters together. Requires identical `(m, k)`.
    pub fn merge(&self, other: &BloomFilter) -> Result<BloomFilter> {
        if self.m_bits != other.m_bits || self.k_hashes != other.k_hashes {
            return Err(Error::invalid_argument(
                "bloom filter merge requires identical (m, k)",
            ));
        }
        let bits = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .map(|(a, b)| a | b)
            .collect();
        Ok(BloomFilter {
            m_bits: self.m_bits,
            k_hashes: self.k_hashes,
            bits,
        })
    }

    /// Serialized form: `(m, k, packed-bits)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.bits.len());
        out.extend_from_slice(&(self.m_bits as u64).to_be_bytes());
        out.extend_from_slice(&(self.k_hashes as u64).to_be_bytes());
        out.extend_from_slice(&self.bits);
        out
    }

    /// Inverse of [BloomFilter::to_bytes].
    pub fn from_bytes(buf: &[u8]) -> Result<BloomFilter> {
        if buf.len() < 16 {
            return Err(Error::invalid_argument("bloom filter buffer too short"));
        }
        let m_bits = u64::from_be_bytes(buf[0..8].try_into().unwrap()) as usize;
        let k_hashes = u64::from_be_bytes(buf[8..16].try_into().unwrap()) as usize;
        let bits = buf[16..].to_vec();
        if bits.len() != (m_bits + 7) / 8 {
            return Err(Error::invalid_argument(
                "bloom filter buffer length does not match m",
            ));
        }
        Ok(BloomFilter {
            m_bits,
            k_hashes,
            bits,
        })
    }

    fn set_bit(&mut self, pos: usize) {
        self.bits[pos / 8] |= 1 << (pos % 8);
    }

    fn get_bit(&self, pos: usize) -> bool {
        self.bits[pos / 8] & (1 << (pos % 8)) != 0
    }
}

#[cfg(test)]
#[path = "bloom_test.rs"]
mod bloom_test;
