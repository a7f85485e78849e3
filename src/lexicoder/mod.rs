//! Composable codecs between typed values and order-preserving bytes.
//!
//! A lexicoder is a bidirectional codec between values of some domain type
//! and non-empty byte sequences, with the central property: for all `a`,
//! `b` in the domain, `compare(a, b)` and `unsigned_lex_compare(encode(a),
//! encode(b))` have the same sign. All index structure relies on byte-wise
//! comparison; any typed ordering must be reducible to that single
//! primitive.
//!
//! Each concrete coder exposes a self-describing tag via [Lexicoder::config].
//! [from_config] is the factory that reconstructs a coder from such a tag --
//! the grammar is a keyword, optionally followed by a parenthesized
//! parameter list: `bytes`, `string`, `string(latin1)`, `long`, `double`,
//! `instant`, `sequence(long)`, `tuple(string|long)`, `reverse(long)`.

mod bytes;
mod double;
mod instant;
mod long;
mod reverse;
mod sequence;
mod string;
mod tuple;

pub use self::bytes::BytesCoder;
pub use double::DoubleCoder;
pub use instant::InstantCoder;
pub use long::LongCoder;
pub use reverse::ReverseCoder;
pub use sequence::SequenceCoder;
pub use string::StringCoder;
pub use tuple::TupleCoder;

use std::fmt;

use crate::error::{Error, Result};

/// A value flowing through a lexicoder. Composite coders (sequence, tuple,
/// reverse) are parametrized over the element coder(s) rather than the
/// element type, so a single dynamic value enum stands in for the open set
/// of domain types spec.md describes abstractly as `T`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// raw, opaque bytes (the `bytes` coder's domain)
    Bytes(Vec<u8>),
    /// UTF-8 (or configured charset) text
    Str(String),
    /// signed 64-bit integer
    Long(i64),
    /// IEEE-754 double
    Double(f64),
    /// milliseconds since epoch
    Instant(i64),
    /// homogeneous, variable-length sequence of values
    Seq(Vec<Value>),
    /// fixed-arity, heterogeneous tuple of values
    Tuple(Vec<Value>),
}

/// Capability set implemented by every concrete lexicoder.
pub trait Lexicoder: fmt::Debug {
    /// Self-describing configuration tag; round-trips through [from_config].
    fn config(&self) -> String;

    /// Encode `value` into its order-preserving byte representation.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode a byte representation back into a value.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// Reconstruct a coder from a configuration tag (see module docs for the
/// grammar). Unknown keywords or wrong parameter counts fail with
/// `Error::UnsupportedConfig`.
pub fn from_config(tag: &str) -> Result<Box<dyn Lexicoder>> {
    let (head, params) = split_head(tag)?;
    match head {
        "bytes" => {
            expect_arity(head, &params, 0)?;
            Ok(Box::new(BytesCoder))
        }
        "string" => match params.len() {
            0 => Ok(Box::new(StringCoder::utf8())),
            1 => Ok(Box::new(StringCoder::with_charset(params[0].to_string()))),
            n => Err(arity_error(head, n)),
        },
        "long" => {
            expect_arity(head, &params, 0)?;
            Ok(Box::new(LongCoder))
        }
        "double" => {
            expect_arity(head, &params, 0)?;
            Ok(Box::new(DoubleCoder))
        }
        "instant" => {
            expect_arity(head, &params, 0)?;
            Ok(Box::new(InstantCoder))
        }
        "sequence" => {
            expect_arity(head, &params, 1)?;
            Ok(Box::new(SequenceCoder::new(from_config(params[0])?)))
        }
        "reverse" => {
            expect_arity(head, &params, 1)?;
            Ok(Box::new(ReverseCoder::new(from_config(params[0])?)))
        }
        "tuple" => {
            if params.is_empty() {
                return Err(arity_error(head, 0));
            }
            let elems = params
                .iter()
                .map(|p| from_config(p))
                .collect::<Result<Vec<_>>>()?;
            Ok(Box::new(TupleCoder::new(elems)))
        }
        other => Err(Error::unsupported_config(format!(
            "unknown lexicoder tag: {}",
            other
        ))),
    }
}

fn arity_error(head: &str, got: usize) -> Error {
    Error::unsupported_config(format!("{}: wrong parameter count ({})", head, got))
}

fn expect_arity(head: &str, params: &[&str], n: usize) -> Result<()> {
    if params.len() != n {
        return Err(arity_error(head, params.len()));
    }
    Ok(())
}

/// Split `head(p1|p2|...)` into `(head, [p1, p2, ...])`, honoring nested
/// parens so that e.g. `tuple(sequence(long)|string)` splits its outer
/// params on the top-level `|` only.
fn split_head(tag: &str) -> Result<(&str, Vec<&str>)> {
    let tag = tag.trim();
    match tag.find('(') {
        None => Ok((tag, vec![])),
        Some(open) => {
            if !tag.ends_with(')') {
                return Err(Error::unsupported_config(format!(
                    "unbalanced lexicoder tag: {}",
                    tag
                )));
            }
            let head = &tag[..open];
            let inner = &tag[open + 1..tag.len() - 1];
            Ok((head, split_top_level(inner)))
        }
    }
}

fn split_top_level(inner: &str) -> Vec<&str> {
    if inner.is_empty() {
        return vec![];
    }
    let mut parts = vec![];
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    parts
}

/// Escaping protocol shared by composite coders: within an element, `0x00`
/// bytes become `0x01 0x01` and `0x01` bytes become `0x01 0x02`, so the
/// unescaped `0x00` separator between elements stays unambiguous and sorts
/// strictly before any escaped content.
pub(crate) fn escape(src: &[u8], out: &mut Vec<u8>) {
    for &b in src {
        match b {
            0x00 => out.extend_from_slice(&[0x01, 0x01]),
            0x01 => out.extend_from_slice(&[0x01, 0x02]),
            _ => out.push(b),
        }
    }
}

pub(crate) fn unescape(src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        match src[i] {
            0x01 => {
                let next = *src.get(i + 1).ok_or_else(|| {
                    Error::invalid_argument("truncated escape sequence")
                })?;
                match next {
                    0x01 => out.push(0x00),
                    0x02 => out.push(0x01),
                    _ => {
                        return Err(Error::invalid_argument(
                            "invalid escape sequence",
                        ))
                    }
                }
                i += 2;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Concatenate already-escaped elements with a single unescaped `0x00`
/// separator. An empty element list encodes to the empty output.
pub(crate) fn join_escaped(elems: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, e) in elems.iter().enumerate() {
        if i > 0 {
            out.push(0x00);
        }
        out.extend_from_slice(e);
    }
    out
}

/// Inverse of [join_escaped]: split on unescaped `0x00` separators, then
/// unescape each element.
pub(crate) fn split_escaped(src: &[u8]) -> Result<Vec<Vec<u8>>> {
    if src.is_empty() {
        return Ok(vec![]);
    }
    let mut elems = vec![];
    let mut start = 0usize;
    let mut i = 0usize;
    while i < src.len() {
        match src[i] {
            0x00 => {
                elems.push(unescape(&src[start..i])?);
                i += 1;
                start = i;
            }
            0x01 => i += 2,
            _ => i += 1,
        }
    }
    elems.push(unescape(&src[start..])?);
    Ok(elems)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
