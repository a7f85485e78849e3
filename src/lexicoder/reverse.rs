use super::{Lexicoder, Value};
use crate::error::Result;

/// Encode with the inner coder, then map each byte `b -> 255 - b`. Produces
/// the reverse of the inner coder's order.
#[derive(Debug)]
pub struct ReverseCoder {
    inner: Box<dyn Lexicoder>,
}

impl ReverseCoder {
    pub fn new(inner: Box<dyn Lexicoder>) -> ReverseCoder {
        ReverseCoder { inner }
    }
}

fn complement(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| 255 - b).collect()
}

impl Lexicoder for ReverseCoder {
    fn config(&self) -> String {
        format!("reverse({})", self.inner.config())
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(complement(&self.inner.encode(value)?))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        self.inner.decode(&complement(bytes))
    }
}

#[cfg(test)]
#[path = "reverse_test.rs"]
mod reverse_test;
