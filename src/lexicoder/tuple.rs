use super::{escape, join_escaped, split_escaped, Lexicoder, Value};
use crate::error::{Error, Result};

/// Fixed-arity, heterogeneous tuple coder. Like [super::SequenceCoder] but
/// each position has its own coder; encode rejects wrong-arity input and
/// decode rejects element-count mismatches.
#[derive(Debug)]
pub struct TupleCoder {
    elems: Vec<Box<dyn Lexicoder>>,
}

impl TupleCoder {
    pub fn new(elems: Vec<Box<dyn Lexicoder>>) -> TupleCoder {
        TupleCoder { elems }
    }
}

impl Lexicoder for TupleCoder {
    fn config(&self) -> String {
        let parts: Vec<String> = self.elems.iter().map(|e| e.config()).collect();
        format!("tuple({})", parts.join("|"))
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let items = match value {
            Value::Tuple(items) => items,
            other => {
                return Err(Error::invalid_argument(format!(
                    "tuple coder expects Value::Tuple, got {:?}",
                    other
                )))
            }
        };
        if items.len() != self.elems.len() {
            return Err(Error::invalid_argument(format!(
                "tuple coder arity mismatch: expected {}, got {}",
                self.elems.len(),
                items.len()
            )));
        }
        let mut escaped = Vec::with_capacity(items.len());
        for (coder, item) in self.elems.iter().zip(items.iter()) {
            let raw = coder.encode(item)?;
            let mut buf = Vec::with_capacity(raw.len());
            escape(&raw, &mut buf);
            escaped.push(buf);
        }
        Ok(join_escaped(&escaped))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let parts = split_escaped(bytes)?;
        if parts.len() != self.elems.len() {
            return Err(Error::invalid_argument(format!(
                "tuple coder element-count mismatch: expected {}, got {}",
                self.elems.len(),
                parts.len()
            )));
        }
        let items = self
            .elems
            .iter()
            .zip(parts.iter())
            .map(|(coder, part)| coder.decode(part))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Tuple(items))
    }
}

#[cfg(test)]
#[path = "tuple_test.rs"]
mod tuple_test;
