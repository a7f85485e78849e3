use super::{escape, join_escaped, split_escaped, Lexicoder, Value};
use crate::error::{Error, Result};

/// Homogeneous, variable-length sequence coder: encode each element with the
/// inner coder, escape it, then join with a single unescaped `0x00`
/// separator. An empty sequence encodes to the empty output, and is
/// therefore rejected by outer contexts requiring non-empty keys.
#[derive(Debug)]
pub struct SequenceCoder {
    elem: Box<dyn Lexicoder>,
}

impl SequenceCoder {
    pub fn new(elem: Box<dyn Lexicoder>) -> SequenceCoder {
        SequenceCoder { elem }
    }
}

impl Lexicoder for SequenceCoder {
    fn config(&self) -> String {
        format!("sequence({})", self.elem.config())
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let items = match value {
            Value::Seq(items) => items,
            other => {
                return Err(Error::invalid_argument(format!(
                    "sequence coder expects Value::Seq, got {:?}",
                    other
                )))
            }
        };
        let mut escaped = Vec::with_capacity(items.len());
        for item in items {
            let raw = self.elem.encode(item)?;
            let mut buf = Vec::with_capacity(raw.len());
            escape(&raw, &mut buf);
            escaped.push(buf);
        }
        Ok(join_escaped(&escaped))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.is_empty() {
            return Ok(Value::Seq(vec![]));
        }
        let parts = split_escaped(bytes)?;
        let items = parts
            .iter()
            .map(|p| self.elem.decode(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Seq(items))
    }
}

#[cfg(test)]
#[path = "sequence_test.rs"]
mod sequence_test;
