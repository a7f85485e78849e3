use super::{Lexicoder, Value};
use crate::error::{Error, Result};

/// Identity coder: bytes in, bytes out. Rejects empty input in both
/// directions (spec.md §4.1).
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCoder;

impl Lexicoder for BytesCoder {
    fn config(&self) -> String {
        "bytes".to_string()
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Bytes(b) if !b.is_empty() => Ok(b.clone()),
            Value::Bytes(_) => Err(Error::invalid_argument("bytes coder rejects empty input")),
            other => Err(Error::invalid_argument(format!(
                "bytes coder expects Value::Bytes, got {:?}",
                other
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.is_empty() {
            return Err(Error::invalid_argument("bytes coder rejects empty input"));
        }
        Ok(Value::Bytes(bytes.to_vec()))
    }
}

#[cfg(test)]
#[path = "bytes_test.rs"]
mod bytes_test;
