use super::long::LongCoder;
use super::{Lexicoder, Value};
use crate::error::{Error, Result};

/// Milliseconds-since-epoch coder, signed 64-bit, encoded via the long
/// coder.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantCoder;

impl Lexicoder for InstantCoder {
    fn config(&self) -> String {
        "instant".to_string()
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Instant(millis) => Ok(LongCoder::encode_i64(*millis).to_vec()),
            other => Err(Error::invalid_argument(format!(
                "instant coder expects Value::Instant, got {:?}",
                other
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(Value::Instant(LongCoder::decode_i64(bytes)?))
    }
}

#[cfg(test)]
#[path = "instant_test.rs"]
mod instant_test;
