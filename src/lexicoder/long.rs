use super::{Lexicoder, Value};
use crate::error::{Error, Result};

/// 8-byte big-endian signed integer coder, sign bit flipped so two's
/// complement negatives sort before positives under unsigned comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongCoder;

impl LongCoder {
    /// Encode a raw `i64`, used internally by [super::double::DoubleCoder]
    /// and [super::instant::InstantCoder] which both reduce to this coder.
    pub(crate) fn encode_i64(v: i64) -> [u8; 8] {
        let flipped = (v as u64) ^ (1u64 << 63);
        flipped.to_be_bytes()
    }

    pub(crate) fn decode_i64(bytes: &[u8]) -> Result<i64> {
        if bytes.len() != 8 {
            return Err(Error::invalid_argument(format!(
                "long coder requires exactly 8 bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        let flipped = u64::from_be_bytes(buf);
        Ok((flipped ^ (1u64 << 63)) as i64)
    }
}

impl Lexicoder for LongCoder {
    fn config(&self) -> String {
        "long".to_string()
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Long(v) => Ok(LongCoder::encode_i64(*v).to_vec()),
            other => Err(Error::invalid_argument(format!(
                "long coder expects Value::Long, got {:?}",
                other
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(Value::Long(LongCoder::decode_i64(bytes)?))
    }
}

#[cfg(test)]
#[path = "long_test.rs"]
mod long_test;
