use super::{Lexicoder, Value};
use crate::error::{Error, Result};

/// IEEE-754 double coder. If the sign bit is set, all bits are inverted;
/// otherwise only the sign bit is flipped; the resulting bit pattern is
/// written big-endian exactly as the long coder writes its 8 bytes. This
/// yields unsigned-lex order matching numeric order for all finite values;
/// `-0.0` encodes identically to `+0.0`. NaN handling is undefined --
/// callers must reject NaN before encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleCoder;

fn order_preserving_bits(v: f64) -> u64 {
    // Collapse -0.0 onto +0.0 first: IEEE equality says they're the same
    // value, but their bit patterns differ and would otherwise map to
    // different keys.
    let bits = if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
    if bits & (1u64 << 63) != 0 {
        !bits
    } else {
        bits | (1u64 << 63)
    }
}

fn from_order_preserving_bits(bits: u64) -> f64 {
    let raw = if bits & (1u64 << 63) != 0 {
        bits & !(1u64 << 63)
    } else {
        !bits
    };
    f64::from_bits(raw)
}

impl Lexicoder for DoubleCoder {
    fn config(&self) -> String {
        "double".to_string()
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Double(v) if v.is_nan() => {
                Err(Error::invalid_argument("double coder rejects NaN"))
            }
            Value::Double(v) => Ok(order_preserving_bits(*v).to_be_bytes().to_vec()),
            other => Err(Error::invalid_argument(format!(
                "double coder expects Value::Double, got {:?}",
                other
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.len() != 8 {
            return Err(Error::invalid_argument(format!(
                "double coder requires exactly 8 bytes, got {}",
                bytes.len()
            )));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(Value::Double(from_order_preserving_bits(u64::from_be_bytes(buf))))
    }
}

#[cfg(test)]
#[path = "double_test.rs"]
mod double_test;
