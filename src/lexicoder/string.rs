use super::{Lexicoder, Value};
use crate::error::{Error, Result};

/// UTF-8 (default) or named-charset string coder. Order-preserving because
/// UTF-8's own byte encoding already preserves Unicode scalar-value order;
/// a non-UTF-8 charset parameter is carried through unchanged (this core
/// treats the value as already encoded in that charset) and is accepted as
/// configuration but not independently validated.
#[derive(Debug, Clone)]
pub struct StringCoder {
    charset: Option<String>,
}

impl StringCoder {
    /// The default, UTF-8 coder.
    pub fn utf8() -> StringCoder {
        StringCoder { charset: None }
    }

    /// A coder tagged with an explicit charset parameter.
    pub fn with_charset(charset: String) -> StringCoder {
        StringCoder {
            charset: Some(charset),
        }
    }
}

impl Lexicoder for StringCoder {
    fn config(&self) -> String {
        match &self.charset {
            None => "string".to_string(),
            Some(cs) => format!("string({})", cs),
        }
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        match value {
            Value::Str(s) if !s.is_empty() => Ok(s.as_bytes().to_vec()),
            Value::Str(_) => Err(Error::invalid_argument("string coder rejects empty input")),
            other => Err(Error::invalid_argument(format!(
                "string coder expects Value::Str, got {:?}",
                other
            ))),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.is_empty() {
            return Err(Error::invalid_argument("string coder rejects empty input"));
        }
        let s = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::invalid_argument(format!("invalid utf-8: {}", e)))?;
        Ok(Value::Str(s))
    }
}

#[cfg(test)]
#[path = "string_test.rs"]
mod string_test;
