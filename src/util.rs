//! Canonical CBOR encode/decode helpers, matching the teacher's own
//! `crate::util::into_cbor_bytes` idiom used throughout `src/robt/`.

use cbordata::{Cbor, FromCbor, IntoCbor};

use crate::error::{Error, Result};

/// Encode `val` to its canonical byte representation. Field orderings within
/// a value's own CBOR map come from however its `IntoCbor` impl enumerates
/// them; callers that need a deterministic ordering build from a sorted
/// `Vec`/`BTreeMap` (see `crate::value::FieldMap`) before reaching this step,
/// so the bytes this function returns are already canonical by construction.
pub(crate) fn into_cbor_bytes<T: IntoCbor>(val: T) -> Result<Vec<u8>> {
    let cbor_val = val
        .into_cbor()
        .map_err(|e| Error::invalid_argument(format!("cbor encode failed: {}", e)))?;
    let mut buf = Vec::new();
    cbor_val
        .encode(&mut buf)
        .map_err(|e| Error::invalid_argument(format!("cbor encode failed: {}", e)))?;
    Ok(buf)
}

/// Inverse of [into_cbor_bytes].
pub(crate) fn from_cbor_bytes<T: FromCbor>(mut buf: &[u8]) -> Result<T> {
    let (cbor_val, _) = Cbor::decode(&mut buf)
        .map_err(|e| Error::invalid_argument(format!("cbor decode failed: {}", e)))?;
    T::from_cbor(cbor_val)
        .map_err(|e| Error::invalid_argument(format!("cbor decode failed: {}", e)))
}
