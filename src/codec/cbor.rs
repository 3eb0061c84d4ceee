//! A thin CBOR reader built on `ciborium`, this crate's existing CBOR
//! dependency. Authenticator data containing attestation data uses a
//! *concatenated* layout (credential public key immediately followed,
//! optionally, by an extensions map) rather than a wrapping array, so the
//! reader exposes "read one item, return the remaining bytes" semantics
//! instead of assuming the buffer holds exactly one value.

use std::io::Cursor;

use ciborium::value::Value;
use serde::de::DeserializeOwned;

use crate::error::CoreError;

/// Splits `bytes` into the raw encoding of exactly one leading CBOR data
/// item and whatever bytes remain after it, without interpreting the item.
/// Used for the concatenated authenticator data layout, where the caller
/// decides whether leftover bytes are an expected extensions item or stray
/// (and therefore fatal) trailing data.
pub fn split_one(bytes: &[u8]) -> Result<(&[u8], &[u8]), CoreError> {
    let mut cursor = Cursor::new(bytes);
    let _: Value = ciborium::de::from_reader(&mut cursor)
        .map_err(|e| CoreError::malformed(format!("invalid CBOR item: {e}")))?;
    let consumed = cursor.position() as usize;
    Ok((&bytes[..consumed], &bytes[consumed..]))
}

/// Reads exactly one CBOR data item from the front of `bytes` and returns it
/// along with whatever bytes remain.
pub fn read_one(bytes: &[u8]) -> Result<(Value, &[u8]), CoreError> {
    let (item, rest) = split_one(bytes)?;
    let value: Value = ciborium::de::from_reader(item)
        .map_err(|e| CoreError::malformed(format!("invalid CBOR item: {e}")))?;
    Ok((value, rest))
}

/// Decodes `bytes` as exactly one CBOR-encoded value of type `T`, failing if
/// any trailing bytes remain. Used for top-level structures such as the
/// attestation object, which are never followed by anything else.
pub fn decode_exact<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    let mut cursor = Cursor::new(bytes);
    let value: T = ciborium::de::from_reader(&mut cursor)
        .map_err(|e| CoreError::malformed(format!("invalid CBOR: {e}")))?;
    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(CoreError::malformed(format!(
            "{} stray trailing byte(s) after CBOR value",
            bytes.len() - consumed
        )));
    }
    Ok(value)
}

/// Converts a decoded CBOR map [`Value`] into a `(text key, Value)` lookup,
/// failing if the value is not a map or any key is not text.
pub fn as_text_map(value: Value) -> Result<Vec<(String, Value)>, CoreError> {
    let map = value
        .into_map()
        .map_err(|_| CoreError::malformed("expected a CBOR map"))?;
    map.into_iter()
        .map(|(k, v)| {
            k.into_text()
                .map(|k| (k, v))
                .map_err(|_| CoreError::malformed("expected CBOR map key to be text"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::cbor;

    #[test]
    fn read_one_reports_trailing_bytes() {
        let item = cbor!(42).unwrap();
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&item, &mut bytes).unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB]);

        let (value, rest) = read_one(&bytes).unwrap();
        assert_eq!(value, Value::Integer(42.into()));
        assert_eq!(rest, &[0xAA, 0xBB]);
    }

    #[test]
    fn decode_exact_rejects_trailing_bytes() {
        let item = cbor!(42).unwrap();
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&item, &mut bytes).unwrap();
        bytes.push(0xFF);

        let err = decode_exact::<i64>(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(_)));
    }
}
