//! Opaque immutable byte buffer with a cached Base64URL rendering, the wire
//! form every byte-valued WebAuthn JSON field uses.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::base64url;
use crate::error::CoreError;

#[derive(Clone, Eq)]
pub struct ByteArray {
    bytes: Vec<u8>,
    encoded: String,
}

impl ByteArray {
    pub fn new(bytes: Vec<u8>) -> Self {
        let encoded = base64url::encode(&bytes);
        ByteArray { bytes, encoded }
    }

    pub fn from_base64url(s: &str) -> Result<Self, CoreError> {
        let bytes = base64url::decode(s)?;
        Ok(ByteArray {
            bytes,
            encoded: s.to_owned(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn as_base64url(&self) -> &str {
        &self.encoded
    }
}

impl PartialEq for ByteArray {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl std::hash::Hash for ByteArray {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Debug for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteArray({})", self.encoded)
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(bytes: Vec<u8>) -> Self {
        ByteArray::new(bytes)
    }
}

impl Serialize for ByteArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded)
    }
}

impl<'de> Deserialize<'de> for ByteArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ByteArray::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_content_wise() {
        let a = ByteArray::new(vec![1, 2, 3]);
        let b = ByteArray::from_base64url(a.as_base64url()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn json_form_is_base64url() {
        let a = ByteArray::new(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a.as_base64url()));
    }
}
