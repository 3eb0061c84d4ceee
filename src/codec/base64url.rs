//! RFC 4648 §5 Base64URL, unpadded. Decoding fails on any non-alphabet
//! character; both padded and unpadded input is accepted since browsers are
//! inconsistent about emitting the trailing `=`.

use base64::{URL_SAFE, URL_SAFE_NO_PAD};

use crate::error::CoreError;

/// Encodes bytes as unpadded Base64URL, the canonical wire form used
/// everywhere in the WebAuthn JSON DTOs this crate decodes.
pub fn encode(bytes: &[u8]) -> String {
    base64::encode_config(bytes, URL_SAFE_NO_PAD)
}

/// Decodes a Base64URL string, with or without padding.
pub fn decode(input: &str) -> Result<Vec<u8>, CoreError> {
    let config = if input.ends_with('=') { URL_SAFE } else { URL_SAFE_NO_PAD };
    base64::decode_config(input, config)
        .map_err(|e| CoreError::malformed(format!("invalid base64url: {e}")))
}
