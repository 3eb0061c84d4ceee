//! `CollectedClientData`, parsed from the raw UTF-8 JSON of `clientDataJSON`
//! (WebAuthn §5.10.1).

use serde::Deserialize;

use crate::error::CoreError;
use crate::model::ByteArray;

/// Token Binding status as declared by the client (WebAuthn §5.10.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenBindingStatus {
    Present,
    Supported,
    NotSupported,
}

/// `id` is present if and only if `status == Present`; this is enforced at
/// parse time rather than left to the caller to notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBindingInfo {
    pub status: TokenBindingStatus,
    pub id: Option<String>,
}

#[derive(Deserialize)]
struct RawTokenBindingInfo {
    status: TokenBindingStatus,
    id: Option<String>,
}

impl<'de> Deserialize<'de> for TokenBindingInfo {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTokenBindingInfo::deserialize(deserializer)?;
        if raw.status == TokenBindingStatus::Present && raw.id.is_none() {
            return Err(serde::de::Error::custom(
                "tokenBinding.id is required when status is \"present\"",
            ));
        }
        Ok(TokenBindingInfo {
            status: raw.status,
            id: raw.id,
        })
    }
}

/// The client data signed by the authenticator, decoded from
/// `clientDataJSON`. `challenge`, `origin`, and `type` are mandatory and
/// non-null; a JSON document missing any of them fails to parse rather than
/// producing a `CollectedClientData` with a default/empty value for it.
#[derive(Debug, Deserialize)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub type_: String,
    pub challenge: ByteArray,
    pub origin: String,
    #[serde(rename = "tokenBinding")]
    pub token_binding: Option<TokenBindingInfo>,
    #[serde(rename = "clientExtensions")]
    pub client_extensions: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "authenticatorExtensions")]
    pub authenticator_extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CollectedClientData {
    /// Parses `clientDataJSON` bytes (WebAuthn §1: "UTF-8 encoded JSON").
    /// UTF-8 decoding is intrinsic to `serde_json`'s own input handling, so
    /// a non-UTF-8 buffer surfaces as the same `MalformedInput` as a JSON
    /// syntax error.
    pub fn parse(client_data_json: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(client_data_json)
            .map_err(|e| CoreError::malformed(format!("invalid clientDataJSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(extra: &str) -> String {
        format!(
            r#"{{"type":"webauthn.create","challenge":"AQID","origin":"https://example.com"{extra}}}"#
        )
    }

    #[test]
    fn parses_minimal_client_data() {
        let cd = CollectedClientData::parse(sample("").as_bytes()).unwrap();
        assert_eq!(cd.type_, "webauthn.create");
        assert_eq!(cd.challenge.as_bytes(), &[1, 2, 3]);
        assert_eq!(cd.origin, "https://example.com");
        assert!(cd.token_binding.is_none());
    }

    #[test]
    fn fails_on_missing_challenge() {
        let json = r#"{"type":"webauthn.create","origin":"https://example.com"}"#;
        assert!(CollectedClientData::parse(json.as_bytes()).is_err());
    }

    #[test]
    fn fails_on_missing_origin() {
        let json = r#"{"type":"webauthn.create","challenge":"AQID"}"#;
        assert!(CollectedClientData::parse(json.as_bytes()).is_err());
    }

    #[test]
    fn fails_on_missing_type() {
        let json = r#"{"challenge":"AQID","origin":"https://example.com"}"#;
        assert!(CollectedClientData::parse(json.as_bytes()).is_err());
    }

    #[test]
    fn fails_on_invalid_json() {
        assert!(CollectedClientData::parse(b"not json").is_err());
    }

    #[test]
    fn token_binding_present_without_id_is_rejected() {
        let json = sample(r#","tokenBinding":{"status":"present"}"#);
        assert!(CollectedClientData::parse(json.as_bytes()).is_err());
    }

    #[test]
    fn token_binding_present_with_id_parses() {
        let json = sample(r#","tokenBinding":{"status":"present","id":"ys"}"#);
        let cd = CollectedClientData::parse(json.as_bytes()).unwrap();
        let tb = cd.token_binding.unwrap();
        assert_eq!(tb.status, TokenBindingStatus::Present);
        assert_eq!(tb.id.as_deref(), Some("ys"));
    }
}
