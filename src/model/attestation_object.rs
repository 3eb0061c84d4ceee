//! `AttestationObject` (WebAuthn §6.4): a CBOR map of `fmt` (text),
//! `authData` (bytes), and `attStmt` (a map whose shape depends on `fmt`).

use ciborium::value::Value;

use crate::codec::cbor;
use crate::error::CoreError;
use crate::model::auth_data::AuthenticatorData;

pub struct AttestationObject {
    pub fmt: String,
    pub auth_data: AuthenticatorData,
    /// Left undecoded here; the attestation-statement verifier selected by
    /// `fmt` interprets its shape (§4.4).
    pub att_stmt: Value,
}

impl AttestationObject {
    pub fn parse(bytes: &[u8]) -> Result<Self, CoreError> {
        let value: Value = cbor::decode_exact(bytes)?;
        let fields = cbor::as_text_map(value)?;

        let mut fmt = None;
        let mut auth_data_bytes = None;
        let mut att_stmt = None;
        for (key, value) in fields {
            match key.as_str() {
                "fmt" => {
                    fmt = Some(value.into_text().map_err(|_| {
                        CoreError::malformed("attestationObject.fmt must be a text string")
                    })?)
                }
                "authData" => {
                    auth_data_bytes = Some(value.into_bytes().map_err(|_| {
                        CoreError::malformed("attestationObject.authData must be a byte string")
                    })?)
                }
                "attStmt" => att_stmt = Some(value),
                _ => {}
            }
        }

        let fmt = fmt.ok_or_else(|| CoreError::malformed("attestationObject missing fmt"))?;
        let auth_data_bytes =
            auth_data_bytes.ok_or_else(|| CoreError::malformed("attestationObject missing authData"))?;
        let att_stmt = att_stmt.ok_or_else(|| CoreError::malformed("attestationObject missing attStmt"))?;

        let auth_data = AuthenticatorData::parse(&auth_data_bytes)?;

        Ok(AttestationObject {
            fmt,
            auth_data,
            att_stmt,
        })
    }
}
