//! `AuthenticatorData` (WebAuthn §6.1): raw bytes plus a derived view. The
//! first 32 bytes are the RP-ID hash, byte 32 is the flags byte, bytes
//! 33-36 are the big-endian signature counter; attested credential data and
//! extensions follow in that order, gated by the `AT`/`ED` flag bits.

use ciborium::value::Value;

use crate::codec::cbor;
use crate::cose::CosePublicKey;
use crate::error::CoreError;
use crate::model::flags::AuthenticatorDataFlags;
use crate::model::ByteArray;

pub type Aaguid = [u8; 16];

/// AAGUID + credential id + COSE public key, present when the `AT` flag is
/// set (i.e. always during registration, never during assertion).
#[derive(Debug, Clone)]
pub struct AttestedCredentialData {
    pub aaguid: Aaguid,
    pub credential_id: ByteArray,
    pub credential_public_key: CosePublicKey,
    /// The exact bytes the COSE_Key was decoded from, kept so a caller can
    /// verify the stored credential descriptor's key is byte-identical to
    /// what the authenticator actually sent.
    pub credential_public_key_raw: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AuthenticatorData {
    pub raw: Vec<u8>,
    pub rp_id_hash: [u8; 32],
    pub flags: AuthenticatorDataFlags,
    pub counter: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
    pub extensions: Option<Value>,
}

impl AuthenticatorData {
    pub fn parse(raw: &[u8]) -> Result<Self, CoreError> {
        if raw.len() < 37 {
            return Err(CoreError::malformed(
                "authenticator data shorter than the fixed 37-byte header",
            ));
        }

        let mut rp_id_hash = [0u8; 32];
        rp_id_hash.copy_from_slice(&raw[0..32]);
        let flags = AuthenticatorDataFlags::from_byte(raw[32]);
        let counter = u32::from_be_bytes(raw[33..37].try_into().unwrap());

        let mut rest = &raw[37..];

        let attested_credential_data = if flags.attested_credential_data() {
            if rest.len() < 18 {
                return Err(CoreError::malformed(
                    "authenticator data flags AT set but too short for attested credential data",
                ));
            }
            let mut aaguid = [0u8; 16];
            aaguid.copy_from_slice(&rest[0..16]);
            let cred_id_len = u16::from_be_bytes(rest[16..18].try_into().unwrap()) as usize;
            let cred_id_end = 18 + cred_id_len;
            let cred_id_bytes = rest
                .get(18..cred_id_end)
                .ok_or_else(|| CoreError::malformed("attested credential data credentialId truncated"))?;

            let (key_bytes, remaining) = cbor::split_one(&rest[cred_id_end..])?;
            let credential_public_key = CosePublicKey::decode(key_bytes)?;

            rest = remaining;
            Some(AttestedCredentialData {
                aaguid,
                credential_id: ByteArray::new(cred_id_bytes.to_vec()),
                credential_public_key,
                credential_public_key_raw: key_bytes.to_vec(),
            })
        } else {
            None
        };

        let extensions = if flags.extension_data() {
            let (item, remaining) = cbor::split_one(rest)?;
            if !remaining.is_empty() {
                return Err(CoreError::malformed(
                    "stray trailing bytes after authenticator extensions",
                ));
            }
            let value: Value = ciborium::de::from_reader(item)
                .map_err(|e| CoreError::malformed(format!("invalid extensions CBOR: {e}")))?;
            Some(value)
        } else {
            if !rest.is_empty() {
                return Err(CoreError::malformed(
                    "stray trailing bytes after authenticator data",
                ));
            }
            None
        };

        Ok(AuthenticatorData {
            raw: raw.to_vec(),
            rp_id_hash,
            flags,
            counter,
            attested_credential_data,
            extensions,
        })
    }
}
