//! `none` attestation (§4.4.1): the authenticator declines to attest at
//! all. There is nothing to verify and no trust path.

use crate::attestation::AttestationVerifier;
use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::model::{AttestationObject, AttestationType};

pub struct NoneVerifier;

impl AttestationVerifier for NoneVerifier {
    fn classify(&self, _object: &AttestationObject, _crypto: &dyn CryptoProvider) -> Result<AttestationType, CoreError> {
        Ok(AttestationType::None)
    }

    fn verify_signature(
        &self,
        _object: &AttestationObject,
        _client_data_hash: &[u8],
        _crypto: &dyn CryptoProvider,
    ) -> Result<bool, CoreError> {
        Ok(true)
    }

    fn trust_path(&self, _object: &AttestationObject) -> Result<Option<Vec<Vec<u8>>>, CoreError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RingProvider;
    use crate::model::auth_data::AuthenticatorData;
    use ciborium::value::Value;

    fn object() -> AttestationObject {
        let mut raw = vec![0u8; 32];
        raw.push(0b0000_0001);
        raw.extend_from_slice(&0u32.to_be_bytes());
        AttestationObject {
            fmt: "none".to_owned(),
            auth_data: AuthenticatorData::parse(&raw).unwrap(),
            att_stmt: Value::Map(vec![]),
        }
    }

    #[test]
    fn classifies_as_none_and_always_verifies() {
        let verifier = NoneVerifier;
        let crypto = RingProvider;
        let object = object();
        assert_eq!(verifier.classify(&object, &crypto).unwrap(), AttestationType::None);
        assert!(verifier.verify_signature(&object, &[0u8; 32], &crypto).unwrap());
        assert!(verifier.trust_path(&object).unwrap().is_none());
    }
}
