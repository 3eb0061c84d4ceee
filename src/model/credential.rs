//! Credential identity types shared between requests, responses, and the
//! credential repository capability.

use serde::{Deserialize, Serialize};

use crate::cose::CosePublicKey;
use crate::model::ByteArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicKeyType {
    PublicKey,
}

/// Identifies a credential along with the transports it can be used on.
/// Used both for `excludeCredentials` (registration) and `allowCredentials`
/// (assertion, §4.7 step 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyCredentialDescriptor {
    #[serde(rename = "type")]
    pub type_: PublicKeyType,
    pub id: ByteArray,
    pub transports: Option<Vec<String>>,
}

impl PublicKeyCredentialDescriptor {
    pub fn new(id: ByteArray) -> Self {
        PublicKeyCredentialDescriptor {
            type_: PublicKeyType::PublicKey,
            id,
            transports: None,
        }
    }
}

/// A credential as stored by the external credential repository. Primary
/// key is `credential_id`; one credential belongs to exactly one user
/// handle.
#[derive(Debug, Clone)]
pub struct RegisteredCredential {
    pub credential_id: ByteArray,
    pub user_handle: ByteArray,
    pub cose_public_key: CosePublicKey,
    pub signature_count: u32,
}
