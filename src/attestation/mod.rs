//! Attestation-statement verifiers (§4.4), one per supported `fmt`, behind a
//! small closed trait rather than a class hierarchy — matching the design
//! notes' guidance that the format set is closed and unsupported formats
//! (ECDAA, anything outside the three below) should be explicit,
//! compile-time-visible arms rather than a default fallthrough.

mod fido_u2f;
mod none;
mod packed;

use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::model::{AttestationObject, AttestationType};

/// One attestation statement format's verification logic.
pub trait AttestationVerifier {
    /// Determines the attestation type this statement represents. May fail
    /// if classification itself requires parsing that is invalid.
    fn classify(&self, object: &AttestationObject, crypto: &dyn CryptoProvider) -> Result<AttestationType, CoreError>;

    /// Verifies the attestation signature over `client_data_hash`.
    fn verify_signature(
        &self,
        object: &AttestationObject,
        client_data_hash: &[u8],
        crypto: &dyn CryptoProvider,
    ) -> Result<bool, CoreError>;

    /// The X.509 trust path (DER-encoded certificates), if this format
    /// carries one. `None` for formats with no certificate chain at all.
    fn trust_path(&self, object: &AttestationObject) -> Result<Option<Vec<Vec<u8>>>, CoreError>;
}

/// Resolves the verifier for `fmt` (§4.4.4: USASCII case-sensitive exact
/// match; anything outside the three known formats is unsupported).
pub fn verifier_for(fmt: &str) -> Result<Box<dyn AttestationVerifier>, CoreError> {
    match fmt {
        "none" => Ok(Box::new(none::NoneVerifier)),
        "fido-u2f" => Ok(Box::new(fido_u2f::FidoU2fVerifier)),
        "packed" => Ok(Box::new(packed::PackedVerifier)),
        other => Err(CoreError::unsupported(format!(
            "unsupported attestation statement format \"{other}\""
        ))),
    }
}
