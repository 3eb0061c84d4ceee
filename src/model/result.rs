//! Terminal ceremony outputs and the attestation-type/warning vocabulary
//! they carry. Produced only by the last step of each pipeline; dropped
//! once the caller has consumed them.

use crate::model::auth_data::Aaguid;
use crate::model::ByteArray;

/// Only `None`, `SelfAttestation`, and `Basic` are implemented by the
/// attestation-statement verifiers in this crate (§4.4); `Attca` and
/// `Ecdaa` exist as explicit, compile-time-visible "unsupported" arms so
/// that adding either later is a deliberate change, not a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttestationType {
    None,
    SelfAttestation,
    Basic,
    Attca,
    Ecdaa,
}

/// Vendor metadata returned by the metadata service for a trusted
/// attestation trust path.
#[derive(Debug, Clone)]
pub struct AttestationMetadata {
    pub is_trusted: bool,
    pub identifier: String,
}

/// A recoverable issue a policy chose to let through rather than reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationWarning {
    /// `attestationTrusted` is false but `allowUntrustedAttestation`
    /// permitted the ceremony to succeed anyway (§4.6 step 16/19).
    UntrustedAttestation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionWarning {
    /// `C.type != "webauthn.get"`, downgraded from a fatal error because
    /// `validateTypeAttribute` is disabled (§4.7 step 7).
    UnexpectedClientDataType,
    /// The response carried extension identifiers outside the requested
    /// set, downgraded from a fatal error because
    /// `allowUnrequestedExtensions` is enabled (§4.7 step 14).
    UnrequestedExtensions,
    /// The signature counter did not strictly increase, downgraded from a
    /// fatal error because `validateSignatureCounter` is disabled (§4.7
    /// step 17).
    SignatureCounterDidNotIncrease,
}

#[derive(Debug, Clone)]
pub struct RegistrationResult {
    pub credential_descriptor: crate::model::credential::PublicKeyCredentialDescriptor,
    pub cose_public_key_raw: Vec<u8>,
    pub aaguid: Aaguid,
    pub attestation_type: AttestationType,
    pub attestation_trusted: bool,
    pub attestation_metadata: Option<AttestationMetadata>,
    pub warnings: Vec<RegistrationWarning>,
}

#[derive(Debug, Clone)]
pub struct AssertionResult {
    pub username: String,
    pub user_handle: ByteArray,
    pub credential_id: ByteArray,
    pub signature_count: u32,
    pub signature_counter_valid: bool,
    pub success: bool,
    pub warnings: Vec<AssertionWarning>,
}
