//! Registration ceremony pipeline (WebAuthn §7.1, `navigator.credentials.create`).
//!
//! Encoded as a sum type of sequential states rather than a class
//! hierarchy, per the design notes: each step is a total function from one
//! state to the next, and `verify_registration` is the fold over all
//! nineteen of them. A step's failure aborts the whole ceremony immediately
//! with a classified [`CoreError`]; there is no partial result to resume
//! from.

use tracing::instrument;

use crate::attestation;
use crate::config::RelyingPartyConfig;
use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::extensions;
use crate::model::{
    AttestationMetadata, AttestationObject, AttestationType, ByteArray, CollectedClientData,
    PublicKeyCredentialDescriptor, RegistrationResult, RegistrationWarning,
};
use crate::token_binding;
use crate::trust::{self, MetadataService};

/// Everything the caller hands the pipeline for one registration ceremony.
pub struct RegistrationRequest<'a> {
    /// The challenge this RP issued for this ceremony.
    pub challenge: ByteArray,
    /// Raw `response.clientDataJSON`.
    pub client_data_json: &'a [u8],
    /// Raw `response.attestationObject` (CBOR).
    pub attestation_object: &'a [u8],
    /// Extensions the RP actually requested, if any (§4.3).
    pub requested_extensions: Option<&'a serde_json::Map<String, serde_json::Value>>,
    /// `authenticatorSelection.userVerification`, or the RP default.
    pub user_verification_required: bool,
    /// The RP's own Token Binding identifier for this connection, if the
    /// TLS layer negotiated one (§4.2).
    pub rp_token_binding_id: Option<&'a str>,
}

/// Runs the full nineteen-step registration pipeline (§4.6).
#[instrument(skip_all, fields(rp_id = %config.rp_identity.id))]
pub async fn verify_registration(
    config: &RelyingPartyConfig,
    crypto: &dyn CryptoProvider,
    request: RegistrationRequest<'_>,
) -> Result<RegistrationResult, CoreError> {
    // Steps 1-2: clientDataJSON is UTF-8 JSON; decoding both happens inside
    // CollectedClientData::parse, which already fails MalformedInput on
    // either a UTF-8 or a JSON-shape violation.
    let client_data = CollectedClientData::parse(request.client_data_json)?;

    // Step 3.
    if client_data.type_ != "webauthn.create" {
        return Err(CoreError::contract(format!(
            "expected clientData.type \"webauthn.create\", got \"{}\"",
            client_data.type_
        )));
    }

    // Step 4.
    if client_data.challenge != request.challenge {
        return Err(CoreError::contract("clientData.challenge does not match the issued challenge"));
    }

    // Step 5.
    if !config.origins.iter().any(|o| o == &client_data.origin) {
        return Err(CoreError::contract(format!(
            "clientData.origin \"{}\" is not one of the relying party's configured origins",
            client_data.origin
        )));
    }

    // Step 6.
    token_binding::validate(client_data.token_binding.as_ref(), request.rp_token_binding_id)?;

    // Step 7.
    let client_data_hash = crypto.sha256(request.client_data_json);

    // Step 8.
    let attestation_object = AttestationObject::parse(request.attestation_object)?;

    // Step 9.
    let expected_rp_id_hash = crypto.sha256(config.rp_identity.id.as_bytes());
    if expected_rp_id_hash != attestation_object.auth_data.rp_id_hash {
        return Err(CoreError::contract("authenticatorData.rpIdHash does not match SHA-256(rpId)"));
    }

    // Steps 10-11.
    if request.user_verification_required && !attestation_object.auth_data.flags.user_verified() {
        return Err(CoreError::contract("user verification was required but authenticatorData.flags.UV is unset"));
    }
    if !request.user_verification_required && !attestation_object.auth_data.flags.user_present() {
        return Err(CoreError::contract("authenticatorData.flags.UP is unset"));
    }

    // Step 12.
    extensions::validate(
        request.requested_extensions,
        client_data.client_extensions.as_ref(),
        attestation_object.auth_data.extensions.as_ref(),
    )?;

    // Step 13-14.
    let verifier = attestation::verifier_for(&attestation_object.fmt)?;
    let attestation_type = verifier.classify(&attestation_object, crypto)?;
    if !verifier.verify_signature(&attestation_object, &client_data_hash, crypto)? {
        return Err(CoreError::contract("attestation statement signature verification failed"));
    }
    let trust_path = verifier.trust_path(&attestation_object)?;

    // Step 15-16.
    let (attestation_trusted, attestation_metadata) =
        resolve_attestation_trust(config, attestation_type, trust_path.as_deref()).await?;

    let mut warnings = Vec::new();
    if !attestation_trusted {
        if !config.allow_untrusted_attestation {
            return Err(CoreError::contract(
                "attestation is not trusted and allowUntrustedAttestation is disabled",
            ));
        }
        tracing::debug!(?attestation_type, "allowing untrusted attestation under policy");
        warnings.push(RegistrationWarning::UntrustedAttestation);
    }

    // Step 17.
    let attested = attestation_object
        .auth_data
        .attested_credential_data
        .as_ref()
        .ok_or_else(|| CoreError::malformed("registration authenticator data is missing attested credential data"))?;

    if !config
        .credential_repository
        .lookup_all(&attested.credential_id)
        .await?
        .is_empty()
    {
        return Err(CoreError::contract("credential id is already registered"));
    }

    // Step 18-19: no further verification; assemble the result.
    Ok(RegistrationResult {
        credential_descriptor: PublicKeyCredentialDescriptor::new(attested.credential_id.clone()),
        cose_public_key_raw: attested.credential_public_key_raw.clone(),
        aaguid: attested.aaguid,
        attestation_type,
        attestation_trusted,
        attestation_metadata,
        warnings,
    })
}

/// Step 15-16: constructs a trust resolver only for attestation types that
/// carry a certificate chain worth judging, and computes `attestationTrusted`
/// per the table in §4.6.
async fn resolve_attestation_trust(
    config: &RelyingPartyConfig,
    attestation_type: AttestationType,
    trust_path: Option<&[Vec<u8>]>,
) -> Result<(bool, Option<AttestationMetadata>), CoreError> {
    match attestation_type {
        AttestationType::None | AttestationType::SelfAttestation => {
            Ok((config.allow_untrusted_attestation, None))
        }
        AttestationType::Basic => {
            let service = config
                .metadata_service
                .as_ref()
                .ok_or_else(|| CoreError::contract("basic attestation requires a configured metadata service"))?;
            let metadata = trust::resolve_trust_anchor(service.as_ref(), trust_path.unwrap_or_default()).await?;
            let trusted = metadata.as_ref().map(|m| m.is_trusted).unwrap_or(false);
            Ok((trusted, metadata))
        }
        AttestationType::Attca | AttestationType::Ecdaa => Err(CoreError::unsupported(format!(
            "{attestation_type:?} attestation is not implemented"
        ))),
    }
}
