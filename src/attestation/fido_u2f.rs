//! `fido-u2f` attestation (§4.4.2), the legacy U2F signed-payload format.

use ciborium::value::Value;

use crate::attestation::AttestationVerifier;
use crate::codec::cbor;
use crate::codec::x509::{Certificate, KeyAlgorithm};
use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::model::{AttestationObject, AttestationType};

pub struct FidoU2fVerifier;

struct Statement {
    sig: Vec<u8>,
    cert_der: Vec<u8>,
}

fn parse_statement(att_stmt: &Value) -> Result<Statement, CoreError> {
    let fields = cbor::as_text_map(att_stmt.clone())?;

    let mut sig = None;
    let mut x5c = None;
    for (key, value) in fields {
        match key.as_str() {
            "sig" => sig = Some(value.into_bytes().map_err(|_| CoreError::malformed("fido-u2f sig must be bytes"))?),
            "x5c" => x5c = Some(value.into_array().map_err(|_| CoreError::malformed("fido-u2f x5c must be an array"))?),
            _ => {}
        }
    }

    let sig = sig.ok_or_else(|| CoreError::malformed("fido-u2f attestation statement missing sig"))?;
    let x5c = x5c.ok_or_else(|| CoreError::malformed("fido-u2f attestation statement missing x5c"))?;
    if x5c.len() != 1 {
        return Err(CoreError::malformed("fido-u2f x5c must contain exactly one certificate"));
    }
    let cert_der = x5c
        .into_iter()
        .next()
        .unwrap()
        .into_bytes()
        .map_err(|_| CoreError::malformed("fido-u2f x5c entry must be bytes"))?;

    Ok(Statement { sig, cert_der })
}

/// `0x00 || rpIdHash(32) || clientDataHash(32) || credentialId(L) ||
/// publicKeyUncompressed(65)` (FIDO U2F Raw Message Formats §4.3).
fn signed_payload(object: &AttestationObject, client_data_hash: &[u8]) -> Result<Vec<u8>, CoreError> {
    let cred = object
        .auth_data
        .attested_credential_data
        .as_ref()
        .ok_or_else(|| CoreError::malformed("fido-u2f attestation requires attested credential data"))?;
    let point = cred
        .credential_public_key
        .to_uncompressed_point()
        .ok_or_else(|| CoreError::unsupported("fido-u2f requires an EC2 credential public key"))?;

    let mut payload = Vec::with_capacity(1 + 32 + 32 + cred.credential_id.as_bytes().len() + 65);
    payload.push(0x00);
    payload.extend_from_slice(&object.auth_data.rp_id_hash);
    payload.extend_from_slice(client_data_hash);
    payload.extend_from_slice(cred.credential_id.as_bytes());
    payload.extend_from_slice(&point);
    Ok(payload)
}

fn parse_cert(cert_der: &[u8]) -> Result<Certificate<'_>, CoreError> {
    let cert = Certificate::parse(cert_der)?;
    if cert.key_algorithm() != KeyAlgorithm::Ec || !cert.is_p256() {
        return Err(CoreError::unsupported(
            "fido-u2f attestation certificate must use a P-256 EC key",
        ));
    }
    Ok(cert)
}

impl AttestationVerifier for FidoU2fVerifier {
    fn classify(&self, object: &AttestationObject, _crypto: &dyn CryptoProvider) -> Result<AttestationType, CoreError> {
        let statement = parse_statement(&object.att_stmt)?;
        let cert = parse_cert(&statement.cert_der)?;

        let cred = object
            .auth_data
            .attested_credential_data
            .as_ref()
            .ok_or_else(|| CoreError::malformed("fido-u2f attestation requires attested credential data"))?;
        let credential_point = cred.credential_public_key.to_uncompressed_point();

        let is_self_attestation =
            cert.is_self_signed() && credential_point.as_deref() == cert.ec_point().as_deref();

        Ok(if is_self_attestation {
            AttestationType::SelfAttestation
        } else {
            AttestationType::Basic
        })
    }

    fn verify_signature(
        &self,
        object: &AttestationObject,
        client_data_hash: &[u8],
        crypto: &dyn CryptoProvider,
    ) -> Result<bool, CoreError> {
        let statement = parse_statement(&object.att_stmt)?;
        let cert = parse_cert(&statement.cert_der)?;
        let cert_point = cert
            .ec_point()
            .ok_or_else(|| CoreError::internal("fido-u2f cert already verified as EC"))?;

        let payload = signed_payload(object, client_data_hash)?;
        crypto.verify_ecdsa_p256(&cert_point, &payload, &statement.sig)
    }

    fn trust_path(&self, object: &AttestationObject) -> Result<Option<Vec<Vec<u8>>>, CoreError> {
        let statement = parse_statement(&object.att_stmt)?;
        Ok(Some(vec![statement.cert_der]))
    }
}
