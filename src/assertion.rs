//! Assertion ceremony pipeline (WebAuthn §7.2, `navigator.credentials.get`).
//!
//! Mirrors [`registration`](crate::registration)'s shape: a linear sequence
//! of total, `Result`-returning steps numbered to match the WebAuthn spec
//! text, folded by [`verify_assertion`].

use tracing::instrument;

use crate::config::RelyingPartyConfig;
use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::extensions;
use crate::model::auth_data::AuthenticatorData;
use crate::model::{AssertionResult, AssertionWarning, ByteArray, CollectedClientData};
use crate::token_binding;

/// Everything the caller hands the pipeline for one assertion ceremony.
pub struct AssertionRequest<'a> {
    pub challenge: ByteArray,
    /// The credential id the client claims to have used (`response.id`).
    pub credential_id: ByteArray,
    /// Present only if the original request set `allowCredentials`.
    pub allowed_credential_ids: Option<&'a [ByteArray]>,
    /// `response.userHandle`, if the authenticator returned one.
    pub user_handle: Option<ByteArray>,
    /// The username the caller collected out-of-band (e.g. a login form
    /// field), if any. At least one of `username`/`user_handle` must
    /// eventually resolve to an account (§4.7 step 0).
    pub username: Option<String>,
    pub client_data_json: &'a [u8],
    pub authenticator_data: &'a [u8],
    pub signature: &'a [u8],
    pub requested_extensions: Option<&'a serde_json::Map<String, serde_json::Value>>,
    pub user_verification_required: bool,
    /// The RP's own Token Binding identifier for this connection, if the
    /// TLS layer negotiated one (§4.2).
    pub rp_token_binding_id: Option<&'a str>,
}

/// Runs the full seventeen-step assertion pipeline (§4.7).
#[instrument(skip_all, fields(rp_id = %config.rp_identity.id))]
pub async fn verify_assertion(
    config: &RelyingPartyConfig,
    crypto: &dyn CryptoProvider,
    request: AssertionRequest<'_>,
) -> Result<AssertionResult, CoreError> {
    let mut warnings = Vec::new();

    // Step 0.
    let (username, user_handle) = resolve_identity(config, request.username, request.user_handle).await?;

    // Step 1.
    if let Some(allowed) = request.allowed_credential_ids {
        if !allowed.iter().any(|id| id == &request.credential_id) {
            return Err(CoreError::contract("response.id is not one of the request's allowCredentials"));
        }
    }

    // Steps 2-3.
    let credential = config
        .credential_repository
        .lookup(&request.credential_id, &user_handle)
        .await?
        .ok_or_else(|| CoreError::unknown_credential("no credential registered for this id and user handle"))?;

    // Step 4: callers cannot construct an AssertionRequest with these
    // fields absent (they are plain `&[u8]`), so nothing further to check
    // here beyond what the byte-level parsers below already enforce.

    // Step 6.
    let client_data = CollectedClientData::parse(request.client_data_json)?;

    // Step 7.
    if client_data.type_ != "webauthn.get" {
        if config.validate_type_attribute {
            return Err(CoreError::contract(format!(
                "expected clientData.type \"webauthn.get\", got \"{}\"",
                client_data.type_
            )));
        }
        warnings.push(AssertionWarning::UnexpectedClientDataType);
    }

    // Step 8.
    if client_data.challenge != request.challenge {
        return Err(CoreError::contract("clientData.challenge does not match the issued challenge"));
    }

    // Step 9.
    if !config.origins.iter().any(|o| o == &client_data.origin) {
        return Err(CoreError::contract(format!(
            "clientData.origin \"{}\" is not one of the relying party's configured origins",
            client_data.origin
        )));
    }

    // Step 10.
    token_binding::validate(client_data.token_binding.as_ref(), request.rp_token_binding_id)?;

    // Step 11.
    let authenticator_data = AuthenticatorData::parse(request.authenticator_data)?;
    let expected_rp_id_hash = crypto.sha256(config.rp_identity.id.as_bytes());
    if expected_rp_id_hash != authenticator_data.rp_id_hash {
        return Err(CoreError::contract("authenticatorData.rpIdHash does not match SHA-256(rpId)"));
    }

    // Steps 12-13.
    if request.user_verification_required && !authenticator_data.flags.user_verified() {
        return Err(CoreError::contract("user verification was required but authenticatorData.flags.UV is unset"));
    }
    if !request.user_verification_required && !authenticator_data.flags.user_present() {
        return Err(CoreError::contract("authenticatorData.flags.UP is unset"));
    }

    // Step 14.
    let extension_check = extensions::validate(
        request.requested_extensions,
        client_data.client_extensions.as_ref(),
        authenticator_data.extensions.as_ref(),
    );
    match extension_check {
        Ok(()) => {}
        Err(CoreError::ContractViolation(msg)) if config.allow_unrequested_extensions => {
            tracing::debug!(%msg, "allowing unrequested extension under policy");
            warnings.push(AssertionWarning::UnrequestedExtensions);
        }
        Err(err) => return Err(err),
    }

    // Step 15.
    let client_data_hash = crypto.sha256(request.client_data_json);

    // Step 16.
    let mut signed_message = request.authenticator_data.to_vec();
    signed_message.extend_from_slice(&client_data_hash);
    if !crypto.verify_cose_signature(&credential.cose_public_key, &signed_message, request.signature)? {
        return Err(CoreError::contract("assertion signature verification failed"));
    }

    // Step 17.
    let counter_valid = authenticator_data.counter == 0 || authenticator_data.counter > credential.signature_count;
    if !counter_valid {
        if config.validate_signature_counter {
            return Err(CoreError::contract("signature counter did not increase"));
        }
        warnings.push(AssertionWarning::SignatureCounterDidNotIncrease);
    }

    Ok(AssertionResult {
        username,
        user_handle: credential.user_handle.clone(),
        credential_id: credential.credential_id.clone(),
        signature_count: authenticator_data.counter,
        signature_counter_valid: counter_valid,
        success: true,
        warnings,
    })
}

/// Step 0: resolves whichever of `username`/`user_handle` the caller did
/// not already have, failing if neither resolves to a known account.
async fn resolve_identity(
    config: &RelyingPartyConfig,
    username: Option<String>,
    user_handle: Option<ByteArray>,
) -> Result<(String, ByteArray), CoreError> {
    match (username, user_handle) {
        (Some(username), Some(user_handle)) => Ok((username, user_handle)),
        (Some(username), None) => {
            let user_handle = config
                .credential_repository
                .get_user_handle_for_username(&username)
                .await?
                .ok_or_else(|| CoreError::unknown_user(format!("no user handle registered for username \"{username}\"")))?;
            Ok((username, user_handle))
        }
        (None, Some(user_handle)) => {
            let username = config
                .credential_repository
                .get_username_for_user_handle(&user_handle)
                .await?
                .ok_or_else(|| CoreError::unknown_user("no username registered for this user handle"))?;
            Ok((username, user_handle))
        }
        (None, None) => Err(CoreError::contract(
            "assertion request must provide a username, a response userHandle, or both",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::base64url as b64;
    use crate::config::{RelyingPartyConfigBuilder, RpIdentity};
    use crate::cose::CosePublicKey;
    use crate::crypto::RingProvider;
    use crate::model::RegisteredCredential;
    use crate::repository::CredentialRepository;
    use async_trait::async_trait;
    use ring::rand::SystemRandom;
    use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
    use std::sync::Arc;

    struct FixedRepository {
        credential: RegisteredCredential,
        username: String,
    }

    #[async_trait]
    impl CredentialRepository for FixedRepository {
        async fn lookup(&self, id: &ByteArray, user_handle: &ByteArray) -> Result<Option<RegisteredCredential>, CoreError> {
            if id == &self.credential.credential_id && user_handle == &self.credential.user_handle {
                Ok(Some(self.credential.clone()))
            } else {
                Ok(None)
            }
        }
        async fn lookup_all(&self, _id: &ByteArray) -> Result<Vec<RegisteredCredential>, CoreError> {
            Ok(vec![self.credential.clone()])
        }
        async fn get_credential_ids_for_username(
            &self,
            _username: &str,
        ) -> Result<Vec<crate::model::PublicKeyCredentialDescriptor>, CoreError> {
            Ok(Vec::new())
        }
        async fn get_user_handle_for_username(&self, username: &str) -> Result<Option<ByteArray>, CoreError> {
            if username == self.username {
                Ok(Some(self.credential.user_handle.clone()))
            } else {
                Ok(None)
            }
        }
        async fn get_username_for_user_handle(&self, user_handle: &ByteArray) -> Result<Option<String>, CoreError> {
            if user_handle == &self.credential.user_handle {
                Ok(Some(self.username.clone()))
            } else {
                Ok(None)
            }
        }
    }

    fn setup(signature_count: u32) -> (RelyingPartyConfig, EcdsaKeyPair, RegisteredCredential) {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let keypair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap();
        let raw = keypair.public_key().as_ref();
        let (x, y) = (raw[1..33].to_vec(), raw[33..65].to_vec());

        let credential = RegisteredCredential {
            credential_id: ByteArray::new(vec![7, 7, 7]),
            user_handle: ByteArray::new(vec![8, 8, 8]),
            cose_public_key: CosePublicKey::Ec2 {
                alg: crate::cose::CoseAlgorithm::Es256,
                x,
                y,
            },
            signature_count,
        };

        let repository = FixedRepository {
            credential: credential.clone(),
            username: "alice".to_owned(),
        };

        let config = RelyingPartyConfigBuilder::new(
            RpIdentity::new("example.com", "Example"),
            Arc::new(repository),
        )
        .origin("https://example.com")
        .build();

        (config, keypair, credential)
    }

    fn build_auth_data(rp_id_hash: [u8; 32], counter: u32) -> Vec<u8> {
        let mut raw = rp_id_hash.to_vec();
        raw.push(0b0000_0001); // UP only
        raw.extend_from_slice(&counter.to_be_bytes());
        raw
    }

    #[tokio::test]
    async fn happy_path_assertion_succeeds() {
        let (config, keypair, credential) = setup(10);
        let crypto = RingProvider;
        let rng = SystemRandom::new();

        let challenge = ByteArray::new(vec![5, 6, 7]);
        let client_data_json = format!(
            r#"{{"type":"webauthn.get","challenge":"{}","origin":"https://example.com"}}"#,
            b64::encode(challenge.as_bytes())
        );
        let client_data_hash = crypto.sha256(client_data_json.as_bytes());

        let rp_id_hash = crypto.sha256(config.rp_identity.id.as_bytes());
        let authenticator_data = build_auth_data(rp_id_hash, 11);

        let mut signed_message = authenticator_data.clone();
        signed_message.extend_from_slice(&client_data_hash);
        let signature = keypair.sign(&rng, &signed_message).unwrap();

        let result = verify_assertion(
            &config,
            &crypto,
            AssertionRequest {
                challenge,
                credential_id: credential.credential_id.clone(),
                allowed_credential_ids: None,
                user_handle: Some(credential.user_handle.clone()),
                username: None,
                client_data_json: client_data_json.as_bytes(),
                authenticator_data: &authenticator_data,
                signature: signature.as_ref(),
                requested_extensions: None,
                user_verification_required: false,
                rp_token_binding_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.username, "alice");
        assert_eq!(result.signature_count, 11);
        assert!(result.signature_counter_valid);
    }

    #[tokio::test]
    async fn counter_regression_is_rejected_when_validated() {
        let (config, keypair, credential) = setup(1337);
        let crypto = RingProvider;
        let rng = SystemRandom::new();

        let challenge = ByteArray::new(vec![5, 6, 7]);
        let client_data_json = format!(
            r#"{{"type":"webauthn.get","challenge":"{}","origin":"https://example.com"}}"#,
            b64::encode(challenge.as_bytes())
        );
        let client_data_hash = crypto.sha256(client_data_json.as_bytes());
        let rp_id_hash = crypto.sha256(config.rp_identity.id.as_bytes());
        let authenticator_data = build_auth_data(rp_id_hash, 1000);

        let mut signed_message = authenticator_data.clone();
        signed_message.extend_from_slice(&client_data_hash);
        let signature = keypair.sign(&rng, &signed_message).unwrap();

        let err = verify_assertion(
            &config,
            &crypto,
            AssertionRequest {
                challenge,
                credential_id: credential.credential_id.clone(),
                allowed_credential_ids: None,
                user_handle: Some(credential.user_handle.clone()),
                username: None,
                client_data_json: client_data_json.as_bytes(),
                authenticator_data: &authenticator_data,
                signature: signature.as_ref(),
                requested_extensions: None,
                user_verification_required: false,
                rp_token_binding_id: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::ContractViolation(_)));
    }

    #[tokio::test]
    async fn counter_regression_is_a_warning_when_not_validated() {
        let (mut config, keypair, credential) = setup(1337);
        config.validate_signature_counter = false;
        let crypto = RingProvider;
        let rng = SystemRandom::new();

        let challenge = ByteArray::new(vec![5, 6, 7]);
        let client_data_json = format!(
            r#"{{"type":"webauthn.get","challenge":"{}","origin":"https://example.com"}}"#,
            b64::encode(challenge.as_bytes())
        );
        let client_data_hash = crypto.sha256(client_data_json.as_bytes());
        let rp_id_hash = crypto.sha256(config.rp_identity.id.as_bytes());
        let authenticator_data = build_auth_data(rp_id_hash, 1000);

        let mut signed_message = authenticator_data.clone();
        signed_message.extend_from_slice(&client_data_hash);
        let signature = keypair.sign(&rng, &signed_message).unwrap();

        let result = verify_assertion(
            &config,
            &crypto,
            AssertionRequest {
                challenge,
                credential_id: credential.credential_id.clone(),
                allowed_credential_ids: None,
                user_handle: Some(credential.user_handle.clone()),
                username: None,
                client_data_json: client_data_json.as_bytes(),
                authenticator_data: &authenticator_data,
                signature: signature.as_ref(),
                requested_extensions: None,
                user_verification_required: false,
                rp_token_binding_id: None,
            },
        )
        .await
        .unwrap();

        assert!(!result.signature_counter_valid);
        assert!(result.warnings.contains(&AssertionWarning::SignatureCounterDidNotIncrease));
    }

    #[tokio::test]
    async fn unknown_credential_id_is_rejected() {
        let (config, _keypair, _credential) = setup(0);
        let crypto = RingProvider;

        let challenge = ByteArray::new(vec![5, 6, 7]);
        let client_data_json = format!(
            r#"{{"type":"webauthn.get","challenge":"{}","origin":"https://example.com"}}"#,
            b64::encode(challenge.as_bytes())
        );
        let rp_id_hash = crypto.sha256(config.rp_identity.id.as_bytes());
        let authenticator_data = build_auth_data(rp_id_hash, 1);

        let err = verify_assertion(
            &config,
            &crypto,
            AssertionRequest {
                challenge,
                credential_id: ByteArray::new(vec![99, 99, 99]),
                allowed_credential_ids: None,
                user_handle: Some(ByteArray::new(vec![8, 8, 8])),
                username: None,
                client_data_json: client_data_json.as_bytes(),
                authenticator_data: &authenticator_data,
                signature: &[0u8; 64],
                requested_extensions: None,
                user_verification_required: false,
                rp_token_binding_id: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::UnknownCredential(_)));
    }
}
