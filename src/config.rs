//! Relying-party configuration: a single immutable struct, built once per
//! deployment and threaded explicitly into every ceremony. There is no
//! global or ambient configuration state.

use std::sync::Arc;

use crate::cose::CoseAlgorithm;
use crate::repository::CredentialRepository;
use crate::trust::MetadataService;

/// The relying party's own identity, as presented to authenticators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpIdentity {
    /// DNS-style RP ID; `SHA-256(id)` is compared against
    /// `authenticatorData.rpIdHash`.
    pub id: String,
    /// Human-readable RP name, shown by platform UI. Not used in any
    /// cryptographic comparison.
    pub name: String,
}

impl RpIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Governs §7.1 step 10/11 and §7.2 step 12/13: whether user verification
/// (as opposed to mere user presence) is demanded of the authenticator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserVerificationRequirement {
    Required,
    Preferred,
    Discouraged,
}

impl UserVerificationRequirement {
    fn is_required(self) -> bool {
        matches!(self, UserVerificationRequirement::Required)
    }
}

/// Advisory only; not enforced by verification, but threaded through so a
/// caller building the next ceremony's request can read it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttestationConveyancePreference {
    None,
    Indirect,
    Direct,
    Enterprise,
}

/// Immutable, explicit, per-deployment policy. One instance is shared
/// across all ceremonies; nothing here is mutated after construction.
#[derive(Clone)]
pub struct RelyingPartyConfig {
    pub rp_identity: RpIdentity,
    pub origins: Vec<String>,
    pub preferred_public_key_algorithms: Vec<CoseAlgorithm>,
    pub allow_untrusted_attestation: bool,
    pub allow_unrequested_extensions: bool,
    pub validate_type_attribute: bool,
    pub validate_signature_counter: bool,
    pub user_verification: UserVerificationRequirement,
    pub credential_repository: Arc<dyn CredentialRepository>,
    pub metadata_service: Option<Arc<dyn MetadataService>>,
}

impl RelyingPartyConfig {
    pub fn builder(
        rp_identity: RpIdentity,
        credential_repository: Arc<dyn CredentialRepository>,
    ) -> RelyingPartyConfigBuilder {
        RelyingPartyConfigBuilder::new(rp_identity, credential_repository)
    }

    pub fn user_verification_required(&self) -> bool {
        self.user_verification.is_required()
    }
}

/// Builder for [`RelyingPartyConfig`]: one setter per optional field, a
/// single terminal `build()`.
pub struct RelyingPartyConfigBuilder {
    rp_identity: RpIdentity,
    origins: Vec<String>,
    preferred_public_key_algorithms: Vec<CoseAlgorithm>,
    allow_untrusted_attestation: bool,
    allow_unrequested_extensions: bool,
    validate_type_attribute: bool,
    validate_signature_counter: bool,
    user_verification: UserVerificationRequirement,
    credential_repository: Arc<dyn CredentialRepository>,
    metadata_service: Option<Arc<dyn MetadataService>>,
}

impl RelyingPartyConfigBuilder {
    pub fn new(rp_identity: RpIdentity, credential_repository: Arc<dyn CredentialRepository>) -> Self {
        Self {
            rp_identity,
            origins: Vec::new(),
            preferred_public_key_algorithms: vec![CoseAlgorithm::Es256],
            allow_untrusted_attestation: false,
            allow_unrequested_extensions: false,
            validate_type_attribute: true,
            validate_signature_counter: true,
            user_verification: UserVerificationRequirement::Preferred,
            credential_repository,
            metadata_service: None,
        }
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origins.push(origin.into());
        self
    }

    pub fn origins(mut self, origins: impl IntoIterator<Item = String>) -> Self {
        self.origins.extend(origins);
        self
    }

    pub fn preferred_public_key_algorithms(mut self, algs: Vec<CoseAlgorithm>) -> Self {
        self.preferred_public_key_algorithms = algs;
        self
    }

    pub fn allow_untrusted_attestation(mut self, allow: bool) -> Self {
        self.allow_untrusted_attestation = allow;
        self
    }

    pub fn allow_unrequested_extensions(mut self, allow: bool) -> Self {
        self.allow_unrequested_extensions = allow;
        self
    }

    pub fn validate_type_attribute(mut self, validate: bool) -> Self {
        self.validate_type_attribute = validate;
        self
    }

    pub fn validate_signature_counter(mut self, validate: bool) -> Self {
        self.validate_signature_counter = validate;
        self
    }

    pub fn user_verification(mut self, requirement: UserVerificationRequirement) -> Self {
        self.user_verification = requirement;
        self
    }

    pub fn metadata_service(mut self, service: Arc<dyn MetadataService>) -> Self {
        self.metadata_service = Some(service);
        self
    }

    pub fn build(self) -> RelyingPartyConfig {
        RelyingPartyConfig {
            rp_identity: self.rp_identity,
            origins: self.origins,
            preferred_public_key_algorithms: self.preferred_public_key_algorithms,
            allow_untrusted_attestation: self.allow_untrusted_attestation,
            allow_unrequested_extensions: self.allow_unrequested_extensions,
            validate_type_attribute: self.validate_type_attribute,
            validate_signature_counter: self.validate_signature_counter,
            user_verification: self.user_verification,
            credential_repository: self.credential_repository,
            metadata_service: self.metadata_service,
        }
    }
}
