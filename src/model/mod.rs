//! Immutable value types flowing through the ceremony pipelines: client
//! data, authenticator data, attestation objects, credential descriptors,
//! and result objects. Nothing here is mutated after construction; a
//! builder producing a new value is the only way to change one.

pub mod attestation_object;
pub mod auth_data;
pub mod byte_array;
pub mod client_data;
pub mod credential;
pub mod flags;
pub mod result;

pub use attestation_object::AttestationObject;
pub use auth_data::{Aaguid, AttestedCredentialData, AuthenticatorData};
pub use byte_array::ByteArray;
pub use client_data::{CollectedClientData, TokenBindingInfo, TokenBindingStatus};
pub use credential::{PublicKeyCredentialDescriptor, PublicKeyType, RegisteredCredential};
pub use flags::AuthenticatorDataFlags;
pub use result::{
    AssertionResult, AssertionWarning, AttestationMetadata, AttestationType, RegistrationResult,
    RegistrationWarning,
};
