//! Server-side verification core for WebAuthn / FIDO2 registration and
//! assertion ceremonies.
//!
//! This crate implements the two ceremony pipelines a relying party runs
//! against a client-produced credential response: [`registration`] (WebAuthn
//! §7.1, `navigator.credentials.create`) and [`assertion`] (WebAuthn §7.2,
//! `navigator.credentials.get`). Everything outside the pipelines themselves
//! — HTTP wiring, session storage, challenge generation — is a caller
//! concern; this crate only consumes two capabilities supplied by the
//! caller, [`repository::CredentialRepository`] and [`trust::MetadataService`].

pub mod attestation;
pub mod codec;
pub mod config;
pub mod cose;
pub mod crypto;
pub mod error;
pub mod extensions;
pub mod model;
pub mod repository;
pub mod token_binding;
pub mod trust;

pub mod assertion;
pub mod registration;

pub use config::{RelyingPartyConfig, RelyingPartyConfigBuilder, RpIdentity};
pub use error::CoreError;
pub use model::{AssertionResult, RegistrationResult};
