//! Classified failure taxonomy shared by both ceremony pipelines.
//!
//! Every pipeline step either succeeds silently or fails with exactly one of
//! these variants. No panics are used for ceremony control flow; see §7 of
//! the design for the mapping from kind to trigger.

use thiserror::Error;

/// A failure surfaced by a ceremony step.
///
/// Each variant carries a human-readable message so callers that only log
/// the error still get something actionable, but callers are expected to
/// match on the variant itself rather than parse the message.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON/CBOR/Base64URL/X.509 decode failure, or a structurally invalid
    /// or missing required field.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A step's contract was not satisfied: wrong type, wrong challenge,
    /// wrong origin, bad token binding, non-subset extensions, counter
    /// regression, signature mismatch, duplicate credential id, untrusted
    /// attestation when not permitted.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// `fmt` is not in the supported set, ECDAA was encountered, or a
    /// `fido-u2f` attestation certificate used a non-P-256 key.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Assertion lookup could not resolve a credential id to a registered
    /// credential.
    #[error("unknown credential: {0}")]
    UnknownCredential(String),

    /// Assertion lookup could not resolve a username/user handle to an
    /// account.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// A programmer error that should be unreachable on a well-configured
    /// deployment, e.g. a cryptographic provider returning an error for an
    /// algorithm this crate already checked is supported.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        CoreError::MalformedInput(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        CoreError::ContractViolation(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        CoreError::UnsupportedFormat(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CoreError::Internal(msg.into())
    }

    pub fn unknown_credential(msg: impl Into<String>) -> Self {
        CoreError::UnknownCredential(msg.into())
    }

    pub fn unknown_user(msg: impl Into<String>) -> Self {
        CoreError::UnknownUser(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
