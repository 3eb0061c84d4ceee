//! The credential-storage capability the ceremony pipelines depend on.
//! I/O-performing collaborators are injected as trait objects, never
//! assumed to be a particular database.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{ByteArray, PublicKeyCredentialDescriptor, RegisteredCredential};

/// Supplied by the caller; the core never embeds storage of its own.
/// Implementations may be backed by any store — the core only calls these
/// five operations and otherwise treats credentials as opaque.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// A credential registered to exactly one user, identified by both its
    /// id and the user handle the caller claims owns it. `None` if no such
    /// pairing exists.
    async fn lookup(
        &self,
        credential_id: &ByteArray,
        user_handle: &ByteArray,
    ) -> Result<Option<RegisteredCredential>, CoreError>;

    /// Every credential registered under `credential_id`, regardless of
    /// owner. Used by registration's duplicate-id check (§4.6 step 17); a
    /// well-behaved store never returns more than one, but the pipeline
    /// only needs to know whether the set is empty.
    async fn lookup_all(&self, credential_id: &ByteArray) -> Result<Vec<RegisteredCredential>, CoreError>;

    async fn get_credential_ids_for_username(
        &self,
        username: &str,
    ) -> Result<Vec<PublicKeyCredentialDescriptor>, CoreError>;

    async fn get_user_handle_for_username(&self, username: &str) -> Result<Option<ByteArray>, CoreError>;

    async fn get_username_for_user_handle(&self, user_handle: &ByteArray) -> Result<Option<String>, CoreError>;
}
