//! Attestation trust resolution (§4.5). The core never embeds trust
//! anchors itself; it hands the parsed certificate chain to a
//! caller-supplied metadata service and reports back whatever that service
//! decides.

use async_trait::async_trait;

use crate::codec::x509::Certificate;
use crate::error::CoreError;
use crate::model::AttestationMetadata;

/// Vendor/device metadata lookup, keyed by attestation certificate chain.
/// Implementations may consult a FIDO Metadata Service feed, a static
/// allowlist, or anything else; the core only needs a verdict.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Returns metadata for the given trust path, or `None` if the service
    /// has no opinion (treated as untrusted by the registration pipeline).
    async fn get_attestation(&self, trust_path: &[Vec<u8>]) -> Result<Option<AttestationMetadata>, CoreError>;
}

/// Parses the DER certificates in `x5c` and asks `service` to judge them.
/// Does not itself hold or compare against any trust root.
pub async fn resolve_trust_anchor(
    service: &dyn MetadataService,
    trust_path: &[Vec<u8>],
) -> Result<Option<AttestationMetadata>, CoreError> {
    for der in trust_path {
        Certificate::parse(der)?;
    }
    service.get_attestation(trust_path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysTrusted;

    #[async_trait]
    impl MetadataService for AlwaysTrusted {
        async fn get_attestation(&self, _trust_path: &[Vec<u8>]) -> Result<Option<AttestationMetadata>, CoreError> {
            Ok(Some(AttestationMetadata {
                is_trusted: true,
                identifier: "test-vendor".to_owned(),
            }))
        }
    }

    #[tokio::test]
    async fn resolves_trust_for_valid_chain() {
        let service = AlwaysTrusted;
        let meta = resolve_trust_anchor(&service, &[]).await.unwrap();
        assert!(meta.unwrap().is_trusted);
    }

    #[tokio::test]
    async fn rejects_malformed_certificate_in_chain() {
        let service = AlwaysTrusted;
        let result = resolve_trust_anchor(&service, &[vec![0xFF, 0x00]]).await;
        assert!(result.is_err());
    }
}
