//! Cryptographic provider abstraction: a narrow capability exposing only
//! hashing and signature verification, so the pipelines and attestation
//! verifiers never touch a cryptographic primitive directly. Backed by
//! `ring`.

use ring::digest;
use ring::signature::{self, UnparsedPublicKey};

use crate::cose::{CoseAlgorithm, CosePublicKey};
use crate::error::CoreError;

/// Verification operations the ceremony pipelines need. Implementations may
/// back this with any vetted cryptographic provider; [`RingProvider`] is the
/// one this crate ships.
pub trait CryptoProvider: Send + Sync {
    fn sha256(&self, data: &[u8]) -> [u8; 32];

    /// Verifies an ASN.1 DER-encoded ECDSA signature over `message` using an
    /// uncompressed SEC1 P-256 public key point (`0x04 || x || y`).
    fn verify_ecdsa_p256(&self, point: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CoreError>;

    /// Verifies a PKCS#1 v1.5 RSA-SHA256 signature given raw modulus/exponent.
    fn verify_rsa_pkcs1_sha256(&self, n: &[u8], e: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CoreError>;

    /// Verifies an Ed25519 signature.
    fn verify_ed25519(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CoreError>;

    /// Dispatches to the signature scheme implied by a decoded COSE public
    /// key's own algorithm. Fails with [`CoreError::UnsupportedFormat`] for
    /// an algorithm this provider does not implement (e.g. `INSECURE_RS1`
    /// is never offered at all, since this crate never decodes it).
    fn verify_cose_signature(
        &self,
        key: &CosePublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, CoreError> {
        match key {
            CosePublicKey::Ec2 { alg, .. } => {
                if *alg != CoseAlgorithm::Es256 {
                    return Err(CoreError::unsupported(format!(
                        "unsupported EC2 signature algorithm {alg:?}"
                    )));
                }
                let point = key
                    .to_uncompressed_point()
                    .expect("Ec2 variant always has a point");
                self.verify_ecdsa_p256(&point, message, signature)
            }
            CosePublicKey::Rsa { alg, n, e } => {
                if *alg != CoseAlgorithm::Rs256 {
                    return Err(CoreError::unsupported(format!(
                        "unsupported RSA signature algorithm {alg:?}"
                    )));
                }
                self.verify_rsa_pkcs1_sha256(n, e, message, signature)
            }
            CosePublicKey::Okp { alg, x } => {
                if *alg != CoseAlgorithm::EdDsa {
                    return Err(CoreError::unsupported(format!(
                        "unsupported OKP signature algorithm {alg:?}"
                    )));
                }
                self.verify_ed25519(x, message, signature)
            }
        }
    }
}

/// The `ring`-backed [`CryptoProvider`].
#[derive(Default, Clone, Copy)]
pub struct RingProvider;

impl CryptoProvider for RingProvider {
    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        let digest = digest::digest(&digest::SHA256, data);
        let mut out = [0u8; 32];
        out.copy_from_slice(digest.as_ref());
        out
    }

    fn verify_ecdsa_p256(&self, point: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CoreError> {
        let key = UnparsedPublicKey::new(&signature::ECDSA_P256_SHA256_ASN1, point);
        Ok(key.verify(message, signature).is_ok())
    }

    fn verify_rsa_pkcs1_sha256(&self, n: &[u8], e: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CoreError> {
        let components = signature::RsaPublicKeyComponents { n, e };
        Ok(components
            .verify(&signature::RSA_PKCS1_2048_8192_SHA256, message, signature)
            .is_ok())
    }

    fn verify_ed25519(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool, CoreError> {
        let key = UnparsedPublicKey::new(&signature::ED25519, public_key);
        Ok(key.verify(message, signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring::rand::SystemRandom;
    use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};

    #[test]
    fn sha256_matches_known_vector() {
        let provider = RingProvider;
        let digest = provider.sha256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn ecdsa_p256_round_trip() {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let keypair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref()).unwrap();
        let point = keypair.public_key().as_ref().to_vec();

        let message = b"registration payload";
        let signature = keypair.sign(&rng, message).unwrap();

        let provider = RingProvider;
        assert!(provider
            .verify_ecdsa_p256(&point, message, signature.as_ref())
            .unwrap());

        let mut tampered = message.to_vec();
        tampered[0] ^= 0xFF;
        assert!(!provider
            .verify_ecdsa_p256(&point, &tampered, signature.as_ref())
            .unwrap());
    }
}
