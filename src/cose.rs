//! COSE_Key decoding (RFC 8152 §7), built on the `coset` crate: decodes
//! credential and attestation public keys received from a client.

use coset::iana::{self, EnumI64};
use coset::{CborSerializable, CoseKey, KeyType, Label};

use crate::error::CoreError;

/// A COSE algorithm identifier (RFC 8152 §8, negative integers per the IANA
/// COSE registry). ES256 is the only algorithm this crate requires for
/// verification; RS256 and EdDSA are decoded so interop checks (e.g. a
/// `packed` self-attestation's declared `alg` against the credential key's
/// own `alg`) can compare like with like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoseAlgorithm {
    Es256,
    Rs256,
    EdDsa,
    Other(i64),
}

impl CoseAlgorithm {
    pub fn from_i64(value: i64) -> Self {
        if value == iana::Algorithm::ES256.to_i64() {
            CoseAlgorithm::Es256
        } else if value == iana::Algorithm::RS256.to_i64() {
            CoseAlgorithm::Rs256
        } else if value == iana::Algorithm::EdDSA.to_i64() {
            CoseAlgorithm::EdDsa
        } else {
            CoseAlgorithm::Other(value)
        }
    }

    pub fn to_i64(self) -> i64 {
        match self {
            CoseAlgorithm::Es256 => iana::Algorithm::ES256.to_i64(),
            CoseAlgorithm::Rs256 => iana::Algorithm::RS256.to_i64(),
            CoseAlgorithm::EdDsa => iana::Algorithm::EdDSA.to_i64(),
            CoseAlgorithm::Other(v) => v,
        }
    }
}

/// A decoded COSE public key, narrowed to the key types this crate
/// recognizes (EC2 and RSA; OKP/EdDSA decoded only far enough to support
/// the algorithm-match interop check, as no supported attestation format
/// requires verifying an EdDSA signature).
#[derive(Debug, Clone)]
pub enum CosePublicKey {
    Ec2 {
        alg: CoseAlgorithm,
        x: Vec<u8>,
        y: Vec<u8>,
    },
    Rsa {
        alg: CoseAlgorithm,
        n: Vec<u8>,
        e: Vec<u8>,
    },
    Okp {
        alg: CoseAlgorithm,
        x: Vec<u8>,
    },
}

fn find_bytes(params: &[(Label, ciborium::value::Value)], label: i64) -> Option<Vec<u8>> {
    params
        .iter()
        .find(|(l, _)| matches!(l, Label::Int(n) if *n == label))
        .and_then(|(_, v)| v.as_bytes().cloned())
}

impl CosePublicKey {
    /// Decodes a COSE_Key CBOR map per RFC 8152 §7. The key MUST contain an
    /// `alg` (label `3`); this crate has no use for a key with no declared
    /// algorithm, since every verifier needs to know which signature scheme
    /// to apply.
    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let key = CoseKey::from_slice(bytes)
            .map_err(|e| CoreError::malformed(format!("invalid COSE_Key: {e}")))?;
        let alg = key
            .alg
            .as_ref()
            .and_then(|a| match a {
                coset::Algorithm::Assigned(a) => Some(CoseAlgorithm::from_i64(a.to_i64())),
                coset::Algorithm::PrivateUse(n) => Some(CoseAlgorithm::from_i64(*n)),
                _ => None,
            })
            .ok_or_else(|| CoreError::malformed("COSE_Key missing required alg parameter"))?;

        match &key.kty {
            KeyType::Assigned(iana::KeyType::EC2) => {
                let x = find_bytes(&key.params, iana::Ec2KeyParameter::X.to_i64())
                    .ok_or_else(|| CoreError::malformed("COSE_Key EC2 missing x"))?;
                let y = find_bytes(&key.params, iana::Ec2KeyParameter::Y.to_i64())
                    .ok_or_else(|| CoreError::malformed("COSE_Key EC2 missing y"))?;
                Ok(CosePublicKey::Ec2 { alg, x, y })
            }
            KeyType::Assigned(iana::KeyType::RSA) => {
                let n = find_bytes(&key.params, iana::RsaKeyParameter::N.to_i64())
                    .ok_or_else(|| CoreError::malformed("COSE_Key RSA missing n"))?;
                let e = find_bytes(&key.params, iana::RsaKeyParameter::E.to_i64())
                    .ok_or_else(|| CoreError::malformed("COSE_Key RSA missing e"))?;
                Ok(CosePublicKey::Rsa { alg, n, e })
            }
            KeyType::Assigned(iana::KeyType::OKP) => {
                let x = find_bytes(&key.params, iana::OkpKeyParameter::X.to_i64())
                    .ok_or_else(|| CoreError::malformed("COSE_Key OKP missing x"))?;
                Ok(CosePublicKey::Okp { alg, x })
            }
            other => Err(CoreError::unsupported(format!(
                "unsupported COSE key type: {other:?}"
            ))),
        }
    }

    pub fn algorithm(&self) -> CoseAlgorithm {
        match self {
            CosePublicKey::Ec2 { alg, .. } => *alg,
            CosePublicKey::Rsa { alg, .. } => *alg,
            CosePublicKey::Okp { alg, .. } => *alg,
        }
    }

    /// The uncompressed SEC1 point `0x04 || x || y`, for EC2 keys only.
    /// `fido-u2f`'s signed payload embeds exactly this encoding.
    pub fn to_uncompressed_point(&self) -> Option<Vec<u8>> {
        match self {
            CosePublicKey::Ec2 { x, y, .. } => {
                let mut point = Vec::with_capacity(1 + x.len() + y.len());
                point.push(0x04);
                point.extend_from_slice(x);
                point.extend_from_slice(y);
                Some(point)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coset::{iana::EllipticCurve, CoseKeyBuilder};

    #[test]
    fn decodes_ec2_key() {
        let x = vec![1u8; 32];
        let y = vec![2u8; 32];
        let key = CoseKeyBuilder::new_ec2_pub_key(EllipticCurve::P_256, x.clone(), y.clone())
            .algorithm(iana::Algorithm::ES256)
            .build();
        let bytes = key.to_vec().unwrap();

        let decoded = CosePublicKey::decode(&bytes).unwrap();
        match decoded {
            CosePublicKey::Ec2 { alg, x: dx, y: dy } => {
                assert_eq!(alg, CoseAlgorithm::Es256);
                assert_eq!(dx, x);
                assert_eq!(dy, y);
            }
            _ => panic!("expected EC2 key"),
        }
    }

    #[test]
    fn uncompressed_point_has_leading_0x04() {
        let key = CosePublicKey::Ec2 {
            alg: CoseAlgorithm::Es256,
            x: vec![1u8; 32],
            y: vec![2u8; 32],
        };
        let point = key.to_uncompressed_point().unwrap();
        assert_eq!(point.len(), 65);
        assert_eq!(point[0], 0x04);
    }

    #[test]
    fn rejects_key_without_alg() {
        let key = coset::CoseKeyBuilder::new_ec2_pub_key(EllipticCurve::P_256, vec![1; 32], vec![2; 32]).build();
        assert!(key.alg.is_none());
        let bytes = key.to_vec().unwrap();
        assert!(CosePublicKey::decode(&bytes).is_err());
    }

    #[test]
    fn algorithm_round_trips() {
        assert_eq!(CoseAlgorithm::from_i64(-7), CoseAlgorithm::Es256);
        assert_eq!(CoseAlgorithm::from_i64(-257), CoseAlgorithm::Rs256);
        assert_eq!(CoseAlgorithm::from_i64(-8), CoseAlgorithm::EdDsa);
        assert_eq!(CoseAlgorithm::Es256.to_i64(), -7);
    }
}
