//! Thin wrapper over `x509-parser` DER parsing: attestation certificates
//! arrive as raw DER and must be decomposed into subject fields, public
//! key, `BasicConstraints`, and OID extensions.

use x509_parser::certificate::X509Certificate as ParserCertificate;
use x509_parser::prelude::{FromDer, X509Version};
use x509_parser::public_key::PublicKey as ParserPublicKey;

use crate::error::CoreError;

/// NIST P-256 / secp256r1 named-curve OID (ANSI X9.62 prime256v1).
const OID_PRIME256V1: &str = "1.2.840.10045.3.1.7";

/// id-fido-gen-ce-aaguid, the non-critical extension a `packed` attestation
/// certificate may carry to assert its AAGUID.
pub const OID_FIDO_GEN_CE_AAGUID: &str = "1.3.6.1.4.1.45724.1.1.4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Ec,
    Rsa,
    Other,
}

/// A parsed attestation certificate, exposing only what the attestation
/// verifiers need: subject RDNs, the raw public key, `BasicConstraints`, the
/// X.509 version, and arbitrary OID extension payloads.
pub struct Certificate<'a> {
    der: &'a [u8],
    inner: ParserCertificate<'a>,
}

impl<'a> Certificate<'a> {
    pub fn parse(der: &'a [u8]) -> Result<Self, CoreError> {
        let (_, inner) = ParserCertificate::from_der(der)
            .map_err(|e| CoreError::malformed(format!("invalid X.509 certificate: {e}")))?;
        Ok(Certificate { der, inner })
    }

    pub fn der_bytes(&self) -> &'a [u8] {
        self.der
    }

    pub fn version_is_v3(&self) -> bool {
        self.inner.version() == X509Version::V3
    }

    fn subject_attr(&self, short_name: &str) -> Option<String> {
        self.inner
            .subject()
            .iter_attributes()
            .find(|attr| {
                attr.attr_type()
                    .short_name()
                    .map(|n| n == short_name)
                    .unwrap_or(false)
            })
            .and_then(|attr| attr.as_str().ok())
            .map(|s| s.to_owned())
    }

    pub fn subject_country(&self) -> Option<String> {
        self.subject_attr("C")
    }

    pub fn subject_organization(&self) -> Option<String> {
        self.subject_attr("O")
    }

    pub fn subject_organizational_unit(&self) -> Option<String> {
        self.subject_attr("OU")
    }

    pub fn subject_common_name(&self) -> Option<String> {
        self.subject_attr("CN")
    }

    pub fn subject_der(&self) -> &[u8] {
        self.inner.tbs_certificate.subject.as_raw()
    }

    pub fn issuer_der(&self) -> &[u8] {
        self.inner.tbs_certificate.issuer.as_raw()
    }

    /// `BasicConstraints.cA`; absent extension is treated as `false`, which
    /// matches the default used by every certificate profile this crate
    /// deals with (end-entity attestation certificates never omit it, but
    /// treating absence as "not a CA" is the conservative reading either way).
    pub fn is_ca(&self) -> bool {
        self.inner
            .basic_constraints()
            .ok()
            .flatten()
            .map(|bc| bc.value.ca)
            .unwrap_or(false)
    }

    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self.inner.public_key().parsed() {
            Ok(ParserPublicKey::EC(_)) => KeyAlgorithm::Ec,
            Ok(ParserPublicKey::RSA(_)) => KeyAlgorithm::Rsa,
            _ => KeyAlgorithm::Other,
        }
    }

    /// Raw uncompressed EC point (`0x04 || x || y`), if this is an EC key.
    /// For a P-256 subject public key this is exactly the 65-byte point
    /// `fido-u2f`'s signed payload embeds.
    pub fn ec_point(&self) -> Option<Vec<u8>> {
        match self.inner.public_key().parsed() {
            Ok(ParserPublicKey::EC(point)) => Some(point.data().to_vec()),
            _ => None,
        }
    }

    /// Raw `(modulus, exponent)` bytes, if this is an RSA key.
    pub fn rsa_components(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        match self.inner.public_key().parsed() {
            Ok(ParserPublicKey::RSA(key)) => Some((key.modulus.to_vec(), key.exponent.to_vec())),
            _ => None,
        }
    }

    /// Whether the key's named curve is NIST P-256. Named-curve equivalence
    /// is checked via the curve OID carried in the SPKI algorithm
    /// parameters, which is what distinguishes P-256 from `secp256k1` (both
    /// are EC keys, but the curve parameters -- order, generator, cofactor
    /// -- differ; the OID is the compact proxy for that comparison).
    pub fn is_p256(&self) -> bool {
        self.inner
            .tbs_certificate
            .subject_pki
            .algorithm
            .parameters
            .as_ref()
            .and_then(|p| p.as_oid().ok())
            .map(|oid| oid.to_id_string() == OID_PRIME256V1)
            .unwrap_or(false)
    }

    /// Raw `extnValue` octets of the first extension matching `oid`, if
    /// present.
    pub fn extension_value(&self, oid: &str) -> Option<&[u8]> {
        self.inner
            .extensions()
            .iter()
            .find(|ext| ext.oid.to_id_string() == oid)
            .map(|ext| ext.value)
    }

    /// `true` if the certificate's signature verifies against its own
    /// public key and its subject equals its issuer -- i.e. it is
    /// self-signed.
    pub fn is_self_signed(&self) -> bool {
        self.subject_der() == self.issuer_der() && self.inner.verify_signature(None).is_ok()
    }
}

/// Strips a DER `OCTET STRING` TLV wrapper, returning its content. The
/// id-fido-gen-ce-aaguid extension's `extnValue` is itself an `OCTET
/// STRING` wrapping the 16 raw AAGUID bytes, so reading the AAGUID back out
/// requires peeling one more layer than `Certificate::extension_value`
/// already strips.
pub fn unwrap_octet_string(der: &[u8]) -> Result<&[u8], CoreError> {
    if der.len() < 2 || der[0] != 0x04 {
        return Err(CoreError::malformed("expected a DER OCTET STRING"));
    }
    let len = der[1] as usize;
    if len & 0x80 != 0 {
        return Err(CoreError::malformed(
            "multi-byte DER length in AAGUID extension unsupported",
        ));
    }
    der.get(2..2 + len)
        .ok_or_else(|| CoreError::malformed("truncated DER OCTET STRING"))
}
