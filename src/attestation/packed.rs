//! `packed` attestation (§4.4.3): the modern, compact attestation format.
//! Carries either a certificate chain (basic/privacy-CA attestation) or,
//! when neither `x5c` nor `ecdaaKeyId` is present, is self-attested by the
//! credential's own key.

use std::collections::HashSet;

use ciborium::value::Value;
use once_cell::sync::Lazy;

use crate::attestation::AttestationVerifier;
use crate::codec::cbor;
use crate::codec::x509::{self, Certificate, KeyAlgorithm};
use crate::cose::CoseAlgorithm;
use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::model::{AttestationObject, AttestationType};

pub struct PackedVerifier;

enum TrustVariant {
    X5c(Vec<Vec<u8>>),
    SelfAttestation,
}

struct Statement {
    alg: CoseAlgorithm,
    sig: Vec<u8>,
    variant: TrustVariant,
}

fn parse_statement(att_stmt: &Value) -> Result<Statement, CoreError> {
    let fields = cbor::as_text_map(att_stmt.clone())?;

    let mut alg = None;
    let mut sig = None;
    let mut x5c = None;
    let mut ecdaa_key_id = None;
    for (key, value) in fields {
        match key.as_str() {
            "alg" => {
                let integer = value
                    .as_integer()
                    .ok_or_else(|| CoreError::malformed("packed alg must be an integer"))?;
                alg = Some(i64::try_from(i128::from(integer)).map_err(|_| CoreError::malformed("packed alg out of range"))?)
            }
            "sig" => sig = Some(value.into_bytes().map_err(|_| CoreError::malformed("packed sig must be bytes"))?),
            "x5c" => x5c = Some(value.into_array().map_err(|_| CoreError::malformed("packed x5c must be an array"))?),
            "ecdaaKeyId" => {
                ecdaa_key_id =
                    Some(value.into_bytes().map_err(|_| CoreError::malformed("packed ecdaaKeyId must be bytes"))?)
            }
            _ => {}
        }
    }

    let alg = alg.ok_or_else(|| CoreError::malformed("packed attestation statement missing alg"))?;
    let sig = sig.ok_or_else(|| CoreError::malformed("packed attestation statement missing sig"))?;

    if ecdaa_key_id.is_some() {
        return Err(CoreError::unsupported("ECDAA attestation is not implemented"));
    }

    let variant = match x5c {
        Some(certs) => {
            let ders = certs
                .into_iter()
                .map(|v| v.into_bytes().map_err(|_| CoreError::malformed("packed x5c entry must be bytes")))
                .collect::<Result<Vec<_>, _>>()?;
            if ders.is_empty() {
                return Err(CoreError::malformed("packed x5c must not be empty"));
            }
            TrustVariant::X5c(ders)
        }
        None => TrustVariant::SelfAttestation,
    };

    Ok(Statement {
        alg: CoseAlgorithm::from_i64(alg),
        sig,
        variant,
    })
}

fn signed_payload(object: &AttestationObject, client_data_hash: &[u8]) -> Vec<u8> {
    let mut payload = object.auth_data.raw.clone();
    payload.extend_from_slice(client_data_hash);
    payload
}

fn verify_with_cert(
    cert: &Certificate<'_>,
    alg: CoseAlgorithm,
    message: &[u8],
    signature: &[u8],
    crypto: &dyn CryptoProvider,
) -> Result<bool, CoreError> {
    match alg {
        CoseAlgorithm::Es256 => {
            let point = cert
                .ec_point()
                .ok_or_else(|| CoreError::unsupported("packed alg ES256 requires an EC attestation certificate"))?;
            crypto.verify_ecdsa_p256(&point, message, signature)
        }
        CoseAlgorithm::Rs256 => {
            let (n, e) = cert
                .rsa_components()
                .ok_or_else(|| CoreError::unsupported("packed alg RS256 requires an RSA attestation certificate"))?;
            crypto.verify_rsa_pkcs1_sha256(&n, &e, message, signature)
        }
        other => Err(CoreError::unsupported(format!(
            "unsupported packed attestation algorithm {other:?}"
        ))),
    }
}

/// Packed certificate requirements (§7.2.1), applied to `x5c[0]`.
fn check_packed_certificate_requirements(cert: &Certificate<'_>) -> Result<(), CoreError> {
    if !cert.version_is_v3() {
        return Err(CoreError::contract("packed attestation certificate must be X.509 v3"));
    }

    let country = cert
        .subject_country()
        .ok_or_else(|| CoreError::contract("packed attestation certificate subject missing C"))?;
    if !is_iso_3166_1_alpha2(&country) {
        return Err(CoreError::contract(format!(
            "packed attestation certificate subject C \"{country}\" is not a valid ISO 3166-1 alpha-2 code"
        )));
    }

    let organization = cert
        .subject_organization()
        .ok_or_else(|| CoreError::contract("packed attestation certificate subject missing O"))?;
    if organization.is_empty() {
        return Err(CoreError::contract("packed attestation certificate subject O must be non-empty"));
    }

    let organizational_unit = cert
        .subject_organizational_unit()
        .ok_or_else(|| CoreError::contract("packed attestation certificate subject missing OU"))?;
    if organizational_unit != "Authenticator Attestation" {
        return Err(CoreError::contract(
            "packed attestation certificate subject OU must be \"Authenticator Attestation\"",
        ));
    }

    if cert.subject_common_name().is_none() {
        return Err(CoreError::contract("packed attestation certificate subject missing CN"));
    }

    if cert.is_ca() {
        return Err(CoreError::contract(
            "packed attestation certificate must not be a CA certificate",
        ));
    }

    Ok(())
}

/// Checks the `id-fido-gen-ce-aaguid` extension, if present, against the
/// AAGUID in authenticator data (§4.4.3 basic-path step 3).
fn check_aaguid_extension(cert: &Certificate<'_>, object: &AttestationObject) -> Result<(), CoreError> {
    let Some(extn_value) = cert.extension_value(x509::OID_FIDO_GEN_CE_AAGUID) else {
        return Ok(());
    };
    let aaguid_bytes = x509::unwrap_octet_string(extn_value)?;
    let cred = object
        .auth_data
        .attested_credential_data
        .as_ref()
        .ok_or_else(|| CoreError::malformed("packed attestation requires attested credential data"))?;
    if aaguid_bytes != cred.aaguid.as_slice() {
        return Err(CoreError::contract(
            "packed attestation certificate AAGUID extension does not match authenticator data AAGUID",
        ));
    }
    Ok(())
}

impl AttestationVerifier for PackedVerifier {
    fn classify(&self, object: &AttestationObject, _crypto: &dyn CryptoProvider) -> Result<AttestationType, CoreError> {
        let statement = parse_statement(&object.att_stmt)?;
        Ok(match statement.variant {
            TrustVariant::X5c(_) => AttestationType::Basic,
            TrustVariant::SelfAttestation => AttestationType::SelfAttestation,
        })
    }

    fn verify_signature(
        &self,
        object: &AttestationObject,
        client_data_hash: &[u8],
        crypto: &dyn CryptoProvider,
    ) -> Result<bool, CoreError> {
        let statement = parse_statement(&object.att_stmt)?;
        let payload = signed_payload(object, client_data_hash);

        match &statement.variant {
            TrustVariant::X5c(ders) => {
                let leaf = Certificate::parse(&ders[0])?;
                if leaf.key_algorithm() == KeyAlgorithm::Other {
                    return Err(CoreError::unsupported(
                        "packed attestation certificate key algorithm is not EC or RSA",
                    ));
                }
                let verified = verify_with_cert(&leaf, statement.alg, &payload, &statement.sig, crypto)?;
                if !verified {
                    return Ok(false);
                }
                check_packed_certificate_requirements(&leaf)?;
                check_aaguid_extension(&leaf, object)?;
                Ok(true)
            }
            TrustVariant::SelfAttestation => {
                let cred = object
                    .auth_data
                    .attested_credential_data
                    .as_ref()
                    .ok_or_else(|| CoreError::malformed("packed self-attestation requires attested credential data"))?;
                if cred.credential_public_key.algorithm() != statement.alg {
                    return Err(CoreError::contract(
                        "packed self-attestation alg does not match credential public key alg",
                    ));
                }
                crypto.verify_cose_signature(&cred.credential_public_key, &payload, &statement.sig)
            }
        }
    }

    fn trust_path(&self, object: &AttestationObject) -> Result<Option<Vec<Vec<u8>>>, CoreError> {
        let statement = parse_statement(&object.att_stmt)?;
        Ok(match statement.variant {
            TrustVariant::X5c(ders) => Some(ders),
            TrustVariant::SelfAttestation => None,
        })
    }
}

/// ISO 3166-1 alpha-2 country codes currently assigned, used to validate a
/// packed attestation certificate's subject `C` field (§7.2.1). A `Lazy`
/// `HashSet`, the same shape this crate already uses for other precomputed
/// lookup tables (e.g. the supported COSE algorithm set).
static ISO_3166_1_ALPHA2: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from_iter([
        "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ", "BA", "BB",
        "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS", "BT", "BV", "BW", "BY",
        "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX",
        "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK",
        "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
        "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR",
        "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA",
        "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
        "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE",
        "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
        "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC", "SD", "SE", "SG",
        "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF",
        "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY",
        "UZ", "VA", "VC", "VE", "VG", "VI", "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
    ])
});

fn is_iso_3166_1_alpha2(code: &str) -> bool {
    ISO_3166_1_ALPHA2.contains(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdaa_key_id_is_unsupported() {
        let att_stmt = ciborium::cbor!({
            "alg" => -7,
            "sig" => ciborium::value::Value::Bytes(vec![1, 2, 3]),
            "ecdaaKeyId" => ciborium::value::Value::Bytes(vec![4, 5, 6]),
        })
        .unwrap();
        let err = parse_statement(&att_stmt).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_x5c_and_ecdaa_is_self_attestation() {
        let att_stmt = ciborium::cbor!({
            "alg" => -7,
            "sig" => ciborium::value::Value::Bytes(vec![1, 2, 3]),
        })
        .unwrap();
        let statement = parse_statement(&att_stmt).unwrap();
        assert!(matches!(statement.variant, TrustVariant::SelfAttestation));
    }

    #[test]
    fn valid_iso_codes_are_accepted() {
        assert!(is_iso_3166_1_alpha2("US"));
        assert!(is_iso_3166_1_alpha2("JP"));
        assert!(!is_iso_3166_1_alpha2("ZZ"));
        assert!(!is_iso_3166_1_alpha2("usa"));
    }
}
