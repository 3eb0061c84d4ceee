//! Binary codecs shared by both ceremony pipelines: Base64URL, a CBOR reader
//! with "read one item, report trailing bytes" semantics, and a thin wrapper
//! over X.509 DER parsing.

pub mod base64url;
pub mod cbor;
pub mod x509;
