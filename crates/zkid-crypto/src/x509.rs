//! # Certificate Parser
//!
//! Decodes a DSC or CSCA certificate (DER, or PEM with a `CERTIFICATE`
//! label) into an immutable [`CertificateRecord`]. Pure, no I/O.
//!
//! ## Declared algorithms
//!
//! The outer signature algorithm OID is mapped to a declared signature tag
//! and hash. RSASSA-PSS parameters supply the declared hash and salt length.
//! OIDs outside the supported set produce `SignatureAlgorithm::Other` with
//! an `other:<oid>` tag and no declared hash, leaving the resolver to search.

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;
use x509_parser::signature_algorithm::SignatureAlgorithm as X509SignatureAlgorithm;
use zkid_core::{
    CertificateRecord, EcCurve, HashAlgorithm, PublicKeyMaterial, SignatureAlgorithm,
};

use crate::digest::sha256;
use crate::error::CertificateError;

const RSASSA_PSS_OID: &str = "1.2.840.113549.1.1.10";

/// Parse a DER or PEM certificate.
pub fn parse_certificate(input: &[u8]) -> Result<CertificateRecord, CertificateError> {
    let der = decode_der(input)?;
    let (_, cert) = parse_x509_certificate(&der)
        .map_err(|e| CertificateError::Malformed(e.to_string()))?;

    let spki = cert.public_key();
    let public_key = public_key_material(spki)?;

    let mut key_identifier = None;
    let mut authority_key_identifier = None;
    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::SubjectKeyIdentifier(kid) => key_identifier = Some(kid.0.to_vec()),
            ParsedExtension::AuthorityKeyIdentifier(aki) => {
                authority_key_identifier = aki.key_identifier.as_ref().map(|k| hex::encode(k.0));
            }
            _ => {}
        }
    }
    let key_identifier = key_identifier.unwrap_or_else(|| sha256(spki.raw).to_vec());

    let oid = cert.signature_algorithm.algorithm.to_id_string();
    let (signature_algorithm, mut hash_algorithm) = declared_algorithm(&oid);
    let mut salt_length = None;
    if signature_algorithm == SignatureAlgorithm::RsaPss {
        if let Ok(X509SignatureAlgorithm::RSASSA_PSS(params)) =
            X509SignatureAlgorithm::try_from(&cert.signature_algorithm)
        {
            hash_algorithm = hash_from_oid(&params.hash_algorithm_oid().to_id_string());
            salt_length = Some(params.salt_length());
        }
    }

    Ok(CertificateRecord {
        key_identifier,
        authority_key_identifier,
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        public_key,
        signature_algorithm,
        hash_algorithm,
        salt_length,
        tbs: cert.tbs_certificate.as_ref().to_vec(),
        signature: cert.signature_value.data.as_ref().to_vec(),
        der,
    })
}

fn decode_der(input: &[u8]) -> Result<Vec<u8>, CertificateError> {
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(input.len());
    let trimmed = &input[start..];
    if !trimmed.starts_with(b"-----BEGIN") {
        return Ok(input.to_vec());
    }
    let (_, pem) =
        parse_x509_pem(trimmed).map_err(|e| CertificateError::Malformed(e.to_string()))?;
    if pem.label != "CERTIFICATE" {
        return Err(CertificateError::Malformed(format!(
            "unexpected PEM label {:?}",
            pem.label
        )));
    }
    Ok(pem.contents)
}

fn public_key_material(spki: &SubjectPublicKeyInfo<'_>) -> Result<PublicKeyMaterial, CertificateError> {
    match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => Ok(PublicKeyMaterial::Rsa {
            modulus: strip_leading_zeros(rsa.modulus),
            exponent: strip_leading_zeros(rsa.exponent),
        }),
        Ok(PublicKey::EC(point)) => {
            let curve_oid = spki
                .algorithm
                .parameters
                .as_ref()
                .and_then(|p| p.as_oid().ok())
                .map(|oid| oid.to_id_string())
                .ok_or_else(|| {
                    CertificateError::UnsupportedKeyType("EC key without a named curve".into())
                })?;
            let curve = EcCurve::from_oid(&curve_oid).ok_or_else(|| {
                CertificateError::UnsupportedKeyType(format!("EC curve {curve_oid}"))
            })?;
            Ok(PublicKeyMaterial::Ec {
                curve,
                point: point.data().to_vec(),
            })
        }
        Ok(_) if spki.algorithm.algorithm.to_id_string() == RSASSA_PSS_OID => {
            let key = RsaPublicKey::from_pkcs1_der(spki.subject_public_key.data.as_ref())
                .map_err(|e| CertificateError::Malformed(format!("RSASSA-PSS public key: {e}")))?;
            Ok(PublicKeyMaterial::Rsa {
                modulus: key.n().to_bytes_be(),
                exponent: key.e().to_bytes_be(),
            })
        }
        Ok(_) => Err(CertificateError::UnsupportedKeyType(
            spki.algorithm.algorithm.to_id_string(),
        )),
        Err(e) => Err(CertificateError::Malformed(format!("public key: {e}"))),
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Map a signature algorithm OID to its declared scheme and hash.
pub fn declared_algorithm(oid: &str) -> (SignatureAlgorithm, Option<HashAlgorithm>) {
    use HashAlgorithm::*;
    match oid {
        "1.2.840.113549.1.1.5" => (SignatureAlgorithm::Rsa, Some(Sha1)),
        "1.2.840.113549.1.1.14" => (SignatureAlgorithm::Rsa, Some(Sha224)),
        "1.2.840.113549.1.1.11" => (SignatureAlgorithm::Rsa, Some(Sha256)),
        "1.2.840.113549.1.1.12" => (SignatureAlgorithm::Rsa, Some(Sha384)),
        "1.2.840.113549.1.1.13" => (SignatureAlgorithm::Rsa, Some(Sha512)),
        RSASSA_PSS_OID => (SignatureAlgorithm::RsaPss, None),
        "1.2.840.10045.4.1" => (SignatureAlgorithm::Ecdsa, Some(Sha1)),
        "1.2.840.10045.4.3.1" => (SignatureAlgorithm::Ecdsa, Some(Sha224)),
        "1.2.840.10045.4.3.2" => (SignatureAlgorithm::Ecdsa, Some(Sha256)),
        "1.2.840.10045.4.3.3" => (SignatureAlgorithm::Ecdsa, Some(Sha384)),
        "1.2.840.10045.4.3.4" => (SignatureAlgorithm::Ecdsa, Some(Sha512)),
        other => (SignatureAlgorithm::Other(format!("other:{other}")), None),
    }
}

fn hash_from_oid(oid: &str) -> Option<HashAlgorithm> {
    match oid {
        "1.3.14.3.2.26" => Some(HashAlgorithm::Sha1),
        "2.16.840.1.101.3.4.2.4" => Some(HashAlgorithm::Sha224),
        "2.16.840.1.101.3.4.2.1" => Some(HashAlgorithm::Sha256),
        "2.16.840.1.101.3.4.2.2" => Some(HashAlgorithm::Sha384),
        "2.16.840.1.101.3.4.2.3" => Some(HashAlgorithm::Sha512),
        _ => None,
    }
}
