//! # Certificate Chain Tests
//!
//! Parses real certificate chains from `tests/fixtures/` and resolves their
//! signature algorithms end to end. The fixtures cover:
//!
//! - an RSA-PSS (SHA-256, salt 32) 3072-bit CSCA and DSC,
//! - an RSA PKCS#1 2048-bit CA whose leaf is signed with SHA-384,
//! - a P-384 ECDSA CSCA signing a P-256 DSC with SHA-256,
//! - a brainpoolP256r1 CSCA, an 8192-bit RSA CSCA and an Ed25519 certificate,
//! - a passport and an identity card whose signed-content chains hash with
//!   SHA-256 and are signed by the RSA-PSS and ECDSA DSCs respectively.

use zkid_core::{
    AlgorithmProfile, AttestationCategory, DocumentProfile, EcCurve, HashAlgorithm,
    PassportLikeDocument, PublicKeyMaterial, SignatureAlgorithm,
};
use zkid_crypto::{
    ensure_metadata, parse_certificate, resolve_certificate, resolve_metadata,
    resolve_signature, CertificateError, ResolutionError,
};

const CSCA_RSAPSS: &str = include_str!("fixtures/csca_rsapss_3072.pem");
const DSC_RSAPSS: &str = include_str!("fixtures/dsc_rsapss_3072.pem");
const CA_RSA: &str = include_str!("fixtures/ca_rsa_2048.pem");
const DSC_RSA_SHA384: &str = include_str!("fixtures/dsc_rsa_2048_sha384.pem");
const CSCA_P384: &str = include_str!("fixtures/csca_ecdsa_p384.pem");
const DSC_P256: &str = include_str!("fixtures/dsc_ecdsa_p256.pem");
const CSCA_BRAINPOOL: &str = include_str!("fixtures/csca_brainpool_p256.pem");
const CSCA_RSA_8192: &str = include_str!("fixtures/csca_rsa_8192.pem");
const ED25519: &str = include_str!("fixtures/ed25519.pem");
const PASSPORT: &str = include_str!("fixtures/passport_rsapss.json");
const ID_CARD: &str = include_str!("fixtures/id_card_ecdsa.json");

fn passport_like(json: &str) -> PassportLikeDocument {
    match serde_json::from_str::<DocumentProfile>(json).unwrap() {
        DocumentProfile::PassportLike(doc) => doc,
        other => panic!("expected passport-like fixture, got {:?}", other.document_category()),
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn parses_rsapss_csca() {
    let csca = parse_certificate(CSCA_RSAPSS.as_bytes()).unwrap();
    assert!(csca.subject.contains("Utopia CSCA PSS"));
    assert_eq!(csca.bit_length(), 3072);
    assert_eq!(csca.curve_or_exponent(), "65537");
    assert_eq!(csca.signature_algorithm, SignatureAlgorithm::RsaPss);
    assert_eq!(csca.hash_algorithm, Some(HashAlgorithm::Sha256));
    assert_eq!(csca.salt_length, Some(32));
    assert_eq!(csca.key_identifier.len(), 20);
}

#[test]
fn dsc_authority_key_identifier_matches_csca() {
    let csca = parse_certificate(CSCA_RSAPSS.as_bytes()).unwrap();
    let dsc = parse_certificate(DSC_RSAPSS.as_bytes()).unwrap();
    assert_eq!(
        dsc.authority_key_identifier.as_deref(),
        Some(csca.key_identifier_hex().as_str())
    );
}

#[test]
fn der_and_pem_parse_identically() {
    let from_pem = parse_certificate(CA_RSA.as_bytes()).unwrap();
    let from_der = parse_certificate(&from_pem.der).unwrap();
    assert_eq!(from_pem, from_der);
}

#[test]
fn parses_ec_keys() {
    let csca = parse_certificate(CSCA_P384.as_bytes()).unwrap();
    assert!(matches!(
        csca.public_key,
        PublicKeyMaterial::Ec { curve: EcCurve::Secp384r1, .. }
    ));
    assert_eq!(csca.signature_algorithm, SignatureAlgorithm::Ecdsa);
    assert_eq!(csca.hash_algorithm, Some(HashAlgorithm::Sha384));

    let bp = parse_certificate(CSCA_BRAINPOOL.as_bytes()).unwrap();
    assert_eq!(bp.curve_or_exponent(), "brainpoolP256r1");
    assert_eq!(bp.bit_length(), 256);
}

#[test]
fn ed25519_is_unsupported_key_type() {
    assert!(matches!(
        parse_certificate(ED25519.as_bytes()),
        Err(CertificateError::UnsupportedKeyType(_))
    ));
}

#[test]
fn truncated_der_is_malformed() {
    let ca = parse_certificate(CA_RSA.as_bytes()).unwrap();
    assert!(matches!(
        parse_certificate(&ca.der[..ca.der.len() / 2]),
        Err(CertificateError::Malformed(_))
    ));
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn rsapss_3072_resolves_to_sha256_salt_32() {
    let csca = parse_certificate(CSCA_RSAPSS.as_bytes()).unwrap();
    let dsc = parse_certificate(DSC_RSAPSS.as_bytes()).unwrap();
    let expected = AlgorithmProfile {
        hash_algorithm: HashAlgorithm::Sha256,
        signature_algorithm: SignatureAlgorithm::RsaPss,
        curve_or_exponent: "65537".into(),
        bit_length: 3072,
        salt_length: Some(32),
    };
    assert_eq!(resolve_certificate(&dsc, &csca).unwrap(), expected);
    // Same answer by brute force, with no declared candidate.
    assert_eq!(
        resolve_signature(&dsc.tbs, &dsc.signature, &csca, None).unwrap(),
        expected
    );
}

#[test]
fn brute_force_finds_sha384_pkcs1() {
    let ca = parse_certificate(CA_RSA.as_bytes()).unwrap();
    let leaf = parse_certificate(DSC_RSA_SHA384.as_bytes()).unwrap();
    assert_eq!(leaf.curve_or_exponent(), "3");
    let profile = resolve_signature(&leaf.tbs, &leaf.signature, &ca, None).unwrap();
    assert_eq!(profile.hash_algorithm, HashAlgorithm::Sha384);
    assert_eq!(profile.signature_algorithm, SignatureAlgorithm::Rsa);
    assert_eq!(profile.bit_length, 2048);
    assert_eq!(profile.salt_length, None);
}

#[test]
fn ecdsa_chain_resolves() {
    let csca = parse_certificate(CSCA_P384.as_bytes()).unwrap();
    let dsc = parse_certificate(DSC_P256.as_bytes()).unwrap();
    let profile = resolve_certificate(&dsc, &csca).unwrap();
    assert_eq!(profile.hash_algorithm, HashAlgorithm::Sha256);
    assert_eq!(profile.signature_algorithm, SignatureAlgorithm::Ecdsa);
    assert_eq!(profile.curve_or_exponent, "secp384r1");
    assert_eq!(profile.bit_length, 384);

    let self_signed = resolve_certificate(&csca, &csca).unwrap();
    assert_eq!(self_signed.hash_algorithm, HashAlgorithm::Sha384);
}

#[test]
fn wrong_issuer_is_not_resolved() {
    let csca = parse_certificate(CSCA_RSAPSS.as_bytes()).unwrap();
    let leaf = parse_certificate(DSC_RSA_SHA384.as_bytes()).unwrap();
    assert!(matches!(
        resolve_certificate(&leaf, &csca),
        Err(ResolutionError::SignatureAlgorithmNotResolved { attempts: 30, .. })
    ));
}

#[test]
fn brainpool_never_resolves() {
    let bp = parse_certificate(CSCA_BRAINPOOL.as_bytes()).unwrap();
    assert!(matches!(
        resolve_certificate(&bp, &bp),
        Err(ResolutionError::SignatureAlgorithmNotResolved { .. })
    ));
}

#[test]
fn oversized_rsa_key_fails_fast() {
    let big = parse_certificate(CSCA_RSA_8192.as_bytes()).unwrap();
    assert_eq!(big.bit_length(), 8192);
    assert!(matches!(
        resolve_certificate(&big, &big),
        Err(ResolutionError::KeyLengthUnsupported { bits: 8192, max: 4096 })
    ));
}

#[test]
fn oversized_signature_fails_fast() {
    let ca = parse_certificate(CA_RSA.as_bytes()).unwrap();
    let dsc = parse_certificate(DSC_RSAPSS.as_bytes()).unwrap();
    assert!(matches!(
        resolve_certificate(&dsc, &ca),
        Err(ResolutionError::InvalidSignatureLength { expected: 256, actual: 384 })
    ));
}

// ---------------------------------------------------------------------------
// Document metadata
// ---------------------------------------------------------------------------

#[test]
fn passport_metadata_resolves_full_chain() {
    let doc = passport_like(PASSPORT);
    assert_eq!(doc.category, AttestationCategory::Passport);
    let metadata = resolve_metadata(&doc).unwrap();
    assert_eq!(metadata.dg_hash_algorithm, HashAlgorithm::Sha256);
    assert_eq!(metadata.econtent_hash_algorithm, HashAlgorithm::Sha256);
    assert_eq!(metadata.signed_attr_hash_algorithm, HashAlgorithm::Sha256);
    assert_eq!(metadata.dsc_profile.signature_algorithm, SignatureAlgorithm::RsaPss);
    assert_eq!(metadata.dsc_profile.salt_length, Some(32));
    assert_eq!(metadata.dsc_profile.bit_length, 3072);
    assert!(metadata.csca_found);
    assert_eq!(metadata.csca_error, None);
    assert_eq!(
        metadata.csca_profile.as_ref().map(|p| p.bit_length),
        Some(3072)
    );
}

#[test]
fn id_card_metadata_resolves_ecdsa_chain() {
    let doc = passport_like(ID_CARD);
    assert_eq!(doc.category, AttestationCategory::IdCard);
    let metadata = resolve_metadata(&doc).unwrap();
    assert_eq!(metadata.dsc_profile.curve_or_exponent, "secp256r1");
    assert_eq!(
        metadata.csca_profile.map(|p| p.curve_or_exponent),
        Some("secp384r1".to_string())
    );
}

#[test]
fn mismatched_csca_leaves_chain_unresolved() {
    let mut doc = passport_like(PASSPORT);
    doc.csca = Some(parse_certificate(CA_RSA.as_bytes()).unwrap().der);
    let metadata = resolve_metadata(&doc).unwrap();
    assert!(!metadata.csca_found);
    assert!(metadata.csca_profile.is_none());
    assert!(metadata
        .csca_error
        .as_deref()
        .is_some_and(|e| e.contains("invalid signature length")));
}

#[test]
fn oversized_csca_reports_key_length() {
    let mut doc = passport_like(PASSPORT);
    doc.csca = Some(parse_certificate(CSCA_RSA_8192.as_bytes()).unwrap().der);
    let metadata = resolve_metadata(&doc).unwrap();
    assert!(!metadata.csca_found);
    assert!(metadata
        .csca_error
        .as_deref()
        .is_some_and(|e| e.contains("key length 8192 bits")));
}

#[test]
fn unreadable_csca_leaves_chain_unresolved() {
    let mut doc = passport_like(PASSPORT);
    doc.csca = Some(vec![0x30, 0x03, 0x02, 0x01]);
    let metadata = resolve_metadata(&doc).unwrap();
    assert!(!metadata.csca_found);
    assert!(metadata
        .csca_error
        .as_deref()
        .is_some_and(|e| e.starts_with("CSCA certificate unreadable")));
}

#[test]
fn missing_csca_leaves_chain_unresolved() {
    let mut doc = passport_like(PASSPORT);
    doc.csca = None;
    let metadata = resolve_metadata(&doc).unwrap();
    assert!(!metadata.csca_found);
    assert_eq!(metadata.csca_error.as_deref(), Some("no CSCA certificate supplied"));
}

#[test]
fn metadata_is_cached_after_first_resolution() {
    let mut doc = passport_like(PASSPORT);
    let first = ensure_metadata(&mut doc).unwrap().clone();
    // Break the document: a cached value must not be recomputed.
    doc.signature.clear();
    let second = ensure_metadata(&mut doc).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(doc.metadata, Some(first));
}

#[test]
fn tampered_mrz_breaks_dg1_digest() {
    let mut doc = passport_like(PASSPORT);
    doc.mrz = doc.mrz.replace("ERIKSSON", "ERIKSSEN");
    assert!(matches!(
        resolve_metadata(&doc),
        Err(zkid_crypto::MetadataError::DigestNotFound { stage: "dg1" })
    ));
}
