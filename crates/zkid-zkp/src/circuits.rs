//! # Circuit Identifier Resolver
//!
//! Maps a resolved document to the canonical names of the circuits that can
//! prove it, and checks those names against the deployed catalog.
//!
//! ## Naming
//!
//! - Registration, passport-like:
//!   `register[_id]_{dg}_{econtent}_{signedattr}_{sig}_{curve|exp}[_{salt}][_{bits}]`.
//!   RSA-family keys append the exact DSC bit length; only RSA-PSS carries a
//!   salt.
//! - Registration, QR credential: `register_aadhaar`.
//! - Issuer chain (DSC signed by CSCA): `dsc_{hash}_{sig}_{exp}[_{salt}]_4096`
//!   for RSA-family CSCA keys, which are bucketed at the maximum supported
//!   width, and `dsc_{hash}_ecdsa_{curve}` for EC keys.
//! - Disclosure: `vc_and_disclose`, `vc_and_disclose_id`,
//!   `vc_and_disclose_aadhaar`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use zkid_core::constants::DSC_RSA_BUCKET_BITS;
use zkid_core::{
    AlgorithmProfile, AttestationCategory, DocumentMetadata, DocumentProfile, PassportLikeDocument,
    SignatureAlgorithm,
};

use crate::error::CircuitError;

/// Circuit names currently deployed, by circuit family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedCircuits {
    #[serde(default)]
    pub register: BTreeSet<String>,
    #[serde(default)]
    pub dsc: BTreeSet<String>,
    #[serde(default)]
    pub disclose: BTreeSet<String>,
}

impl DeployedCircuits {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn has_register(&self, name: &str) -> bool {
        self.register.contains(name)
    }

    pub fn has_dsc(&self, name: &str) -> bool {
        self.dsc.contains(name)
    }

    pub fn has_disclose(&self, name: &str) -> bool {
        self.disclose.contains(name)
    }
}

/// Outcome of a document support check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSupportStatus {
    MetadataMissing,
    IssuerChainNotFound,
    RegistrationCircuitUnsupported,
    IssuerCircuitUnsupported,
    Supported,
}

impl DocumentSupportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetadataMissing => "metadata_missing",
            Self::IssuerChainNotFound => "issuer_chain_not_found",
            Self::RegistrationCircuitUnsupported => "registration_circuit_unsupported",
            Self::IssuerCircuitUnsupported => "issuer_circuit_unsupported",
            Self::Supported => "supported",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }
}

impl std::fmt::Display for DocumentSupportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration circuit for `doc`.
pub fn register_circuit_name(doc: &DocumentProfile) -> Result<String, CircuitError> {
    match doc {
        DocumentProfile::NationalQrCredential(_) => Ok("register_aadhaar".to_string()),
        DocumentProfile::PassportLike(doc) => {
            let metadata = doc.metadata.as_ref().ok_or(CircuitError::MetadataMissing)?;
            passport_register_name(doc.category, metadata)
        }
    }
}

fn passport_register_name(
    category: AttestationCategory,
    metadata: &DocumentMetadata,
) -> Result<String, CircuitError> {
    let prefix = match category {
        AttestationCategory::IdCard => "register_id",
        _ => "register",
    };
    let dsc = &metadata.dsc_profile;
    let mut name = format!(
        "{prefix}_{}_{}_{}_{}",
        metadata.dg_hash_algorithm,
        metadata.econtent_hash_algorithm,
        metadata.signed_attr_hash_algorithm,
        signature_segment(dsc)?
    );
    if dsc.signature_algorithm.is_rsa_family() {
        name.push_str(&format!("_{}", dsc.bit_length));
    }
    Ok(name)
}

/// Issuer-chain circuit for a passport-like document.
pub fn dsc_circuit_name(doc: &PassportLikeDocument) -> Result<String, CircuitError> {
    let metadata = doc.metadata.as_ref().ok_or(CircuitError::MetadataMissing)?;
    let csca = metadata
        .csca_profile
        .as_ref()
        .filter(|_| metadata.csca_found)
        .ok_or(CircuitError::IssuerChainNotFound)?;
    dsc_name_for(csca)
}

/// Issuer-chain circuit for a resolved CSCA profile.
pub fn dsc_name_for(csca: &AlgorithmProfile) -> Result<String, CircuitError> {
    let mut name = format!("dsc_{}_{}", csca.hash_algorithm, signature_segment(csca)?);
    if csca.signature_algorithm.is_rsa_family() {
        name.push_str(&format!("_{DSC_RSA_BUCKET_BITS}"));
    }
    Ok(name)
}

/// Disclosure circuit for `category`.
pub fn disclose_circuit_name(category: AttestationCategory) -> &'static str {
    match category {
        AttestationCategory::Passport => "vc_and_disclose",
        AttestationCategory::IdCard => "vc_and_disclose_id",
        AttestationCategory::NationalQr => "vc_and_disclose_aadhaar",
    }
}

/// `{sig}_{curve|exp}[_{salt}]`.
fn signature_segment(profile: &AlgorithmProfile) -> Result<String, CircuitError> {
    match &profile.signature_algorithm {
        SignatureAlgorithm::Ecdsa | SignatureAlgorithm::Rsa => Ok(format!(
            "{}_{}",
            profile.signature_algorithm, profile.curve_or_exponent
        )),
        SignatureAlgorithm::RsaPss => {
            let mut segment = format!("rsapss_{}", profile.curve_or_exponent);
            if let Some(salt) = profile.salt_length {
                segment.push_str(&format!("_{salt}"));
            }
            Ok(segment)
        }
        SignatureAlgorithm::Other(tag) => Err(CircuitError::UnsupportedSignatureAlgorithm(tag.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkid_core::HashAlgorithm;

    fn profile(sig: SignatureAlgorithm, curve_or_exponent: &str, bits: u32, salt: Option<u32>) -> AlgorithmProfile {
        AlgorithmProfile {
            hash_algorithm: HashAlgorithm::Sha256,
            signature_algorithm: sig,
            curve_or_exponent: curve_or_exponent.into(),
            bit_length: bits,
            salt_length: salt,
        }
    }

    fn metadata(dsc: AlgorithmProfile, csca: Option<AlgorithmProfile>) -> DocumentMetadata {
        DocumentMetadata {
            dg_hash_algorithm: HashAlgorithm::Sha256,
            econtent_hash_algorithm: HashAlgorithm::Sha256,
            signed_attr_hash_algorithm: dsc.hash_algorithm,
            csca_found: csca.is_some(),
            csca_error: None,
            dsc_profile: dsc,
            csca_profile: csca,
        }
    }

    #[test]
    fn rsapss_register_name_carries_salt_and_bits() {
        let m = metadata(profile(SignatureAlgorithm::RsaPss, "65537", 3072, Some(32)), None);
        assert_eq!(
            passport_register_name(AttestationCategory::Passport, &m).unwrap(),
            "register_sha256_sha256_sha256_rsapss_65537_32_3072"
        );
    }

    #[test]
    fn ecdsa_register_name_has_no_bits() {
        let m = metadata(profile(SignatureAlgorithm::Ecdsa, "secp256r1", 256, None), None);
        assert_eq!(
            passport_register_name(AttestationCategory::IdCard, &m).unwrap(),
            "register_id_sha256_sha256_sha256_ecdsa_secp256r1"
        );
    }

    #[test]
    fn dsc_names_bucket_rsa_keys() {
        let rsa2048 = profile(SignatureAlgorithm::Rsa, "65537", 2048, None);
        let rsa3072 = profile(SignatureAlgorithm::Rsa, "65537", 3072, None);
        assert_eq!(dsc_name_for(&rsa2048).unwrap(), "dsc_sha256_rsa_65537_4096");
        assert_eq!(dsc_name_for(&rsa2048), dsc_name_for(&rsa3072));
        let pss = profile(SignatureAlgorithm::RsaPss, "3", 4096, Some(64));
        assert_eq!(dsc_name_for(&pss).unwrap(), "dsc_sha256_rsapss_3_64_4096");
        let ec = profile(SignatureAlgorithm::Ecdsa, "secp384r1", 384, None);
        assert_eq!(dsc_name_for(&ec).unwrap(), "dsc_sha256_ecdsa_secp384r1");
    }

    #[test]
    fn unknown_signature_algorithm_rejected() {
        let other = profile(SignatureAlgorithm::Other("other:1.3.101.112".into()), "", 256, None);
        assert_eq!(
            dsc_name_for(&other),
            Err(CircuitError::UnsupportedSignatureAlgorithm("other:1.3.101.112".into()))
        );
    }

    #[test]
    fn disclose_names() {
        assert_eq!(disclose_circuit_name(AttestationCategory::Passport), "vc_and_disclose");
        assert_eq!(disclose_circuit_name(AttestationCategory::IdCard), "vc_and_disclose_id");
        assert_eq!(
            disclose_circuit_name(AttestationCategory::NationalQr),
            "vc_and_disclose_aadhaar"
        );
    }

    #[test]
    fn deployed_catalog_parses_and_defaults() {
        let deployed = DeployedCircuits::from_json(r#"{"register":["register_aadhaar"]}"#).unwrap();
        assert!(deployed.has_register("register_aadhaar"));
        assert!(!deployed.has_dsc("register_aadhaar"));
        assert!(deployed.disclose.is_empty());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DocumentSupportStatus::IssuerChainNotFound).unwrap(),
            "\"issuer_chain_not_found\""
        );
        assert_eq!(DocumentSupportStatus::Supported.to_string(), "supported");
    }
}
