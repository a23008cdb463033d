//! # Document Profiles
//!
//! [`DocumentProfile`] is the closed tagged union every pipeline component
//! receives. Components call [`DocumentProfile::document_category()`] once at
//! entry and branch on it; nothing downstream re-inspects the variant.
//!
//! ## Metadata caching
//!
//! Passport-like documents carry an optional [`DocumentMetadata`]: the hash
//! algorithms of each stage of the signed-content chain plus the resolved
//! DSC and CSCA algorithm profiles. It is filled at most once (see
//! [`PassportLikeDocument::cache_metadata`]) and never recomputed after.

use serde::{Deserialize, Serialize};

use crate::algorithm::{AlgorithmProfile, HashAlgorithm};
use crate::category::AttestationCategory;
use crate::error::ZkidError;

/// TD3 (passport) MRZ length.
pub const PASSPORT_MRZ_LEN: usize = 88;

/// TD1 (identity card) MRZ length.
pub const ID_CARD_MRZ_LEN: usize = 90;

/// Polymorphic identity document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentProfile {
    /// Passport or ICAO-compliant identity card.
    PassportLike(PassportLikeDocument),
    /// QR-based national identity credential.
    NationalQrCredential(QrCredential),
}

impl DocumentProfile {
    /// The single discriminant used for all downstream branching.
    pub fn document_category(&self) -> AttestationCategory {
        match self {
            Self::PassportLike(doc) => doc.category,
            Self::NationalQrCredential(_) => AttestationCategory::NationalQr,
        }
    }

    /// Resolved signing-chain metadata, for passport-like documents.
    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        match self {
            Self::PassportLike(doc) => doc.metadata.as_ref(),
            Self::NationalQrCredential(_) => None,
        }
    }
}

/// Resolved signing-chain description of a passport-like document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Hash used for the data-group digests inside eContent.
    pub dg_hash_algorithm: HashAlgorithm,
    /// Hash of eContent embedded in the signed attributes.
    pub econtent_hash_algorithm: HashAlgorithm,
    /// Hash the DSC signature was computed over.
    pub signed_attr_hash_algorithm: HashAlgorithm,
    /// Algorithm the DSC key signed the signed attributes with.
    pub dsc_profile: AlgorithmProfile,
    /// Algorithm the CSCA key signed the DSC with, once the chain resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csca_profile: Option<AlgorithmProfile>,
    /// Whether an issuing CSCA certificate was found and verified.
    pub csca_found: bool,
    /// Why the CSCA did not resolve, when `csca_found` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csca_error: Option<String>,
}

/// A passport or identity card read over NFC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportLikeDocument {
    /// `Passport` or `IdCard`.
    pub category: AttestationCategory,
    /// Machine-readable zone, concatenated without line breaks.
    pub mrz: String,
    /// eContent (the LDS security object's signed content).
    #[serde(with = "hex::serde")]
    pub econtent: Vec<u8>,
    /// DER signed attributes, which embed the eContent digest.
    #[serde(with = "hex::serde")]
    pub signed_attributes: Vec<u8>,
    /// DSC signature over the signed attributes.
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
    /// Document-signing certificate, DER.
    #[serde(with = "hex::serde")]
    pub dsc: Vec<u8>,
    /// Country-signing certificate, DER, when known.
    #[serde(default, with = "hex_opt", skip_serializing_if = "Option::is_none")]
    pub csca: Option<Vec<u8>>,
    /// Cached chain metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

impl PassportLikeDocument {
    /// Check category and MRZ shape.
    pub fn validate(&self) -> Result<(), ZkidError> {
        let expected = match self.category {
            AttestationCategory::Passport => PASSPORT_MRZ_LEN,
            AttestationCategory::IdCard => ID_CARD_MRZ_LEN,
            AttestationCategory::NationalQr => {
                return Err(ZkidError::InvalidDocument(
                    "national QR credentials are not passport-like".into(),
                ))
            }
        };
        if self.mrz.len() != expected || !self.mrz.is_ascii() {
            return Err(ZkidError::InvalidDocument(format!(
                "{} MRZ must be {expected} ASCII characters, got {}",
                self.category,
                self.mrz.len()
            )));
        }
        if self.econtent.is_empty() || self.signed_attributes.is_empty() {
            return Err(ZkidError::InvalidDocument(
                "eContent and signed attributes are required".into(),
            ));
        }
        Ok(())
    }

    /// DG1 as stored on the chip: the TLV header followed by the MRZ.
    pub fn dg1_tlv(&self) -> Vec<u8> {
        let mrz = self.mrz.as_bytes();
        let header: [u8; 5] = match self.category {
            AttestationCategory::IdCard => [0x61, 0x5D, 0x5F, 0x1F, 0x5A],
            _ => [0x61, 0x5B, 0x5F, 0x1F, 0x58],
        };
        let mut out = Vec::with_capacity(header.len() + mrz.len());
        out.extend_from_slice(&header);
        out.extend_from_slice(mrz);
        out
    }

    /// Store resolved metadata unless already present, returning the cached
    /// value.
    pub fn cache_metadata(&mut self, metadata: DocumentMetadata) -> &DocumentMetadata {
        self.metadata.get_or_insert(metadata)
    }
}

/// Personal fields carried by a QR credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPersonalInfo {
    pub name: String,
    /// `YYYYMMDD`.
    pub date_of_birth: String,
    /// Single character, `M`, `F` or `T`.
    pub gender: String,
    /// Last four digits of the national id number.
    pub id_number_tail: String,
    pub pincode: String,
    pub state: String,
    /// Last four digits of the registered phone number.
    pub phone_tail: String,
}

/// A QR-based national identity credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCredential {
    /// Packed personal-info payload as signed by the issuer.
    #[serde(with = "hex::serde")]
    pub personal_info: Vec<u8>,
    /// Full signed QR payload (data plus signature) as scanned.
    #[serde(with = "hex::serde")]
    pub signed_payload: Vec<u8>,
    /// Issuer public key bytes (RSA modulus, big-endian).
    #[serde(with = "hex::serde")]
    pub issuer_public_key: Vec<u8>,
    /// Decoded personal fields.
    pub personal: QrPersonalInfo,
}

impl QrCredential {
    /// Check that the signed material is present.
    pub fn validate(&self) -> Result<(), ZkidError> {
        if self.personal_info.is_empty() || self.signed_payload.is_empty() {
            return Err(ZkidError::InvalidDocument(
                "QR credential payload is empty".into(),
            ));
        }
        if self.issuer_public_key.is_empty() {
            return Err(ZkidError::InvalidDocument(
                "QR credential has no issuer key".into(),
            ));
        }
        Ok(())
    }
}

mod hex_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => s.serialize_str(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| hex::decode(raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::SignatureAlgorithm;

    fn passport() -> PassportLikeDocument {
        PassportLikeDocument {
            category: AttestationCategory::Passport,
            mrz: format!("{:<44}{:<44}", "P<UTOERIKSSON<<ANNA<MARIA", "L898902C36UTO7408122F1204159ZE184226B<<<<<10")
                .replace(' ', "<"),
            econtent: vec![1, 2, 3],
            signed_attributes: vec![4, 5, 6],
            signature: vec![7],
            dsc: vec![8],
            csca: None,
            metadata: None,
        }
    }

    fn metadata(found: bool) -> DocumentMetadata {
        let profile = AlgorithmProfile {
            hash_algorithm: HashAlgorithm::Sha256,
            signature_algorithm: SignatureAlgorithm::Rsa,
            curve_or_exponent: "65537".into(),
            bit_length: 2048,
            salt_length: None,
        };
        DocumentMetadata {
            dg_hash_algorithm: HashAlgorithm::Sha256,
            econtent_hash_algorithm: HashAlgorithm::Sha256,
            signed_attr_hash_algorithm: HashAlgorithm::Sha256,
            dsc_profile: profile,
            csca_profile: None,
            csca_found: found,
            csca_error: None,
        }
    }

    #[test]
    fn passport_validates_and_builds_dg1() {
        let doc = passport();
        doc.validate().unwrap();
        let dg1 = doc.dg1_tlv();
        assert_eq!(&dg1[..5], &[0x61, 0x5B, 0x5F, 0x1F, 0x58]);
        assert_eq!(dg1.len(), 93);
    }

    #[test]
    fn short_mrz_rejected() {
        let mut doc = passport();
        doc.mrz.truncate(80);
        assert!(matches!(doc.validate(), Err(ZkidError::InvalidDocument(_))));
        doc.category = AttestationCategory::IdCard;
        assert!(doc.validate().is_err());
    }

    #[test]
    fn metadata_cached_once() {
        let mut doc = passport();
        assert!(!doc.cache_metadata(metadata(false)).csca_found);
        assert!(!doc.cache_metadata(metadata(true)).csca_found);
    }

    #[test]
    fn profile_tag_roundtrip() {
        let profile = DocumentProfile::PassportLike(passport());
        assert_eq!(profile.document_category(), AttestationCategory::Passport);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"kind\":\"passport_like\""));
        let back: DocumentProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
