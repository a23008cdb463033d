//! # Circuit Inputs
//!
//! Flat records handed to the proving subsystem. Scalars serialize as
//! decimal strings and byte arrays as arrays of decimal strings, which is
//! what witness generators read.
//!
//! ## Conventions
//!
//! - Messages a circuit hashes are SHA-padded and zero-filled to a fixed
//!   buffer; the padded length travels alongside.
//! - RSA integers are split into 120-bit little-endian limbs, EC
//!   coordinates and scalars into 64-bit limbs.
//! - Dates are digit arrays: `YYMMDD` for passport-like documents,
//!   `YYYYMMDD` for QR credentials.
//!
//! ## Security Invariant
//!
//! The secret is carried as [`SecretSignal`], whose `Debug` is redacted and
//! whose buffer is zeroized on drop.

use std::fmt;

use chrono::{Datelike, NaiveDate, Utc};
use num_bigint::BigUint;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};
use zkid_core::{
    AttestationCategory, DocumentProfile, FieldElement, HashAlgorithm, PassportLikeDocument,
    PublicKeyMaterial, QrCredential, SecretScalar,
};
use zkid_crypto::digest::digest;
use zkid_crypto::{
    fold, parse_certificate, public_key_components, signature_components, MetadataError,
};

use crate::codec::pack_countries;
use crate::commitment::{econtent_digest, issuer_leaf_for};
use crate::error::{CircuitError, CodecError, CommitmentError};
use crate::layout::{layout, Attribute};
use crate::registration::TreeProof;
use crate::sanctions::SanctionsProof;

/// Fixed eContent buffer.
pub const MAX_ECONTENT_PADDED_LEN: usize = 384;
/// Fixed signed-attributes buffer.
pub const MAX_SIGNED_ATTR_PADDED_LEN: usize = 256;
/// Fixed DSC TBS buffer.
pub const MAX_DSC_TBS_PADDED_LEN: usize = 1792;
/// Fixed QR personal-data buffer.
pub const MAX_QR_DATA_PADDED_LEN: usize = 1280;
/// RSA limb width.
pub const RSA_WORD_BITS: u64 = 120;
/// EC limb width.
pub const EC_WORD_BITS: u64 = 64;

/// The user secret as a circuit signal.
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretSignal(String);

impl SecretSignal {
    pub fn new(secret: &SecretScalar) -> Self {
        Self(secret.to_field().to_decimal())
    }

    /// The decimal literal, for the witness generator only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretSignal([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

/// Bytes as decimal strings.
pub fn byte_signals(bytes: &[u8]) -> Vec<String> {
    bytes.iter().map(u8::to_string).collect()
}

/// SHA-pad `message` for `hash` and zero-fill to `max_len`. Returns the
/// buffer and the padded length.
pub fn sha_pad(message: &[u8], hash: HashAlgorithm, max_len: usize) -> Result<(Vec<u8>, usize), CodecError> {
    let (block, length_field) = match hash {
        HashAlgorithm::Sha384 | HashAlgorithm::Sha512 => (128usize, 16usize),
        _ => (64, 8),
    };
    let mut padded = message.to_vec();
    padded.push(0x80);
    while padded.len() % block != block - length_field {
        padded.push(0);
    }
    let bit_len = (message.len() as u128) * 8;
    let be = bit_len.to_be_bytes();
    padded.extend_from_slice(&be[be.len() - length_field..]);
    let padded_len = padded.len();
    if padded_len > max_len {
        return Err(CodecError::PaddingOverflow {
            needed: padded_len,
            max: max_len,
        });
    }
    padded.resize(max_len, 0);
    Ok((padded, padded_len))
}

/// Split `value` into `words` little-endian limbs of `word_bits` bits.
pub fn split_to_words(value: &BigUint, word_bits: u64, words: usize) -> Result<Vec<String>, CodecError> {
    let capacity = word_bits * words as u64;
    if value.bits() > capacity {
        return Err(CodecError::WordOverflow {
            bits: value.bits(),
            capacity,
        });
    }
    let mask = (BigUint::from(1u8) << word_bits) - 1u8;
    let mut rest = value.clone();
    let mut out = Vec::with_capacity(words);
    for _ in 0..words {
        out.push((&rest & &mask).to_string());
        rest >>= word_bits;
    }
    Ok(out)
}

/// Limbs of key or signature components: one block per component.
fn limbs(key: &PublicKeyMaterial, components: &[BigUint]) -> Result<Vec<String>, CodecError> {
    let word_bits = if key.is_rsa() { RSA_WORD_BITS } else { EC_WORD_BITS };
    let words = u64::from(key.bit_length()).div_ceil(word_bits) as usize;
    let mut out = Vec::with_capacity(words * components.len());
    for component in components {
        out.extend(split_to_words(component, word_bits, words)?);
    }
    Ok(out)
}

/// Digit array of `date` for `category`.
pub fn current_date_digits(date: NaiveDate, category: AttestationCategory) -> Vec<String> {
    let text = if category.is_passport_like() {
        format!("{:02}{:02}{:02}", date.year().rem_euclid(100), date.month(), date.day())
    } else {
        format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
    };
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d.to_string())
        .collect()
}

/// Today in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn offset_of(needle: &[u8], haystack: &[u8], stage: &'static str) -> Result<usize, MetadataError> {
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
        .ok_or(MetadataError::DigestNotFound { stage })
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration circuit input for a passport-like document.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterInputs {
    pub secret: SecretSignal,
    pub attestation_id: String,
    pub dg1: Vec<String>,
    pub dg1_hash_offset: usize,
    pub econtent: Vec<String>,
    pub econtent_padded_length: usize,
    pub signed_attr: Vec<String>,
    pub signed_attr_padded_length: usize,
    pub signed_attr_econtent_hash_offset: usize,
    pub pubkey_dsc: Vec<String>,
    pub signature_passport: Vec<String>,
    pub raw_dsc: Vec<String>,
    pub raw_dsc_actual_length: usize,
    pub csca_tree_leaf: FieldElement,
}

impl RegisterInputs {
    /// Build from a document whose chain metadata is resolved.
    pub fn build(secret: &SecretScalar, doc: &PassportLikeDocument) -> Result<Self, CommitmentError> {
        doc.validate()?;
        let metadata = doc.metadata.as_ref().ok_or(CircuitError::MetadataMissing)?;
        let dsc = parse_certificate(&doc.dsc)?;
        let csca_tree_leaf = match &doc.csca {
            Some(der) => fold(&parse_certificate(der)?.tbs)?,
            None => FieldElement::zero(),
        };

        let dg1 = doc.dg1_tlv();
        let dg1_hash_offset = offset_of(&digest(metadata.dg_hash_algorithm, &dg1), &doc.econtent, "dg1")?;
        let signed_attr_econtent_hash_offset =
            offset_of(&econtent_digest(doc)?, &doc.signed_attributes, "econtent")?;
        let (econtent, econtent_padded_length) =
            sha_pad(&doc.econtent, metadata.econtent_hash_algorithm, MAX_ECONTENT_PADDED_LEN)?;
        let (signed_attr, signed_attr_padded_length) = sha_pad(
            &doc.signed_attributes,
            metadata.signed_attr_hash_algorithm,
            MAX_SIGNED_ATTR_PADDED_LEN,
        )?;
        if dsc.tbs.len() > MAX_DSC_TBS_PADDED_LEN {
            return Err(CodecError::PaddingOverflow {
                needed: dsc.tbs.len(),
                max: MAX_DSC_TBS_PADDED_LEN,
            }
            .into());
        }
        let mut raw_dsc = dsc.tbs.clone();
        raw_dsc.resize(MAX_DSC_TBS_PADDED_LEN, 0);

        Ok(Self {
            secret: SecretSignal::new(secret),
            attestation_id: doc.category.attestation_id().to_string(),
            dg1: byte_signals(&dg1),
            dg1_hash_offset,
            econtent: byte_signals(&econtent),
            econtent_padded_length,
            signed_attr: byte_signals(&signed_attr),
            signed_attr_padded_length,
            signed_attr_econtent_hash_offset,
            pubkey_dsc: limbs(&dsc.public_key, &public_key_components(&dsc.public_key)?)?,
            signature_passport: limbs(&dsc.public_key, &signature_components(&dsc.public_key, &doc.signature)?)?,
            raw_dsc: byte_signals(&raw_dsc),
            raw_dsc_actual_length: dsc.tbs.len(),
            csca_tree_leaf,
        })
    }
}

/// Registration circuit input for a QR credential.
#[derive(Debug, Clone, Serialize)]
pub struct QrRegisterInputs {
    pub secret: SecretSignal,
    pub attestation_id: String,
    pub qr_data_padded: Vec<String>,
    pub qr_data_padded_length: usize,
    pub pubkey: Vec<String>,
}

impl QrRegisterInputs {
    pub fn build(secret: &SecretScalar, cred: &QrCredential) -> Result<Self, CommitmentError> {
        cred.validate()?;
        let (padded, padded_len) = sha_pad(&cred.personal_info, HashAlgorithm::Sha256, MAX_QR_DATA_PADDED_LEN)?;
        let modulus = BigUint::from_bytes_be(&cred.issuer_public_key);
        let words = modulus.bits().div_ceil(RSA_WORD_BITS) as usize;
        Ok(Self {
            secret: SecretSignal::new(secret),
            attestation_id: AttestationCategory::NationalQr.attestation_id().to_string(),
            qr_data_padded: byte_signals(&padded),
            qr_data_padded_length: padded_len,
            pubkey: split_to_words(&modulus, RSA_WORD_BITS, words)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Issuer chain
// ---------------------------------------------------------------------------

/// Issuer-chain circuit input: the CSCA signature over the DSC, plus the
/// CSCA's membership in the issuer tree.
#[derive(Debug, Clone, Serialize)]
pub struct DscInputs {
    pub raw_dsc: Vec<String>,
    pub raw_dsc_padded_length: usize,
    pub csca_pubkey: Vec<String>,
    pub signature: Vec<String>,
    pub csca_tree_leaf: FieldElement,
    pub merkle_root: FieldElement,
    pub leaf_depth: usize,
    pub path: Vec<String>,
    pub siblings: Vec<FieldElement>,
}

impl DscInputs {
    pub fn build(doc: &PassportLikeDocument, csca_tree: &TreeProof) -> Result<Self, CommitmentError> {
        let metadata = doc.metadata.as_ref().ok_or(CircuitError::MetadataMissing)?;
        let (Some(csca_profile), Some(csca_der)) = (metadata.csca_profile.as_ref(), doc.csca.as_ref()) else {
            return Err(CircuitError::IssuerChainNotFound.into());
        };
        let dsc = parse_certificate(&doc.dsc)?;
        let csca = parse_certificate(csca_der)?;
        let (raw_dsc, raw_dsc_padded_length) =
            sha_pad(&dsc.tbs, csca_profile.hash_algorithm, MAX_DSC_TBS_PADDED_LEN)?;
        Ok(Self {
            raw_dsc: byte_signals(&raw_dsc),
            raw_dsc_padded_length,
            csca_pubkey: limbs(&csca.public_key, &public_key_components(&csca.public_key)?)?,
            signature: limbs(&csca.public_key, &signature_components(&csca.public_key, &dsc.signature)?)?,
            csca_tree_leaf: fold(&csca.tbs)?,
            merkle_root: csca_tree.root,
            leaf_depth: csca_tree.leaf_depth,
            path: byte_signals(&csca_tree.path),
            siblings: csca_tree.siblings.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Disclosure
// ---------------------------------------------------------------------------

/// What the verifier asks to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscloseRequest {
    pub attributes: Vec<Attribute>,
    /// Always revealed; `0` disables the age check.
    pub minimum_age: u8,
    pub forbidden_countries: Vec<String>,
    pub scope: FieldElement,
    pub user_identifier: FieldElement,
    pub current_date: NaiveDate,
}

/// Disclosure circuit input.
#[derive(Debug, Clone, Serialize)]
pub struct DiscloseInputs {
    pub secret: SecretSignal,
    pub attestation_id: String,
    /// DG1 TLV, or the QR personal data.
    pub document_data: Vec<String>,
    /// `fold(eContent digest)` for passport-like documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub econtent_hash_folded: Option<FieldElement>,
    /// Issuer leaf for passport-like documents, `fold(issuer key)` for QR.
    pub issuer_binding: FieldElement,
    pub merkle_root: FieldElement,
    pub leaf_depth: usize,
    pub path: Vec<String>,
    pub siblings: Vec<FieldElement>,
    pub selector: String,
    pub majority: Vec<String>,
    pub current_date: Vec<String>,
    pub forbidden_countries_list: Vec<String>,
    pub ofac: Vec<SanctionsProof>,
    pub scope: FieldElement,
    pub user_identifier: FieldElement,
}

impl DiscloseInputs {
    pub fn build(
        secret: &SecretScalar,
        doc: &DocumentProfile,
        registration: &TreeProof,
        sanctions: &[SanctionsProof],
        request: &DiscloseRequest,
    ) -> Result<Self, CommitmentError> {
        let category = doc.document_category();
        let (document_data, econtent_hash_folded, issuer_binding) = match doc {
            DocumentProfile::PassportLike(doc) => {
                doc.validate()?;
                (
                    doc.dg1_tlv(),
                    Some(fold(&econtent_digest(doc)?)?),
                    issuer_leaf_for(doc, doc.csca.as_deref())?,
                )
            }
            DocumentProfile::NationalQrCredential(cred) => {
                cred.validate()?;
                (cred.personal_info.clone(), None, fold(&cred.issuer_public_key)?)
            }
        };
        let selector = layout(category).selector(&request.attributes)?;
        let countries = pack_countries(request.forbidden_countries.as_slice())?;
        Ok(Self {
            secret: SecretSignal::new(secret),
            attestation_id: category.attestation_id().to_string(),
            document_data: byte_signals(&document_data),
            econtent_hash_folded,
            issuer_binding,
            merkle_root: registration.root,
            leaf_depth: registration.leaf_depth,
            path: byte_signals(&registration.path),
            siblings: registration.siblings.clone(),
            selector: selector.to_string(),
            majority: byte_signals(format!("{:02}", request.minimum_age).as_bytes()),
            current_date: current_date_digits(request.current_date, category),
            forbidden_countries_list: byte_signals(&countries.bytes),
            ofac: sanctions.to_vec(),
            scope: request.scope,
            user_identifier: request.user_identifier,
        })
    }
}
