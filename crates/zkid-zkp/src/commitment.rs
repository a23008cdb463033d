//! # Commitment/Nullifier Engine
//!
//! Binds a user secret to document content:
//!
//! ```text
//! passport-like:
//!   issuer_leaf = Poseidon2(fold(DSC TBS), fold(CSCA TBS) or 0)
//!   commitment  = Poseidon5(secret, tag, fold(DG1 TLV), fold(eContent digest), issuer_leaf)
//!   nullifier   = Poseidon2(fold(signed attributes), tag)
//!
//! QR credential:
//!   commitment  = Poseidon4(secret, tag, fold(personal info), fold(issuer key))
//!   nullifier   = Poseidon2(fold(signed QR payload), tag)
//! ```
//!
//! `tag` is the attestation id. Nullifiers are document-bound and do not
//! depend on the secret, so the same document cannot register twice under
//! different secrets.
//!
//! ## Security Invariant
//!
//! Every function here is deterministic: no randomness, no clock. The secret
//! is read through [`SecretScalar::to_field`] and never logged.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkid_core::{
    AttestationCategory, DocumentProfile, FieldElement, HashAlgorithm, PassportLikeDocument,
    QrCredential, SecretScalar,
};
use zkid_crypto::digest::{digest, find_embedded_digest, sha256};
use zkid_crypto::{fold, hash_pair, parse_certificate, poseidon_hash, HashError, MetadataError};

use crate::error::CommitmentError;

/// Commitment and nullifier of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCommitment {
    pub commitment: FieldElement,
    pub nullifier: FieldElement,
}

/// Commitment computed against one alternative issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCommitment {
    /// Position in the caller's candidate list.
    pub index: usize,
    /// CSCA key identifier (hex), or a short SHA-256 prefix of a QR issuer key.
    pub candidate_id: String,
    pub commitment: FieldElement,
}

fn tag(category: AttestationCategory) -> FieldElement {
    FieldElement::from_u64(category.attestation_id())
}

/// Commitment and nullifier for any document.
pub fn derive(secret: &SecretScalar, doc: &DocumentProfile) -> Result<DocumentCommitment, CommitmentError> {
    let derived = match doc {
        DocumentProfile::PassportLike(doc) => DocumentCommitment {
            commitment: passport_commitment(secret, doc)?,
            nullifier: passport_nullifier(doc)?,
        },
        DocumentProfile::NationalQrCredential(cred) => DocumentCommitment {
            commitment: qr_commitment(secret, cred)?,
            nullifier: qr_nullifier(cred)?,
        },
    };
    debug!(category = %doc.document_category(), nullifier = %derived.nullifier, "commitment derived");
    Ok(derived)
}

/// `Poseidon2(fold(DSC TBS), fold(CSCA TBS) or 0)`.
pub fn issuer_leaf(dsc_tbs: &[u8], csca_tbs: Option<&[u8]>) -> Result<FieldElement, HashError> {
    let csca = match csca_tbs {
        Some(tbs) => fold(tbs)?,
        None => FieldElement::zero(),
    };
    hash_pair(fold(dsc_tbs)?, csca)
}

/// Hash algorithm of the eContent digest: cached metadata first, else
/// located in the signed attributes.
fn econtent_hash_algorithm(doc: &PassportLikeDocument) -> Result<HashAlgorithm, MetadataError> {
    if let Some(metadata) = &doc.metadata {
        return Ok(metadata.econtent_hash_algorithm);
    }
    find_embedded_digest(&doc.econtent, &doc.signed_attributes)
        .ok_or(MetadataError::DigestNotFound { stage: "econtent" })
}

fn passport_commitment_with(
    secret: &SecretScalar,
    doc: &PassportLikeDocument,
    csca_der: Option<&[u8]>,
) -> Result<FieldElement, CommitmentError> {
    doc.validate()?;
    let leaf = issuer_leaf_for(doc, csca_der)?;
    Ok(poseidon_hash(&[
        secret.to_field(),
        tag(doc.category),
        fold(&doc.dg1_tlv())?,
        fold(&econtent_digest(doc)?)?,
        leaf,
    ])?)
}

/// Issuer leaf of `doc` with an explicit CSCA.
pub(crate) fn issuer_leaf_for(
    doc: &PassportLikeDocument,
    csca_der: Option<&[u8]>,
) -> Result<FieldElement, CommitmentError> {
    let dsc = parse_certificate(&doc.dsc)?;
    let csca = csca_der.map(parse_certificate).transpose()?;
    Ok(issuer_leaf(&dsc.tbs, csca.as_ref().map(|c| c.tbs.as_slice()))?)
}

/// Digest of eContent as embedded in the signed attributes.
pub(crate) fn econtent_digest(doc: &PassportLikeDocument) -> Result<Vec<u8>, MetadataError> {
    Ok(digest(econtent_hash_algorithm(doc)?, &doc.econtent))
}

/// Passport-like commitment using the document's own CSCA, if any.
pub fn passport_commitment(secret: &SecretScalar, doc: &PassportLikeDocument) -> Result<FieldElement, CommitmentError> {
    passport_commitment_with(secret, doc, doc.csca.as_deref())
}

/// Passport-like nullifier.
pub fn passport_nullifier(doc: &PassportLikeDocument) -> Result<FieldElement, CommitmentError> {
    doc.validate()?;
    Ok(hash_pair(fold(&doc.signed_attributes)?, tag(doc.category))?)
}

/// QR credential commitment.
pub fn qr_commitment(secret: &SecretScalar, cred: &QrCredential) -> Result<FieldElement, CommitmentError> {
    qr_commitment_with(secret, cred, &cred.issuer_public_key)
}

fn qr_commitment_with(
    secret: &SecretScalar,
    cred: &QrCredential,
    issuer_key: &[u8],
) -> Result<FieldElement, CommitmentError> {
    cred.validate()?;
    Ok(poseidon_hash(&[
        secret.to_field(),
        tag(AttestationCategory::NationalQr),
        fold(&cred.personal_info)?,
        fold(issuer_key)?,
    ])?)
}

/// QR credential nullifier.
pub fn qr_nullifier(cred: &QrCredential) -> Result<FieldElement, CommitmentError> {
    cred.validate()?;
    Ok(hash_pair(
        fold(&cred.signed_payload)?,
        tag(AttestationCategory::NationalQr),
    )?)
}

/// Commitments of `doc` against each alternative issuer: CSCA certificates
/// (DER or PEM) for passport-like documents, raw issuer keys for QR
/// credentials. Returned in candidate order; inclusion is left to the
/// caller.
pub fn candidate_commitments(
    secret: &SecretScalar,
    doc: &DocumentProfile,
    candidates: &[Vec<u8>],
) -> Result<Vec<CandidateCommitment>, CommitmentError> {
    let mut out = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        let (candidate_id, commitment) = match doc {
            DocumentProfile::PassportLike(doc) => {
                let csca = parse_certificate(candidate)?;
                let commitment = passport_commitment_with(secret, doc, Some(candidate.as_slice()))?;
                (csca.key_identifier_hex(), commitment)
            }
            DocumentProfile::NationalQrCredential(cred) => {
                let id = hex::encode(&sha256(candidate)[..8]);
                (id, qr_commitment_with(secret, cred, candidate)?)
            }
        };
        out.push(CandidateCommitment {
            index,
            candidate_id,
            commitment,
        });
    }
    debug!(
        category = %doc.document_category(),
        candidates = out.len(),
        "candidate commitments computed"
    );
    Ok(out)
}
