//! # Passport Signed-Content Chain
//!
//! Recovers [`DocumentMetadata`] for a passport-like document by walking its
//! signed-content chain:
//!
//! 1. DG1 (TLV header + MRZ) is hashed into eContent: find the algorithm.
//! 2. eContent is hashed into the signed attributes: find the algorithm.
//! 3. The DSC signed the signed attributes: resolve the signature profile.
//! 4. The CSCA signed the DSC: resolve the issuer profile, when a CSCA is
//!    supplied. A CSCA that does not decode or cannot verify the DSC leaves
//!    the chain unresolved (`csca_found = false`) rather than failing, with
//!    the reason kept in `csca_error`.

use tracing::{info, warn};
use zkid_core::{DocumentMetadata, PassportLikeDocument};

use crate::digest::find_embedded_digest;
use crate::error::MetadataError;
use crate::resolver::{resolve_certificate, resolve_signature};
use crate::x509::parse_certificate;

/// Resolve the chain metadata of `doc` without caching it.
pub fn resolve_metadata(doc: &PassportLikeDocument) -> Result<DocumentMetadata, MetadataError> {
    doc.validate()?;

    let dg_hash_algorithm = find_embedded_digest(&doc.dg1_tlv(), &doc.econtent)
        .ok_or(MetadataError::DigestNotFound { stage: "dg1" })?;
    let econtent_hash_algorithm = find_embedded_digest(&doc.econtent, &doc.signed_attributes)
        .ok_or(MetadataError::DigestNotFound { stage: "econtent" })?;

    let dsc = parse_certificate(&doc.dsc)?;
    let dsc_profile = resolve_signature(&doc.signed_attributes, &doc.signature, &dsc, None)?;

    let csca = match &doc.csca {
        Some(csca_der) => match parse_certificate(csca_der) {
            Ok(csca) => resolve_certificate(&dsc, &csca).map_err(|error| {
                warn!(dsc = %dsc.subject, csca = %csca.subject, %error, "CSCA does not verify DSC");
                format!("CSCA {} does not verify the DSC: {error}", csca.subject)
            }),
            Err(error) => {
                warn!(dsc = %dsc.subject, %error, "CSCA certificate unreadable");
                Err(format!("CSCA certificate unreadable: {error}"))
            }
        },
        None => Err("no CSCA certificate supplied".to_string()),
    };
    let (csca_profile, csca_error) = match csca {
        Ok(profile) => (Some(profile), None),
        Err(error) => (None, Some(error)),
    };

    info!(
        category = %doc.category,
        dg = %dg_hash_algorithm,
        econtent = %econtent_hash_algorithm,
        dsc = %dsc_profile,
        csca_found = csca_profile.is_some(),
        "document metadata resolved"
    );

    Ok(DocumentMetadata {
        dg_hash_algorithm,
        econtent_hash_algorithm,
        signed_attr_hash_algorithm: dsc_profile.hash_algorithm,
        csca_found: csca_profile.is_some(),
        dsc_profile,
        csca_profile,
        csca_error,
    })
}

/// Resolve and cache metadata on first use. Later calls return the cached
/// value without recomputing.
pub fn ensure_metadata(doc: &mut PassportLikeDocument) -> Result<&DocumentMetadata, MetadataError> {
    let metadata = match doc.metadata.take() {
        Some(cached) => cached,
        None => resolve_metadata(doc)?,
    };
    Ok(doc.cache_metadata(metadata))
}
