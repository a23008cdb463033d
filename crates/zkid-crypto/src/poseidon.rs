//! # Poseidon Hashing and Byte Folding
//!
//! Poseidon over the BN254 scalar field with the circom parameter sets
//! (`light-poseidon`), so every digest here matches what the proving
//! circuits recompute in-circuit.
//!
//! ## Folding
//!
//! [`fold`] turns an arbitrary byte string into one field element:
//!
//! 1. Pack into 31-byte little-endian chunks ([`pack_bytes`]).
//! 2. At most 12 chunks: one Poseidon call over the chunks.
//! 3. More: split into groups of 12 (the last group zero-padded), hash each
//!    group, then fold the group digests the same way.
//!
//! An empty input folds to `Poseidon([0])`.

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};
use zkid_core::constants::{PACK_CHUNK_BYTES, POSEIDON_MAX_ARITY};
use zkid_core::FieldElement;

use crate::error::HashError;

/// Poseidon over 1..=12 field elements.
pub fn poseidon_hash(inputs: &[FieldElement]) -> Result<FieldElement, HashError> {
    if inputs.is_empty() || inputs.len() > POSEIDON_MAX_ARITY {
        return Err(HashError::Arity(inputs.len()));
    }
    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .map_err(|e| HashError::Poseidon(e.to_string()))?;
    let frs: Vec<Fr> = inputs.iter().map(FieldElement::inner).collect();
    hasher
        .hash(&frs)
        .map(FieldElement::from)
        .map_err(|e| HashError::Poseidon(e.to_string()))
}

/// Two-input compression used by both Merkle trees.
pub fn hash_pair(left: FieldElement, right: FieldElement) -> Result<FieldElement, HashError> {
    poseidon_hash(&[left, right])
}

/// Pack bytes into field elements, 31 bytes per element, little-endian
/// within each element, first chunk first.
pub fn pack_bytes(bytes: &[u8]) -> Vec<FieldElement> {
    bytes
        .chunks(PACK_CHUNK_BYTES)
        .map(FieldElement::from_le_bytes_mod_order)
        .collect()
}

/// Fold a byte string into a single field element.
pub fn fold(bytes: &[u8]) -> Result<FieldElement, HashError> {
    let packed = pack_bytes(bytes);
    if packed.is_empty() {
        return poseidon_hash(&[FieldElement::zero()]);
    }
    fold_elements(&packed)
}

/// Fold a non-empty list of field elements into one.
pub fn fold_elements(elements: &[FieldElement]) -> Result<FieldElement, HashError> {
    if elements.is_empty() {
        return Err(HashError::Arity(0));
    }
    if elements.len() <= POSEIDON_MAX_ARITY {
        return poseidon_hash(elements);
    }
    let groups = elements
        .chunks(POSEIDON_MAX_ARITY)
        .map(|group| {
            let mut padded = group.to_vec();
            padded.resize(POSEIDON_MAX_ARITY, FieldElement::zero());
            poseidon_hash(&padded)
        })
        .collect::<Result<Vec<_>, _>>()?;
    fold_elements(&groups)
}

/// Interpret ASCII text as a big-endian integer of at most 31 bytes.
pub fn ascii_to_field(text: &str) -> Result<FieldElement, HashError> {
    if !text.is_ascii() {
        return Err(HashError::InvalidInput(format!(
            "{text:?} contains non-ASCII characters"
        )));
    }
    if text.len() > PACK_CHUNK_BYTES {
        return Err(HashError::InvalidInput(format!(
            "{} bytes exceeds the {PACK_CHUNK_BYTES}-byte field capacity",
            text.len()
        )));
    }
    Ok(FieldElement::from_be_bytes_mod_order(text.as_bytes()))
}
