//! # User Identifiers and Scopes
//!
//! Helpers shared by verifiers consuming disclosure proofs:
//!
//! - [`user_identifier_hash`]: RIPEMD-160 over SHA-256 of the user context
//!   data, rendered as `0x` plus 40 hex digits.
//! - [`cast_to_address`] / [`cast_to_uuid`]: render the user-identifier
//!   public signal in the caller's preferred form.
//! - [`hash_endpoint_with_scope`]: the scope public signal, binding a
//!   verifier endpoint's domain to an application scope string.

use num_bigint::BigUint;
use ripemd::{Digest, Ripemd160};
use zkid_core::constants::{PACK_CHUNK_BYTES, POSEIDON_MAX_ARITY};
use zkid_core::FieldElement;

use crate::digest::sha256;
use crate::error::HashError;
use crate::poseidon::{ascii_to_field, hash_pair, poseidon_hash};

/// `0x` + 40 hex digits of `RIPEMD160(SHA256(context))`.
pub fn user_identifier_hash(user_context_data: &[u8]) -> String {
    let inner = sha256(user_context_data);
    let outer = Ripemd160::digest(inner);
    format!("0x{}", hex::encode(outer))
}

/// `0x` + the value as at least 40 hex digits.
pub fn cast_to_address(value: &BigUint) -> String {
    format!("0x{:0>40}", value.to_str_radix(16))
}

/// The value rendered as an 8-4-4-4-12 UUID.
pub fn cast_to_uuid(value: &BigUint) -> String {
    let hex = format!("{:0>32}", value.to_str_radix(16));
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Strip the scheme and any path, keeping the host part.
pub fn format_endpoint(endpoint: &str) -> &str {
    let stripped = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .unwrap_or(endpoint);
    stripped.split('/').next().unwrap_or_default()
}

/// `Poseidon2(Poseidon(domain chunks), scope)` where each 31-character chunk
/// of the domain and the scope itself are read as big-endian ASCII
/// integers.
///
/// The domain hash is a single Poseidon call, so the domain is limited to
/// 12 chunks (372 characters).
pub fn hash_endpoint_with_scope(endpoint: &str, scope: &str) -> Result<FieldElement, HashError> {
    let domain = format_endpoint(endpoint);
    if !domain.is_ascii() {
        return Err(HashError::InvalidInput(format!(
            "endpoint {domain:?} is not ASCII"
        )));
    }
    let chunks = domain
        .as_bytes()
        .chunks(PACK_CHUNK_BYTES)
        .map(|c| ascii_to_field(std::str::from_utf8(c).unwrap_or_default()))
        .collect::<Result<Vec<_>, _>>()?;
    if chunks.is_empty() || chunks.len() > POSEIDON_MAX_ARITY {
        return Err(HashError::InvalidInput(format!(
            "endpoint must be 1..={} characters",
            PACK_CHUNK_BYTES * POSEIDON_MAX_ARITY
        )));
    }
    let endpoint_hash = poseidon_hash(&chunks)?;
    hash_pair(endpoint_hash, ascii_to_field(scope)?)
}
