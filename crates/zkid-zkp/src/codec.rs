//! # Attribute Codec
//!
//! Fixed-width byte packing between reveal buffers and field elements.
//!
//! Every field element carries up to 31 bytes, little-endian: byte `i` of a
//! chunk is `(element >> 8i) & 0xFF`. The first chunk is the first element.
//! Chunk widths per category live in [`crate::layout`]; the forbidden
//! country list always uses four full 31-byte chunks.

use serde::{Deserialize, Serialize};
use zkid_core::constants::{COUNTRY_CODE_LEN, MAX_FORBIDDEN_COUNTRIES, PACK_CHUNK_BYTES};
use zkid_core::{AttestationCategory, FieldElement};
use zkid_crypto::pack_bytes;

use crate::error::CodecError;
use crate::layout::layout;

/// Chunk widths of the packed forbidden-country list.
pub const COUNTRY_LIST_WIDTHS: [usize; 4] = [PACK_CHUNK_BYTES; 4];

/// A packed forbidden-country list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedCountries {
    /// `MAX_FORBIDDEN_COUNTRIES * 3` bytes, zero padded.
    pub bytes: Vec<u8>,
    /// The bytes packed into four field elements.
    pub elements: Vec<FieldElement>,
}

/// Pack up to 40 three-letter country codes.
pub fn pack_countries<S: AsRef<str>>(codes: &[S]) -> Result<PackedCountries, CodecError> {
    if codes.len() > MAX_FORBIDDEN_COUNTRIES {
        return Err(CodecError::TooManyCountries {
            count: codes.len(),
            max: MAX_FORBIDDEN_COUNTRIES,
        });
    }
    let mut bytes = vec![0u8; MAX_FORBIDDEN_COUNTRIES * COUNTRY_CODE_LEN];
    for (i, code) in codes.iter().enumerate() {
        let code = code.as_ref();
        if code.len() != COUNTRY_CODE_LEN || !code.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(CodecError::InvalidCountryCode(code.to_string()));
        }
        bytes[i * COUNTRY_CODE_LEN..(i + 1) * COUNTRY_CODE_LEN].copy_from_slice(code.as_bytes());
    }
    let elements = pack_bytes(&bytes);
    Ok(PackedCountries { bytes, elements })
}

/// Expand packed elements into bytes. Element `i` contributes
/// `widths[i]` bytes (31 past the end of `widths`).
pub fn unpack_reveal(elements: &[FieldElement], widths: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(PACK_CHUNK_BYTES);
        let le = element.to_le_bytes();
        out.extend(le.iter().take(width));
        // Widths above 32 bytes read zero bytes past the element.
        out.extend(std::iter::repeat(0).take(width.saturating_sub(le.len())));
    }
    out
}

/// One character per byte.
pub fn render(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Unpack a packed forbidden-country list, dropping NUL padding.
pub fn unpack_countries(elements: &[FieldElement]) -> Vec<String> {
    let bytes: Vec<u8> = unpack_reveal(elements, &COUNTRY_LIST_WIDTHS)
        .into_iter()
        .filter(|&b| b != 0)
        .collect();
    bytes
        .chunks_exact(COUNTRY_CODE_LEN)
        .map(render)
        .collect()
}

/// Pack a category's reveal buffer into its public-signal elements.
pub fn pack_reveal(category: AttestationCategory, buffer: &[u8]) -> Result<Vec<FieldElement>, CodecError> {
    let layout = layout(category);
    if buffer.len() != layout.len {
        return Err(CodecError::BufferLength {
            category,
            expected: layout.len,
            actual: buffer.len(),
        });
    }
    Ok(pack_bytes(buffer))
}

/// Unpack a category's reveal buffer from its public-signal elements.
pub fn unpack_category(category: AttestationCategory, elements: &[FieldElement]) -> Vec<u8> {
    unpack_reveal(elements, layout(category).chunk_widths)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn code() -> impl Strategy<Value = String> {
        "[A-Z]{3}"
    }

    proptest! {
        #[test]
        fn country_lists_roundtrip(codes in proptest::collection::vec(code(), 0..=40)) {
            let packed = pack_countries(codes.as_slice()).unwrap();
            prop_assert_eq!(unpack_countries(&packed.elements), codes);
        }

        #[test]
        fn qr_buffers_roundtrip(buffer in proptest::collection::vec(any::<u8>(), 119)) {
            let elements = pack_reveal(AttestationCategory::NationalQr, &buffer).unwrap();
            prop_assert_eq!(unpack_category(AttestationCategory::NationalQr, &elements), buffer);
        }
    }
}
