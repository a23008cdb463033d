//! # Digest Dispatch
//!
//! SHA-1 and SHA-2 family hashing keyed by [`HashAlgorithm`], plus the
//! embedded-digest search used to recover which hash each stage of a
//! passport's signed-content chain was computed with.

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use zkid_core::HashAlgorithm;

/// Order in which hash algorithms are tried when nothing is declared.
pub const HASH_SEARCH_ORDER: [HashAlgorithm; 5] = [
    HashAlgorithm::Sha256,
    HashAlgorithm::Sha1,
    HashAlgorithm::Sha384,
    HashAlgorithm::Sha512,
    HashAlgorithm::Sha224,
];

/// Hash `data` with `algorithm`.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// SHA-256 convenience.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Find the first algorithm in [`HASH_SEARCH_ORDER`] whose digest of
/// `content` occurs verbatim inside `container`.
pub fn find_embedded_digest(content: &[u8], container: &[u8]) -> Option<HashAlgorithm> {
    HASH_SEARCH_ORDER.into_iter().find(|alg| {
        let d = digest(*alg, content);
        container.windows(d.len()).any(|w| w == d.as_slice())
    })
}
