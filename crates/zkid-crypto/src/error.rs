//! # Crypto Errors
//!
//! One `thiserror` enum per concern. Malformed input and parameter
//! validation failures are errors; absence outcomes (a key missing from a
//! sparse tree, a commitment missing from the registration tree) are not and
//! never appear here.

use thiserror::Error;
use zkid_core::{FieldError, ZkidError};

/// Failure inside the Poseidon sponge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The requested input count has no circom parameter set.
    #[error("poseidon arity {0} is outside 1..=12")]
    Arity(usize),

    /// The backend rejected the input.
    #[error("poseidon hash failed: {0}")]
    Poseidon(String),

    /// Text input to a packed hash was not ASCII or was too long.
    #[error("invalid hash input: {0}")]
    InvalidInput(String),
}

/// Failure decoding a certificate.
#[derive(Error, Debug)]
pub enum CertificateError {
    /// DER, PEM or X.509 structure could not be decoded.
    #[error("certificate malformed: {0}")]
    Malformed(String),

    /// The public key is neither RSA nor EC on a supported curve.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
}

/// Failure recovering the algorithm a signature was produced with.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// No candidate in the search order verified the signature.
    #[error("signature algorithm not resolved for issuer {issuer} after {attempts} candidates")]
    SignatureAlgorithmNotResolved {
        /// Issuer subject name.
        issuer: String,
        /// Number of candidates tried.
        attempts: usize,
    },

    /// The RSA modulus is above the supported bound.
    #[error("key length {bits} bits exceeds the supported maximum of {max} bits")]
    KeyLengthUnsupported {
        /// Modulus length.
        bits: u32,
        /// Supported maximum.
        max: u32,
    },

    /// The signature buffer cannot belong to the issuer key.
    #[error("invalid signature length: {actual} bytes (key size {expected} bytes)")]
    InvalidSignatureLength {
        /// Key size in bytes.
        expected: usize,
        /// Signature size in bytes.
        actual: usize,
    },

    /// The issuer key could not be loaded for verification.
    #[error("issuer key rejected: {0}")]
    InvalidKey(String),
}

/// Failure importing, mutating or querying a Merkle tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The serialized snapshot does not decode.
    #[error("malformed tree snapshot: {0}")]
    MalformedSnapshot(String),

    /// Exported internal nodes disagree with the nodes rebuilt from leaves.
    #[error("tree snapshot inconsistent at level {level}, index {index}")]
    InconsistentSnapshot {
        /// Level of the first mismatch (0 = leaves).
        level: usize,
        /// Node index within that level.
        index: usize,
    },

    /// A leaf index is past the end of the tree.
    #[error("leaf index {index} out of range for tree of size {size}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Tree size.
        size: usize,
    },

    /// The tree is deeper than the circuit depth.
    #[error("tree depth {depth} exceeds maximum {max}")]
    DepthExceeded {
        /// Actual depth.
        depth: usize,
        /// Circuit maximum.
        max: usize,
    },

    /// A sparse tree already holds the key.
    #[error("key {0} already present in sparse tree")]
    KeyExists(String),

    /// A node value failed to parse.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Node hashing failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Failure resolving the signed-content chain of a passport-like document.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The document failed structural validation.
    #[error(transparent)]
    Document(#[from] ZkidError),

    /// No supported hash of `stage` input was found embedded in the next
    /// stage.
    #[error("no supported {stage} digest found in the signed content chain")]
    DigestNotFound {
        /// `dg1` or `econtent`.
        stage: &'static str,
    },

    /// The DSC or CSCA certificate failed to decode.
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// The DSC signature over the signed attributes did not resolve.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
