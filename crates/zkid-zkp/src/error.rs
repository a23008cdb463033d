//! # Circuit Layer Errors
//!
//! Parameter-validation failures (country lists, selector attributes,
//! signal arrays) fail fast before any hashing. Resolution failures are
//! errors here because these call sites assume success; the support
//! validator turns them into status values instead.

use thiserror::Error;
use zkid_core::{AttestationCategory, FieldError, ZkidError};
use zkid_crypto::{CertificateError, HashError, MetadataError, ResolutionError, TreeError};

use crate::layout::Attribute;

/// Failure packing or unpacking attribute buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// More country codes than the forbidden-list capacity.
    #[error("{count} country codes exceed the maximum of {max}")]
    TooManyCountries {
        /// Codes supplied.
        count: usize,
        /// Capacity.
        max: usize,
    },

    /// A country code is not exactly three ASCII characters.
    #[error("invalid country code {0:?}: expected exactly 3 ASCII characters")]
    InvalidCountryCode(String),

    /// The attribute has no range in this category's reveal buffer.
    #[error("attribute {attribute} cannot be disclosed for {category}")]
    AttributeNotDisclosable {
        /// Requested attribute.
        attribute: Attribute,
        /// Document category.
        category: AttestationCategory,
    },

    /// A reveal buffer has the wrong length for its category.
    #[error("reveal buffer for {category} must be {expected} bytes, got {actual}")]
    BufferLength {
        /// Document category.
        category: AttestationCategory,
        /// Layout length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The public signal array is too short.
    #[error("public signal {index} missing (only {len} signals)")]
    MissingSignal {
        /// Required index.
        index: usize,
        /// Signals supplied.
        len: usize,
    },

    /// SHA padding does not fit the circuit's fixed buffer.
    #[error("padded message needs {needed} bytes, circuit buffer holds {max}")]
    PaddingOverflow {
        /// Padded length.
        needed: usize,
        /// Buffer capacity.
        max: usize,
    },

    /// An integer does not fit the requested limbs.
    #[error("{bits}-bit integer does not fit {capacity} bits of limbs")]
    WordOverflow {
        /// Integer width.
        bits: u64,
        /// Limb capacity.
        capacity: u64,
    },

    /// A public signal is not a field element literal.
    #[error(transparent)]
    InvalidSignal(#[from] FieldError),
}

/// Failure computing a circuit identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// The signature algorithm has no circuit family.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedSignatureAlgorithm(String),

    /// The document's chain metadata has not been resolved.
    #[error("document metadata missing")]
    MetadataMissing,

    /// The CSCA did not verify the DSC, so there is no issuer profile.
    #[error("issuer chain not found")]
    IssuerChainNotFound,

    /// Issuer circuits only exist for passport-like documents.
    #[error("no issuer circuit for {0}")]
    NoIssuerCircuit(AttestationCategory),
}

/// Failure deriving commitments, nullifiers or circuit inputs.
#[derive(Error, Debug)]
pub enum CommitmentError {
    /// The document failed structural validation.
    #[error(transparent)]
    Document(#[from] ZkidError),

    /// The signed-content chain could not be resolved.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A DSC or CSCA certificate failed to decode.
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// Key or signature components could not be decoded.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Poseidon folding failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// A tree proof could not be produced.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Attribute packing failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Circuit identity could not be computed.
    #[error(transparent)]
    Circuit(#[from] CircuitError),

    /// The operation does not apply to this document category.
    #[error("operation not available for {0}")]
    WrongCategory(AttestationCategory),
}
