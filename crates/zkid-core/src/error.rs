//! # Error Types: Structured Error Hierarchy
//!
//! Core-level errors. Component crates define their own `thiserror` enums
//! (`CertificateError`, `ResolutionError`, `CodecError`, ...) and convert into
//! [`ZkidError`] where a caller wants a single error type.
//!
//! ## Design
//!
//! - Malformed input is always fatal to the current request.
//! - Absence outcomes (commitment not in tree, no sanctions match) are never
//!   errors and never appear here.
//! - Parameter-validation failures carry the offending value.

use thiserror::Error;

/// Top-level error type for the witness pipeline.
#[derive(Error, Debug)]
pub enum ZkidError {
    /// A field element could not be parsed or encoded.
    #[error("field element error: {0}")]
    Field(#[from] FieldError),

    /// A document failed structural validation.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A caller-supplied parameter failed validation before any
    /// cryptographic work was attempted.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error parsing or constructing a BN254 field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The string is not a valid decimal or `0x`-prefixed hex integer.
    #[error("not a valid integer literal: {0:?}")]
    InvalidLiteral(String),

    /// The integer is not below the BN254 scalar field modulus.
    #[error("value exceeds the BN254 scalar field modulus: {0}")]
    OutOfRange(String),
}
