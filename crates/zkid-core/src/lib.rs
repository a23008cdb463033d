//! # zkid-core: Foundational Types for the Witness Pipeline
//!
//! This crate is the leaf of the zkid workspace. It defines the value types
//! that flow between the certificate layer, the commitment engine, the tree
//! clients, and the circuit-input builders. Every other crate depends on
//! `zkid-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One field type.** All circuit scalars are [`FieldElement`], a newtype
//!    over the BN254 scalar field. Serialized form is always a decimal string,
//!    matching what proving backends consume.
//!
//! 2. **One polymorphism point.** [`DocumentProfile`] is a closed tagged union
//!    over passport-like documents and QR credentials. Components match on
//!    [`DocumentProfile::document_category()`] once at entry.
//!
//! 3. **Validated newtypes.** [`CountryCode`] and [`SecretScalar`] are only
//!    constructible through checked constructors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkid-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod algorithm;
pub mod category;
pub mod certificate;
pub mod constants;
pub mod country;
pub mod document;
pub mod error;
pub mod field;

pub use algorithm::{AlgorithmProfile, HashAlgorithm, SignatureAlgorithm};
pub use category::AttestationCategory;
pub use certificate::{CertificateRecord, EcCurve, PublicKeyMaterial};
pub use country::CountryCode;
pub use document::{
    DocumentMetadata, DocumentProfile, PassportLikeDocument, QrCredential, QrPersonalInfo,
};
pub use error::{FieldError, ZkidError};
pub use field::{FieldElement, SecretScalar};
