//! # zkid-crypto: Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the witness pipeline:
//!
//! - **Poseidon** (circom parameters) and the byte-folding hash used by every
//!   commitment, nullifier and sanctions key.
//! - **Certificate parsing** of DSC and CSCA certificates into
//!   [`zkid_core::CertificateRecord`].
//! - **Signature algorithm resolution** by ordered brute-force verification
//!   over RSA PKCS#1 v1.5, RSA-PSS and ECDSA candidates.
//! - **Passport chain metadata**: which hash each stage of the signed-content
//!   chain used, and the DSC/CSCA signature profiles.
//! - **Lean incremental Merkle tree** (registration set) and **sparse Merkle
//!   tree** (sanctions lists), both snapshot-in/proof-out.
//! - **User identifier and scope hashes** consumed by disclosure verifiers.
//! - **Key and signature components** as the integers circuit inputs are
//!   built from.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkid-core` internally.
//! - No mocking of cryptographic operations in tests: certificate tests use
//!   real chains from `tests/fixtures/`.
//! - No `unsafe` code.

pub mod components;
pub mod digest;
pub mod error;
pub mod lean_imt;
pub mod passport;
pub mod poseidon;
pub mod resolver;
pub mod smt;
pub mod user_id;
pub mod x509;

pub use components::{public_key_components, signature_components};
pub use error::{CertificateError, HashError, MetadataError, ResolutionError, TreeError};
pub use lean_imt::{LeanImt, LeanImtProof};
pub use passport::{ensure_metadata, resolve_metadata};
pub use poseidon::{fold, hash_pair, pack_bytes, poseidon_hash};
pub use resolver::{resolve_certificate, resolve_signature, Candidate, Scheme};
pub use smt::{SmtProof, SparseMerkleTree};
pub use x509::parse_certificate;
