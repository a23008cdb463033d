//! # zkid-zkp: Circuit-Facing Layer
//!
//! Everything between a parsed identity document and the inputs a prover
//! consumes:
//!
//! - **Circuit identity** ([`circuits`]): the registration, issuer-chain and
//!   disclosure circuit names a document maps to, and the deployed set.
//! - **Attribute codec** ([`layout`], [`codec`]): per-category reveal
//!   buffers, selector bitmaps and 31-byte field-element packing, including
//!   the forbidden-country list.
//! - **Commitments and nullifiers** ([`commitment`]).
//! - **Tree proofs** ([`registration`], [`sanctions`]) over snapshots of the
//!   registration tree and the sanctions sparse Merkle trees.
//! - **Support validation** ([`support`]) before any proof work.
//! - **Circuit inputs** ([`inputs`]) and decoding of disclosure public
//!   signals ([`disclose`]).
//!
//! ## Crate Policy
//!
//! - Depends on `zkid-core` and `zkid-crypto` only; no network access.
//! - Every function is deterministic except [`inputs::today`].
//! - Secrets only leave this crate inside [`inputs::SecretSignal`], whose
//!   `Debug` output is redacted.

pub mod circuits;
pub mod codec;
pub mod commitment;
pub mod disclose;
pub mod error;
pub mod inputs;
pub mod layout;
pub mod registration;
pub mod sanctions;
pub mod support;

pub use circuits::{
    disclose_circuit_name, dsc_circuit_name, register_circuit_name, DeployedCircuits,
    DocumentSupportStatus,
};
pub use codec::{pack_countries, pack_reveal, unpack_countries, PackedCountries};
pub use commitment::{candidate_commitments, derive, CandidateCommitment, DocumentCommitment};
pub use disclose::{
    format_revealed_data, validate_disclosure, ConfigIssue, DisclosureOutput, VerificationConfig,
};
pub use error::{CircuitError, CodecError, CommitmentError};
pub use inputs::{DiscloseInputs, DiscloseRequest, DscInputs, QrRegisterInputs, RegisterInputs};
pub use layout::{layout, Attribute, Layout};
pub use registration::{membership_proof, membership_proof_in, MembershipLookup, TreeProof};
pub use sanctions::{sanctions_proof, sanctions_proof_in, SanctionsList, SanctionsProof, SanctionsSubject};
pub use support::{check_document_support, SupportReport};
