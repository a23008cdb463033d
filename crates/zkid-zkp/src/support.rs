//! # Document Support Validator
//!
//! Decides, before any proof work, whether a document can be proven against
//! the deployed circuits. Checks short-circuit in this order:
//!
//! 1. chain metadata present,
//! 2. issuer chain resolved (passport-like only),
//! 3. registration circuit deployed,
//! 4. issuer circuit deployed (passport-like only).
//!
//! The validator never fails: every outcome, including an unsupported
//! signature algorithm, is a [`SupportReport`].

use serde::{Deserialize, Serialize};
use tracing::info;
use zkid_core::DocumentProfile;

use crate::circuits::{
    dsc_circuit_name, register_circuit_name, DeployedCircuits, DocumentSupportStatus,
};

/// Outcome of a support check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportReport {
    pub status: DocumentSupportStatus,
    /// The circuit identity that failed the check, or the registration
    /// circuit when supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<String>,
    pub detail: String,
}

impl SupportReport {
    fn new(status: DocumentSupportStatus, circuit: Option<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            circuit,
            detail: detail.into(),
        }
    }
}

/// Check `doc` against `deployed`.
pub fn check_document_support(doc: &DocumentProfile, deployed: &DeployedCircuits) -> SupportReport {
    let report = evaluate(doc, deployed);
    info!(
        category = %doc.document_category(),
        status = %report.status,
        circuit = report.circuit.as_deref().unwrap_or("-"),
        "document support decided"
    );
    report
}

fn evaluate(doc: &DocumentProfile, deployed: &DeployedCircuits) -> SupportReport {
    use DocumentSupportStatus::*;

    let passport = match doc {
        DocumentProfile::PassportLike(passport) => {
            let Some(metadata) = &passport.metadata else {
                return SupportReport::new(MetadataMissing, None, "document chain metadata has not been resolved");
            };
            if !metadata.csca_found {
                let detail = metadata
                    .csca_error
                    .clone()
                    .unwrap_or_else(|| "no CSCA certificate verifies the document signing certificate".to_string());
                return SupportReport::new(IssuerChainNotFound, None, detail);
            }
            Some(passport)
        }
        DocumentProfile::NationalQrCredential(cred) => {
            if let Err(error) = cred.validate() {
                return SupportReport::new(MetadataMissing, None, error.to_string());
            }
            None
        }
    };

    let register = match register_circuit_name(doc) {
        Ok(name) => name,
        Err(error) => return SupportReport::new(RegistrationCircuitUnsupported, None, error.to_string()),
    };
    if !deployed.has_register(&register) {
        return SupportReport::new(
            RegistrationCircuitUnsupported,
            Some(register),
            "registration circuit is not deployed",
        );
    }

    if let Some(passport) = passport {
        let dsc = match dsc_circuit_name(passport) {
            Ok(name) => name,
            Err(error) => return SupportReport::new(IssuerCircuitUnsupported, None, error.to_string()),
        };
        if !deployed.has_dsc(&dsc) {
            return SupportReport::new(IssuerCircuitUnsupported, Some(dsc), "issuer circuit is not deployed");
        }
    }

    SupportReport::new(Supported, Some(register), "document is supported")
}
