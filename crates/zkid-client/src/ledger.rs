//! Ledger nullifier status.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/nullifier/status` | Whether a nullifier is already registered |

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use zkid_core::{AttestationCategory, FieldElement};

use crate::envelope::read_payload;
use crate::error::FetchError;

const ENDPOINT: &str = "POST /nullifier/status";

/// Request body for the status check.
#[derive(Debug, Serialize)]
pub struct NullifierStatusRequest {
    /// `0x`-prefixed 64-digit hex.
    pub nullifier: String,
    pub attestation_id: u64,
}

/// Typed client for the ledger status service.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LedgerClient {
    pub(crate) fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// `true` when `nullifier` is already registered for `category`.
    pub async fn is_nullifier_registered(
        &self,
        nullifier: &FieldElement,
        category: AttestationCategory,
    ) -> Result<bool, FetchError> {
        let url = self
            .base_url
            .join("nullifier/status")
            .map_err(|e| FetchError::Deserialization {
                endpoint: ENDPOINT.to_string(),
                message: format!("cannot build request URL: {e}"),
            })?;
        let body = NullifierStatusRequest {
            nullifier: nullifier.to_hex(),
            attestation_id: category.attestation_id(),
        };

        debug!(endpoint = ENDPOINT, %category, "checking nullifier status");
        let resp = self.http.post(url).json(&body).send().await.map_err(|e| {
            warn!(endpoint = ENDPOINT, error = %e, "nullifier status request failed");
            FetchError::Http {
                endpoint: ENDPOINT.to_string(),
                source: e,
            }
        })?;

        match read_payload(ENDPOINT, resp).await? {
            Value::Bool(registered) => Ok(registered),
            other => Err(FetchError::Deserialization {
                endpoint: ENDPOINT.to_string(),
                message: format!("expected a boolean, got {other}"),
            }),
        }
    }
}
