//! # zkid-client -- HTTP access to pipeline services
//!
//! Two external services feed the witness pipeline:
//! - **Sanctions lists** as sparse Merkle tree snapshots, per document family
//! - **Ledger** nullifier status, to detect already registered documents
//!
//! ## Request Policy
//!
//! Every call is a single attempt bounded by the configured timeout. There
//! is no retry; callers decide whether to try again. Failures carry the
//! endpoint and the underlying error.

pub mod config;
pub(crate) mod envelope;
pub mod error;
pub mod ledger;
pub mod sanctions;

pub use config::{ClientConfig, ConfigError};
pub use error::FetchError;

use std::time::Duration;

/// Top-level client. Holds one sub-client per service.
#[derive(Debug, Clone)]
pub struct ZkidClient {
    sanctions: sanctions::SanctionsClient,
    ledger: ledger::LedgerClient,
}

impl ZkidClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidToken)?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            sanctions: sanctions::SanctionsClient::new(http.clone(), config.sanctions_url),
            ledger: ledger::LedgerClient::new(http, config.ledger_url),
        })
    }

    /// Access the sanctions list client.
    pub fn sanctions(&self) -> &sanctions::SanctionsClient {
        &self.sanctions
    }

    /// Access the ledger client.
    pub fn ledger(&self) -> &ledger::LedgerClient {
        &self.ledger
    }
}
