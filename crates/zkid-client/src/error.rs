//! Client error types.

use zkid_core::AttestationCategory;
use zkid_crypto::TreeError;
use zkid_zkp::SanctionsList;

/// Errors from external service calls.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Non-2xx status, a failed envelope status, or an envelope without data.
    #[error("{endpoint} upstream failure: {message}")]
    Upstream {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },
    /// Response body is not the expected JSON shape.
    #[error("failed to decode response from {endpoint}: {message}")]
    Deserialization { endpoint: String, message: String },
    /// The fetched snapshot is not a valid tree.
    #[error("invalid snapshot from {endpoint}: {source}")]
    Snapshot {
        endpoint: String,
        source: TreeError,
    },
    /// The list is not published for this category.
    #[error("sanctions list {list} is not available for {category}")]
    ListNotAvailable {
        list: SanctionsList,
        category: AttestationCategory,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}
