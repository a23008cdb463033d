//! Client configuration.
//!
//! Base URLs for the sanctions list service and the ledger status service.
//! Override via environment variables or explicit construction for tests.

use url::Url;
use zeroize::Zeroizing;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the external services.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL serving `/ofac/{variant}/{list}`.
    pub sanctions_url: Url,
    /// Base URL serving `/nullifier/status`.
    pub ledger_url: Url,
    /// Optional bearer token sent with every request.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds. Requests are attempted once.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("sanctions_url", &self.sanctions_url)
            .field("ledger_url", &self.ledger_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ZKID_SANCTIONS_URL` (required)
    /// - `ZKID_LEDGER_URL` (required)
    /// - `ZKID_API_TOKEN` (optional)
    /// - `ZKID_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sanctions_url: env_url("ZKID_SANCTIONS_URL")?,
            ledger_url: env_url("ZKID_LEDGER_URL")?,
            api_token: std::env::var("ZKID_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            timeout_secs: std::env::var("ZKID_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&secs| secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Both services on one local mock server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        let url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            sanctions_url: url.clone(),
            ledger_url: url,
            api_token: None,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).map_err(|_| ConfigError::Missing(var.to_string()))?;
    parse_url(var, &raw)
}

/// Parses a base URL, appending a trailing `/` so relative endpoint paths
/// join below it instead of replacing its last segment.
fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("API token is not a valid HTTP header value")]
    InvalidToken,
}
