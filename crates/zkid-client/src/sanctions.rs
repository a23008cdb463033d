//! Sanctions list snapshots.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/ofac/{variant}/{list}` | Sparse Merkle tree snapshot |
//!
//! `variant` is `passport`, `id_card` or `aadhaar`. The passport-number
//! list is only published for passports.

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use zkid_core::AttestationCategory;
use zkid_crypto::SparseMerkleTree;
use zkid_zkp::SanctionsList;

use crate::envelope::read_payload;
use crate::error::FetchError;

/// Path segment naming the document family of a list.
pub fn variant(category: AttestationCategory) -> &'static str {
    match category {
        AttestationCategory::Passport => "passport",
        AttestationCategory::IdCard => "id_card",
        AttestationCategory::NationalQr => "aadhaar",
    }
}

/// Typed client for the sanctions list service.
#[derive(Debug, Clone)]
pub struct SanctionsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SanctionsClient {
    pub(crate) fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Fetch a list snapshot as the JSON text [`SparseMerkleTree::import`]
    /// reads.
    pub async fn fetch_snapshot(
        &self,
        category: AttestationCategory,
        list: SanctionsList,
    ) -> Result<String, FetchError> {
        if !SanctionsList::for_category(category).contains(&list) {
            return Err(FetchError::ListNotAvailable { list, category });
        }
        let endpoint = format!("GET /ofac/{}/{list}", variant(category));
        let url = self
            .base_url
            .join(&format!("ofac/{}/{list}", variant(category)))
            .map_err(|e| FetchError::Deserialization {
                endpoint: endpoint.clone(),
                message: format!("cannot build request URL: {e}"),
            })?;

        debug!(%endpoint, "fetching sanctions list");
        let resp = self.http.get(url).send().await.map_err(|e| {
            warn!(%endpoint, error = %e, "sanctions list request failed");
            FetchError::Http {
                endpoint: endpoint.clone(),
                source: e,
            }
        })?;

        match read_payload(&endpoint, resp).await? {
            Value::String(snapshot) => Ok(snapshot),
            other => Ok(other.to_string()),
        }
    }

    /// Fetch and import a list.
    pub async fn fetch_tree(
        &self,
        category: AttestationCategory,
        list: SanctionsList,
    ) -> Result<SparseMerkleTree, FetchError> {
        let snapshot = self.fetch_snapshot(category, list).await?;
        SparseMerkleTree::import(&snapshot).map_err(|source| FetchError::Snapshot {
            endpoint: format!("GET /ofac/{}/{list}", variant(category)),
            source,
        })
    }
}
