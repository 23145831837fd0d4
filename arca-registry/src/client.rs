//! Low-level HTTP client for the registry's query endpoints

use crate::limiter::RegistryLimiter;
use arca_core::TaxonId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Transport-level errors, classified by the fetch pipeline
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("registry returned HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed registry response: {0}")]
    Malformed(String),
}

/// Continuation state of a server-side search result set
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub count: usize,
    pub web_env: String,
    pub query_key: String,
}

/// One level of a taxonomic lineage as reported by the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageLevel {
    pub taxid: u32,
    pub rank: String,
    pub scientific_name: String,
}

/// Lineage summary for one queried taxonomy id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonSummary {
    pub taxid: u32,
    pub scientific_name: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub lineage: Vec<LineageLevel>,
}

/// HTTP client for the registry's e-utilities style endpoints.
///
/// Every request first acquires a slot on the shared rate limiter, so
/// concurrent callers queue rather than exceed the registry's limit.
#[derive(Clone)]
pub struct EntrezClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RegistryLimiter>,
    tool: String,
    email: Option<String>,
}

impl EntrezClient {
    pub fn new(
        base_url: impl Into<String>,
        limiter: Arc<RegistryLimiter>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("arca/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limiter,
            tool: "arca".to_string(),
            email: None,
        })
    }

    /// Set the client identification sent with every request
    pub fn with_identity(mut self, tool: impl Into<String>, email: Option<String>) -> Self {
        self.tool = tool.into();
        self.email = email;
        self
    }

    fn identity(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        params
    }

    /// Fetch flat-file text for a batch of accession identifiers
    pub async fn fetch_by_ids(&self, ids: &[String]) -> Result<String, ClientError> {
        self.limiter.until_ready().await;
        tracing::debug!(count = ids.len(), "requesting records from registry");

        let response = self
            .http
            .get(format!("{}/efetch.fcgi", self.base_url))
            .query(&[("db", "nucleotide"), ("rettype", "gb"), ("retmode", "text")])
            .query(&[("id", ids.join(","))])
            .query(&self.identity())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Self::text_body(response).await
    }

    /// Run a free-text search, returning the result count and the
    /// continuation token for paginated retrieval
    pub async fn search(&self, term: &str) -> Result<SearchSession, ClientError> {
        self.limiter.until_ready().await;
        tracing::debug!(term, "counting registry search results");

        let response = self
            .http
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&[
                ("db", "nucleotide"),
                ("retmode", "json"),
                ("usehistory", "y"),
                ("retmax", "0"),
            ])
            .query(&[("term", term)])
            .query(&self.identity())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;
        let result = body
            .get("esearchresult")
            .ok_or_else(|| ClientError::Malformed("missing esearchresult".to_string()))?;
        let count = result
            .get("count")
            .and_then(json_usize)
            .ok_or_else(|| ClientError::Malformed("missing result count".to_string()))?;
        let web_env = result
            .get("webenv")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let query_key = result
            .get("querykey")
            .and_then(|v| v.as_str())
            .unwrap_or("1")
            .to_string();

        Ok(SearchSession {
            count,
            web_env,
            query_key,
        })
    }

    /// Fetch one page of a search result set
    pub async fn fetch_search_page(
        &self,
        session: &SearchSession,
        retstart: usize,
        retmax: usize,
    ) -> Result<String, ClientError> {
        self.limiter.until_ready().await;

        let response = self
            .http
            .get(format!("{}/efetch.fcgi", self.base_url))
            .query(&[("db", "nucleotide"), ("rettype", "gb"), ("retmode", "text")])
            .query(&[
                ("WebEnv", session.web_env.as_str()),
                ("query_key", session.query_key.as_str()),
            ])
            .query(&[
                ("retstart", retstart.to_string()),
                ("retmax", retmax.to_string()),
            ])
            .query(&self.identity())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Self::text_body(response).await
    }

    /// Look up lineage summaries for a batch of taxonomy ids
    pub async fn fetch_lineages(&self, taxids: &[TaxonId]) -> Result<Vec<TaxonSummary>, ClientError> {
        self.limiter.until_ready().await;
        let joined = taxids
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        tracing::debug!(ids = %joined, "requesting lineages from taxonomy service");

        let response = self
            .http
            .get(format!("{}/efetch.fcgi", self.base_url))
            .query(&[("db", "taxonomy"), ("retmode", "json")])
            .query(&[("id", joined)])
            .query(&self.identity())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        response
            .json::<Vec<TaxonSummary>>()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    async fn text_body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

/// The registry encodes counts both as JSON numbers and as strings
fn json_usize(value: &serde_json::Value) -> Option<usize> {
    value
        .as_u64()
        .map(|v| v as usize)
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_usize_accepts_both_encodings() {
        assert_eq!(json_usize(&serde_json::json!(42)), Some(42));
        assert_eq!(json_usize(&serde_json::json!("42")), Some(42));
        assert_eq!(json_usize(&serde_json::json!("x")), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            EntrezClient::new("http://localhost:9/", crate::limiter::unthrottled()).unwrap();
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
