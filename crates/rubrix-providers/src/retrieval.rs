//! HTTP retrieval backend for reference material.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rubrix_core::traits::{Retriever, Snippet};

use crate::error::ProviderError;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Retriever backed by an HTTP search service. POSTs `{query, top_k}` to
/// `{base_url}/search` and expects `{"results": [{"content": ...}]}`.
pub struct HttpRetriever {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRetriever {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    content: String,
}

#[async_trait]
impl Retriever for HttpRetriever {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<Snippet>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest { query, top_k })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status: 0,
                message: format!("failed to parse search response: {e}"),
            }
        })?;

        Ok(parsed
            .results
            .into_iter()
            .take(top_k)
            .map(|r| Snippet { content: r.content })
            .collect())
    }
}

/// Retriever for deployments without a search service. Always returns no
/// snippets, so evaluations run without reference context.
pub struct NullRetriever;

#[async_trait]
impl Retriever for NullRetriever {
    async fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<Snippet>> {
        Ok(Vec::new())
    }
}
