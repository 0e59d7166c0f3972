use async_trait::async_trait;
use chrono::NaiveDate;
use quill_types::RetrievedDoc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::SearchBackend;
use crate::error::{Result, RetrievalError};
use crate::normalize::normalize_results;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl ElasticsearchConfig {
    pub fn new(url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: index.into(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Queries an Elasticsearch index over its `_search` REST API.
pub struct ElasticsearchBackend {
    http_client: reqwest::Client,
    search_url: String,
}

impl ElasticsearchBackend {
    pub fn new(config: ElasticsearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let search_url = format!(
            "{}/{}/_search",
            config.url.trim_end_matches('/'),
            config.index
        );

        Ok(Self {
            http_client,
            search_url,
        })
    }

    async fn search(&self, body: Value) -> Result<Vec<RetrievedDoc>> {
        let response = self.http_client.post(&self.search_url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Backend { status, body });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| RetrievalError::Decode(e.to_string()))?;
        normalize_results(&raw)
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn similar(&self, query: &str, limit: usize) -> Result<Vec<RetrievedDoc>> {
        self.search(json!({
            "query": { "match": { "text": query } },
            "size": limit,
        }))
        .await
    }

    async fn newest(&self, n: usize) -> Result<Vec<RetrievedDoc>> {
        self.search(json!({
            "query": { "match_all": {} },
            "sort": [{ "date": { "order": "desc" } }],
            "size": n,
        }))
        .await
    }

    async fn date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RetrievedDoc>> {
        self.search(json!({
            "query": {
                "range": {
                    "date": {
                        "gte": start.format("%Y-%m-%d").to_string(),
                        "lte": end.format("%Y-%m-%d").to_string(),
                    }
                }
            },
            "sort": [{ "date": { "order": "asc" } }],
            "size": limit,
        }))
        .await
    }
}
