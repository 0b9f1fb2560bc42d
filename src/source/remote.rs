//! Remote Paginated Source
//!
//! Client for the Gyeonggi open-data API. Each call fetches exactly one page; looping,
//! delays and fallback belong to `RefreshCoordinator`.
//!
//! ## Envelope
//! A successful response looks like
//! `{"<dataset>": [{"head": [{"list_total_count": N}, {"RESULT": {..}}]}, {"row": [..]}]}`.
//! When the upstream rejects a request it returns a bare `{"RESULT": {"CODE": .., "MESSAGE": ..}}`
//! instead, which is reported as a malformed response.

use super::types::{PageRequest, SourceError, SourceKind, SourcePage};
use super::PagedSource;
use crate::record::RawRecord;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_DATASET: &str = "Tbinstutm";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "facility-index/0.1";

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    /// Name of the top-level section holding the dataset (e.g. `Tbinstutm`).
    pub dataset: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            dataset: DEFAULT_DATASET.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

pub struct RemotePaginatedSource {
    config: RemoteConfig,
    http_client: reqwest::Client,
}

impl RemotePaginatedSource {
    pub fn new(config: RemoteConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn query_params(&self, request: &PageRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("KEY", self.config.api_key.clone()),
            ("Type", "json".to_string()),
            ("pIndex", request.page_index.to_string()),
            ("pSize", request.page_size.to_string()),
        ];
        if let Some(region) = &request.region_filter {
            params.push(("SIGUN_NM", region.clone()));
        }
        params
    }
}

#[async_trait]
impl PagedSource for RemotePaginatedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, SourceError> {
        tracing::debug!(
            "Requesting page {} (size {}) from {}",
            request.page_index,
            request.page_size,
            self.config.base_url
        );

        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(&self.query_params(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Unavailable(format!(
                "upstream responded with {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        parse_envelope(&self.config.dataset, &body)
    }
}

/// Extracts rows and the total count from an open-data response body.
pub fn parse_envelope(dataset: &str, body: &Value) -> Result<SourcePage, SourceError> {
    if let Some(result) = body.get("RESULT") {
        let code = result.get("CODE").and_then(Value::as_str).unwrap_or("unknown");
        let message = result.get("MESSAGE").and_then(Value::as_str).unwrap_or("");
        return Err(SourceError::Malformed(format!(
            "upstream returned {}: {}",
            code, message
        )));
    }

    let sections = body
        .get(dataset)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed(format!("missing '{}' section", dataset)))?;

    let total_count = sections
        .iter()
        .find_map(list_total_count)
        .ok_or_else(|| SourceError::Malformed("missing list_total_count".to_string()))?;

    let rows = sections
        .iter()
        .find_map(|section| section.get("row"))
        .cloned()
        .ok_or_else(|| SourceError::Malformed("missing row array".to_string()))?;

    let records: Vec<RawRecord> = serde_json::from_value(rows)?;

    Ok(SourcePage {
        records,
        total_count,
    })
}

fn list_total_count(section: &Value) -> Option<usize> {
    let nested = || {
        section
            .get("head")
            .and_then(Value::as_array)
            .and_then(|head| head.iter().find_map(|entry| entry.get("list_total_count")))
    };

    match section.get("list_total_count").or_else(nested)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
