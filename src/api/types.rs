use crate::query::QueryParams;
use crate::query::types::DEFAULT_PAGE_SIZE;
use crate::source::SourceKind;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query string of `GET /api/facilities`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl From<SearchQuery> for QueryParams {
    fn from(query: SearchQuery) -> Self {
        QueryParams {
            search: query.search,
            region: query.region,
            category: query.category,
            page: query.page.unwrap_or(1),
            page_size: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// False until the first snapshot has been published.
    pub loaded: bool,
    pub count: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub refreshing: bool,
    pub version: u64,
    pub source: Option<SourceKind>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("facility not found: {0}")]
    NotFound(String),

    /// Nothing has ever been loaded and the last refresh failed.
    #[error("data not available yet: {0}")]
    Unavailable(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
