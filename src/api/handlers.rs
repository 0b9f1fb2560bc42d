use super::service::FacilityService;
use super::types::{HealthStatus, SearchQuery, ServiceError};
use crate::cache::TriggerResult;
use crate::query::{PagedResult, QueryParams, Stats};
use crate::record::Record;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::sync::Arc;

pub fn router(service: Arc<FacilityService>) -> Router {
    Router::new()
        .route("/api/facilities", get(handle_search))
        .route("/api/facilities/:name", get(handle_get_facility))
        .route("/api/regions", get(handle_regions))
        .route("/api/categories", get(handle_categories))
        .route("/api/stats", get(handle_stats))
        .route("/api/refresh", post(handle_refresh))
        .route("/api/health", get(handle_health))
        .layer(Extension(service))
}

pub async fn handle_search(
    Query(query): Query<SearchQuery>,
    Extension(service): Extension<Arc<FacilityService>>,
) -> Result<Json<PagedResult>, ServiceError> {
    let params = QueryParams::from(query);
    service.search(&params).map(Json)
}

pub async fn handle_get_facility(
    Path(name): Path<String>,
    Extension(service): Extension<Arc<FacilityService>>,
) -> Result<Json<Record>, ServiceError> {
    match service.get_by_name(&name) {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::debug!("Lookup failed for {:?}: {}", name, e);
            Err(e)
        }
    }
}

pub async fn handle_regions(
    Extension(service): Extension<Arc<FacilityService>>,
) -> Result<Json<Vec<String>>, ServiceError> {
    service.list_regions().map(Json)
}

pub async fn handle_categories(
    Extension(service): Extension<Arc<FacilityService>>,
) -> Result<Json<Vec<String>>, ServiceError> {
    service.list_categories().map(Json)
}

pub async fn handle_stats(
    Extension(service): Extension<Arc<FacilityService>>,
) -> Result<Json<Stats>, ServiceError> {
    service.get_stats().map(Json)
}

pub async fn handle_refresh(
    Extension(service): Extension<Arc<FacilityService>>,
) -> (StatusCode, Json<TriggerResult>) {
    let result = service.trigger_refresh();
    let status = if result.accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (status, Json(result))
}

pub async fn handle_health(
    Extension(service): Extension<Arc<FacilityService>>,
) -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(service.health_status()))
}
