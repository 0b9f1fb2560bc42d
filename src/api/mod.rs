//! HTTP API Module
//!
//! Exposes the facility query interface as JSON over HTTP.
//!
//! ## Responsibilities
//! - **Service**: `FacilityService` combines the query engine with the refresh coordinator
//!   and decides when the data counts as unavailable.
//! - **Routing**: `router` mounts every endpoint under `/api` with the service as an
//!   `Extension` layer.
//! - **Errors**: `ServiceError` maps onto 404 and 503 responses.
//!
//! ## Submodules
//! - **`service`**: Operation logic, independent of HTTP.
//! - **`handlers`**: Axum handlers and the router.
//! - **`types`**: Query strings, response bodies and `ServiceError`.

pub mod handlers;
pub mod service;
pub mod types;

pub use handlers::router;
pub use service::FacilityService;
pub use types::{HealthStatus, SearchQuery, ServiceError};
