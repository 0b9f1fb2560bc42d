//! Facility Index Library
//!
//! This library crate defines the modules behind the facility directory service.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is a read-mostly cache in front of slow, rate-limited data sources:
//!
//! - **`record`**: The facility data model in its upstream, resolved and compact shapes.
//! - **`source`**: Adapters for every data origin (the paginated open-data API, a local
//!   bulk file, another process's static export) behind two async traits.
//! - **`cache`**: The versioned snapshot store and the refresh pipeline that fills it,
//!   falling back from the primary source to the secondary as a whole.
//! - **`query`**: Search, filtering, pagination, facets and statistics over one snapshot.
//! - **`export`**: Chunked static export of a snapshot, and the cached assembler that rebuilds
//!   it elsewhere.
//! - **`api`**: The `FacilityService` query interface and its HTTP routes.
//! - **`config`**: Environment-driven process configuration.

pub mod api;
pub mod cache;
pub mod config;
pub mod export;
pub mod query;
pub mod record;
pub mod source;

#[cfg(test)]
mod testing;
