//! Query Engine Module
//!
//! Executes user queries against the in-memory snapshot.
//!
//! ## Responsibilities
//! - **Search**: Case-insensitive substring match across the seven searchable fields.
//! - **Filtering**: Exact region/category equality, combined with search by logical AND.
//! - **Pagination**: 1-indexed pages over the filtered set. Pages past the end are empty,
//!   never an error.
//! - **Lookups & Facets**: Point lookup by name, distinct region/category lists and aggregate
//!   counts.
//!
//! ## Submodules
//! - **`engine`**: `QueryEngine` and the pure functions it delegates to.
//! - **`types`**: Query parameters and result DTOs.

pub mod engine;
pub mod types;

pub use engine::{QueryEngine, aggregate, execute};
pub use types::{CacheInfo, FacetCount, PagedResult, QueryParams, Stats};
