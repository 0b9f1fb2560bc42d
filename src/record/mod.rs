//! Facility Record Model
//!
//! Defines the three shapes a facility takes as it moves through the system.
//!
//! ## Representations
//! - **`RawRecord`**: The upstream shape, using the source's field names. Every field is optional
//!   because neither the open-data API nor the bulk file guarantees any of them.
//! - **`Record`**: The resolved, immutable entity stored in a snapshot. Nullable facets are
//!   flattened to empty strings and the address fallback chain is resolved exactly once here.
//! - **`CompactRecord`**: The field-abbreviated projection written into static export chunks.
//!
//! Conversions between the shapes live next to the types so the export and import paths
//! stay symmetric.

pub mod types;

pub use types::{CompactRecord, RawRecord, Record};
