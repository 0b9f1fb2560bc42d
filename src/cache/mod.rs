//! Dataset Cache Module
//!
//! Keeps the in-memory copy of the dataset and the machinery that reloads it.
//!
//! ## Submodules
//! - **`store`**: `Snapshot` (immutable, versioned record set) and `CacheStore` (atomic swap-in
//!   of snapshots plus the single refresh-in-progress guard).
//! - **`refresh`**: `RefreshCoordinator`, the primary-then-fallback reload pipeline.

pub mod refresh;
pub mod store;

pub use refresh::{RefreshConfig, RefreshCoordinator, RefreshError, RefreshOutcome, TriggerResult};
pub use store::{CacheStore, Snapshot};
