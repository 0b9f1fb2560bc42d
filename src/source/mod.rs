//! Data Source Adapters
//!
//! Every origin of facility data sits behind one of two traits so the refresh pipeline
//! never knows where records physically come from.
//!
//! ## Adapters
//! - **`remote`**: `RemotePaginatedSource`, the primary. Pages through the open-data HTTP API.
//! - **`local`**: `LocalBulkSource`, the usual fallback. Reads one JSON array from disk.
//! - **`static_chunks`**: `StaticChunkedSource`, a bulk source backed by the static export
//!   artifacts of another process (see `crate::export`).
//!
//! Adapters surface transport and parse failures as `SourceError`, never as a partial page.

pub mod local;
pub mod remote;
pub mod static_chunks;
pub mod types;

pub use local::LocalBulkSource;
pub use remote::{RemoteConfig, RemotePaginatedSource};
pub use static_chunks::StaticChunkedSource;
pub use types::{PageRequest, SourceError, SourceKind, SourcePage};

use async_trait::async_trait;

/// A source that serves the dataset one page at a time.
#[async_trait]
pub trait PagedSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, SourceError>;
}

/// A source that serves the whole dataset in one call.
#[async_trait]
pub trait BulkSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn load_all(&self) -> Result<SourcePage, SourceError>;
}
