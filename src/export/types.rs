//! Static Export Types
//!
//! The manifest and chunk documents are the only contract between the exporting process
//! and a consuming process. Both sides read these definitions.

use crate::source::SourceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MANIFEST_FILE: &str = "metadata.json";
pub const DEFAULT_CHUNK_SIZE: usize = 5000;
pub const DEFAULT_STALENESS: Duration = Duration::from_secs(3600);

/// File name of chunk `id` relative to the artifact root.
pub fn chunk_file(id: usize) -> String {
    format!("data-{}.json", id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkInfo {
    pub id: usize,
    /// Offset of the first record within the full ordered dataset.
    pub start_offset: usize,
    /// Exclusive end offset.
    pub end_offset: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub total_records: usize,
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub chunks: Vec<ChunkInfo>,
    pub last_updated: DateTime<Utc>,
}

/// Serialized chunks plus their manifest, ready to be written or uploaded.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// JSON arrays of compact records, indexed by chunk id.
    pub chunks: Vec<Vec<u8>>,
    pub manifest: Manifest,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("artifact unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("manifest could not be loaded: {0}")]
    Manifest(SourceError),

    #[error("chunk {chunk_id} could not be assembled: {reason}")]
    Incomplete { chunk_id: usize, reason: String },

    #[error("assembled {actual} records but the manifest lists {expected}")]
    CountMismatch { expected: usize, actual: usize },
}
