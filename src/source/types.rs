//! Source Adapter Types
//!
//! Shared request/response structures and the error taxonomy for every data origin.

use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One page request against a paginated source.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Optional region (`SIGUN_NM`) restriction applied by the upstream.
    pub region_filter: Option<String>,
    /// 1-indexed page number.
    pub page_index: u32,
    pub page_size: u32,
}

/// The unit of truth returned by any adapter.
///
/// For paginated sources `total_count` is the size of the whole upstream dataset,
/// not of this page. Bulk sources report the length of `records`.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub records: Vec<RawRecord>,
    pub total_count: usize,
}

/// Which adapter produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Remote,
    LocalFile,
    StaticChunks,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::Remote => "remote",
            SourceKind::LocalFile => "local_file",
            SourceKind::StaticChunks => "static_chunks",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network failure, non-success status or missing backing file.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The response arrived but its shape was not what the adapter expects.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Unavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}
