//! Local Bulk Source
//!
//! Reads a JSON array of upstream-shaped records from disk. This is the fallback that keeps
//! the service answering when the remote API is down or rate-limiting us.

use super::types::{SourceError, SourceKind, SourcePage};
use super::BulkSource;
use crate::record::RawRecord;

use async_trait::async_trait;
use std::path::PathBuf;

pub struct LocalBulkSource {
    path: PathBuf,
}

impl LocalBulkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BulkSource for LocalBulkSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LocalFile
    }

    async fn load_all(&self) -> Result<SourcePage, SourceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            SourceError::Unavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        let records: Vec<RawRecord> = serde_json::from_slice(&bytes)?;
        tracing::info!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );

        Ok(SourcePage {
            total_count: records.len(),
            records,
        })
    }
}
