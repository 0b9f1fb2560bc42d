//! Static Chunked Source
//!
//! Adapts a `ChunkAssembler` to the `BulkSource` trait, so a consuming process can run the
//! ordinary refresh pipeline against artifacts published by `ChunkExporter`.

use super::types::{SourceError, SourceKind, SourcePage};
use super::BulkSource;
use crate::export::{AssemblyError, ChunkAssembler};

use async_trait::async_trait;
use std::sync::Arc;

pub struct StaticChunkedSource {
    assembler: Arc<ChunkAssembler>,
}

impl StaticChunkedSource {
    pub fn new(assembler: Arc<ChunkAssembler>) -> Self {
        Self { assembler }
    }
}

#[async_trait]
impl BulkSource for StaticChunkedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::StaticChunks
    }

    async fn load_all(&self) -> Result<SourcePage, SourceError> {
        let records = self.assembler.load_raw().await.map_err(|e| match e {
            AssemblyError::Manifest(inner) => inner,
            other => SourceError::Unavailable(other.to_string()),
        })?;

        Ok(SourcePage {
            total_count: records.len(),
            records,
        })
    }
}
