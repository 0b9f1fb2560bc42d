//! Chunk Assembler
//!
//! Rebuilds a snapshot from static export artifacts.
//!
//! ## Caching
//! - The manifest and every chunk are cached with the time they were fetched.
//! - Within the staleness window a retry after a failed chunk only fetches what is missing.
//! - Once the manifest is older than the window everything is dropped and reloaded, since a
//!   new export may have changed chunk boundaries.
//!
//! Assembly is all-or-nothing: a failed chunk aborts the whole load.

use super::fetcher::ArtifactFetcher;
use super::types::{AssemblyError, ChunkInfo, DEFAULT_STALENESS, MANIFEST_FILE, Manifest, chunk_file};
use crate::cache::Snapshot;
use crate::record::{CompactRecord, RawRecord};
use crate::source::{SourceError, SourceKind};

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> Cached<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, staleness: Duration) -> bool {
        self.fetched_at.elapsed() < staleness
    }
}

pub struct ChunkAssembler {
    fetcher: Arc<dyn ArtifactFetcher>,
    staleness: Duration,
    /// Also serializes concurrent loads so each artifact is fetched once.
    manifest: Mutex<Option<Cached<Arc<Manifest>>>>,
    chunks: DashMap<usize, Cached<Arc<Vec<RawRecord>>>>,
}

impl ChunkAssembler {
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self::with_staleness(fetcher, DEFAULT_STALENESS)
    }

    pub fn with_staleness(fetcher: Arc<dyn ArtifactFetcher>, staleness: Duration) -> Self {
        Self {
            fetcher,
            staleness,
            manifest: Mutex::new(None),
            chunks: DashMap::new(),
        }
    }

    /// Loads every chunk and returns them as one snapshot, in manifest order.
    pub async fn load_all(&self) -> Result<Snapshot, AssemblyError> {
        let (manifest, records) = self.assemble().await?;
        Ok(Snapshot::from_raw(
            records,
            SourceKind::StaticChunks,
            manifest.last_updated,
        ))
    }

    /// Like `load_all`, but returns the expanded upstream-shaped records.
    pub async fn load_raw(&self) -> Result<Vec<RawRecord>, AssemblyError> {
        let (_, records) = self.assemble().await?;
        Ok(records)
    }

    pub fn cached_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    async fn assemble(&self) -> Result<(Arc<Manifest>, Vec<RawRecord>), AssemblyError> {
        let mut slot = self.manifest.lock().await;
        let manifest = self.current_manifest(&mut slot).await?;

        let mut ordered: Vec<&ChunkInfo> = manifest.chunks.iter().collect();
        ordered.sort_by_key(|info| info.id);

        let mut records = Vec::with_capacity(manifest.total_records);
        for info in ordered {
            let chunk = self.chunk(info).await?;
            records.extend(chunk.iter().cloned());
        }

        if records.len() != manifest.total_records {
            return Err(AssemblyError::CountMismatch {
                expected: manifest.total_records,
                actual: records.len(),
            });
        }

        tracing::info!(
            "Assembled {} records from {} chunks",
            records.len(),
            manifest.chunks.len()
        );
        Ok((manifest, records))
    }

    async fn current_manifest(
        &self,
        slot: &mut Option<Cached<Arc<Manifest>>>,
    ) -> Result<Arc<Manifest>, AssemblyError> {
        if let Some(cached) = slot.as_ref()
            && cached.is_fresh(self.staleness)
        {
            return Ok(cached.value.clone());
        }

        if slot.take().is_some() {
            tracing::info!("Static artifacts are stale, forcing a full reload");
        }
        self.chunks.clear();

        let bytes = self.fetcher.fetch(MANIFEST_FILE).await.map_err(|e| {
            AssemblyError::Manifest(SourceError::Unavailable(e.to_string()))
        })?;
        let manifest: Manifest = serde_json::from_slice(&bytes)
            .map_err(|e| AssemblyError::Manifest(SourceError::Malformed(e.to_string())))?;

        let manifest = Arc::new(manifest);
        *slot = Some(Cached::new(manifest.clone()));
        Ok(manifest)
    }

    async fn chunk(&self, info: &ChunkInfo) -> Result<Arc<Vec<RawRecord>>, AssemblyError> {
        if let Some(cached) = self.chunks.get(&info.id)
            && cached.is_fresh(self.staleness)
        {
            return Ok(cached.value.clone());
        }

        let incomplete = |reason: String| AssemblyError::Incomplete {
            chunk_id: info.id,
            reason,
        };

        let bytes = self
            .fetcher
            .fetch(&chunk_file(info.id))
            .await
            .map_err(|e| incomplete(e.to_string()))?;
        let compact: Vec<CompactRecord> =
            serde_json::from_slice(&bytes).map_err(|e| incomplete(e.to_string()))?;

        if compact.len() != info.count {
            return Err(incomplete(format!(
                "expected {} records, got {}",
                info.count,
                compact.len()
            )));
        }

        let expanded: Arc<Vec<RawRecord>> =
            Arc::new(compact.into_iter().map(CompactRecord::expand).collect());
        self.chunks.insert(info.id, Cached::new(expanded.clone()));
        tracing::debug!("Fetched chunk {} ({} records)", info.id, info.count);

        Ok(expanded)
    }
}
