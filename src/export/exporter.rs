use super::types::{ChunkInfo, ExportBundle, ExportError, MANIFEST_FILE, Manifest, chunk_file};
use crate::cache::Snapshot;
use crate::record::CompactRecord;

use chrono::Utc;
use std::path::{Path, PathBuf};

/// Splits a snapshot into fixed-size chunks of compact records plus a manifest.
pub struct ChunkExporter {
    chunk_size: usize,
}

impl ChunkExporter {
    pub fn new(chunk_size: usize) -> Result<Self, ExportError> {
        if chunk_size == 0 {
            return Err(ExportError::InvalidChunkSize);
        }
        Ok(Self { chunk_size })
    }

    /// Chunk `i` holds records `[i * chunk_size, min((i + 1) * chunk_size, total))` in
    /// snapshot order.
    pub fn export(&self, snapshot: &Snapshot) -> Result<ExportBundle, ExportError> {
        let records = snapshot.records();
        let mut chunks = Vec::with_capacity(records.len().div_ceil(self.chunk_size));
        let mut infos = Vec::with_capacity(chunks.capacity());

        for (id, slice) in records.chunks(self.chunk_size).enumerate() {
            let compact: Vec<CompactRecord> = slice.iter().map(CompactRecord::from).collect();
            chunks.push(serde_json::to_vec(&compact)?);

            let start_offset = id * self.chunk_size;
            infos.push(ChunkInfo {
                id,
                start_offset,
                end_offset: start_offset + slice.len(),
                count: slice.len(),
            });
        }

        let manifest = Manifest {
            total_records: records.len(),
            regions: snapshot.regions().to_vec(),
            categories: snapshot.categories().to_vec(),
            chunks: infos,
            last_updated: snapshot.last_updated().unwrap_or_else(Utc::now),
        };

        tracing::info!(
            "Exported {} records into {} chunks of up to {}",
            manifest.total_records,
            manifest.chunks.len(),
            self.chunk_size
        );

        Ok(ExportBundle { chunks, manifest })
    }

    /// Writes `metadata.json` and one `data-{id}.json` per chunk into `dir`.
    pub async fn write_to_dir(bundle: &ExportBundle, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        tokio::fs::create_dir_all(dir).await?;

        let mut written = Vec::with_capacity(bundle.chunks.len() + 1);
        for (id, bytes) in bundle.chunks.iter().enumerate() {
            let path = dir.join(chunk_file(id));
            tokio::fs::write(&path, bytes).await?;
            tracing::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
            written.push(path);
        }

        // Manifest last, so a reader never sees it before the chunks it lists
        let manifest_path = dir.join(MANIFEST_FILE);
        tokio::fs::write(&manifest_path, serde_json::to_vec_pretty(&bundle.manifest)?).await?;
        written.push(manifest_path);

        tracing::info!("Wrote {} artifacts to {}", written.len(), dir.display());
        Ok(written)
    }
}
