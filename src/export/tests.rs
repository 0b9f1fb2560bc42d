//! Export Module Tests
//!
//! ## Test Scopes
//! - **Exporter**: Chunk boundaries, manifest contents and the compact wire format.
//! - **Assembler**: Ordered reassembly, field-level round trip, per-chunk caching, staleness
//!   and all-or-nothing failure.
//! - **Filesystem**: Writing artifacts to disk and reading them back through `DirFetcher`.

#[cfg(test)]
mod tests {
    use crate::cache::Snapshot;
    use crate::export::types::{MANIFEST_FILE, chunk_file};
    use crate::export::{
        AssemblyError, ChunkAssembler, ChunkExporter, DirFetcher, ExportBundle, ExportError,
    };
    use crate::record::RawRecord;
    use crate::source::{BulkSource, SourceKind, StaticChunkedSource};
    use crate::testing::{MemoryFetcher, raw, raw_named};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn snapshot_of(raw: Vec<RawRecord>) -> Snapshot {
        Snapshot::from_raw(raw, SourceKind::Remote, Utc::now())
    }

    fn publish(bundle: &ExportBundle) -> Arc<MemoryFetcher> {
        let fetcher = Arc::new(MemoryFetcher::default());
        for (id, bytes) in bundle.chunks.iter().enumerate() {
            fetcher.files.insert(chunk_file(id), bytes.clone());
        }
        fetcher
            .files
            .insert(MANIFEST_FILE.to_string(), serde_json::to_vec(&bundle.manifest).unwrap());
        fetcher
    }

    fn detailed() -> Vec<RawRecord> {
        let mut full = raw("풀옵션학원", "수원시", "국제화");
        full.representative = Some("홍길동".to_string());
        full.phone = Some("031-111-2222".to_string());
        full.latitude = Some(37.2636);
        full.longitude = Some(127.0286);

        let mut lot_only = raw("지번학원", "고양시", "예능");
        lot_only.road_address = None;
        lot_only.lot_address = Some("경기도 고양시 일산동 1-1".to_string());
        lot_only.latitude = Some(37.65);

        let mut bare = RawRecord {
            name: Some("빈학원".to_string()),
            ..Default::default()
        };
        bare.longitude = Some(126.9);

        vec![full, lot_only, bare]
    }

    // ============================================================
    // EXPORTER
    // ============================================================

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(ChunkExporter::new(0), Err(ExportError::InvalidChunkSize)));
    }

    #[test]
    fn test_chunk_boundaries_and_manifest() {
        let snapshot = snapshot_of(raw_named("r", 12));
        let bundle = ChunkExporter::new(5).unwrap().export(&snapshot).unwrap();
        let manifest = &bundle.manifest;

        assert_eq!(bundle.chunks.len(), 3);
        assert_eq!(manifest.total_records, 12);
        assert_eq!(manifest.chunks.len(), 3);

        let last = &manifest.chunks[2];
        assert_eq!((last.id, last.start_offset, last.end_offset, last.count), (2, 10, 12, 2));
        assert_eq!(manifest.chunks[1].start_offset, 5);
        assert_eq!(manifest.last_updated, snapshot.last_updated().unwrap());
    }

    #[test]
    fn test_manifest_lists_sorted_facets() {
        let snapshot = snapshot_of(vec![
            raw("A", "고양시", "예능"),
            raw("B", "가평군", "국제화"),
            raw("C", "고양시", ""),
        ]);
        let bundle = ChunkExporter::new(5000).unwrap().export(&snapshot).unwrap();

        assert_eq!(bundle.manifest.regions, vec!["가평군", "고양시"]);
        assert_eq!(bundle.manifest.categories, vec!["국제화", "예능"]);
    }

    #[test]
    fn test_chunks_preserve_order_with_compact_keys() {
        let snapshot = snapshot_of(raw_named("r", 4));
        let bundle = ChunkExporter::new(3).unwrap().export(&snapshot).unwrap();

        let second: serde_json::Value = serde_json::from_slice(&bundle.chunks[1]).unwrap();
        assert_eq!(second.as_array().unwrap().len(), 1);
        assert_eq!(second[0]["n"], "r-3");
    }

    #[test]
    fn test_manifest_json_is_camel_case() {
        let bundle = ChunkExporter::new(2)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 3)))
            .unwrap();
        let json = serde_json::to_value(&bundle.manifest).unwrap();

        assert_eq!(json["totalRecords"], 3);
        assert_eq!(json["chunks"][1]["startOffset"], 2);
        assert_eq!(json["chunks"][1]["endOffset"], 3);
        assert!(json["lastUpdated"].is_string());
    }

    #[test]
    fn test_empty_snapshot_exports_no_chunks() {
        let bundle = ChunkExporter::new(10).unwrap().export(&Snapshot::empty()).unwrap();
        assert!(bundle.chunks.is_empty());
        assert_eq!(bundle.manifest.total_records, 0);
    }

    // ============================================================
    // ASSEMBLER
    // ============================================================

    #[tokio::test]
    async fn test_round_trip_restores_every_field() {
        let original = snapshot_of(detailed());
        let bundle = ChunkExporter::new(2).unwrap().export(&original).unwrap();
        let assembler = ChunkAssembler::new(publish(&bundle));

        let restored = assembler.load_all().await.expect("assembly failed");

        assert_eq!(restored.records(), original.records());
        assert_eq!(restored.source(), Some(SourceKind::StaticChunks));
        assert_eq!(restored.last_updated(), original.last_updated());
    }

    #[tokio::test]
    async fn test_raw_records_carry_address_in_both_fields() {
        let bundle = ChunkExporter::new(10)
            .unwrap()
            .export(&snapshot_of(detailed()))
            .unwrap();
        let assembler = ChunkAssembler::new(publish(&bundle));

        let raw = assembler.load_raw().await.unwrap();

        let lot_only = raw.iter().find(|r| r.name.as_deref() == Some("지번학원")).unwrap();
        assert_eq!(lot_only.road_address.as_deref(), Some("경기도 고양시 일산동 1-1"));
        assert_eq!(lot_only.lot_address, lot_only.road_address);
    }

    #[tokio::test]
    async fn test_chunks_are_assembled_by_ascending_id() {
        let mut bundle = ChunkExporter::new(2)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 6)))
            .unwrap();
        bundle.manifest.chunks.reverse();
        let assembler = ChunkAssembler::new(publish(&bundle));

        let snapshot = assembler.load_all().await.unwrap();
        let names: Vec<&str> = snapshot.records().iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["r-0", "r-1", "r-2", "r-3", "r-4", "r-5"]);
    }

    #[tokio::test]
    async fn test_failed_chunk_aborts_and_retry_skips_cached_chunks() {
        let bundle = ChunkExporter::new(2)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 6)))
            .unwrap();
        let fetcher = publish(&bundle);
        fetcher.fail(&chunk_file(1));
        let assembler = ChunkAssembler::new(fetcher.clone());

        let result = assembler.load_all().await;
        assert!(matches!(
            result,
            Err(AssemblyError::Incomplete { chunk_id: 1, .. })
        ));

        fetcher.heal(&chunk_file(1));
        let snapshot = assembler.load_all().await.unwrap();

        assert_eq!(snapshot.len(), 6);
        assert_eq!(fetcher.fetch_count(&chunk_file(0)), 1, "chunk 0 was cached");
        assert_eq!(fetcher.fetch_count(&chunk_file(1)), 2);
        assert_eq!(fetcher.fetch_count(MANIFEST_FILE), 1);
    }

    #[tokio::test]
    async fn test_missing_manifest_is_reported() {
        let assembler = ChunkAssembler::new(Arc::new(MemoryFetcher::default()));
        assert!(matches!(
            assembler.load_all().await,
            Err(AssemblyError::Manifest(_))
        ));
    }

    #[tokio::test]
    async fn test_chunk_count_disagreeing_with_manifest() {
        let mut bundle = ChunkExporter::new(3)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 3)))
            .unwrap();
        bundle.manifest.chunks[0].count = 4;
        let assembler = ChunkAssembler::new(publish(&bundle));

        assert!(matches!(
            assembler.load_all().await,
            Err(AssemblyError::Incomplete { chunk_id: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_chunk_is_incomplete() {
        let bundle = ChunkExporter::new(3)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 3)))
            .unwrap();
        let fetcher = publish(&bundle);
        fetcher.files.insert(chunk_file(0), b"{not json".to_vec());
        let assembler = ChunkAssembler::new(fetcher);

        assert!(matches!(
            assembler.load_all().await,
            Err(AssemblyError::Incomplete { chunk_id: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_fresh_cache_avoids_refetching() {
        let bundle = ChunkExporter::new(2)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 4)))
            .unwrap();
        let fetcher = publish(&bundle);
        let assembler = ChunkAssembler::new(fetcher.clone());

        assembler.load_all().await.unwrap();
        assembler.load_all().await.unwrap();

        assert_eq!(fetcher.fetch_count(MANIFEST_FILE), 1);
        assert_eq!(fetcher.fetch_count(&chunk_file(1)), 1);
        assert_eq!(assembler.cached_chunk_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_forces_full_reload() {
        let bundle = ChunkExporter::new(2)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 4)))
            .unwrap();
        let fetcher = publish(&bundle);
        let assembler = ChunkAssembler::with_staleness(fetcher.clone(), Duration::ZERO);

        assembler.load_all().await.unwrap();
        assembler.load_all().await.unwrap();

        assert_eq!(fetcher.fetch_count(MANIFEST_FILE), 2);
        assert_eq!(fetcher.fetch_count(&chunk_file(0)), 2);
    }

    #[tokio::test]
    async fn test_static_source_exposes_assembled_records() {
        let bundle = ChunkExporter::new(2)
            .unwrap()
            .export(&snapshot_of(raw_named("r", 5)))
            .unwrap();
        let source = StaticChunkedSource::new(Arc::new(ChunkAssembler::new(publish(&bundle))));

        let page = source.load_all().await.unwrap();

        assert_eq!(source.kind(), SourceKind::StaticChunks);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.records[4].name.as_deref(), Some("r-4"));
    }

    // ============================================================
    // FILESYSTEM
    // ============================================================

    #[tokio::test]
    async fn test_write_to_dir_and_assemble_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let original = snapshot_of(detailed());
        let bundle = ChunkExporter::new(2).unwrap().export(&original).unwrap();

        let written = ChunkExporter::write_to_dir(&bundle, dir.path()).await.unwrap();

        assert_eq!(written.len(), 3);
        assert!(dir.path().join("metadata.json").exists());
        assert!(dir.path().join("data-1.json").exists());

        let assembler = ChunkAssembler::new(Arc::new(DirFetcher::new(dir.path())));
        let restored = assembler.load_all().await.unwrap();
        assert_eq!(restored.records(), original.records());
    }
}
