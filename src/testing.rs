//! Test doubles shared by the module test suites.

use crate::cache::{CacheStore, Snapshot};
use crate::export::{ArtifactFetcher, FetchError};
use crate::record::RawRecord;
use crate::source::{BulkSource, PageRequest, PagedSource, SourceError, SourceKind, SourcePage};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn raw(name: &str, region: &str, category: &str) -> RawRecord {
    RawRecord {
        name: Some(name.to_string()),
        region: Some(region.to_string()),
        district: Some("중앙동".to_string()),
        category: Some(category.to_string()),
        road_address: Some(format!("경기도 {} 중앙로 1", region)),
        ..Default::default()
    }
}

pub fn raw_named(prefix: &str, count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| raw(&format!("{}-{}", prefix, i), "수원시", "보습"))
        .collect()
}

/// A store with `raw` already published as version 1.
pub fn store_with(raw: Vec<RawRecord>) -> Arc<CacheStore> {
    let store = CacheStore::new();
    store.publish(Snapshot::from_raw(raw, SourceKind::LocalFile, Utc::now()));
    store
}

/// Paginated source serving `total_count` synthetic records, with optional failure on a page.
pub struct FakePagedSource {
    pub total_count: usize,
    pub fail_on_page: Option<u32>,
    pub requested_pages: Mutex<Vec<u32>>,
    /// When set, `fetch_page` waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
}

impl FakePagedSource {
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            fail_on_page: None,
            requested_pages: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn failing_on(total_count: usize, page: u32) -> Self {
        Self {
            fail_on_page: Some(page),
            ..Self::new(total_count)
        }
    }

    pub fn pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl PagedSource for FakePagedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<SourcePage, SourceError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.requested_pages.lock().unwrap().push(request.page_index);

        if self.fail_on_page == Some(request.page_index) {
            return Err(SourceError::Unavailable("connection reset".to_string()));
        }

        let size = request.page_size as usize;
        let start = (request.page_index as usize - 1) * size;
        let end = (start + size).min(self.total_count);
        let records = (start..end)
            .map(|i| raw(&format!("remote-{}", i), "고양시", "국제화"))
            .collect();

        Ok(SourcePage {
            records,
            total_count: self.total_count,
        })
    }
}

/// Bulk source returning a fixed record set, or failing when `records` is `None`.
pub struct FakeBulkSource {
    pub records: Option<Vec<RawRecord>>,
    pub calls: AtomicUsize,
}

impl FakeBulkSource {
    pub fn with(records: Vec<RawRecord>) -> Self {
        Self {
            records: Some(records),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            records: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BulkSource for FakeBulkSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LocalFile
    }

    async fn load_all(&self) -> Result<SourcePage, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.records {
            Some(records) => Ok(SourcePage {
                total_count: records.len(),
                records: records.clone(),
            }),
            None => Err(SourceError::Unavailable("file not found".to_string())),
        }
    }
}

/// In-memory artifact store that counts fetches and can be told to fail on given paths.
#[derive(Default)]
pub struct MemoryFetcher {
    pub files: DashMap<String, Vec<u8>>,
    pub failing: Mutex<HashSet<String>>,
    pub fetches: DashMap<String, usize>,
}

impl MemoryFetcher {
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.get(path).map(|count| *count).unwrap_or(0)
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
    }
}

#[async_trait]
impl ArtifactFetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        *self.fetches.entry(path.to_string()).or_insert(0) += 1;

        if self.failing.lock().unwrap().contains(path) {
            return Err(FetchError::Unavailable(format!("{} unreachable", path)));
        }
        self.files
            .get(path)
            .map(|bytes| bytes.clone())
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}
