//! Snapshot Store
//!
//! Holds the currently published `Snapshot` behind a single shared pointer.
//!
//! ## Concurrency
//! - **Readers** load the `Arc<Snapshot>` from an `ArcSwap` without taking any lock, so a
//!   query never waits on a writer and never observes a half-built snapshot.
//! - **Writers** are serialized by the `refreshing` flag (compare-and-swap). A second refresh
//!   request fails fast instead of queuing. `publish` additionally holds a writer-only mutex
//!   while it stamps the next version and swaps the pointer; readers never touch it.

use crate::record::{RawRecord, Record};
use crate::source::SourceKind;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An immutable, versioned view of the dataset.
///
/// The name index and facet lists are computed on first use and live as long as the
/// snapshot, so they are naturally invalidated when a new version is published.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<Record>,
    last_updated: Option<DateTime<Utc>>,
    version: u64,
    source: Option<SourceKind>,
    name_index: OnceCell<HashMap<String, usize>>,
    facets: OnceCell<Facets>,
}

#[derive(Debug, Default)]
struct Facets {
    regions: Vec<String>,
    categories: Vec<String>,
}

impl Snapshot {
    /// The version-0 snapshot a store starts with.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None, None)
    }

    /// Builds an unpublished snapshot. The version is assigned by `CacheStore::publish`.
    pub fn new(
        records: Vec<Record>,
        last_updated: Option<DateTime<Utc>>,
        source: Option<SourceKind>,
    ) -> Self {
        Self {
            records,
            last_updated,
            version: 0,
            source,
            name_index: OnceCell::new(),
            facets: OnceCell::new(),
        }
    }

    /// Resolves raw records into a snapshot, dropping the ones without a name.
    pub fn from_raw(raw: Vec<RawRecord>, source: SourceKind, last_updated: DateTime<Utc>) -> Self {
        let total = raw.len();
        let records: Vec<Record> = raw.into_iter().filter_map(Record::from_raw).collect();

        let dropped = total - records.len();
        if dropped > 0 {
            tracing::warn!("Dropped {} of {} records without a name", dropped, total);
        }

        Self::new(records, Some(last_updated), Some(source))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    /// Exact-name lookup. When several records share a name the last one wins.
    pub fn get_by_name(&self, name: &str) -> Option<&Record> {
        let index = self.name_index.get_or_init(|| {
            self.records
                .iter()
                .enumerate()
                .map(|(position, record)| (record.name.clone(), position))
                .collect()
        });
        index.get(name).map(|&position| &self.records[position])
    }

    /// Sorted distinct non-empty regions.
    pub fn regions(&self) -> &[String] {
        &self.facets().regions
    }

    /// Sorted distinct non-empty categories.
    pub fn categories(&self) -> &[String] {
        &self.facets().categories
    }

    fn facets(&self) -> &Facets {
        self.facets.get_or_init(|| {
            let mut regions = BTreeSet::new();
            let mut categories = BTreeSet::new();
            for record in &self.records {
                if !record.region.is_empty() {
                    regions.insert(record.region.as_str());
                }
                if !record.category.is_empty() {
                    categories.insert(record.category.as_str());
                }
            }
            Facets {
                regions: regions.into_iter().map(str::to_string).collect(),
                categories: categories.into_iter().map(str::to_string).collect(),
            }
        })
    }
}

/// Owner of the current snapshot and the refresh-in-progress flag.
pub struct CacheStore {
    current: ArcSwap<Snapshot>,
    /// Orders concurrent `publish` calls so versions stay strictly increasing.
    publish_lock: Mutex<()>,
    refreshing: AtomicBool,
}

impl CacheStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the current snapshot. The caller keeps a consistent view for as long as it
    /// holds the `Arc`, even if a newer snapshot is published meanwhile.
    pub fn get(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Claims the writer slot. Returns `false` if a refresh is already running.
    pub fn try_begin_refresh(&self) -> bool {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Swaps in `snapshot` as the next version and releases the writer slot.
    pub fn publish(&self, mut snapshot: Snapshot) -> Arc<Snapshot> {
        let published = {
            let _writer = self
                .publish_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            snapshot.version = self.current.load().version + 1;
            let published = Arc::new(snapshot);
            self.current.store(published.clone());
            published
        };

        self.refreshing.store(false, Ordering::Release);
        published
    }

    /// Releases the writer slot without touching the current snapshot.
    pub fn abort_refresh(&self) {
        self.refreshing.store(false, Ordering::Release);
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    pub fn version(&self) -> u64 {
        self.get().version()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::empty()),
            publish_lock: Mutex::new(()),
            refreshing: AtomicBool::new(false),
        }
    }
}
