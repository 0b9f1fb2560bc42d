//! Refresh Coordinator
//!
//! Runs one full reload of the dataset and publishes the result to the `CacheStore`.
//!
//! ## Cycle
//! 1. **Claim**: `try_begin_refresh`. If another cycle is running, return `AlreadyInProgress`.
//! 2. **Primary**: Fetch page 1, derive the page count from the reported total, then fetch the
//!    remaining pages serially (capped at `max_pages`) with a fixed delay between requests.
//! 3. **Fallback**: On any primary failure the pages gathered so far are discarded and the
//!    secondary source is loaded in full. Results from the two are never merged.
//! 4. **Publish**: Exactly once per successful cycle. If both sources fail the previous
//!    snapshot stays in place and the writer slot is released.

use super::store::{CacheStore, Snapshot};
use crate::record::RawRecord;
use crate::source::{BulkSource, PageRequest, PagedSource, SourceError, SourceKind};

use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_MAX_PAGES: u32 = 10;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub page_size: u32,
    /// Hard cap on pages fetched from the primary in one cycle.
    pub max_pages: u32,
    /// Pause between consecutive page requests. Part of the upstream's usage terms.
    pub page_delay: Duration,
    /// Optional region restriction passed to the primary on every page.
    pub region_filter: Option<String>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: DEFAULT_PAGE_DELAY,
            region_filter: None,
        }
    }
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Refreshed {
        snapshot: Arc<Snapshot>,
        source: SourceKind,
    },
    /// Another cycle held the writer slot. Nothing was done.
    AlreadyInProgress,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("all sources failed, cache left unchanged ({0})")]
    AllSourcesFailed(String),
}

/// Synchronous answer to a fire-and-forget refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResult {
    pub accepted: bool,
    pub already_in_progress: bool,
}

pub struct RefreshCoordinator {
    store: Arc<CacheStore>,
    primary: Option<Arc<dyn PagedSource>>,
    secondary: Arc<dyn BulkSource>,
    config: RefreshConfig,
    last_error: RwLock<Option<String>>,
}

/// Releases the writer slot if a cycle ends without publishing (error or panic).
struct RefreshGuard<'a> {
    store: &'a CacheStore,
    armed: bool,
}

impl RefreshGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.abort_refresh();
        }
    }
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<CacheStore>,
        primary: Option<Arc<dyn PagedSource>>,
        secondary: Arc<dyn BulkSource>,
        config: RefreshConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            primary,
            secondary,
            config,
            last_error: RwLock::new(None),
        })
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Runs a full cycle and waits for it.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        if !self.store.try_begin_refresh() {
            tracing::info!("Refresh requested while another is running, skipping");
            return Ok(RefreshOutcome::AlreadyInProgress);
        }
        self.run_cycle().await
    }

    /// Claims the writer slot now and runs the cycle in the background.
    pub fn trigger(self: &Arc<Self>) -> TriggerResult {
        if !self.store.try_begin_refresh() {
            return TriggerResult {
                accepted: false,
                already_in_progress: true,
            };
        }

        let coordinator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = coordinator.run_cycle().await {
                tracing::error!("Background refresh failed: {}", e);
            }
        });

        TriggerResult {
            accepted: true,
            already_in_progress: false,
        }
    }

    /// Description of the last failed cycle, cleared by the next successful one.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Assumes the writer slot is already held by the caller.
    async fn run_cycle(&self) -> Result<RefreshOutcome, RefreshError> {
        let guard = RefreshGuard {
            store: &self.store,
            armed: true,
        };
        let started = Instant::now();

        let primary_error = match &self.primary {
            Some(primary) => match self.fetch_all_pages(primary.as_ref()).await {
                Ok(records) => {
                    return Ok(self.publish(guard, records, primary.kind(), started));
                }
                Err(e) => {
                    tracing::warn!(
                        "Primary source failed, falling back to {}: {}",
                        self.secondary.kind(),
                        e
                    );
                    Some(e)
                }
            },
            None => None,
        };

        match self.secondary.load_all().await {
            Ok(page) => Ok(self.publish(guard, page.records, self.secondary.kind(), started)),
            Err(e) => {
                let reason = match primary_error {
                    Some(primary) => format!("primary: {}; secondary: {}", primary, e),
                    None => format!("secondary: {}", e),
                };
                tracing::error!("Refresh failed, keeping version {}: {}", self.store.version(), reason);
                self.set_last_error(Some(reason.clone()));
                Err(RefreshError::AllSourcesFailed(reason))
            }
        }
    }

    async fn fetch_all_pages(&self, source: &dyn PagedSource) -> Result<Vec<RawRecord>, SourceError> {
        let page_size = self.config.page_size.max(1);

        let first = source.fetch_page(&self.page_request(1, page_size)).await?;
        if first.records.is_empty() {
            return Err(SourceError::Malformed("page 1 returned no records".to_string()));
        }

        let total_pages = first.total_count.div_ceil(page_size as usize);
        let last_page = total_pages.min(self.config.max_pages.max(1) as usize) as u32;
        if total_pages > last_page as usize {
            tracing::warn!(
                "Upstream reports {} pages ({} records), fetching only the first {}",
                total_pages,
                first.total_count,
                last_page
            );
        }

        let mut records = first.records;
        for page_index in 2..=last_page {
            tokio::time::sleep(self.config.page_delay).await;

            let page = source.fetch_page(&self.page_request(page_index, page_size)).await?;
            records.extend(page.records);
            tracing::debug!(
                "Page {}/{} loaded, {} records so far",
                page_index,
                last_page,
                records.len()
            );
        }

        Ok(records)
    }

    fn page_request(&self, page_index: u32, page_size: u32) -> PageRequest {
        PageRequest {
            region_filter: self.config.region_filter.clone(),
            page_index,
            page_size,
        }
    }

    fn publish(
        &self,
        guard: RefreshGuard<'_>,
        records: Vec<RawRecord>,
        source: SourceKind,
        started: Instant,
    ) -> RefreshOutcome {
        let snapshot = Snapshot::from_raw(records, source, Utc::now());
        let published = self.store.publish(snapshot);
        guard.disarm();
        self.set_last_error(None);

        tracing::info!(
            "Published snapshot v{} with {} records from {} in {:?}",
            published.version(),
            published.len(),
            source,
            started.elapsed()
        );

        RefreshOutcome::Refreshed {
            snapshot: published,
            source,
        }
    }

    fn set_last_error(&self, value: Option<String>) {
        *self
            .last_error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}
