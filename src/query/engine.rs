use super::types::{
    ALL_SENTINELS, CacheInfo, DEFAULT_PAGE_SIZE, FacetCount, MAX_PAGE_SIZE, PagedResult, QueryParams,
    STATS_TOP_N, Stats,
};
use crate::cache::{CacheStore, Snapshot};
use crate::record::Record;

use std::collections::HashMap;
use std::sync::Arc;

/// Read-side view over the `CacheStore`.
///
/// Every operation takes one snapshot reference up front and works on it alone, so a
/// refresh publishing mid-query cannot change the result.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<CacheStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.get()
    }

    pub fn query(&self, params: &QueryParams) -> PagedResult {
        let snapshot = self.store.get();
        execute(&snapshot, params)
    }

    pub fn get_by_name(&self, name: &str) -> Option<Record> {
        self.store.get().get_by_name(name).cloned()
    }

    pub fn distinct_regions(&self) -> Vec<String> {
        self.store.get().regions().to_vec()
    }

    pub fn distinct_categories(&self) -> Vec<String> {
        self.store.get().categories().to_vec()
    }

    pub fn stats(&self) -> Stats {
        let snapshot = self.store.get();
        aggregate(&snapshot)
    }
}

/// Runs search, filters and pagination against one snapshot in a single pass.
pub fn execute(snapshot: &Snapshot, params: &QueryParams) -> PagedResult {
    let page = params.page.max(1);
    let page_size = match params.page_size {
        0 => DEFAULT_PAGE_SIZE,
        size => size.min(MAX_PAGE_SIZE),
    };

    let needle = params
        .search
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    let region = active_filter(params.region.as_deref());
    let category = active_filter(params.category.as_deref());

    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size);

    let mut total_matching = 0usize;
    let mut items = Vec::new();
    let matches = snapshot.records().iter().filter(|record| {
        region.is_none_or(|r| record.region == r)
            && category.is_none_or(|c| record.category == c)
            && record.matches_text(&needle)
    });
    for record in matches {
        if total_matching >= start && total_matching < end {
            items.push(record.clone());
        }
        total_matching += 1;
    }

    PagedResult {
        items,
        page,
        page_size,
        total_matching,
        total_pages: total_matching.div_ceil(page_size),
        has_more: end < total_matching,
        cache: CacheInfo {
            last_updated: snapshot.last_updated(),
            total_cached: snapshot.len(),
        },
    }
}

fn active_filter(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !ALL_SENTINELS.contains(v))
}

/// Per-region and per-category counts, highest first, ties broken by name.
pub fn aggregate(snapshot: &Snapshot) -> Stats {
    let mut regions: HashMap<&str, usize> = HashMap::new();
    let mut categories: HashMap<&str, usize> = HashMap::new();

    for record in snapshot.records() {
        if !record.region.is_empty() {
            *regions.entry(record.region.as_str()).or_insert(0) += 1;
        }
        if !record.category.is_empty() {
            *categories.entry(record.category.as_str()).or_insert(0) += 1;
        }
    }

    Stats {
        total: snapshot.len(),
        total_regions: regions.len(),
        total_categories: categories.len(),
        region_stats: top_counts(regions),
        category_stats: top_counts(categories),
    }
}

fn top_counts(counts: HashMap<&str, usize>) -> Vec<FacetCount> {
    let mut sorted: Vec<FacetCount> = counts
        .into_iter()
        .map(|(name, count)| FacetCount {
            name: name.to_string(),
            count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    sorted.truncate(STATS_TOP_N);
    sorted
}
