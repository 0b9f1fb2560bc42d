use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 1000;
pub const STATS_TOP_N: usize = 10;

/// Filter values that mean "no filter".
pub const ALL_SENTINELS: [&str; 2] = ["all", "전체"];

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    pub search: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    /// 1-indexed.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search: None,
            region: None,
            category: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub items: Vec<Record>,
    pub page: usize,
    pub page_size: usize,
    pub total_matching: usize,
    pub total_pages: usize,
    pub has_more: bool,
    pub cache: CacheInfo,
}

/// Freshness of the snapshot a result was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the whole snapshot, not of the filtered set.
    pub total_cached: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub name: String,
    pub count: usize,
}

/// Aggregate counts over the whole snapshot.
///
/// `region_stats` and `category_stats` hold only the top entries; the `total_*` fields
/// always describe the full dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub total_regions: usize,
    pub total_categories: usize,
    pub region_stats: Vec<FacetCount>,
    pub category_stats: Vec<FacetCount>,
}
