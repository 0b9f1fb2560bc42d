//! Process Configuration
//!
//! Everything is read from environment variables once at startup. Unset variables fall
//! back to defaults; set-but-unparseable ones are errors, so a typo never silently turns
//! into a default.
//!
//! ## Variables
//! - `BIND_ADDR`: HTTP listen address (default `127.0.0.1:5000`).
//! - `PRIMARY_API_URL`, `PRIMARY_API_KEY`, `PRIMARY_DATASET`, `PRIMARY_REGION`: The remote
//!   paginated source. Without a URL there is no primary.
//! - `FALLBACK_FILE`: The local bulk file (default `data/facilities.json`).
//! - `STATIC_BASE_URL` / `STATIC_DIR`: Replace the local file with another process's static
//!   export, served over HTTP or read from a directory.
//! - `PAGE_SIZE` (1000), `MAX_PAGES` (10), `PAGE_DELAY_MS` (200): Primary paging.
//! - `CHUNK_SIZE` (5000), `STATIC_STALENESS_SECS` (3600): Static export and assembly.
//! - `REFRESH_INTERVAL_SECS` (0 = off): Periodic background refresh.

use crate::cache::{CacheStore, RefreshConfig, RefreshCoordinator};
use crate::cache::refresh::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use crate::export::types::{DEFAULT_CHUNK_SIZE, DEFAULT_STALENESS};
use crate::export::{ArtifactFetcher, ChunkAssembler, DirFetcher, HttpFetcher};
use crate::source::remote::{DEFAULT_DATASET, REQUEST_TIMEOUT};
use crate::source::{
    BulkSource, LocalBulkSource, PagedSource, RemoteConfig, RemotePaginatedSource,
    StaticChunkedSource,
};

use anyhow::{Context, bail};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_FALLBACK_FILE: &str = "data/facilities.json";
const DEFAULT_PAGE_DELAY_MS: u64 = 200;

/// Where a consuming process finds another process's static export.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticOrigin {
    Http(String),
    Dir(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub primary: Option<RemoteConfig>,
    pub fallback_file: PathBuf,
    pub static_origin: Option<StaticOrigin>,
    pub refresh: RefreshConfig,
    pub chunk_size: usize,
    pub static_staleness: Duration,
    /// `None` disables the periodic refresh loop.
    pub refresh_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or(&var, "BIND_ADDR", DEFAULT_BIND_ADDR.parse::<SocketAddr>()?)?;

        let primary = match var("PRIMARY_API_URL") {
            Some(base_url) => {
                let api_key = var("PRIMARY_API_KEY")
                    .context("PRIMARY_API_KEY is required when PRIMARY_API_URL is set")?;
                Some(RemoteConfig {
                    base_url,
                    api_key,
                    dataset: var("PRIMARY_DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string()),
                    timeout: REQUEST_TIMEOUT,
                })
            }
            None => None,
        };

        let static_origin = match (var("STATIC_BASE_URL"), var("STATIC_DIR")) {
            (Some(_), Some(_)) => bail!("STATIC_BASE_URL and STATIC_DIR are mutually exclusive"),
            (Some(url), None) => Some(StaticOrigin::Http(url)),
            (None, Some(dir)) => Some(StaticOrigin::Dir(PathBuf::from(dir))),
            (None, None) => None,
        };

        let refresh = RefreshConfig {
            page_size: parse_or(&var, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_pages: parse_or(&var, "MAX_PAGES", DEFAULT_MAX_PAGES)?,
            page_delay: Duration::from_millis(parse_or(&var, "PAGE_DELAY_MS", DEFAULT_PAGE_DELAY_MS)?),
            region_filter: var("PRIMARY_REGION"),
        };

        let chunk_size = parse_or(&var, "CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        if chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than zero");
        }

        let static_staleness = Duration::from_secs(parse_or(
            &var,
            "STATIC_STALENESS_SECS",
            DEFAULT_STALENESS.as_secs(),
        )?);

        let refresh_interval = match parse_or(&var, "REFRESH_INTERVAL_SECS", 0u64)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            bind_addr,
            primary,
            fallback_file: var("FALLBACK_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_FILE)),
            static_origin,
            refresh,
            chunk_size,
            static_staleness,
            refresh_interval,
        })
    }

    pub fn build_primary(&self) -> anyhow::Result<Option<Arc<dyn PagedSource>>> {
        let Some(remote) = &self.primary else {
            return Ok(None);
        };
        let source = RemotePaginatedSource::new(remote.clone())
            .context("failed to set up the remote source")?;
        Ok(Some(Arc::new(source)))
    }

    pub fn build_secondary(&self) -> anyhow::Result<Arc<dyn BulkSource>> {
        let fetcher: Arc<dyn ArtifactFetcher> = match &self.static_origin {
            None => return Ok(Arc::new(LocalBulkSource::new(&self.fallback_file))),
            Some(StaticOrigin::Http(url)) => Arc::new(
                HttpFetcher::new(url, REQUEST_TIMEOUT)
                    .context("failed to set up the static artifact client")?,
            ),
            Some(StaticOrigin::Dir(dir)) => Arc::new(DirFetcher::new(dir)),
        };

        let assembler = ChunkAssembler::with_staleness(fetcher, self.static_staleness);
        Ok(Arc::new(StaticChunkedSource::new(Arc::new(assembler))))
    }

    pub fn build_coordinator(&self, store: Arc<CacheStore>) -> anyhow::Result<Arc<RefreshCoordinator>> {
        Ok(RefreshCoordinator::new(
            store,
            self.build_primary()?,
            self.build_secondary()?,
            self.refresh.clone(),
        ))
    }
}

fn parse_or<T, V>(var: &V, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
