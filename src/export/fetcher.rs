//! Artifact Fetchers
//!
//! Static artifacts are plain files, so fetching one is a path lookup against either an
//! HTTP origin (a static site) or a local directory.

use super::types::FetchError;

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Returns the raw bytes of the artifact at `path`, relative to the artifact root.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url(path);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Unavailable(format!("{}: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !response.status().is_success() {
            return Err(FetchError::Unavailable(format!(
                "{} responded with {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Unavailable(format!("{}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactFetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.root.join(path);
        tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(full.display().to_string()),
            _ => FetchError::Unavailable(format!("{}: {}", full.display(), e)),
        })
    }
}
