//! Fetching asset and screenshot bytes by URL at export time
//!
//! Fetches are sequential and single-shot: no retries, no backoff.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Resolves a URL to binary content
pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F: AssetFetcher + ?Sized> AssetFetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}

/// Serves content from an in-memory URL map
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content for a URL
    pub fn with_resource(mut self, url: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(url, data);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.resources.insert(url.into(), data.into());
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

/// Reads `file://` URLs and root-relative media paths from disk
#[derive(Debug, Clone)]
pub struct FileFetcher {
    media_root: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher resolving relative paths against `media_root`
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        if url.starts_with("file://") {
            let parsed =
                url::Url::parse(url).map_err(|_| FetchError::UnsupportedUrl(url.to_string()))?;
            return parsed
                .to_file_path()
                .map_err(|_| FetchError::UnsupportedUrl(url.to_string()));
        }
        if url.contains("://") {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }

        let relative = Path::new(url.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }
        Ok(self.media_root.join(relative))
    }
}

impl AssetFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(url)?;
        if !path.is_file() {
            return Err(FetchError::NotFound(url.to_string()));
        }
        Ok(std::fs::read(path)?)
    }
}

/// Blocking HTTP(S) fetcher
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::Http(e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
