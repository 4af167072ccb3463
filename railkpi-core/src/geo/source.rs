//! Where boundary GeoJSON comes from: a local file or a URL.
//!
//! Remote fetches use a blocking client with a 30 second timeout and retry
//! connection failures, timeouts and 5xx responses with exponential backoff.
//! A 4xx response fails immediately.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::feature::FeatureCollection;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GeoJSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },
}

/// A source of region boundaries.
pub trait BoundarySource: Send + Sync {
    /// Where the boundaries come from, for logs and errors.
    fn describe(&self) -> String;

    fn load(&self) -> Result<FeatureCollection, GeoError>;
}

/// Pick a source from a string: `http://` and `https://` are fetched,
/// everything else is read as a path.
pub fn source_for(location: &str) -> Result<Box<dyn BoundarySource>, GeoError> {
    source_with_settings(location, DEFAULT_TIMEOUT, DEFAULT_MAX_RETRIES)
}

/// Like [`source_for`], with explicit timeout and retry settings for URLs.
pub fn source_with_settings(
    location: &str,
    timeout: Duration,
    max_retries: u32,
) -> Result<Box<dyn BoundarySource>, GeoError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpBoundarySource::with_settings(
            location,
            timeout,
            max_retries,
        )?))
    } else {
        Ok(Box::new(FileBoundarySource::new(location)))
    }
}

fn parse(origin: &str, body: &str) -> Result<FeatureCollection, GeoError> {
    FeatureCollection::from_json(body).map_err(|source| GeoError::Json {
        origin: origin.to_string(),
        source,
    })
}

// ─── File ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileBoundarySource {
    path: PathBuf,
}

impl FileBoundarySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BoundarySource for FileBoundarySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<FeatureCollection, GeoError> {
        let body = std::fs::read_to_string(&self.path).map_err(|source| GeoError::Io {
            path: self.path.clone(),
            source,
        })?;
        let collection = parse(&self.describe(), &body)?;
        debug!(path = %self.path.display(), features = collection.len(), "loaded boundaries");
        Ok(collection)
    }
}

// ─── HTTP ───────────────────────────────────────────────────────────

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Upper bound accepted from configuration.
pub const MAX_RETRIES_LIMIT: u32 = 10;

pub struct HttpBoundarySource {
    url: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpBoundarySource {
    pub fn new(url: impl Into<String>) -> Result<Self, GeoError> {
        Self::with_settings(url, DEFAULT_TIMEOUT, DEFAULT_MAX_RETRIES)
    }

    pub fn with_settings(
        url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, GeoError> {
        let url = url.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeoError::Network {
                url: url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            url,
            client,
            max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    fn fetch_with_retry(&self) -> Result<String, GeoError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self
                    .base_delay
                    .saturating_mul(2u32.saturating_pow(attempt - 1));
                warn!(url = %self.url, attempt, ?delay, "retrying boundary fetch");
                std::thread::sleep(delay);
            }

            match self.client.get(&self.url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_client_error() {
                        return Err(GeoError::Http {
                            url: self.url.clone(),
                            status: status.as_u16(),
                        });
                    }
                    if !status.is_success() {
                        last_error = Some(GeoError::Http {
                            url: self.url.clone(),
                            status: status.as_u16(),
                        });
                        continue;
                    }
                    return resp.text().map_err(|e| GeoError::Network {
                        url: self.url.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    let err = GeoError::Network {
                        url: self.url.clone(),
                        message: e.to_string(),
                    };
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GeoError::Network {
            url: self.url.clone(),
            message: "max retries exceeded".into(),
        }))
    }
}

impl BoundarySource for HttpBoundarySource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<FeatureCollection, GeoError> {
        let body = self.fetch_with_retry()?;
        let collection = parse(&self.url, &body)?;
        debug!(url = %self.url, features = collection.len(), "fetched boundaries");
        Ok(collection)
    }
}
