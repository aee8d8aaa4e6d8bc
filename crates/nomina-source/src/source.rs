//! Raw CSV sources

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::SourceError;

/// Published CSV export of the budget-execution spreadsheet
pub const DEFAULT_URL: &str =
    "https://docs.google.com/spreadsheets/d/1IHHoIxwkfs3Fre-gYVjHDkRIBeyP3vPP/export?format=csv";

/// Default HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Anything that can produce the raw tabular text
pub trait DataSource {
    /// Location shown in logs and messages
    fn describe(&self) -> String;

    /// Fetch the current body. `refresh` asks the source to bypass any
    /// intermediate cache.
    fn fetch(&self, refresh: bool) -> Result<String, SourceError>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Blocking HTTP GET of a CSV export
#[derive(Clone, Debug)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request URL, with a millisecond cache-buster when refreshing
    pub fn request_url(&self, refresh: bool, epoch_ms: i64) -> String {
        if !refresh {
            return self.url.clone();
        }
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{sep}_={epoch_ms}", self.url)
    }
}

impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self, refresh: bool) -> Result<String, SourceError> {
        let url = self.request_url(refresh, Utc::now().timestamp_millis());
        let http = |source| SourceError::Http {
            url: self.url.clone(),
            source,
        };

        debug!(url = %url, timeout_secs = self.timeout.as_secs(), "fetching CSV");
        let client = Client::builder().timeout(self.timeout).build().map_err(http)?;
        let response = client.get(&url).send().map_err(http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(http)?;
        if body.trim().is_empty() {
            return Err(SourceError::Empty(self.url.clone()));
        }
        info!(bytes = body.len(), "fetched CSV");
        Ok(body)
    }
}

// ============================================================================
// File
// ============================================================================

/// Local CSV file
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self, _refresh: bool) -> Result<String, SourceError> {
        let body = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        if body.trim().is_empty() {
            return Err(SourceError::Empty(self.describe()));
        }
        debug!(path = %self.path.display(), bytes = body.len(), "read CSV file");
        Ok(body)
    }
}
