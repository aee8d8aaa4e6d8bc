//! # nomina-source
//!
//! Where budget tables come from.
//!
//! - [`DataSource`]: fetch the raw CSV body (`HttpSource`, `FileSource`)
//! - [`decode`]: CSV body → `BudgetTable`
//! - [`SnapshotCache`]: last-known-good body with TTL and change digest
//! - [`Pipeline`]: fetch → decode → fall back to the snapshot on failure
//!
//! ## Example
//!
//! ```rust,no_run
//! use nomina_core::ReportKind;
//! use nomina_source::{HttpSource, Pipeline, SnapshotCache, DEFAULT_URL};
//! use std::time::Duration;
//!
//! let pipeline = Pipeline::new(HttpSource::new(DEFAULT_URL));
//! let mut cache = SnapshotCache::new(Duration::from_secs(30));
//! let generated = pipeline
//!     .generate(&mut cache, &[ReportKind::RpTotal], false)
//!     .unwrap();
//! println!("{} rows", generated.reports[0].rows.len());
//! ```

pub mod decode;
pub mod pipeline;
pub mod snapshot;
pub mod source;

pub use decode::decode;
pub use pipeline::{Freshness, Generated, Loaded, Pipeline};
pub use snapshot::{digest, Snapshot, SnapshotCache};
pub use source::{DataSource, FileSource, HttpSource, DEFAULT_URL};

use std::path::PathBuf;

use nomina_core::TableError;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// A fetch that produced no usable body
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("empty response from {0}")]
    Empty(String),
}

/// A body that could not be turned into a table
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Snapshot persistence failure
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot file {} is corrupt: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Report generation failure
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetch failed and no snapshot exists
    #[error("no data available: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("malformed input: {0}")]
    MalformedInput(#[from] DecodeError),
}

impl PipelineError {
    /// Required columns absent from the source, if that is the failure
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            PipelineError::MalformedInput(DecodeError::Table(TableError::MissingColumns(cols))) => {
                Some(cols)
            }
            _ => None,
        }
    }
}
