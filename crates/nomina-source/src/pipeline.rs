//! Fetch → decode → report
//!
//! A successful fetch replaces the snapshot. A failed fetch (or an
//! undecodable body) falls back to the snapshot and is reported as stale.
//! Without a snapshot the failure surfaces as an error.

use chrono::{DateTime, Utc};
use nomina_core::{catalog, BudgetTable, Report, ReportKind};
use tracing::{debug, info, warn};

use crate::{decode, DataSource, PipelineError, Snapshot, SnapshotCache};

/// Where the data behind a report came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// Fetched from the source just now
    Fresh,
    /// Snapshot reused within its TTL
    Cached,
    /// Fetch failed; last successful snapshot substituted
    Stale { reason: String },
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. })
    }
}

#[derive(Debug)]
pub struct Loaded {
    pub table: BudgetTable,
    pub freshness: Freshness,
    /// When the data in `table` was fetched
    pub fetched_at: DateTime<Utc>,
    /// Fresh data whose digest differs from the previous snapshot
    pub changed: bool,
}

impl Loaded {
    pub fn report(&self, kind: ReportKind) -> Report {
        catalog::definition(kind).assemble(&self.table)
    }
}

#[derive(Debug)]
pub struct Generated {
    pub reports: Vec<Report>,
    pub freshness: Freshness,
    pub fetched_at: DateTime<Utc>,
}

pub struct Pipeline {
    source: Box<dyn DataSource>,
}

impl Pipeline {
    pub fn new(source: impl DataSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn load(&self, cache: &mut SnapshotCache, refresh: bool) -> Result<Loaded, PipelineError> {
        self.load_at(cache, refresh, Utc::now())
    }

    /// `load` with an explicit clock
    pub fn load_at(
        &self,
        cache: &mut SnapshotCache,
        refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<Loaded, PipelineError> {
        if !refresh && cache.is_fresh(now) {
            if let Some(snapshot) = cache.get() {
                debug!(
                    fetched_at = %snapshot.fetched_at,
                    records = snapshot.record_count,
                    "using cached snapshot"
                );
                return Ok(Loaded {
                    table: decode(&snapshot.body)?,
                    freshness: Freshness::Cached,
                    fetched_at: snapshot.fetched_at,
                    changed: false,
                });
            }
        }

        let fetched = self
            .source
            .fetch(refresh)
            .map_err(PipelineError::from)
            .and_then(|body| Ok((decode(&body)?, body)));

        match fetched {
            Ok((table, body)) => {
                let changed = cache.replace(Snapshot::new(body, table.len(), now));
                if changed {
                    info!(records = table.len(), "new data detected");
                }
                if let Err(e) = cache.save() {
                    warn!(error = %e, "could not persist snapshot");
                }
                Ok(Loaded {
                    table,
                    freshness: Freshness::Fresh,
                    fetched_at: now,
                    changed,
                })
            }
            Err(err) => {
                let Some(snapshot) = cache.get() else {
                    return Err(err);
                };
                warn!(
                    source = %self.source.describe(),
                    error = %err,
                    fetched_at = %snapshot.fetched_at,
                    records = snapshot.record_count,
                    "fetch failed, using last successful snapshot"
                );
                Ok(Loaded {
                    table: decode(&snapshot.body)?,
                    freshness: Freshness::Stale {
                        reason: err.to_string(),
                    },
                    fetched_at: snapshot.fetched_at,
                    changed: false,
                })
            }
        }
    }

    /// Load once and assemble each requested report
    pub fn generate(
        &self,
        cache: &mut SnapshotCache,
        kinds: &[ReportKind],
        refresh: bool,
    ) -> Result<Generated, PipelineError> {
        let loaded = self.load(cache, refresh)?;
        Ok(Generated {
            reports: kinds.iter().map(|kind| loaded.report(*kind)).collect(),
            freshness: loaded.freshness,
            fetched_at: loaded.fetched_at,
        })
    }
}
