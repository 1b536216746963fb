//! Cache-aware access to the statistics dataset.
//!
//! [`DataManager::get_data`] serves the on-disk cache while it is fresh and
//! otherwise fetches the catalogue and every usage report, rewrites the cache
//! and returns the new dataset. When the upstream source cannot be reached the
//! previous cache is served even if stale.

use std::collections::HashMap;
use std::time::Duration;

use pubstats_core::error::{Result, StatsError};
use pubstats_core::models::{Publication, UsageRecord};
use pubstats_data::store::CacheStore;
use pubstats_data::tables::StatsTables;
use tracing::{debug, info, warn};

use crate::client::StatsSource;
use crate::fetcher::{FetchReport, StatsFetcher};

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// Fetched from the upstream source during this run.
    Fetched,
    /// Read from a cache within its freshness window.
    Cache,
    /// Read from an outdated cache because fetching failed.
    StaleCache,
}

impl DataOrigin {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::Cache => "cached",
            Self::StaleCache => "stale cache",
        }
    }
}

/// Everything the summary printer and the dashboard read.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub tables: StatsTables,
    pub records: Vec<UsageRecord>,
    /// Publication catalogue; empty when only statistics were cached.
    pub publications: Vec<Publication>,
    pub origin: DataOrigin,
    /// Present when the data was fetched in this run.
    pub fetch_report: Option<FetchReport>,
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Decides between the cache and the upstream source.
pub struct DataManager {
    store: CacheStore,
    max_age: Duration,
    fetcher: StatsFetcher,
    max_items: u32,
    /// Only the first N publications are fetched when set.
    sample: Option<usize>,
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(store: CacheStore, max_age: Duration, fetcher: StatsFetcher, max_items: u32) -> Self {
        Self {
            store,
            max_age,
            fetcher,
            max_items,
            sample: None,
            last_error: None,
        }
    }

    pub fn with_sample(mut self, sample: Option<usize>) -> Self {
        self.sample = sample;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Description of the last fetch failure that was recovered from.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the dataset, fetching when the cache is stale or `force` is set.
    pub async fn get_data<S: StatsSource>(&mut self, source: &S, force: bool) -> Result<Dataset> {
        if !force && self.store.is_fresh(self.max_age) {
            match self.load_cached(DataOrigin::Cache) {
                Ok(dataset) => {
                    debug!("Serving statistics from fresh cache");
                    return Ok(dataset);
                }
                Err(e) => warn!(error = %e, "Cached statistics unreadable; fetching again"),
            }
        }

        let limit = match self.sample {
            Some(n) => n.min(self.max_items as usize) as u32,
            None => self.max_items,
        };

        let mut publications = match source.fetch_publications(limit).await {
            Ok(publications) => publications,
            Err(e) if e.is_transport() && self.store.exists() => {
                warn!(error = %e, "Upstream unreachable; serving stale cache");
                self.last_error = Some(e.to_string());
                return self.load_cached(DataOrigin::StaleCache);
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        if let Some(n) = self.sample {
            publications.truncate(n);
        }
        info!(count = publications.len(), "Publication catalogue fetched");

        let cached: HashMap<String, UsageRecord> = self
            .store
            .load_records()
            .map(|records| records.into_iter().map(|r| (r.uuid.clone(), r)).collect())
            .unwrap_or_default();

        let (records, report) = self.fetcher.fetch_all(source, &publications, &cached).await;
        let tables = StatsTables::assemble(&records);

        self.store.write_catalogue(&publications)?;
        self.store.write_stats(&records, &tables)?;
        self.last_error = None;

        Ok(Dataset {
            tables,
            records,
            publications,
            origin: DataOrigin::Fetched,
            fetch_report: Some(report),
        })
    }

    /// Read the cache without contacting the upstream source.
    pub fn load_offline(&self) -> Result<Dataset> {
        if !self.store.exists() {
            return Err(StatsError::CacheMissing(self.store.dir().to_path_buf()));
        }
        let origin = if self.store.is_fresh(self.max_age) {
            DataOrigin::Cache
        } else {
            DataOrigin::StaleCache
        };
        self.load_cached(origin)
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn load_cached(&self, origin: DataOrigin) -> Result<Dataset> {
        let tables = self.store.load_tables()?;
        let records = self.store.load_records()?;
        let publications = self.store.load_catalogue().unwrap_or_else(|e| {
            debug!(error = %e, "No cached catalogue");
            Vec::new()
        });
        Ok(Dataset {
            tables,
            records,
            publications,
            origin,
            fetch_report: None,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
