//! On-disk cache of fetched statistics.
//!
//! One fetch scope is a set of files in the data directory, distinguished by
//! a suffix (`""` for full runs, `"_sample"` for sample runs):
//!
//! | file | content |
//! |---|---|
//! | `publication_statistics{s}.csv` | publication table |
//! | `monthly_visits{s}.csv` | monthly visit table |
//! | `country_statistics{s}.csv` | country table |
//! | `publication_stats_raw{s}.json` | the usage records |
//! | `publications{s}.csv` | publication catalogue |
//! | `estimated_downloads{s}.csv` | derived monthly download estimate |
//!
//! Files are written whole through a temporary sibling and a rename.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use pubstats_core::error::{Result, StatsError};
use pubstats_core::models::{Publication, UsageRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::tables::{
    CountryRow, EstimatedDownloadRow, MonthlyVisitRow, PublicationRow, StatsTables,
};

const PUBLICATION_HEADERS: &[&str] = &[
    "uuid",
    "title",
    "total_downloads",
    "total_visits",
    "num_months_with_data",
    "num_countries",
];
const MONTHLY_HEADERS: &[&str] = &["uuid", "title", "month", "visits"];
const COUNTRY_HEADERS: &[&str] = &["uuid", "title", "country_code", "country", "visits"];
const ESTIMATE_HEADERS: &[&str] = &["uuid", "title", "month", "visits", "estimated_downloads"];
const CATALOGUE_HEADERS: &[&str] = &[
    "uuid",
    "name",
    "doi",
    "has_doi",
    "publication_type",
    "publication_type_group",
    "date_issued",
    "year",
    "license",
    "license_short",
    "license_short_group",
];

// ── CacheStore ────────────────────────────────────────────────────────────────

/// The cache files of one fetch scope.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    suffix: String,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn publication_stats_path(&self) -> PathBuf {
        self.file(&format!("publication_statistics{}.csv", self.suffix))
    }

    pub fn monthly_path(&self) -> PathBuf {
        self.file(&format!("monthly_visits{}.csv", self.suffix))
    }

    pub fn countries_path(&self) -> PathBuf {
        self.file(&format!("country_statistics{}.csv", self.suffix))
    }

    pub fn raw_path(&self) -> PathBuf {
        self.file(&format!("publication_stats_raw{}.json", self.suffix))
    }

    pub fn catalogue_path(&self) -> PathBuf {
        self.file(&format!("publications{}.csv", self.suffix))
    }

    /// Derived per-month download estimate. Not part of the freshness check.
    pub fn estimates_path(&self) -> PathBuf {
        self.file(&format!("estimated_downloads{}.csv", self.suffix))
    }

    /// The files that together make up the statistics cache.
    fn stats_paths(&self) -> [PathBuf; 4] {
        [
            self.publication_stats_path(),
            self.monthly_path(),
            self.countries_path(),
            self.raw_path(),
        ]
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    // ── State ─────────────────────────────────────────────────────────────

    /// `true` when every statistics file is present.
    pub fn exists(&self) -> bool {
        self.stats_paths().iter().all(|p| p.is_file())
    }

    /// Age of the oldest statistics file, or `None` when any is missing.
    pub fn age(&self) -> Option<Duration> {
        let now = SystemTime::now();
        let mut oldest = Duration::ZERO;
        for path in self.stats_paths() {
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            // A timestamp in the future counts as brand new.
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            oldest = oldest.max(age);
        }
        Some(oldest)
    }

    /// `true` when the cache exists and its oldest file is younger than
    /// `max_age`.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        match self.age() {
            Some(age) => {
                debug!(age_secs = age.as_secs(), max_age_secs = max_age.as_secs(), "Cache age");
                age < max_age
            }
            None => false,
        }
    }

    // ── Write ─────────────────────────────────────────────────────────────

    /// Write the three tables and the raw record archive.
    pub fn write_stats(&self, records: &[UsageRecord], tables: &StatsTables) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        write_csv(&self.publication_stats_path(), PUBLICATION_HEADERS, &tables.publications)?;
        write_csv(&self.monthly_path(), MONTHLY_HEADERS, &tables.monthly)?;
        write_csv(&self.countries_path(), COUNTRY_HEADERS, &tables.countries)?;
        let json = serde_json::to_vec_pretty(records)?;
        write_atomic(&self.raw_path(), &json)?;

        info!(
            dir = %self.dir.display(),
            publications = tables.publications.len(),
            monthly_rows = tables.monthly.len(),
            country_rows = tables.countries.len(),
            "Statistics cache written"
        );
        Ok(())
    }

    /// Write the publication catalogue.
    pub fn write_catalogue(&self, publications: &[Publication]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_csv(&self.catalogue_path(), CATALOGUE_HEADERS, publications)?;
        debug!(count = publications.len(), "Publication catalogue written");
        Ok(())
    }

    /// Write the derived download estimate for the current month axis.
    pub fn write_estimates(&self, rows: &[EstimatedDownloadRow]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_csv(&self.estimates_path(), ESTIMATE_HEADERS, rows)?;
        debug!(rows = rows.len(), "Download estimates written");
        Ok(())
    }

    // ── Read ──────────────────────────────────────────────────────────────

    /// Read the three tables back.
    pub fn load_tables(&self) -> Result<StatsTables> {
        self.ensure_exists()?;
        Ok(StatsTables {
            publications: read_csv::<PublicationRow>(&self.publication_stats_path())?,
            monthly: read_csv::<MonthlyVisitRow>(&self.monthly_path())?,
            countries: read_csv::<CountryRow>(&self.countries_path())?,
        })
    }

    /// Read the raw record archive back.
    pub fn load_records(&self) -> Result<Vec<UsageRecord>> {
        self.ensure_exists()?;
        let path = self.raw_path();
        let content = fs::read_to_string(&path).map_err(|source| StatsError::FileRead {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Read the publication catalogue back.
    pub fn load_catalogue(&self) -> Result<Vec<Publication>> {
        let path = self.catalogue_path();
        if !path.is_file() {
            return Err(StatsError::CacheMissing(self.dir.clone()));
        }
        read_csv(&path)
    }

    fn ensure_exists(&self) -> Result<()> {
        if self.exists() {
            Ok(())
        } else {
            Err(StatsError::CacheMissing(self.dir.clone()))
        }
    }
}

// ── File helpers ──────────────────────────────────────────────────────────────

/// Serialise `rows` under an explicit header line, so empty tables still
/// carry their columns.
fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(headers)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    write_atomic(path, &bytes)
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Write to `<path>.tmp`, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
