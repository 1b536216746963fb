//! Flat, joinable tables assembled from per-publication usage records.

use pubstats_core::models::UsageRecord;
use pubstats_core::months::MonthKey;
use serde::{Deserialize, Serialize};

/// One row per publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRow {
    pub uuid: String,
    pub title: String,
    pub total_downloads: u64,
    pub total_visits: u64,
    pub num_months_with_data: usize,
    pub num_countries: usize,
}

/// One row per (publication, reported month) with the raw visit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyVisitRow {
    pub uuid: String,
    pub title: String,
    pub month: String,
    pub visits: u64,
}

/// One row per (publication, country) with the raw visit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRow {
    pub uuid: String,
    pub title: String,
    pub country_code: String,
    pub country: String,
    pub visits: u64,
}

/// One row per (publication, axis month) of the derived download estimate.
///
/// `estimated_downloads` is the publication's total spread along its visit
/// curve, not a measured count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedDownloadRow {
    pub uuid: String,
    pub title: String,
    pub month: MonthKey,
    pub visits: u64,
    pub estimated_downloads: f64,
}

/// The three relational tables that make up the cache and feed the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTables {
    pub publications: Vec<PublicationRow>,
    pub monthly: Vec<MonthlyVisitRow>,
    pub countries: Vec<CountryRow>,
}

impl StatsTables {
    /// Flatten `records`, keeping record order and each record's source order.
    pub fn assemble(records: &[UsageRecord]) -> Self {
        let mut tables = Self::default();

        for record in records {
            tables.publications.push(PublicationRow {
                uuid: record.uuid.clone(),
                title: record.title.clone(),
                total_downloads: record.total_downloads,
                total_visits: record.total_visits,
                num_months_with_data: record.monthly_visits.len(),
                num_countries: record.country_visits.len(),
            });

            tables
                .monthly
                .extend(record.monthly_visits.iter().map(|m| MonthlyVisitRow {
                    uuid: record.uuid.clone(),
                    title: record.title.clone(),
                    month: m.month.clone(),
                    visits: m.visits,
                }));

            tables
                .countries
                .extend(record.country_visits.iter().map(|c| CountryRow {
                    uuid: record.uuid.clone(),
                    title: record.title.clone(),
                    country_code: c.country_code.clone(),
                    country: c.country.clone(),
                    visits: c.visits,
                }));
        }

        tables
    }

    pub fn is_empty(&self) -> bool {
        self.publications.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
