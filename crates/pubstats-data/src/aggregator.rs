//! Summaries over the assembled tables: totals, rankings and country totals.

use std::collections::{BTreeMap, HashSet};

use pubstats_core::models::saturating_sum;

use crate::tables::{CountryRow, PublicationRow, StatsTables};

// ── StatsTotals ───────────────────────────────────────────────────────────────

/// Headline numbers for a whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsTotals {
    pub publications: usize,
    pub total_downloads: u64,
    pub total_visits: u64,
    /// Distinct country names across all publications.
    pub unique_countries: usize,
}

// ── CountryTotal ──────────────────────────────────────────────────────────────

/// Visits from one country summed over all publications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryTotal {
    pub country_code: String,
    pub country: String,
    pub visits: u64,
}

// ── StatsAggregator ───────────────────────────────────────────────────────────

/// Stateless helper computing read-only summaries of [`StatsTables`].
pub struct StatsAggregator;

impl StatsAggregator {
    /// Totals over the publication and country tables.
    pub fn totals(tables: &StatsTables) -> StatsTotals {
        let unique_countries: HashSet<&str> = tables
            .countries
            .iter()
            .map(|row| row.country.as_str())
            .collect();

        StatsTotals {
            publications: tables.publications.len(),
            total_downloads: saturating_sum(tables.publications.iter().map(|p| p.total_downloads)),
            total_visits: saturating_sum(tables.publications.iter().map(|p| p.total_visits)),
            unique_countries: unique_countries.len(),
        }
    }

    /// The `n` publications with the most reported downloads, ties in table
    /// order.
    pub fn top_by_downloads(publications: &[PublicationRow], n: usize) -> Vec<&PublicationRow> {
        Self::top_by(publications, n, |p| p.total_downloads)
    }

    /// The `n` publications with the most reported visits, ties in table
    /// order.
    pub fn top_by_visits(publications: &[PublicationRow], n: usize) -> Vec<&PublicationRow> {
        Self::top_by(publications, n, |p| p.total_visits)
    }

    /// Visits grouped by `(country_code, country)`, most visits first; equal
    /// totals are ordered by country name.
    pub fn country_totals(countries: &[CountryRow]) -> Vec<CountryTotal> {
        let mut map: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for row in countries {
            let total = map
                .entry((row.country_code.as_str(), row.country.as_str()))
                .or_default();
            *total = total.saturating_add(row.visits);
        }

        let mut totals: Vec<CountryTotal> = map
            .into_iter()
            .map(|((code, name), visits)| CountryTotal {
                country_code: code.to_string(),
                country: name.to_string(),
                visits,
            })
            .collect();
        totals.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.country.cmp(&b.country)));
        totals
    }

    /// Country totals whose name contains `query`, ignoring case. An empty
    /// query keeps everything.
    pub fn filter_countries<'a>(totals: &'a [CountryTotal], query: &str) -> Vec<&'a CountryTotal> {
        let needle = query.trim().to_lowercase();
        totals
            .iter()
            .filter(|t| needle.is_empty() || t.country.to_lowercase().contains(&needle))
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn top_by(
        publications: &[PublicationRow],
        n: usize,
        metric: impl Fn(&PublicationRow) -> u64,
    ) -> Vec<&PublicationRow> {
        let mut ranked: Vec<&PublicationRow> = publications.iter().collect();
        ranked.sort_by_key(|p| std::cmp::Reverse(metric(p)));
        ranked.truncate(n);
        ranked
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn publication(uuid: &str, downloads: u64, visits: u64) -> PublicationRow {
        PublicationRow {
            uuid: uuid.to_string(),
            title: format!("Title {uuid}"),
            total_downloads: downloads,
            total_visits: visits,
            num_months_with_data: 0,
            num_countries: 0,
        }
    }

    fn country(uuid: &str, code: &str, name: &str, visits: u64) -> CountryRow {
        CountryRow {
            uuid: uuid.to_string(),
            title: format!("Title {uuid}"),
            country_code: code.to_string(),
            country: name.to_string(),
            visits,
        }
    }

    fn sample() -> StatsTables {
        StatsTables {
            publications: vec![
                publication("a", 10, 300),
                publication("b", 40, 100),
                publication("c", 40, 200),
            ],
            monthly: vec![],
            countries: vec![
                country("a", "CH", "Switzerland", 80),
                country("a", "US", "United States", 20),
                country("b", "CH", "Switzerland", 5),
                country("c", "DE", "Germany", 20),
            ],
        }
    }

    // ── totals ────────────────────────────────────────────────────────────────

    #[test]
    fn test_totals() {
        let totals = StatsAggregator::totals(&sample());
        assert_eq!(
            totals,
            StatsTotals {
                publications: 3,
                total_downloads: 90,
                total_visits: 600,
                unique_countries: 3,
            }
        );
    }

    #[test]
    fn test_totals_saturate() {
        let tables = StatsTables {
            publications: vec![
                publication("a", u64::MAX, u64::MAX),
                publication("b", u64::MAX, 1),
            ],
            ..StatsTables::default()
        };
        let totals = StatsAggregator::totals(&tables);
        assert_eq!(totals.total_downloads, u64::MAX);
        assert_eq!(totals.total_visits, u64::MAX);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(StatsAggregator::totals(&StatsTables::default()), StatsTotals::default());
    }

    // ── rankings ──────────────────────────────────────────────────────────────

    #[test]
    fn test_top_by_downloads_ties_keep_order() {
        let tables = sample();
        let top: Vec<&str> = StatsAggregator::top_by_downloads(&tables.publications, 2)
            .iter()
            .map(|p| p.uuid.as_str())
            .collect();
        assert_eq!(top, vec!["b", "c"]);
    }

    #[test]
    fn test_top_by_visits() {
        let tables = sample();
        let top: Vec<&str> = StatsAggregator::top_by_visits(&tables.publications, 10)
            .iter()
            .map(|p| p.uuid.as_str())
            .collect();
        assert_eq!(top, vec!["a", "c", "b"]);
    }

    // ── countries ─────────────────────────────────────────────────────────────

    #[test]
    fn test_country_totals_grouped_and_sorted() {
        let totals = StatsAggregator::country_totals(&sample().countries);
        let view: Vec<(&str, u64)> = totals.iter().map(|t| (t.country.as_str(), t.visits)).collect();
        assert_eq!(
            view,
            vec![("Switzerland", 85), ("Germany", 20), ("United States", 20)]
        );
    }

    #[test]
    fn test_filter_countries_case_insensitive() {
        let totals = StatsAggregator::country_totals(&sample().countries);
        let hits: Vec<&str> = StatsAggregator::filter_countries(&totals, "STATES")
            .iter()
            .map(|t| t.country_code.as_str())
            .collect();
        assert_eq!(hits, vec!["US"]);
        assert_eq!(StatsAggregator::filter_countries(&totals, "").len(), 3);
        assert!(StatsAggregator::filter_countries(&totals, "atlantis").is_empty());
    }
}
