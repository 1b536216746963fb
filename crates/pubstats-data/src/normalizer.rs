//! Reduce one decoded usage report to a fixed [`UsageRecord`].

use pubstats_core::formatting::percentage;
use pubstats_core::models::{saturating_sum, CountryVisits, MonthlyVisits, UsageRecord};
use tracing::warn;

use crate::report::{ReportPoint, ReportSection, UsageReport};

/// Build the record for one publication from its usage report.
///
/// Missing sections leave the corresponding fields at zero or empty; unknown
/// sections were already dropped while decoding.
pub fn normalize(uuid: &str, title: &str, report: &UsageReport) -> UsageRecord {
    let mut record = UsageRecord::empty(uuid, title);

    for section in &report.sections {
        match section {
            ReportSection::TotalDownloads { points } => {
                // One point per attached file.
                let downloads = section_total(uuid, "TotalDownloads", points);
                record.total_downloads = record.total_downloads.saturating_add(downloads);
            }
            ReportSection::TotalVisits { points } => {
                if points.len() > 1 {
                    warn!(
                        uuid = %uuid,
                        points = points.len(),
                        "TotalVisits has several points; keeping the last one"
                    );
                }
                if let Some(last) = points.last() {
                    record.total_visits = last.views();
                }
            }
            ReportSection::TotalVisitsPerMonth { points } => {
                record.monthly_visits = points
                    .iter()
                    .map(|p| MonthlyVisits {
                        month: p.label.clone(),
                        visits: p.views(),
                    })
                    .collect();
            }
            ReportSection::TopCountries { points } => {
                record.country_visits = country_breakdown(uuid, points);
            }
            ReportSection::Unknown => {}
        }
    }

    record
}

/// Country rows with each share of the section total, rounded to 2 decimals.
fn country_breakdown(uuid: &str, points: &[ReportPoint]) -> Vec<CountryVisits> {
    let total = section_total(uuid, "TopCountries", points);
    points
        .iter()
        .map(|p| CountryVisits {
            country_code: p.id.clone(),
            country: p.label.clone(),
            visits: p.views(),
            percentage: percentage(p.views() as f64, total as f64, 2),
        })
        .collect()
}

/// Sum of a section's views, capped at `u64::MAX`.
fn section_total(uuid: &str, section: &str, points: &[ReportPoint]) -> u64 {
    let total = saturating_sum(points.iter().map(ReportPoint::views));
    if total == u64::MAX {
        warn!(uuid = %uuid, section, "Section total exceeds the counter range; capped");
    }
    total
}

// ── Tests ─────────────────────────────────────────────────────────────────────
