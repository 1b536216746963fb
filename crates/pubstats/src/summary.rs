//! Plain-text summary printed by `--fetch-only`.

use std::fmt::Write;

use pubstats_core::formatting::{format_count, format_number, truncate_title};
use pubstats_data::aggregator::StatsAggregator;
use pubstats_data::publications::{count_by_license_group, count_by_type_group};
use pubstats_data::series::SeriesTable;
use pubstats_runtime::data_manager::Dataset;

/// Publications listed under "Top publications".
const TOP_LISTED: usize = 3;

pub fn render_summary(group_id: &str, dataset: &Dataset, series: &SeriesTable) -> String {
    let totals = StatsAggregator::totals(&dataset.tables);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Publication usage statistics, group {} ({})",
        group_id,
        dataset.origin.describe()
    );
    let _ = writeln!(
        out,
        "  Publications: {}   Countries: {}",
        format_count(totals.publications as u64),
        format_count(totals.unique_countries as u64)
    );
    let _ = writeln!(
        out,
        "  Total downloads: {}   Total visits: {}",
        format_count(totals.total_downloads),
        format_count(totals.total_visits)
    );
    if let (Some(first), Some(last)) = (series.axis().first(), series.axis().last()) {
        let estimated: f64 = series.monthly_download_totals().iter().sum();
        let _ = writeln!(
            out,
            "  Downloads (est.) {} to {}: {}",
            first.short_label(),
            last.short_label(),
            format_number(estimated, 0)
        );
    }

    let top = StatsAggregator::top_by_downloads(&dataset.tables.publications, TOP_LISTED);
    if !top.is_empty() {
        let _ = writeln!(out, "\nTop publications by downloads:");
        for (i, row) in top.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({} downloads, {} visits)",
                i + 1,
                truncate_title(&row.title, 60),
                format_count(row.total_downloads),
                format_count(row.total_visits)
            );
        }
    }

    if !dataset.publications.is_empty() {
        let _ = writeln!(out, "\nPublication types:");
        for (group, count) in count_by_type_group(&dataset.publications) {
            let _ = writeln!(out, "  {}: {}", group, count);
        }
        let _ = writeln!(out, "\nLicenses:");
        for (license, count) in count_by_license_group(&dataset.publications) {
            let _ = writeln!(out, "  {}: {}", license, count);
        }
    }

    if let Some(report) = &dataset.fetch_report {
        let _ = writeln!(
            out,
            "\nFetched {} of {} reports ({} reused from cache, {} defaulted)",
            report.succeeded, report.requested, report.reused, report.defaulted
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubstats_core::models::{MonthlyVisits, Publication, PublicationTypeGroup, UsageRecord};
    use pubstats_data::tables::StatsTables;
    use pubstats_runtime::data_manager::DataOrigin;
    use pubstats_runtime::fetcher::FetchReport;

    fn record(uuid: &str, title: &str, downloads: u64, months: &[(&str, u64)]) -> UsageRecord {
        let mut record = UsageRecord::empty(uuid, title);
        record.total_downloads = downloads;
        record.monthly_visits = months
            .iter()
            .map(|(month, visits)| MonthlyVisits {
                month: month.to_string(),
                visits: *visits,
            })
            .collect();
        record.total_visits = record.monthly_visits.iter().map(|m| m.visits).sum();
        record
    }

    fn publication(uuid: &str, kind: &str, license: &str) -> Publication {
        Publication {
            uuid: uuid.to_string(),
            name: uuid.to_string(),
            doi: None,
            has_doi: false,
            publication_type: Some(kind.to_string()),
            publication_type_group: PublicationTypeGroup::classify(Some(kind)),
            date_issued: Some("2023-01-01".to_string()),
            year: Some(2023),
            license: license.to_string(),
            license_short: license.to_string(),
            license_short_group: license.to_string(),
        }
    }

    fn dataset() -> Dataset {
        let records = vec![
            record("a", "Glacier retreat", 30, &[("January 2025", 1), ("February 2025", 2)]),
            record("b", "Snow cover", 12, &[("February 2025", 4)]),
        ];
        Dataset {
            tables: StatsTables::assemble(&records),
            records,
            publications: vec![
                publication("a", "Dataset", "CC BY 4.0"),
                publication("b", "Journal Article", "CC BY 4.0"),
            ],
            origin: DataOrigin::Fetched,
            fetch_report: Some(FetchReport {
                requested: 2,
                succeeded: 1,
                reused: 1,
                defaulted: 0,
            }),
        }
    }

    #[test]
    fn test_summary_lists_totals_and_rankings() {
        let dataset = dataset();
        let series = SeriesTable::build(&dataset.tables, None, None).unwrap();
        let text = render_summary("09746", &dataset, &series);

        assert!(text.contains("group 09746 (fetched)"));
        assert!(text.contains("Total downloads: 42   Total visits: 7"));
        assert!(text.contains("Downloads (est.) Jan 25 to Feb 25: 42"));
        assert!(text.contains("1. Glacier retreat (30 downloads, 3 visits)"));
        assert!(text.contains("Scientific Article: 1"));
        assert!(text.contains("CC BY 4.0: 2"));
        assert!(text.contains("Fetched 1 of 2 reports (1 reused from cache, 0 defaulted)"));
    }

    #[test]
    fn test_summary_of_cached_dataset_without_catalogue() {
        let mut dataset = dataset();
        dataset.publications.clear();
        dataset.fetch_report = None;
        dataset.origin = DataOrigin::StaleCache;
        let text = render_summary("09746", &dataset, &SeriesTable::default());

        assert!(text.contains("(stale cache)"));
        assert!(!text.contains("Publication types:"));
        assert!(!text.contains("Fetched"));
        assert!(!text.contains("Downloads (est.)"));
    }
}
