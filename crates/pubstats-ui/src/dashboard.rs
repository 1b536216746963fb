//! Read-only view model shared by every dashboard view.

use pubstats_data::aggregator::{CountryTotal, StatsAggregator, StatsTotals};
use pubstats_data::series::SeriesTable;
use pubstats_data::tables::StatsTables;

/// Everything the views draw, derived once from the assembled tables.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub group_id: String,
    /// Where the data came from, as shown in the header.
    pub origin: String,
    pub tables: StatsTables,
    pub series: SeriesTable,
    pub totals: StatsTotals,
    /// Country totals, most visits first.
    pub countries: Vec<CountryTotal>,
}

impl DashboardData {
    pub fn new(
        group_id: impl Into<String>,
        origin: impl Into<String>,
        tables: StatsTables,
        series: SeriesTable,
    ) -> Self {
        let totals = StatsAggregator::totals(&tables);
        let countries = StatsAggregator::country_totals(&tables.countries);
        Self {
            group_id: group_id.into(),
            origin: origin.into(),
            tables,
            series,
            totals,
            countries,
        }
    }

    /// `"Mar 25 – Sep 25"`, or `"no months"` for an empty axis.
    pub fn span_label(&self) -> String {
        match (self.series.axis().first(), self.series.axis().last()) {
            (Some(first), Some(last)) if first == last => first.short_label(),
            (Some(first), Some(last)) => {
                format!("{} – {}", first.short_label(), last.short_label())
            }
            _ => "no months".to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pubstats_core::months::MonthKey;
    use pubstats_data::tables::{CountryRow, MonthlyVisitRow, PublicationRow};
    use ratatui::backend::TestBackend;
    use ratatui::{Frame, Terminal};

    /// Draw into an off-screen buffer and return its rows joined by newlines.
    pub(crate) fn render_text(width: u16, height: u16, draw: impl FnOnce(&mut Frame)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Three publications over Mar–Sep 2025 with a handful of countries.
    pub(crate) fn sample_data() -> DashboardData {
        let publication = |uuid: &str, title: &str, downloads: u64, visits: u64| PublicationRow {
            uuid: uuid.to_string(),
            title: title.to_string(),
            total_downloads: downloads,
            total_visits: visits,
            num_months_with_data: 0,
            num_countries: 0,
        };
        let monthly = |uuid: &str, month: &str, visits: u64| MonthlyVisitRow {
            uuid: uuid.to_string(),
            title: String::new(),
            month: month.to_string(),
            visits,
        };
        let country = |uuid: &str, code: &str, name: &str, visits: u64| CountryRow {
            uuid: uuid.to_string(),
            title: String::new(),
            country_code: code.to_string(),
            country: name.to_string(),
            visits,
        };

        let tables = StatsTables {
            publications: vec![
                publication("a", "Glacier mass balance in the Swiss Alps", 100, 40),
                publication("b", "Permafrost dataset", 50, 6),
                publication("c", "Unvisited report", 3, 0),
            ],
            monthly: vec![
                monthly("a", "May 2025", 10),
                monthly("a", "July 2025", 30),
                monthly("b", "June 2025", 6),
            ],
            countries: vec![
                country("a", "CH", "Switzerland", 30),
                country("a", "DE", "Germany", 10),
                country("b", "US", "United States", 6),
            ],
        };
        let series = SeriesTable::build(
            &tables,
            Some(MonthKey::new(2025, 3).unwrap()),
            Some(MonthKey::new(2025, 9).unwrap()),
        )
        .unwrap();
        DashboardData::new("09746", "cached", tables, series)
    }

    #[test]
    fn test_dashboard_data_derives_summaries() {
        let data = sample_data();
        assert_eq!(data.totals.publications, 3);
        assert_eq!(data.totals.total_downloads, 153);
        assert_eq!(data.countries[0].country, "Switzerland");
        assert_eq!(data.span_label(), "Mar 25 – Sep 25");
    }

    #[test]
    fn test_span_label_empty() {
        let data = DashboardData::new(
            "09746",
            "cached",
            StatsTables::default(),
            SeriesTable::default(),
        );
        assert_eq!(data.span_label(), "no months");
        assert!(data.is_empty());
    }
}
