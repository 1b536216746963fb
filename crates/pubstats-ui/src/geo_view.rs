//! Country breakdown with a searchable table.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use pubstats_core::formatting::{format_count, percentage};
use pubstats_core::models::saturating_sum;
use pubstats_data::aggregator::StatsAggregator;

use crate::components::charts::render_ranked_bars;
use crate::dashboard::DashboardData;
use crate::themes::Theme;

/// Countries shown in the bar chart.
pub const TOP_COUNTRIES: usize = 15;

/// Render the geography view. `query` filters the table by country name.
pub fn render_geo(
    frame: &mut Frame,
    area: Rect,
    data: &DashboardData,
    query: &str,
    searching: bool,
    theme: &Theme,
) {
    if data.countries.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("No country data available", theme.warning)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Visits by Country "),
            ),
            area,
        );
        return;
    }

    let rows = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(1),
        Constraint::Min(5),
    ])
    .split(area);

    let top: Vec<(String, u64)> = data
        .countries
        .iter()
        .take(TOP_COUNTRIES)
        .map(|c| (c.country.clone(), c.visits))
        .collect();
    render_ranked_bars(
        frame,
        rows[0],
        &format!("Top {} Countries by Visits", top.len()),
        &top,
        theme.countries,
        theme,
    );

    let matches = StatsAggregator::filter_countries(&data.countries, query);

    let cursor = if searching { "_" } else { "" };
    let search = Line::from(vec![
        Span::styled("Search: ", theme.label),
        Span::styled(format!("{}{}", query, cursor), theme.search),
        Span::styled(
            format!(
                "   Showing {} of {} countries",
                matches.len(),
                data.countries.len()
            ),
            theme.dim,
        ),
    ]);
    frame.render_widget(Paragraph::new(search), rows[1]);

    let all_visits = saturating_sum(data.countries.iter().map(|c| c.visits));
    let header = Row::new(
        ["Country", "Code", "Visits", "Share"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    );
    let table_rows: Vec<Row> = matches
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Row::new(vec![
                Cell::from(c.country.clone()),
                Cell::from(c.country_code.clone()),
                Cell::from(format_count(c.visits)),
                Cell::from(format!(
                    "{:.1}%",
                    percentage(c.visits as f64, all_visits as f64, 1)
                )),
            ])
            .style(theme.row_style(i))
        })
        .collect();
    let widths = [
        Constraint::Min(20),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(8),
    ];
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Visits by Country "),
        )
        .style(theme.text);
    frame.render_widget(table, rows[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{render_text, sample_data};
    use pubstats_data::series::SeriesTable;
    use pubstats_data::tables::StatsTables;

    #[test]
    fn test_render_geo_lists_all_countries() {
        let data = sample_data();
        let theme = Theme::dark();
        let text = render_text(120, 40, |frame| {
            render_geo(frame, frame.area(), &data, "", false, &theme)
        });
        assert!(text.contains("Top 3 Countries by Visits"));
        assert!(text.contains("Showing 3 of 3 countries"));
        assert!(text.contains("65.2%"));
    }

    #[test]
    fn test_render_geo_filters_table() {
        let data = sample_data();
        let theme = Theme::dark();
        let text = render_text(120, 40, |frame| {
            render_geo(frame, frame.area(), &data, "germ", true, &theme)
        });
        assert!(text.contains("Search: germ_"));
        assert!(text.contains("Showing 1 of 3 countries"));
        assert!(text.contains("21.7%"));
        assert!(!text.contains("65.2%"));
    }

    #[test]
    fn test_render_geo_without_countries() {
        let data = DashboardData::new(
            "09746",
            "cached",
            StatsTables::default(),
            SeriesTable::default(),
        );
        let theme = Theme::dark();
        let text = render_text(80, 10, |frame| {
            render_geo(frame, frame.area(), &data, "", false, &theme)
        });
        assert!(text.contains("No country data available"));
    }
}
