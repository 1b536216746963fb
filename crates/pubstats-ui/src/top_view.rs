//! Top performers: ranked bars and a ranking table.
//!
//! Rankings use the series restricted to the month axis, so the numbers
//! match the other views for the same period.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use pubstats_core::formatting::{format_number, truncate_title};
use pubstats_core::models::saturating_sum;
use pubstats_data::series::{ItemSeries, ESTIMATED_DOWNLOADS_LABEL};

use crate::components::charts::render_ranked_bars;
use crate::dashboard::DashboardData;
use crate::overview_view::render_no_data;
use crate::themes::Theme;

pub fn render_top(frame: &mut Frame, area: Rect, data: &DashboardData, top_n: usize, theme: &Theme) {
    if data.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }
    let by_downloads = data.series.top_by_estimated_downloads(top_n);
    let by_visits = data.series.top_by_visits(top_n);

    let rows = Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let bars = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let download_entries: Vec<(String, u64)> = by_downloads
        .iter()
        .map(|item| (item.title.clone(), item.estimated_sum().round() as u64))
        .collect();
    let visit_entries: Vec<(String, u64)> = by_visits
        .iter()
        .map(|item| (item.title.clone(), item.visit_sum()))
        .collect();

    render_ranked_bars(
        frame,
        bars[0],
        &format!("Top {} by {}", by_downloads.len(), ESTIMATED_DOWNLOADS_LABEL),
        &download_entries,
        theme.downloads,
        theme,
    );
    render_ranked_bars(
        frame,
        bars[1],
        &format!("Top {} by Visits", by_visits.len()),
        &visit_entries,
        theme.visits,
        theme,
    );
    render_ranking_table(frame, rows[1], &by_downloads, theme);
}

/// Ranking table with a totals row over the listed publications.
fn render_ranking_table(frame: &mut Frame, area: Rect, items: &[&ItemSeries], theme: &Theme) {
    let header = Row::new(
        ["Rank", "Publication", ESTIMATED_DOWNLOADS_LABEL, "Visits"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let title_width = area.width.saturating_sub(42).max(10) as usize;
    let mut table_rows: Vec<Row> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate_title(&item.title, title_width)),
                Cell::from(format_number(item.estimated_sum(), 0)),
                Cell::from(format_number(item.visit_sum() as f64, 0)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let downloads: f64 = items.iter().map(|item| item.estimated_sum()).sum();
    let visits = saturating_sum(items.iter().map(|item| item.visit_sum()));
    table_rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(format!("{} publications", items.len())),
            Cell::from(format_number(downloads, 0)),
            Cell::from(format_number(visits as f64, 0)),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(6),
        Constraint::Min(10),
        Constraint::Length(18),
        Constraint::Length(12),
    ];
    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Ranking "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{render_text, sample_data};

    #[test]
    fn test_render_top_ranks_by_estimated_downloads() {
        let data = sample_data();
        let theme = Theme::dark();
        let text = render_text(140, 40, |frame| {
            render_top(frame, frame.area(), &data, 10, &theme)
        });
        assert!(text.contains("Top 3 by Downloads (est.)"));
        assert!(text.contains("Top 3 by Visits"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("3 publications"));

        let glacier = text.find("Glacier mass balance").unwrap();
        assert!(text[glacier..].contains("Permafrost dataset"));
    }

    #[test]
    fn test_render_top_respects_top_n() {
        let data = sample_data();
        let theme = Theme::classic();
        let text = render_text(140, 40, |frame| {
            render_top(frame, frame.area(), &data, 1, &theme)
        });
        assert!(text.contains("Top 1 by Visits"));
        assert!(text.contains("1 publications"));
    }
}
