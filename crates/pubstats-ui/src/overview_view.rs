//! Overview: headline totals and the group-wide series over time.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pubstats_core::formatting::{format_count, format_number};
use pubstats_data::series::ESTIMATED_DOWNLOADS_LABEL;

use crate::components::charts::{render_line_chart, LineSeries};
use crate::components::metrics::{render_metrics, Metric};
use crate::dashboard::DashboardData;
use crate::themes::Theme;

pub fn render_overview(frame: &mut Frame, area: Rect, data: &DashboardData, theme: &Theme) {
    let axis = data.series.axis();
    let downloads = data.series.monthly_download_totals();
    let visits: Vec<f64> = data
        .series
        .monthly_visit_totals()
        .into_iter()
        .map(|v| v as f64)
        .collect();

    let metrics = [
        Metric::new(
            "Total Downloads (est.)",
            format_number(downloads.iter().sum::<f64>(), 0),
        ),
        Metric::new("Total Visits", format_number(visits.iter().sum::<f64>(), 0)),
        Metric::new("Publications", format_count(data.totals.publications as u64)),
        Metric::new("Countries", format_count(data.totals.unique_countries as u64)),
    ];

    let rows = Layout::vertical([
        Constraint::Length(4),
        Constraint::Percentage(50),
        Constraint::Min(6),
    ])
    .split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_metrics(frame, rows[0], &metrics, theme);

    let downloads_line = LineSeries {
        name: ESTIMATED_DOWNLOADS_LABEL.to_string(),
        values: downloads,
        color: theme.downloads.fg.unwrap_or_default(),
    };
    let visits_line = LineSeries {
        name: "Visits".to_string(),
        values: visits,
        color: theme.visits.fg.unwrap_or_default(),
    };

    render_line_chart(
        frame,
        top[0],
        "Downloads Over Time (est.)",
        axis,
        std::slice::from_ref(&downloads_line),
        theme,
    );
    render_line_chart(
        frame,
        top[1],
        "Visits Over Time",
        axis,
        std::slice::from_ref(&visits_line),
        theme,
    );
    render_line_chart(
        frame,
        rows[2],
        "Combined Metrics",
        axis,
        &[downloads_line, visits_line],
        theme,
    );
}

/// Placeholder when no publications are available.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No publication statistics found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Fetch statistics first, e.g. `pubstats --fetch-only`.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Publication Statistics "),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
