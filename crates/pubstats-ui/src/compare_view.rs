//! Side-by-side monthly series of the leading publications.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use pubstats_data::series::ESTIMATED_DOWNLOADS_LABEL;

use crate::components::charts::{render_line_chart, LineSeries};
use crate::dashboard::DashboardData;
use crate::overview_view::render_no_data;
use crate::themes::Theme;

/// More lines than this are unreadable in a terminal chart.
pub const MAX_COMPARED: usize = 10;

/// Compare the top `top_n` publications (capped) by estimated downloads.
pub fn render_compare(
    frame: &mut Frame,
    area: Rect,
    data: &DashboardData,
    top_n: usize,
    theme: &Theme,
) {
    if data.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }
    let leaders = data.series.top_by_estimated_downloads(top_n.min(MAX_COMPARED));

    let downloads: Vec<LineSeries> = leaders
        .iter()
        .enumerate()
        .map(|(i, item)| LineSeries {
            name: item.title.clone(),
            values: item.estimated_downloads.clone(),
            color: theme.series_color(i),
        })
        .collect();
    let visits: Vec<LineSeries> = leaders
        .iter()
        .enumerate()
        .map(|(i, item)| LineSeries {
            name: item.title.clone(),
            values: item.visits.iter().map(|v| *v as f64).collect(),
            color: theme.series_color(i),
        })
        .collect();

    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let axis = data.series.axis();
    render_line_chart(
        frame,
        rows[0],
        &format!("{} · top {}", ESTIMATED_DOWNLOADS_LABEL, leaders.len()),
        axis,
        &downloads,
        theme,
    );
    render_line_chart(
        frame,
        rows[1],
        &format!("Visits · top {}", leaders.len()),
        axis,
        &visits,
        theme,
    );
}
