//! Single-publication view: reported totals and its monthly series.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use pubstats_core::formatting::{format_count, format_number, truncate_title};
use pubstats_data::series::ESTIMATED_DOWNLOADS_LABEL;

use crate::components::charts::render_month_bars;
use crate::components::metrics::{render_metrics, Metric};
use crate::dashboard::DashboardData;
use crate::overview_view::render_no_data;
use crate::themes::Theme;

/// Render the publication at `selected` (wrapped into range).
pub fn render_item(
    frame: &mut Frame,
    area: Rect,
    data: &DashboardData,
    selected: usize,
    theme: &Theme,
) {
    let items = data.series.items();
    if items.is_empty() {
        render_no_data(frame, area, theme);
        return;
    }
    let index = selected % items.len();
    let item = &items[index];

    let rows = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(4),
        Constraint::Percentage(50),
        Constraint::Min(5),
    ])
    .split(area);

    let title = vec![
        Line::from(vec![
            Span::styled(
                truncate_title(&item.title, rows[0].width.saturating_sub(12) as usize),
                theme.header,
            ),
            Span::styled(format!(" ({}/{})", index + 1, items.len()), theme.dim),
        ]),
        Line::from(Span::styled("←/→ to change publication", theme.dim)),
    ];
    frame.render_widget(Paragraph::new(title), rows[0]);

    let metrics = [
        Metric::new("Total Downloads", format_count(item.total_downloads)),
        Metric::new("Total Visits", format_count(item.total_visits)),
        Metric::new(
            "Avg Monthly Downloads (est.)",
            format_number(item.average_estimated_downloads(), 1),
        ),
        Metric::new("Avg Monthly Visits", format_number(item.average_visits(), 1)),
    ];
    render_metrics(frame, rows[1], &metrics, theme);

    // Leading and trailing months without activity are not drawn.
    let (start, end) = match item.active_range() {
        Some(range) => range,
        None => {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    "No monthly activity in the selected period",
                    theme.dim,
                )),
                rows[2],
            );
            return;
        }
    };
    let months = &data.series.axis()[start..=end];
    let downloads = &item.estimated_downloads[start..=end];
    let visits: Vec<f64> = item.visits[start..=end].iter().map(|v| *v as f64).collect();

    render_month_bars(
        frame,
        rows[2],
        ESTIMATED_DOWNLOADS_LABEL,
        months,
        downloads,
        theme.downloads,
        theme,
    );
    render_month_bars(frame, rows[3], "Visits", months, &visits, theme.visits, theme);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{render_text, sample_data};

    #[test]
    fn test_render_item_shows_position_and_totals() {
        let data = sample_data();
        let theme = Theme::dark();
        let text = render_text(140, 40, |frame| {
            render_item(frame, frame.area(), &data, 0, &theme)
        });
        assert!(text.contains("Glacier mass balance"));
        assert!(text.contains("(1/3)"));
        assert!(text.contains("Total Downloads"));
        assert!(text.contains("100"));
    }

    #[test]
    fn test_render_item_wraps_selection() {
        let data = sample_data();
        let theme = Theme::dark();
        let text = render_text(140, 40, |frame| {
            render_item(frame, frame.area(), &data, 4, &theme)
        });
        assert!(text.contains("Permafrost dataset"));
        assert!(text.contains("(2/3)"));
    }

    #[test]
    fn test_render_item_without_activity() {
        let data = sample_data();
        let theme = Theme::dark();
        let text = render_text(140, 40, |frame| {
            render_item(frame, frame.area(), &data, 2, &theme)
        });
        assert!(text.contains("Unvisited report"));
        assert!(text.contains("No monthly activity"));
    }
}
