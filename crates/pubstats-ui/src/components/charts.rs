//! Line and bar chart helpers on top of ratatui's chart widgets.

use ratatui::{
    layout::{Direction, Rect},
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use pubstats_core::formatting::{format_number, truncate_title};
use pubstats_core::months::MonthKey;

use crate::themes::Theme;

/// One named line of a line chart.
#[derive(Debug, Clone)]
pub struct LineSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub color: Color,
}

/// Up to three evenly spread x-axis labels: first, middle and last month.
pub fn month_labels(axis: &[MonthKey]) -> Vec<String> {
    match axis.len() {
        0 => Vec::new(),
        1 => vec![axis[0].short_label()],
        2 => vec![axis[0].short_label(), axis[1].short_label()],
        n => vec![
            axis[0].short_label(),
            axis[(n - 1) / 2].short_label(),
            axis[n - 1].short_label(),
        ],
    }
}

/// Upper y bound with a little headroom, never zero.
pub fn y_upper_bound(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        (max * 1.1).ceil()
    }
}

/// Line chart of `series` over the month axis.
pub fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    axis: &[MonthKey],
    series: &[LineSeries],
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title));

    if axis.is_empty() || series.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("No monthly data", theme.dim)).block(block),
            area,
        );
        return;
    }

    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            s.values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(points.iter())
        .map(|(s, data)| {
            Dataset::default()
                .name(truncate_title(&s.name, 40))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.color))
                .data(data)
        })
        .collect();

    let max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max);
    let upper = y_upper_bound(max);

    let chart = Chart::new(datasets)
        .block(block)
        .style(theme.text)
        .x_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, (axis.len().saturating_sub(1)).max(1) as f64])
                .labels(month_labels(axis)),
        )
        .y_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([0.0, upper])
                .labels(vec![
                    "0".to_string(),
                    format_number(upper / 2.0, 0),
                    format_number(upper, 0),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Vertical bars, one per month.
pub fn render_month_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    months: &[MonthKey],
    values: &[f64],
    style: Style,
    theme: &Theme,
) {
    let bars: Vec<Bar> = months
        .iter()
        .zip(values)
        .map(|(month, value)| {
            Bar::default()
                .value(value.round() as u64)
                .label(Line::from(month.short_label()))
                .text_value(format_number(*value, 0))
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1)
        .value_style(theme.value);

    frame.render_widget(chart, area);
}

/// Horizontal bars, largest first, labelled with (truncated) names.
pub fn render_ranked_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[(String, u64)],
    style: Style,
    theme: &Theme,
) {
    let label_width = (area.width / 3).max(8) as usize;
    let bars: Vec<Bar> = entries
        .iter()
        .map(|(name, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(truncate_title(name, label_width)))
                .text_value(format_number(*value as f64, 0))
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .value_style(theme.value);

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
