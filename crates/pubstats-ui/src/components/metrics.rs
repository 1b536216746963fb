//! Row of labelled headline numbers.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::themes::Theme;

/// One labelled number.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Render `metrics` side by side in equal-width boxes.
pub fn render_metrics(frame: &mut Frame, area: Rect, metrics: &[Metric], theme: &Theme) {
    if metrics.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, metrics.len() as u32); metrics.len()];
    let cells = Layout::horizontal(constraints).split(area);

    for (metric, cell) in metrics.iter().zip(cells.iter()) {
        let body = vec![
            Line::from(Span::styled(metric.label.clone(), theme.label)),
            Line::from(Span::styled(metric.value.clone(), theme.value)),
        ];
        let widget = Paragraph::new(body).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border),
        );
        frame.render_widget(widget, *cell);
    }
}
