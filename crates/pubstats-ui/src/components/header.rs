use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Dashboard title shown above every view.
pub const TITLE: &str = "PUBLICATION USAGE STATISTICS";

/// Three header lines: title, separator, and a `[ group | origin | span ]`
/// context line.
pub struct Header<'a> {
    /// Five-digit group identifier.
    pub group_id: &'a str,
    /// Where the data came from ("fetched", "cached", ...).
    pub origin: &'a str,
    /// Month span of the axis, e.g. `"Mar 25 – Sep 25"`.
    pub span: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(group_id: &'a str, origin: &'a str, span: &'a str, theme: &'a Theme) -> Self {
        Self {
            group_id,
            origin,
            span,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ group ", self.theme.label),
                Span::styled(self.group_id, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.origin, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.span, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let lines = Header::new("09746", "cached", "Mar 25 – Sep 25", &theme).to_lines();
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_header_title_and_separator() {
        let theme = Theme::dark();
        let lines = Header::new("09746", "cached", "", &theme).to_lines();
        assert_eq!(line_text(&lines[0]), TITLE);
        assert_eq!(line_text(&lines[1]), "=".repeat(60));
    }

    #[test]
    fn test_header_context_line() {
        let theme = Theme::light();
        let lines = Header::new("09746", "stale cache", "Mar 25 – Sep 25", &theme).to_lines();
        assert_eq!(
            line_text(&lines[2]),
            "[ group 09746 | stale cache | Mar 25 – Sep 25 ]"
        );
    }
}
