use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 are light. Absent or unparseable values count as dark.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style the dashboard draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header / tabs ────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,
    pub tab: Style,
    pub tab_active: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Metrics ──────────────────────────────────────────────────────────────
    /// Estimated downloads series.
    pub downloads: Style,
    /// Visits series.
    pub visits: Style,
    /// Country bars.
    pub countries: Style,
    /// Palette cycled through when several items share a chart.
    pub series_palette: Vec<Color>,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,

    // ── Input ────────────────────────────────────────────────────────────────
    pub search: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),
            tab: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            downloads: Style::default().fg(Color::Rgb(0x1f, 0x77, 0xb4)),
            visits: Style::default().fg(Color::Rgb(0xff, 0x7f, 0x0e)),
            countries: Style::default().fg(Color::LightBlue),
            series_palette: vec![
                Color::Rgb(0x1f, 0x77, 0xb4),
                Color::Rgb(0xff, 0x7f, 0x0e),
                Color::Rgb(0x2c, 0xa0, 0x2c),
                Color::Rgb(0xd6, 0x27, 0x28),
                Color::Rgb(0x94, 0x67, 0xbd),
                Color::Rgb(0x8c, 0x56, 0x4b),
                Color::Rgb(0xe3, 0x77, 0xc2),
                Color::Rgb(0x7f, 0x7f, 0x7f),
                Color::Rgb(0xbc, 0xbd, 0x22),
                Color::Rgb(0x17, 0xbe, 0xcf),
            ],

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),

            search: Style::default().fg(Color::Yellow),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),
            tab: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            downloads: Style::default().fg(Color::Blue),
            visits: Style::default().fg(Color::Rgb(0xd9, 0x5f, 0x02)),
            countries: Style::default().fg(Color::Blue),
            series_palette: vec![
                Color::Blue,
                Color::Rgb(0xd9, 0x5f, 0x02),
                Color::Green,
                Color::Red,
                Color::Magenta,
                Color::Rgb(0x8c, 0x56, 0x4b),
                Color::Cyan,
                Color::DarkGray,
            ],

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),

            search: Style::default().fg(Color::Magenta),
        }
    }

    /// Basic 8-colour ANSI palette without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),
            tab: Style::default().fg(Color::White),
            tab_active: Style::default().fg(Color::Yellow),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            downloads: Style::default().fg(Color::Blue),
            visits: Style::default().fg(Color::Yellow),
            countries: Style::default().fg(Color::Cyan),
            series_palette: vec![
                Color::Blue,
                Color::Yellow,
                Color::Green,
                Color::Red,
                Color::Magenta,
                Color::Cyan,
                Color::White,
            ],

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),

            search: Style::default().fg(Color::Yellow),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour for the `index`-th item of a multi-series chart.
    pub fn series_color(&self, index: usize) -> Color {
        if self.series_palette.is_empty() {
            return Color::White;
        }
        self.series_palette[index % self.series_palette.len()]
    }

    /// Alternating row style for table row `index`.
    pub fn row_style(&self, index: usize) -> Style {
        if index % 2 == 0 {
            self.table_row
        } else {
            self.table_row_alt
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.downloads.fg, Some(Color::Rgb(0x1f, 0x77, 0xb4)));
        assert_eq!(t.visits.fg, Some(Color::Rgb(0xff, 0x7f, 0x0e)));
        assert_eq!(t.error.fg, Some(Color::Red));
    }

    #[test]
    fn test_light_theme_uses_dark_text() {
        let t = Theme::light();
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.header.fg, Some(Color::Blue));
    }

    #[test]
    fn test_classic_theme_has_no_bold() {
        let t = Theme::classic();
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
        assert!(!t.value.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("light").text.fg, Some(Color::Black));
        assert_eq!(Theme::from_name("dark").text.fg, Some(Color::White));
        assert_eq!(Theme::from_name("classic").header.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_series_color_cycles() {
        let t = Theme::classic();
        let n = t.series_palette.len();
        assert_eq!(t.series_color(0), t.series_color(n));
        assert_ne!(t.series_color(0), t.series_color(1));
    }

    #[test]
    fn test_row_style_alternates() {
        let t = Theme::dark();
        assert_eq!(t.row_style(0), t.table_row);
        assert_eq!(t.row_style(1), t.table_row_alt);
        assert_eq!(t.row_style(2), t.table_row);
    }
}
