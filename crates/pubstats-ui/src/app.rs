//! Application state and the terminal event loop of the dashboard.
//!
//! [`App`] owns the theme, the active view and the interactive state
//! (selected publication, ranking size, country search). The dataset is
//! loaded before the loop starts and never changes while it runs.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};

use crate::components::header::Header;
use crate::dashboard::DashboardData;
use crate::themes::Theme;
use crate::{compare_view, geo_view, item_view, overview_view, top_view};

/// Smallest and largest ranking size.
pub const TOP_N_RANGE: (usize, usize) = (5, 20);

// ── View ──────────────────────────────────────────────────────────────────────

/// Which dashboard view is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Item,
    Compare,
    Top,
    Geo,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Overview,
        View::Item,
        View::Compare,
        View::Top,
        View::Geo,
    ];

    /// Parse a `--view` value; unknown names fall back to the overview.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "item" => View::Item,
            "compare" => View::Compare,
            "top" => View::Top,
            "geo" => View::Geo,
            _ => View::Overview,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Item => "item",
            View::Compare => "compare",
            View::Top => "top",
            View::Geo => "geo",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Item => "Item",
            View::Compare => "Compare",
            View::Top => "Top Performers",
            View::Geo => "Geography",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub view: View,
    /// Items in ranked views, kept within [`TOP_N_RANGE`].
    pub top_n: usize,
    /// Index of the publication shown in the item view.
    pub selected: usize,
    pub country_query: String,
    /// `true` while keystrokes go to the country search.
    pub searching: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, view: View, top_n: usize) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view,
            top_n: top_n.clamp(TOP_N_RANGE.0, TOP_N_RANGE.1),
            selected: 0,
            country_query: String::new(),
            searching: false,
            should_quit: false,
        }
    }

    /// Run the dashboard until `q` / `Ctrl+C`, then hand back the final state
    /// so the caller can remember the last view.
    ///
    /// Polls `crossterm` with a 250 ms timeout; the data is static so a
    /// redraw per tick is all that happens between key presses.
    pub fn run(mut self, data: &DashboardData) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, data);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result.map(|()| self)
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        data: &DashboardData,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);
        let item_count = data.series.items().len();

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame, data))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, item_count);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply one key press. `item_count` bounds the item selection.
    pub fn handle_key(&mut self, key: KeyEvent, item_count: usize) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.searching {
            match key.code {
                KeyCode::Char(c) => self.country_query.push(c),
                KeyCode::Backspace => {
                    self.country_query.pop();
                }
                KeyCode::Esc => {
                    self.country_query.clear();
                    self.searching = false;
                }
                KeyCode::Enter => self.searching = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.view = View::ALL[index];
            }
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::BackTab => self.view = self.view.prev(),
            KeyCode::Right if item_count > 0 => {
                self.selected = (self.selected + 1) % item_count;
            }
            KeyCode::Left if item_count > 0 => {
                self.selected = (self.selected + item_count - 1) % item_count;
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.top_n = (self.top_n + 1).min(TOP_N_RANGE.1);
            }
            KeyCode::Char('-') => {
                self.top_n = self.top_n.saturating_sub(1).max(TOP_N_RANGE.0);
            }
            KeyCode::Char('/') => {
                self.view = View::Geo;
                self.searching = true;
            }
            KeyCode::Esc => self.country_query.clear(),
            _ => {}
        }
    }

    /// Render header, tabs, the active view and the key help line.
    pub fn render(&self, frame: &mut Frame, data: &DashboardData) {
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

        let span = data.span_label();
        let header = Header::new(&data.group_id, &data.origin, &span, &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), rows[0]);

        let titles: Vec<Line> = View::ALL
            .iter()
            .enumerate()
            .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .style(self.theme.tab)
            .highlight_style(self.theme.tab_active);
        frame.render_widget(tabs, rows[1]);

        let body = rows[2];
        if data.is_empty() {
            overview_view::render_no_data(frame, body, &self.theme);
        } else {
            match self.view {
                View::Overview => overview_view::render_overview(frame, body, data, &self.theme),
                View::Item => {
                    item_view::render_item(frame, body, data, self.selected, &self.theme)
                }
                View::Compare => {
                    compare_view::render_compare(frame, body, data, self.top_n, &self.theme)
                }
                View::Top => top_view::render_top(frame, body, data, self.top_n, &self.theme),
                View::Geo => geo_view::render_geo(
                    frame,
                    body,
                    data,
                    &self.country_query,
                    self.searching,
                    &self.theme,
                ),
            }
        }

        let help = Line::from(vec![
            Span::styled("1-5/Tab", self.theme.info),
            Span::styled(" views  ", self.theme.dim),
            Span::styled("←/→", self.theme.info),
            Span::styled(" item  ", self.theme.dim),
            Span::styled("+/-", self.theme.info),
            Span::styled(format!(" top {}  ", self.top_n), self.theme.dim),
            Span::styled("/", self.theme.info),
            Span::styled(" search  ", self.theme.dim),
            Span::styled("q", self.theme.info),
            Span::styled(" quit", self.theme.dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[3]);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
