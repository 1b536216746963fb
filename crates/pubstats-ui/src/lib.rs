//! Terminal dashboard for publication usage statistics.
//!
//! Provides themes, chart and metric components, one module per view, and
//! the application event loop built on top of [`ratatui`].

pub mod app;
pub mod compare_view;
pub mod components;
pub mod dashboard;
pub mod geo_view;
pub mod item_view;
pub mod overview_view;
pub mod themes;
pub mod top_view;

pub use app::{App, View};
pub use dashboard::DashboardData;
pub use pubstats_core as core;
