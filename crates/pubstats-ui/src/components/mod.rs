//! Reusable building blocks shared by the dashboard views.

pub mod charts;
pub mod header;
pub mod metrics;
