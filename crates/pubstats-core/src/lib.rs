//! Core types shared by the publication statistics crates.
//!
//! Holds the error taxonomy, the per-publication usage model, month keys,
//! number formatting and the command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod months;
pub mod settings;

pub use error::{Result, StatsError};
pub use models::{CountryVisits, MonthlyVisits, Publication, PublicationTypeGroup, UsageRecord};
pub use months::MonthKey;
