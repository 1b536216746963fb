//! Data layer for publication usage statistics.
//!
//! Decodes upstream usage reports, normalises them into per-publication
//! records, assembles the flat tables, estimates monthly downloads on a shared
//! month axis, summarises the result and keeps the on-disk cache.

pub mod aggregator;
pub mod normalizer;
pub mod publications;
pub mod redistribution;
pub mod report;
pub mod series;
pub mod store;
pub mod tables;

pub use pubstats_core as core;
