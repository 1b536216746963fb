//! Runtime layer: talks to the repository API and manages the cache.
//!
//! Holds the HTTP client, the sequential fetcher and the data manager that
//! chooses between cached and freshly fetched statistics.

pub mod client;
pub mod data_manager;
pub mod fetcher;

pub use pubstats_core as core;
pub use pubstats_data as data;
