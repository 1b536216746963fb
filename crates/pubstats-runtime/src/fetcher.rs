//! Sequential, rate-limited collection of usage records.
//!
//! Publications are fetched one after another with a courtesy delay between
//! consecutive requests. Each request is retried with a short linear back-off;
//! when every attempt fails the last cached record is reused, or an all-zero
//! record stands in so the publication still appears in the tables.

use std::collections::HashMap;
use std::time::Duration;

use pubstats_core::models::{Publication, UsageRecord, UNKNOWN_TITLE};
use pubstats_data::normalizer::normalize;
use pubstats_data::report::UsageReport;
use tracing::{debug, info, warn};

use crate::client::StatsSource;

/// Attempts per publication before falling back.
const MAX_ATTEMPTS: u32 = 3;

/// Back-off step between attempts: 0 ms, 100 ms, 200 ms.
const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(100);

// ── FetchReport ───────────────────────────────────────────────────────────────

/// What happened during one fetch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub requested: usize,
    pub succeeded: usize,
    /// Failed requests replaced by a previously cached record.
    pub reused: usize,
    /// Failed requests replaced by an all-zero record.
    pub defaulted: usize,
}

impl FetchReport {
    pub fn failed(&self) -> usize {
        self.reused + self.defaulted
    }
}

// ── StatsFetcher ──────────────────────────────────────────────────────────────

/// Fetches usage reports for a catalogue, strictly one request at a time.
#[derive(Debug, Clone)]
pub struct StatsFetcher {
    delay: Duration,
    backoff_step: Duration,
}

impl StatsFetcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }

    /// Override the retry back-off step.
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Collect one record per publication, in catalogue order.
    ///
    /// `cached` maps uuids to records from an earlier run; they are only used
    /// when a publication cannot be fetched.
    pub async fn fetch_all<S: StatsSource>(
        &self,
        source: &S,
        publications: &[Publication],
        cached: &HashMap<String, UsageRecord>,
    ) -> (Vec<UsageRecord>, FetchReport) {
        let total = publications.len();
        let mut records = Vec::with_capacity(total);
        let mut report = FetchReport {
            requested: total,
            ..FetchReport::default()
        };

        for (i, publication) in publications.iter().enumerate() {
            let title = if publication.name.trim().is_empty() {
                UNKNOWN_TITLE
            } else {
                publication.name.as_str()
            };
            info!(
                "Fetching stats for publication {}/{}: {}",
                i + 1,
                total,
                pubstats_core::formatting::truncate_title(title, 60)
            );

            match self.fetch_with_retry(source, &publication.uuid).await {
                Some(usage) => {
                    records.push(normalize(&publication.uuid, title, &usage));
                    report.succeeded += 1;
                }
                None => match cached.get(&publication.uuid) {
                    Some(previous) => {
                        warn!(uuid = %publication.uuid, "Using cached record after failed fetch");
                        let mut record = previous.clone();
                        record.title = title.to_string();
                        records.push(record);
                        report.reused += 1;
                    }
                    None => {
                        warn!(uuid = %publication.uuid, "No statistics available; recording zeros");
                        records.push(UsageRecord::empty(&publication.uuid, title));
                        report.defaulted += 1;
                    }
                },
            }

            if i + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            requested = report.requested,
            succeeded = report.succeeded,
            reused = report.reused,
            defaulted = report.defaulted,
            "Statistics fetch finished"
        );
        (records, report)
    }

    /// Up to [`MAX_ATTEMPTS`] tries with linear back-off.
    async fn fetch_with_retry<S: StatsSource>(&self, source: &S, uuid: &str) -> Option<UsageReport> {
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let backoff = self.backoff_step * attempt;
                debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Retrying after back-off");
                tokio::time::sleep(backoff).await;
            }

            match source.fetch_usage_report(uuid).await {
                Ok(usage) => return Some(usage),
                Err(e) => warn!(uuid = %uuid, attempt, error = %e, "Usage report request failed"),
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
