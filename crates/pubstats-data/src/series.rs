//! Per-publication time series on a shared month axis.
//!
//! Pivots the monthly visit table onto one canonical axis, derives the
//! estimated download series for every publication and exposes the totals
//! the dashboard charts.

use std::collections::HashMap;

use pubstats_core::error::Result;
use pubstats_core::models::{saturating_sum, MonthlyVisits};
use pubstats_core::months::{month_range, month_span, MonthKey};
use tracing::debug;

use crate::redistribution::{align, redistribute};
use crate::tables::{EstimatedDownloadRow, StatsTables};

/// Label used wherever the derived download series is shown.
pub const ESTIMATED_DOWNLOADS_LABEL: &str = "Downloads (est.)";

// ── ItemSeries ────────────────────────────────────────────────────────────────

/// One publication's aligned series.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSeries {
    pub uuid: String,
    pub title: String,
    /// Reported total downloads.
    pub total_downloads: u64,
    /// Reported total visits.
    pub total_visits: u64,
    /// Visits per axis month, zero-filled.
    pub visits: Vec<u64>,
    /// Derived downloads per axis month.
    pub estimated_downloads: Vec<f64>,
}

impl ItemSeries {
    /// Visits within the axis.
    pub fn visit_sum(&self) -> u64 {
        saturating_sum(self.visits.iter().copied())
    }

    /// Estimated downloads within the axis.
    pub fn estimated_sum(&self) -> f64 {
        self.estimated_downloads.iter().sum()
    }

    /// Mean visits per axis month.
    pub fn average_visits(&self) -> f64 {
        mean(self.visits.iter().map(|v| *v as f64), self.visits.len())
    }

    /// Mean estimated downloads per axis month.
    pub fn average_estimated_downloads(&self) -> f64 {
        mean(
            self.estimated_downloads.iter().copied(),
            self.estimated_downloads.len(),
        )
    }

    /// Inclusive index range from the first to the last month with any
    /// activity, or `None` when the whole series is zero.
    pub fn active_range(&self) -> Option<(usize, usize)> {
        let active = |i: &usize| self.visits[*i] > 0 || self.estimated_downloads[*i] > 0.0;
        let first = (0..self.visits.len()).find(active)?;
        let last = (0..self.visits.len()).rev().find(active)?;
        Some((first, last))
    }
}

fn mean(values: impl Iterator<Item = f64>, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

// ── SeriesTable ───────────────────────────────────────────────────────────────

/// All publications' series on one month axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    axis: Vec<MonthKey>,
    items: Vec<ItemSeries>,
}

impl SeriesTable {
    /// Pivot `tables` onto a month axis.
    ///
    /// The axis runs from `from` to `to`; a missing bound is taken from the
    /// span of months present in the data. Publications without monthly rows
    /// get all-zero series. Any unreadable month label fails the whole build.
    pub fn build(
        tables: &StatsTables,
        from: Option<MonthKey>,
        to: Option<MonthKey>,
    ) -> Result<Self> {
        let mut by_uuid: HashMap<&str, Vec<MonthlyVisits>> = HashMap::new();
        for row in &tables.monthly {
            by_uuid.entry(row.uuid.as_str()).or_default().push(MonthlyVisits {
                month: row.month.clone(),
                visits: row.visits,
            });
        }

        let axis = if from.is_some() && to.is_some() {
            resolve_axis(from, to, &[])
        } else {
            let observed = tables
                .monthly
                .iter()
                .map(|row| MonthKey::parse(&row.month))
                .collect::<Result<Vec<_>>>()?;
            resolve_axis(from, to, &month_span(observed))
        };

        let mut items = Vec::with_capacity(tables.publications.len());
        for publication in &tables.publications {
            let monthly = by_uuid
                .get(publication.uuid.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            if monthly.is_empty() {
                debug!(uuid = %publication.uuid, "No monthly visits; series is zero");
            }
            let visits = align(monthly, &axis)?;
            let estimated_downloads = redistribute(publication.total_downloads, &visits);
            items.push(ItemSeries {
                uuid: publication.uuid.clone(),
                title: publication.title.clone(),
                total_downloads: publication.total_downloads,
                total_visits: publication.total_visits,
                visits,
                estimated_downloads,
            });
        }

        Ok(Self { axis, items })
    }

    pub fn axis(&self) -> &[MonthKey] {
        &self.axis
    }

    pub fn items(&self) -> &[ItemSeries] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, uuid: &str) -> Option<&ItemSeries> {
        self.items.iter().find(|item| item.uuid == uuid)
    }

    /// Visits per axis month across all publications.
    pub fn monthly_visit_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.axis.len()];
        for item in &self.items {
            for (total, v) in totals.iter_mut().zip(&item.visits) {
                *total = total.saturating_add(*v);
            }
        }
        totals
    }

    /// Estimated downloads per axis month across all publications.
    pub fn monthly_download_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.axis.len()];
        for item in &self.items {
            for (total, d) in totals.iter_mut().zip(&item.estimated_downloads) {
                *total += d;
            }
        }
        totals
    }

    /// The `n` publications with the most estimated downloads on the axis.
    /// Ties keep table order.
    pub fn top_by_estimated_downloads(&self, n: usize) -> Vec<&ItemSeries> {
        let mut ranked: Vec<&ItemSeries> = self.items.iter().collect();
        ranked.sort_by(|a, b| b.estimated_sum().total_cmp(&a.estimated_sum()));
        ranked.truncate(n);
        ranked
    }

    /// The `n` publications with the most visits on the axis.
    pub fn top_by_visits(&self, n: usize) -> Vec<&ItemSeries> {
        let mut ranked: Vec<&ItemSeries> = self.items.iter().collect();
        ranked.sort_by_key(|item| std::cmp::Reverse(item.visit_sum()));
        ranked.truncate(n);
        ranked
    }

    /// The derived download table, one row per (publication, axis month).
    pub fn estimated_rows(&self) -> Vec<EstimatedDownloadRow> {
        self.items
            .iter()
            .flat_map(|item| {
                self.axis.iter().enumerate().map(move |(i, month)| EstimatedDownloadRow {
                    uuid: item.uuid.clone(),
                    title: item.title.clone(),
                    month: *month,
                    visits: item.visits[i],
                    estimated_downloads: item.estimated_downloads[i],
                })
            })
            .collect()
    }
}

/// Combine explicit bounds with the observed span.
fn resolve_axis(from: Option<MonthKey>, to: Option<MonthKey>, observed: &[MonthKey]) -> Vec<MonthKey> {
    let start = from.or_else(|| observed.first().copied());
    let end = to.or_else(|| observed.last().copied());
    match (start, end) {
        (Some(start), Some(end)) => month_range(start, end),
        _ => Vec::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
