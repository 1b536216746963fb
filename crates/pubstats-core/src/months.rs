//! Sortable month keys and the canonical month axis.
//!
//! The usage API labels months in free text (`"March 2025"`); everything that
//! aligns time series works on [`MonthKey`] instead, which orders
//! chronologically and renders as `YYYY-MM`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::Month;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};

/// A calendar month. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

fn named_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)\.?\s+(\d{4})$").expect("regex is valid")
    })
}

fn numeric_month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{1,2})$").expect("regex is valid")
    })
}

impl MonthKey {
    /// Build a key, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(StatsError::InvalidMonthLabel(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// Parse a month label.
    ///
    /// Accepted forms: a month name or three-letter abbreviation followed by a
    /// four-digit year (`"March 2025"`, `"mar 2025"`), or `YYYY-MM`
    /// (`"2025-03"`). Anything else is [`StatsError::InvalidMonthLabel`].
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let invalid = || StatsError::InvalidMonthLabel(label.to_string());

        if let Some(caps) = named_month_re().captures(trimmed) {
            let month = caps[1].parse::<Month>().map_err(|_| invalid())?;
            let year = caps[2].parse::<i32>().map_err(|_| invalid())?;
            return Ok(Self {
                year,
                month: month.number_from_month(),
            });
        }

        if let Some(caps) = numeric_month_re().captures(trimmed) {
            let year = caps[1].parse::<i32>().map_err(|_| invalid())?;
            let month = caps[2].parse::<u32>().map_err(|_| invalid())?;
            return Self::new(year, month).map_err(|_| invalid());
        }

        Err(invalid())
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Short axis label, e.g. `"Mar 25"`.
    pub fn short_label(&self) -> String {
        let name = Month::try_from(self.month as u8)
            .map(|m| &m.name()[..3])
            .unwrap_or("???");
        format!("{} {:02}", name, self.year.rem_euclid(100))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = StatsError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

// ── Month axis ────────────────────────────────────────────────────────────────

/// Every month from `start` to `end`, both inclusive.
///
/// Returns an empty axis when `start` is after `end`.
pub fn month_range(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
    let mut axis = Vec::new();
    let mut current = start;
    while current <= end {
        axis.push(current);
        current = current.succ();
    }
    axis
}

/// The contiguous axis covering every key in `keys`, or empty for no keys.
pub fn month_span<I>(keys: I) -> Vec<MonthKey>
where
    I: IntoIterator<Item = MonthKey>,
{
    let mut bounds: Option<(MonthKey, MonthKey)> = None;
    for key in keys {
        bounds = Some(match bounds {
            None => (key, key),
            Some((lo, hi)) => (lo.min(key), hi.max(key)),
        });
    }
    match bounds {
        Some((lo, hi)) => month_range(lo, hi),
        None => Vec::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
