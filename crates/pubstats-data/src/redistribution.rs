//! Month-axis alignment and proportional download redistribution.
//!
//! The upstream source reports total downloads but only a monthly breakdown of
//! visits. The monthly download series is estimated by spreading the total in
//! proportion to the visit series, so the result is derived, never measured.

use std::collections::HashMap;

use pubstats_core::error::Result;
use pubstats_core::models::{saturating_sum, MonthlyVisits};
use pubstats_core::months::MonthKey;
use tracing::debug;

/// Spread `total` over the months of `visits` in proportion to each month's
/// share of all visits.
///
/// Every value is non-negative and the values sum to `total` up to floating
/// point rounding. When there are no visits at all, every month is `0.0`.
///
/// ```
/// use pubstats_data::redistribution::redistribute;
///
/// assert_eq!(redistribute(100, &[10, 0, 30]), vec![25.0, 0.0, 75.0]);
/// assert_eq!(redistribute(50, &[0, 0, 0]), vec![0.0, 0.0, 0.0]);
/// ```
pub fn redistribute(total: u64, visits: &[u64]) -> Vec<f64> {
    let visit_sum = saturating_sum(visits.iter().copied());
    if visit_sum == 0 {
        return vec![0.0; visits.len()];
    }
    let total = total as f64;
    let visit_sum = visit_sum as f64;
    visits
        .iter()
        .map(|&v| (v as f64 / visit_sum) * total)
        .collect()
}

/// Place a publication's monthly visits onto `axis`, zero-filling months the
/// source did not report.
///
/// Labels are parsed into [`MonthKey`]s first; an unreadable label is an
/// error because dropping it would shift the series against the axis.
/// Repeated labels are summed. Months outside the axis are left out.
pub fn align(monthly: &[MonthlyVisits], axis: &[MonthKey]) -> Result<Vec<u64>> {
    let positions: HashMap<MonthKey, usize> =
        axis.iter().enumerate().map(|(i, key)| (*key, i)).collect();

    let mut aligned = vec![0u64; axis.len()];
    for entry in monthly {
        let key = MonthKey::parse(&entry.month)?;
        match positions.get(&key) {
            Some(&i) => aligned[i] = aligned[i].saturating_add(entry.visits),
            None => debug!(month = %key, "Month outside the axis; excluded"),
        }
    }
    Ok(aligned)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
