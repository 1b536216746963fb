//! Typed model of the upstream usage-report document.
//!
//! A report is an `_embedded.usagereports` list of sections, each tagged by
//! `report-type` and carrying `points` of `{ id, label, values: { views } }`.
//! Sections are decoded one at a time so a single malformed section never
//! discards its siblings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

// ── Points ────────────────────────────────────────────────────────────────────

/// The numeric payload of one point.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PointValues {
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: u64,
}

/// One `(id, label, views)` point of a report section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportPoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_values")]
    pub values: PointValues,
}

impl ReportPoint {
    pub fn views(&self) -> u64 {
        self.values.views
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// One tagged section of a usage report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "report-type")]
pub enum ReportSection {
    TotalDownloads {
        #[serde(default)]
        points: Vec<ReportPoint>,
    },
    TotalVisits {
        #[serde(default)]
        points: Vec<ReportPoint>,
    },
    TotalVisitsPerMonth {
        #[serde(default)]
        points: Vec<ReportPoint>,
    },
    TopCountries {
        #[serde(default)]
        points: Vec<ReportPoint>,
    },
    /// Any report type this crate does not interpret.
    #[serde(other)]
    Unknown,
}

// ── UsageReport ───────────────────────────────────────────────────────────────

/// A decoded usage report: the recognised sections in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageReport {
    pub sections: Vec<ReportSection>,
}

impl UsageReport {
    /// Decode a raw response body.
    ///
    /// Never fails: a missing or malformed envelope yields an empty report,
    /// and malformed sections are skipped with a warning.
    pub fn from_value(raw: &Value) -> Self {
        let Some(list) = raw
            .get("_embedded")
            .and_then(|embedded| embedded.get("usagereports"))
            .and_then(Value::as_array)
        else {
            debug!("Usage report has no _embedded.usagereports list");
            return Self::default();
        };

        let sections = list
            .iter()
            .enumerate()
            .filter_map(|(index, section)| {
                match ReportSection::deserialize(section) {
                    Ok(ReportSection::Unknown) => {
                        debug!(
                            index,
                            report_type = ?section.get("report-type"),
                            "Ignoring unrecognised report section"
                        );
                        None
                    }
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        warn!(index, "Skipping malformed report section: {}", e);
                        None
                    }
                }
            })
            .collect();

        Self { sections }
    }

    /// Decode an optional raw body; `None` means nothing was fetched.
    pub fn from_optional(raw: Option<&Value>) -> Self {
        raw.map(Self::from_value).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<'de> Deserialize<'de> for UsageReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&raw))
    }
}

// ── Lenient field decoding ────────────────────────────────────────────────────

/// Accept integers, floats, numeric strings and `null`; anything negative or
/// unreadable becomes zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(count_from_value(&raw))
}

fn count_from_value(raw: &Value) -> u64 {
    match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| f as u64)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Strings pass through, numbers are rendered, everything else is empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// `values` that is not an object counts as no views.
fn lenient_values<'de, D>(deserializer: D) -> Result<PointValues, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(PointValues {
        views: raw.get("views").map(count_from_value).unwrap_or(0),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(id: &str, label: &str, views: u64) -> ReportPoint {
        ReportPoint {
            id: id.to_string(),
            label: label.to_string(),
            values: PointValues { views },
        }
    }

    #[test]
    fn test_decodes_known_sections_in_order() {
        let raw = json!({
            "_embedded": { "usagereports": [
                { "report-type": "TotalVisits", "points": [
                    { "id": "x", "label": "x", "values": { "views": 12 } }
                ]},
                { "report-type": "TopCountries", "points": [
                    { "id": "CH", "label": "Switzerland", "values": { "views": 8 } }
                ]}
            ]}
        });
        let report = UsageReport::from_value(&raw);
        assert_eq!(
            report.sections,
            vec![
                ReportSection::TotalVisits { points: vec![point("x", "x", 12)] },
                ReportSection::TopCountries { points: vec![point("CH", "Switzerland", 8)] },
            ]
        );
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let raw = json!({
            "_embedded": { "usagereports": [
                { "report-type": "TopCities", "points": [] },
                { "report-type": "TotalDownloads", "points": [] }
            ]}
        });
        let report = UsageReport::from_value(&raw);
        assert_eq!(
            report.sections,
            vec![ReportSection::TotalDownloads { points: vec![] }]
        );
    }

    #[test]
    fn test_malformed_section_skipped_siblings_kept() {
        let raw = json!({
            "_embedded": { "usagereports": [
                { "report-type": "TotalDownloads", "points": "not a list" },
                { "report-type": "TotalVisits", "points": [ { "values": { "views": 3 } } ] }
            ]}
        });
        let report = UsageReport::from_value(&raw);
        assert_eq!(
            report.sections,
            vec![ReportSection::TotalVisits { points: vec![point("", "", 3)] }]
        );
    }

    #[test]
    fn test_missing_envelope_is_empty() {
        assert!(UsageReport::from_value(&json!({})).is_empty());
        assert!(UsageReport::from_value(&json!({ "_embedded": {} })).is_empty());
        assert!(UsageReport::from_value(&json!(null)).is_empty());
        assert!(UsageReport::from_optional(None).is_empty());
    }

    #[test]
    fn test_lenient_views() {
        let raw = json!({
            "_embedded": { "usagereports": [
                { "report-type": "TotalDownloads", "points": [
                    { "values": { "views": "7" } },
                    { "values": { "views": 2.9 } },
                    { "values": { "views": -4 } },
                    { "values": { "views": null } },
                    { "values": {} },
                    { "values": null },
                    {}
                ]}
            ]}
        });
        let report = UsageReport::from_value(&raw);
        let ReportSection::TotalDownloads { points } = &report.sections[0] else {
            panic!("expected TotalDownloads, got {:?}", report.sections);
        };
        let views: Vec<u64> = points.iter().map(ReportPoint::views).collect();
        assert_eq!(views, vec![7, 2, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let raw = json!({
            "_embedded": { "usagereports": [
                { "report-type": "TopCountries", "points": [
                    { "id": 756, "label": null, "values": { "views": 1 } }
                ]}
            ]}
        });
        let report = UsageReport::from_value(&raw);
        assert_eq!(
            report.sections,
            vec![ReportSection::TopCountries { points: vec![point("756", "", 1)] }]
        );
    }

    #[test]
    fn test_deserialize_impl_uses_lenient_decoding() {
        let report: UsageReport = serde_json::from_str(r#"{"unexpected": true}"#).unwrap();
        assert!(report.is_empty());
    }
}
