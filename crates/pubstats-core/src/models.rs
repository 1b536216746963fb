use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when the catalogue did not supply one for a publication.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Sum of counts that stays at `u64::MAX` instead of overflowing.
///
/// Upstream counts are untrusted and may be arbitrarily large.
///
/// ```
/// use pubstats_core::models::saturating_sum;
///
/// assert_eq!(saturating_sum([1, 2, 3]), 6);
/// assert_eq!(saturating_sum([u64::MAX, 1]), u64::MAX);
/// ```
pub fn saturating_sum(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0u64, u64::saturating_add)
}

/// Visits reported for one month, as labelled by the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyVisits {
    /// Free-text month label, e.g. `"March 2025"`.
    pub month: String,
    pub visits: u64,
}

/// Visits reported from one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryVisits {
    /// ISO country code as reported (e.g. `"CH"`).
    pub country_code: String,
    /// Display name of the country.
    pub country: String,
    pub visits: u64,
    /// Share of this publication's country visits, in percent, two decimals.
    pub percentage: f64,
}

/// Normalised usage statistics for one publication.
///
/// Produced once per fetch cycle and never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub uuid: String,
    pub title: String,
    /// Sum of the per-file download counts.
    pub total_downloads: u64,
    /// Reported page-visit total.
    pub total_visits: u64,
    /// Monthly visits in source order (not necessarily chronological).
    #[serde(default)]
    pub monthly_visits: Vec<MonthlyVisits>,
    /// Country breakdown in source order.
    #[serde(default, rename = "top_countries", alias = "country_visits")]
    pub country_visits: Vec<CountryVisits>,
}

impl UsageRecord {
    /// An all-zero record, used when nothing usable was reported.
    pub fn empty(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            total_downloads: 0,
            total_visits: 0,
            monthly_visits: Vec::new(),
            country_visits: Vec::new(),
        }
    }

    /// Sum of the visits across all reported countries.
    pub fn total_country_visits(&self) -> u64 {
        saturating_sum(self.country_visits.iter().map(|c| c.visits))
    }

    /// `true` when the record carries no statistics at all.
    pub fn is_empty(&self) -> bool {
        self.total_downloads == 0
            && self.total_visits == 0
            && self.monthly_visits.is_empty()
            && self.country_visits.is_empty()
    }
}

// ── Publication catalogue ─────────────────────────────────────────────────────

/// Coarse publication category used for grouping in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PublicationTypeGroup {
    #[serde(rename = "Student Paper")]
    StudentPaper,
    #[serde(rename = "Dataset")]
    Dataset,
    #[serde(rename = "Scientific Article")]
    ScientificArticle,
    #[serde(rename = "Other publication")]
    Other,
}

impl PublicationTypeGroup {
    /// Map a repository `dc.type` value onto its group.
    pub fn classify(publication_type: Option<&str>) -> Self {
        match publication_type {
            Some("Student Paper" | "Bachelor Thesis" | "Master Thesis") => Self::StudentPaper,
            Some("Dataset" | "Data Collection") => Self::Dataset,
            Some("Journal Article" | "Review Article" | "Book Chapter") => {
                Self::ScientificArticle
            }
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StudentPaper => "Student Paper",
            Self::Dataset => "Dataset",
            Self::ScientificArticle => "Scientific Article",
            Self::Other => "Other publication",
        }
    }
}

impl fmt::Display for PublicationTypeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One publication of the research group, as listed by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub uuid: String,
    pub name: String,
    pub doi: Option<String>,
    pub has_doi: bool,
    pub publication_type: Option<String>,
    pub publication_type_group: PublicationTypeGroup,
    pub date_issued: Option<String>,
    pub year: Option<i32>,
    pub license: String,
    pub license_short: String,
    pub license_short_group: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_is_all_zero() {
        let record = UsageRecord::empty("abc", "A title");
        assert_eq!(record.uuid, "abc");
        assert_eq!(record.title, "A title");
        assert_eq!(record.total_downloads, 0);
        assert_eq!(record.total_visits, 0);
        assert!(record.monthly_visits.is_empty());
        assert!(record.country_visits.is_empty());
        assert!(record.is_empty());
    }

    #[test]
    fn test_saturating_sum_caps_at_max() {
        assert_eq!(saturating_sum(Vec::new()), 0);
        assert_eq!(saturating_sum([u64::MAX - 1, 1, 1]), u64::MAX);
    }

    #[test]
    fn test_total_country_visits() {
        let mut record = UsageRecord::empty("abc", "t");
        record.country_visits = vec![
            CountryVisits {
                country_code: "CH".to_string(),
                country: "Switzerland".to_string(),
                visits: 80,
                percentage: 80.0,
            },
            CountryVisits {
                country_code: "US".to_string(),
                country: "United States".to_string(),
                visits: 20,
                percentage: 20.0,
            },
        ];
        assert_eq!(record.total_country_visits(), 100);
        assert!(!record.is_empty());
    }

    #[test]
    fn test_record_serializes_countries_as_top_countries() {
        let record = UsageRecord::empty("abc", "t");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("top_countries").is_some());
        assert!(json.get("country_visits").is_none());
    }

    #[test]
    fn test_record_deserializes_without_breakdowns() {
        let json = r#"{"uuid":"u","title":"t","total_downloads":3,"total_visits":9}"#;
        let record: UsageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_downloads, 3);
        assert!(record.monthly_visits.is_empty());
        assert!(record.country_visits.is_empty());
    }

    #[test]
    fn test_classify_publication_types() {
        assert_eq!(
            PublicationTypeGroup::classify(Some("Master Thesis")),
            PublicationTypeGroup::StudentPaper
        );
        assert_eq!(
            PublicationTypeGroup::classify(Some("Data Collection")),
            PublicationTypeGroup::Dataset
        );
        assert_eq!(
            PublicationTypeGroup::classify(Some("Book Chapter")),
            PublicationTypeGroup::ScientificArticle
        );
        assert_eq!(
            PublicationTypeGroup::classify(Some("Conference Poster")),
            PublicationTypeGroup::Other
        );
        assert_eq!(
            PublicationTypeGroup::classify(None),
            PublicationTypeGroup::Other
        );
    }

    #[test]
    fn test_type_group_serde_uses_display_names() {
        let json = serde_json::to_string(&PublicationTypeGroup::ScientificArticle).unwrap();
        assert_eq!(json, r#""Scientific Article""#);
        let back: PublicationTypeGroup = serde_json::from_str(r#""Other publication""#).unwrap();
        assert_eq!(back, PublicationTypeGroup::Other);
    }
}
