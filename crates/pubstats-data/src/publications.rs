//! Publication catalogue parsing from the search endpoint response.

use std::collections::BTreeMap;

use pubstats_core::error::{Result, StatsError};
use pubstats_core::models::{Publication, PublicationTypeGroup};
use serde_json::Value;
use tracing::debug;

/// Publications issued in or before this year are left out.
pub const MIN_YEAR_EXCLUSIVE: i32 = 2010;

const NO_LICENSE: &str = "No license";

/// Full licence names with a well-known short form.
const LICENSE_SHORT_NAMES: &[(&str, &str)] = &[
    ("Creative Commons Attribution 4.0 International", "CC BY 4.0"),
    (
        "Creative Commons Attribution-NonCommercial 4.0 International",
        "CC BY-NC 4.0",
    ),
    ("In Copyright - Non-Commercial Use Permitted", "Copyright"),
    (
        "Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International",
        "CC BY-NC-ND 4.0",
    ),
    (
        "Creative Commons Attribution-NonCommercial-ShareAlike 4.0 International",
        "CC BY-NC-SA 4.0",
    ),
];

/// Decode a search response into publications issued after
/// [`MIN_YEAR_EXCLUSIVE`], in response order.
///
/// The response must carry a top-level `_embedded` object; beneath it, a
/// missing result list simply means no publications.
pub fn parse_search_response(raw: &Value) -> Result<Vec<Publication>> {
    let embedded = raw
        .get("_embedded")
        .filter(|v| v.is_object())
        .ok_or_else(|| StatsError::InvalidResponse("missing _embedded envelope".to_string()))?;

    let objects = match embedded
        .get("searchResult")
        .and_then(|r| r.get("_embedded"))
        .and_then(|e| e.get("objects"))
    {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };

    let mut publications = Vec::with_capacity(objects.len());
    for wrapper in objects {
        let Some(indexable) = wrapper
            .get("_embedded")
            .and_then(|e| e.get("indexableObject"))
        else {
            debug!("Search hit without indexableObject; skipped");
            continue;
        };
        let publication = publication_from_object(indexable);
        if publication.year.is_some_and(|y| y > MIN_YEAR_EXCLUSIVE) {
            publications.push(publication);
        } else {
            debug!(uuid = %publication.uuid, year = ?publication.year, "Publication filtered by year");
        }
    }

    Ok(publications)
}

/// Build one [`Publication`] from an `indexableObject`.
fn publication_from_object(obj: &Value) -> Publication {
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let metadata = obj.get("metadata");
    let field = |name: &str| metadata.and_then(|m| metadata_value(m.get(name)?));

    let doi = field("dc.identifier.doi");
    let publication_type = field("dc.type");
    let date_issued = field("dc.date.issued");
    let license = field("dc.rights.license").unwrap_or_else(|| NO_LICENSE.to_string());
    let license_short = short_license(&license);
    let license_short_group = license_group(&license_short);

    Publication {
        uuid: text("uuid"),
        name: text("name"),
        has_doi: doi.is_some(),
        doi,
        publication_type_group: PublicationTypeGroup::classify(publication_type.as_deref()),
        publication_type,
        year: date_issued.as_deref().and_then(year_of),
        date_issued,
        license,
        license_short,
        license_short_group,
    }
}

/// A metadata field is either a list of `{ value }` entries (first wins) or
/// a single `{ value }` object.
fn metadata_value(field: &Value) -> Option<String> {
    let entry = match field {
        Value::Array(list) => list.first()?,
        Value::Object(_) => field,
        _ => return None,
    };
    entry
        .get("value")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Year from the first four characters of an issue date.
fn year_of(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}

/// Well-known short form of a licence, or the licence itself.
pub fn short_license(license: &str) -> String {
    LICENSE_SHORT_NAMES
        .iter()
        .find(|(full, _)| *full == license)
        .map(|(_, short)| short.to_string())
        .unwrap_or_else(|| license.to_string())
}

/// Any 4.0 licence counts as "CC BY 4.0" for grouping.
pub fn license_group(license_short: &str) -> String {
    if license_short.contains("4.0") {
        "CC BY 4.0".to_string()
    } else {
        license_short.to_string()
    }
}

/// Number of publications per type group.
pub fn count_by_type_group(publications: &[Publication]) -> BTreeMap<PublicationTypeGroup, usize> {
    let mut counts = BTreeMap::new();
    for p in publications {
        *counts.entry(p.publication_type_group).or_default() += 1;
    }
    counts
}

/// Number of publications per licence group.
pub fn count_by_license_group(publications: &[Publication]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for p in publications {
        *counts.entry(p.license_short_group.clone()).or_default() += 1;
    }
    counts
}

// ── Tests ─────────────────────────────────────────────────────────────────────
