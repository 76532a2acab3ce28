// src/schema/normalize.rs

use std::collections::HashMap;
use tracing::warn;

/// Canonical form of a source column name: trimmed, interior spaces as `_`,
/// no `:`, lowercase. Applying it twice gives the same result as once.
pub fn canonical_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != ':')
        .map(|c| if c == ' ' { '_' } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

/// A source column as it appears in the header, plus its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub raw_name: String,
    pub position: usize,
}

/// Lookup from canonical column name to the source column it came from.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    by_canonical: HashMap<String, SourceColumn>,
}

impl ColumnIndex {
    /// Index a header row. When two raw names collapse to the same canonical
    /// name the left-most one wins.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut by_canonical: HashMap<String, SourceColumn> =
            HashMap::with_capacity(headers.len());
        for (position, raw) in headers.iter().enumerate() {
            let canonical = canonical_name(raw);
            if let Some(existing) = by_canonical.get(&canonical) {
                warn!(
                    canonical = %canonical,
                    kept = %existing.raw_name,
                    ignored = %raw,
                    "duplicate column after normalization"
                );
                continue;
            }
            by_canonical.insert(
                canonical,
                SourceColumn {
                    raw_name: raw.clone(),
                    position,
                },
            );
        }
        Self { by_canonical }
    }

    pub fn get(&self, canonical: &str) -> Option<&SourceColumn> {
        self.by_canonical.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.by_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_canonical.is_empty()
    }

    /// Canonical name → raw name, the shape downstream consumers log.
    pub fn raw_names(&self) -> HashMap<&str, &str> {
        self.by_canonical
            .iter()
            .map(|(k, v)| (k.as_str(), v.raw_name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_source_headers() {
        assert_eq!(
            canonical_name("Subways: Total Estimated Ridership"),
            "subways_total_estimated_ridership"
        );
        assert_eq!(
            canonical_name("  Staten Island Railway: % of Comparable Pre-Pandemic Day "),
            "staten_island_railway_%_of_comparable_pre-pandemic_day"
        );
        assert_eq!(canonical_name("Date"), "date");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for raw in [
            "Bridges & Tunnels: Total Traffic",
            "Access-A-Ride: Total Scheduled Trips",
            " LIRR:  Total Estimated Ridership",
            "already_canonical",
        ] {
            let once = canonical_name(raw);
            assert_eq!(canonical_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn first_duplicate_wins() {
        let headers = vec!["Date".to_string(), "DATE".to_string(), "Extra".to_string()];
        let index = ColumnIndex::from_headers(&headers);
        assert_eq!(index.len(), 2);
        let date = index.get("date").expect("date indexed");
        assert_eq!(date.raw_name, "Date");
        assert_eq!(date.position, 0);
        assert_eq!(index.raw_names().get("extra"), Some(&"Extra"));
    }
}
