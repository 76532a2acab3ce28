// src/schema/aliases.rs

use std::fmt;

use super::normalize::{canonical_name, ColumnIndex, SourceColumn};

/// The source quantities the staging mapper reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Date,
    Subway,
    Bus,
    Lirr,
    MetroNorth,
    AccessARide,
    BridgesTunnels,
    StatenIslandRailway,
    PrePandemicComparison,
}

impl LogicalField {
    pub const ALL: [LogicalField; 9] = [
        LogicalField::Date,
        LogicalField::Subway,
        LogicalField::Bus,
        LogicalField::Lirr,
        LogicalField::MetroNorth,
        LogicalField::AccessARide,
        LogicalField::BridgesTunnels,
        LogicalField::StatenIslandRailway,
        LogicalField::PrePandemicComparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Date => "date",
            LogicalField::Subway => "subway",
            LogicalField::Bus => "bus",
            LogicalField::Lirr => "lirr",
            LogicalField::MetroNorth => "metro_north",
            LogicalField::AccessARide => "access_a_ride",
            LogicalField::BridgesTunnels => "bridges_tunnels",
            LogicalField::StatenIslandRailway => "staten_island_railway",
            LogicalField::PrePandemicComparison => "pre_pandemic_comparison",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered canonical column names accepted for each logical field. Earlier
/// entries win when a snapshot carries more than one of them.
const STANDARD_ALIASES: &[(LogicalField, &[&str])] = &[
    (LogicalField::Date, &["date", "ride_date", "service_date"]),
    (
        LogicalField::Subway,
        &[
            "subways_total_estimated_ridership",
            "subway_total_estimated_ridership",
        ],
    ),
    (
        LogicalField::Bus,
        &[
            "buses_total_estimated_ridership",
            "bus_total_estimated_ridership",
        ],
    ),
    (LogicalField::Lirr, &["lirr_total_estimated_ridership"]),
    (
        LogicalField::MetroNorth,
        &[
            "metro-north_total_estimated_ridership",
            "metro_north_total_estimated_ridership",
        ],
    ),
    (
        LogicalField::AccessARide,
        &[
            "access-a-ride_total_estimated_ridership",
            "access_a_ride_total_estimated_ridership",
            "access-a-ride_total_scheduled_trips",
            "access_a_ride_total_scheduled_trips",
        ],
    ),
    (
        LogicalField::BridgesTunnels,
        &[
            "bridges_&_tunnels_total_estimated_ridership",
            "bridges_and_tunnels_total_estimated_ridership",
            "bridges_&_tunnels_total_traffic",
            "bridges_and_tunnels_total_traffic",
        ],
    ),
    (
        LogicalField::StatenIslandRailway,
        &["staten_island_railway_total_estimated_ridership"],
    ),
    (
        LogicalField::PrePandemicComparison,
        &[
            "staten_island_railway_%_of_comparable_pre-pandemic_day",
            "staten_island_railway__of_comparable_pre-pandemic_day",
            "staten_island_railway_of_comparable_pre-pandemic_day",
            "staten_island_railway_%_of_comparable_pre_pandemic_day",
            "staten_island_railway_of_comparable_pre_pandemic_day",
            "staten_island_railway_pct_of_comparable_pre-pandemic_day",
            "staten_island_railway_percent_of_comparable_pre-pandemic_day",
        ],
    ),
];

/// Declarative map from logical field to its accepted column names.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(LogicalField, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl AliasTable {
    pub fn standard() -> Self {
        let entries = STANDARD_ALIASES
            .iter()
            .map(|(field, names)| (*field, names.iter().map(|n| n.to_string()).collect()))
            .collect();
        Self { entries }
    }

    /// Append extra accepted names for `field`, probed after the built-in ones.
    /// Names are canonicalized on the way in so callers may pass raw headers.
    pub fn with_aliases<I, S>(mut self, field: LogicalField, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra: Vec<String> = names
            .into_iter()
            .map(|n| canonical_name(n.as_ref()))
            .collect();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, list)) => list.extend(extra),
            None => self.entries.push((field, extra)),
        }
        self
    }

    pub fn aliases(&self, field: LogicalField) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, names)| names.as_slice())
            .unwrap_or(&[])
    }

    /// First alias of `field` present in `index`.
    pub fn probe<'a>(&self, field: LogicalField, index: &'a ColumnIndex) -> Option<&'a SourceColumn> {
        self.aliases(field).iter().find_map(|alias| index.get(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(headers: &[&str]) -> ColumnIndex {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        ColumnIndex::from_headers(&headers)
    }

    #[test]
    fn every_field_has_aliases() {
        let table = AliasTable::standard();
        for field in LogicalField::ALL {
            assert!(!table.aliases(field).is_empty(), "{field} has no aliases");
        }
    }

    #[test]
    fn standard_aliases_are_canonical() {
        let table = AliasTable::standard();
        for field in LogicalField::ALL {
            for alias in table.aliases(field) {
                assert_eq!(&canonical_name(alias), alias);
            }
        }
    }

    #[test]
    fn probes_aliases_in_order() {
        let idx = index(&[
            "Date",
            "Access_A_Ride: Total Scheduled Trips",
            "Access-A-Ride: Total Estimated Ridership",
        ]);
        let table = AliasTable::standard();
        let col = table.probe(LogicalField::AccessARide, &idx).expect("resolved");
        assert_eq!(col.raw_name, "Access-A-Ride: Total Estimated Ridership");
    }

    #[test]
    fn percentage_without_percent_sign() {
        let idx = index(&["Staten Island Railway: of Comparable Pre-Pandemic Day"]);
        let col = AliasTable::standard()
            .probe(LogicalField::PrePandemicComparison, &idx)
            .expect("resolved");
        assert_eq!(col.position, 0);
    }

    #[test]
    fn extra_aliases_are_probed_last() {
        let idx = index(&["Day", "Subway Riders"]);
        let table = AliasTable::standard()
            .with_aliases(LogicalField::Date, ["Day"])
            .with_aliases(LogicalField::Subway, ["Subway Riders"]);
        assert_eq!(table.probe(LogicalField::Date, &idx).unwrap().position, 0);
        assert_eq!(table.probe(LogicalField::Subway, &idx).unwrap().position, 1);
        assert!(table.probe(LogicalField::Bus, &idx).is_none());
    }
}
