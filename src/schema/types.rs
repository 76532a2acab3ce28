// src/schema/types.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Final column order of the cleaned table.
pub const OUTPUT_COLUMNS: [&str; 11] = [
    "ride_date",
    "station_id",
    "daily_ridership",
    "raw_text_field",
    "subway_ridership",
    "bus_ridership",
    "lirr_ridership",
    "metro_north_ridership",
    "access_a_ride_ridership",
    "bridges_tunnels_ridership",
    "pre_pandemic_comparison",
];

/// Per-mode ridership figures carried through every stage.
///
/// Generic over the cell type so the staging shape (`Option<i64>`, where `None`
/// is a null cell) and the cleaned shape (`i64`) share one definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeCounts<T> {
    pub subway: T,
    pub bus: T,
    pub lirr: T,
    pub metro_north: T,
    pub access_a_ride: T,
    pub bridges_tunnels: T,
}

impl<T: Copy> ModeCounts<T> {
    pub fn to_array(&self) -> [T; 6] {
        [
            self.subway,
            self.bus,
            self.lirr,
            self.metro_north,
            self.access_a_ride,
            self.bridges_tunnels,
        ]
    }

    pub fn map<U>(&self, mut f: impl FnMut(T) -> U) -> ModeCounts<U> {
        ModeCounts {
            subway: f(self.subway),
            bus: f(self.bus),
            lirr: f(self.lirr),
            metro_north: f(self.metro_north),
            access_a_ride: f(self.access_a_ride),
            bridges_tunnels: f(self.bridges_tunnels),
        }
    }
}

/// One source row projected into the staging shape, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingRecord {
    pub ride_date_str: Option<String>,
    pub station_id: i64,
    pub modes: ModeCounts<Option<i64>>,
    /// Six modes plus Staten Island Railway, summed before any capping.
    pub daily_ridership: Option<i64>,
    pub raw_text_field: String,
    pub pre_pandemic_comparison: Option<f64>,
}

/// A staging record that passed the date filter and had every field clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub ride_date: NaiveDate,
    pub station_id: i64,
    pub modes: ModeCounts<i64>,
    pub daily_ridership: i64,
    pub raw_text_field: String,
    pub pre_pandemic_comparison: f64,
}

impl CleanedRecord {
    pub fn key(&self) -> (NaiveDate, i64) {
        (self.ride_date, self.station_id)
    }
}

/// One row of the output table, fields in `OUTPUT_COLUMNS` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub ride_date: NaiveDate,
    pub station_id: i64,
    pub daily_ridership: i64,
    pub raw_text_field: String,
    pub subway_ridership: i64,
    pub bus_ridership: i64,
    pub lirr_ridership: i64,
    pub metro_north_ridership: i64,
    pub access_a_ride_ridership: i64,
    pub bridges_tunnels_ridership: i64,
    pub pre_pandemic_comparison: f64,
}
