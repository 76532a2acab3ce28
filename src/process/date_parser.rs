use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::process::utils::clean_str;

/// `%Y` also takes a two-digit year, so the four-digit layouts come first
/// and anything they read before year 1000 falls through to the `%y` ones.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%m/%d/%y",
    "%m-%d-%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%y %H:%M:%S%.f",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %H:%M",
];

const MIN_YEAR: i32 = 1000;

fn plausible(d: NaiveDate) -> Option<NaiveDate> {
    (d.year() >= MIN_YEAR).then_some(d)
}

/// Parse a source date cell into a calendar date, dropping any time of day.
/// Blank or unrecognised input gives None.
pub fn parse_ride_date(s: &str) -> Option<NaiveDate> {
    let s = clean_str(s);
    if s.is_empty() {
        return None;
    }

    if let Some(d) = parse_compact(&s) {
        return Some(d);
    }
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok().and_then(plausible))
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_from_str(&s, fmt)
                .ok()
                .and_then(|dt| plausible(dt.date()))
        })
    {
        return Some(dt);
    }
    DateTime::parse_from_rfc3339(&s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Fast path for `"YYYYMMDD"`.
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).and_then(plausible)
}
