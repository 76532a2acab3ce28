use tracing::{debug, instrument};

use crate::config::Caps;
use crate::process::date_parser::parse_ride_date;
use crate::schema::{CleanedRecord, StagingRecord};

/// Null → 0, negative → 0, above `cap` → `cap`.
pub fn clean_numeric(value: Option<i64>, cap: i64) -> i64 {
    match value {
        None => 0,
        Some(v) if v < 0 => 0,
        Some(v) if v > cap => cap,
        Some(v) => v,
    }
}

/// Same rule shape as `clean_numeric`; NaN counts as null.
pub fn clean_percentage(value: Option<f64>, cap: f64) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v.is_nan() || v <= 0.0 => 0.0,
        Some(v) if v > cap => cap,
        Some(v) => v,
    }
}

/// Result of the cleaning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub records: Vec<CleanedRecord>,
    /// Rows removed because their date was blank or unparseable.
    pub dropped_bad_date: usize,
}

/// Clamp every field of a row whose date already parsed.
fn clean_record(rec: StagingRecord, ride_date: chrono::NaiveDate, caps: &Caps) -> CleanedRecord {
    CleanedRecord {
        ride_date,
        station_id: rec.station_id,
        modes: rec.modes.map(|v| clean_numeric(v, caps.ridership)),
        daily_ridership: clean_numeric(rec.daily_ridership, caps.ridership),
        raw_text_field: rec.raw_text_field.trim().to_string(),
        pre_pandemic_comparison: clean_percentage(rec.pre_pandemic_comparison, caps.percentage),
    }
}

/// Drop rows without a usable date, then clean the rest column by column.
#[instrument(level = "info", skip_all, fields(rows = staged.len()))]
pub fn clean_records(staged: Vec<StagingRecord>, caps: &Caps) -> CleanOutcome {
    let mut records = Vec::with_capacity(staged.len());
    let mut dropped_bad_date = 0;

    for (row, rec) in staged.into_iter().enumerate() {
        match rec.ride_date_str.as_deref().and_then(parse_ride_date) {
            Some(date) => records.push(clean_record(rec, date, caps)),
            None => {
                debug!(row, value = ?rec.ride_date_str, "dropping row with unusable date");
                dropped_bad_date += 1;
            }
        }
    }

    CleanOutcome {
        records,
        dropped_bad_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModeCounts;

    fn staged(date: Option<&str>, subway: Option<i64>) -> StagingRecord {
        StagingRecord {
            ride_date_str: date.map(str::to_string),
            station_id: 1,
            modes: ModeCounts {
                subway,
                ..ModeCounts::default()
            },
            daily_ridership: subway,
            raw_text_field: "  MTA Aggregate ".to_string(),
            pre_pandemic_comparison: Some(0.0),
        }
    }

    #[test]
    fn numeric_rules() {
        assert_eq!(clean_numeric(None, 100_000), 0);
        assert_eq!(clean_numeric(Some(-50), 100_000), 0);
        assert_eq!(clean_numeric(Some(150_000), 100_000), 100_000);
        assert_eq!(clean_numeric(Some(100_000), 100_000), 100_000);
        assert_eq!(clean_numeric(Some(0), 100_000), 0);
        assert_eq!(clean_numeric(Some(4321), 100_000), 4321);
    }

    #[test]
    fn percentage_rules() {
        assert_eq!(clean_percentage(None, 200.0), 0.0);
        assert_eq!(clean_percentage(Some(f64::NAN), 200.0), 0.0);
        assert_eq!(clean_percentage(Some(-1.5), 200.0), 0.0);
        assert_eq!(clean_percentage(Some(250.0), 200.0), 200.0);
        assert_eq!(clean_percentage(Some(87.25), 200.0), 87.25);
        assert!(clean_percentage(Some(-0.0), 200.0).is_sign_positive());
    }

    #[test]
    fn clamping_is_idempotent() {
        let samples = [
            None,
            Some(i64::MIN),
            Some(-1),
            Some(0),
            Some(99_999),
            Some(100_000),
            Some(100_001),
            Some(i64::MAX),
        ];
        for v in samples {
            let once = clean_numeric(v, 100_000);
            assert_eq!(clean_numeric(Some(once), 100_000), once);
        }
        for v in [None, Some(f64::NAN), Some(-3.0), Some(0.5), Some(200.0), Some(1e9)] {
            let once = clean_percentage(v, 200.0);
            assert_eq!(clean_percentage(Some(once), 200.0), once);
        }
    }

    #[test]
    fn clamping_preserves_order_in_range() {
        let (a, b) = (Some(10), Some(20));
        assert!(clean_numeric(a, 100_000) <= clean_numeric(b, 100_000));
        assert!(clean_percentage(Some(10.0), 200.0) <= clean_percentage(Some(20.0), 200.0));
    }

    #[test]
    fn drops_rows_without_usable_date() {
        let out = clean_records(
            vec![
                staged(Some("2020-03-01"), Some(1)),
                staged(None, Some(2)),
                staged(Some("yesterday"), Some(3)),
                staged(Some("2020-03-02"), Some(4)),
            ],
            &Caps::default(),
        );
        assert_eq!(out.dropped_bad_date, 2);
        let subways: Vec<i64> = out.records.iter().map(|r| r.modes.subway).collect();
        assert_eq!(subways, vec![1, 4]);
    }

    #[test]
    fn cleans_each_field_independently() {
        let mut rec = staged(Some("2020-03-01"), Some(-50));
        rec.modes.bus = Some(150_000);
        rec.modes.lirr = None;
        rec.daily_ridership = Some(149_950);
        rec.pre_pandemic_comparison = Some(310.0);
        let out = clean_records(vec![rec], &Caps::default());
        let r = &out.records[0];
        assert_eq!(r.modes.subway, 0);
        assert_eq!(r.modes.bus, 100_000);
        assert_eq!(r.modes.lirr, 0);
        // capped from the uncapped sum, not the sum of capped parts
        assert_eq!(r.daily_ridership, 100_000);
        assert_eq!(r.pre_pandemic_comparison, 200.0);
        assert_eq!(r.raw_text_field, "MTA Aggregate");
    }
}
