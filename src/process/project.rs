use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray},
    datatypes::Date32Type,
    record_batch::RecordBatch,
    temporal_conversions::date32_to_datetime,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::schema::{build_output_schema, CleanedRecord, OutputRow};

/// Select the eleven output fields. Pure projection, nothing is recomputed.
pub fn project(records: &[CleanedRecord]) -> Vec<OutputRow> {
    records
        .iter()
        .map(|r| OutputRow {
            ride_date: r.ride_date,
            station_id: r.station_id,
            daily_ridership: r.daily_ridership,
            raw_text_field: r.raw_text_field.clone(),
            subway_ridership: r.modes.subway,
            bus_ridership: r.modes.bus,
            lirr_ridership: r.modes.lirr,
            metro_north_ridership: r.modes.metro_north,
            access_a_ride_ridership: r.modes.access_a_ride,
            bridges_tunnels_ridership: r.modes.bridges_tunnels,
            pre_pandemic_comparison: r.pre_pandemic_comparison,
        })
        .collect()
}

/// Date32 value back to a calendar date; None when chrono cannot represent it.
pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    date32_to_datetime(days).map(|dt| dt.date())
}

/// Columnar form of the output rows, in `OUTPUT_COLUMNS` order.
pub fn to_record_batch(rows: &[OutputRow]) -> Result<RecordBatch> {
    let ints = |f: fn(&OutputRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from_iter_values(rows.iter().map(f)))
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from_iter_values(
            rows.iter().map(|r| Date32Type::from_naive_date(r.ride_date)),
        )),
        ints(|r| r.station_id),
        ints(|r| r.daily_ridership),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.raw_text_field.as_str()),
        )),
        ints(|r| r.subway_ridership),
        ints(|r| r.bus_ridership),
        ints(|r| r.lirr_ridership),
        ints(|r| r.metro_north_ridership),
        ints(|r| r.access_a_ride_ridership),
        ints(|r| r.bridges_tunnels_ridership),
        Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|r| r.pre_pandemic_comparison),
        )),
    ];

    RecordBatch::try_new(build_output_schema(), columns).context("building output batch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ModeCounts, OUTPUT_COLUMNS};
    use arrow::array::Array;

    fn cleaned() -> CleanedRecord {
        CleanedRecord {
            ride_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            station_id: 1,
            modes: ModeCounts {
                subway: 1,
                bus: 2,
                lirr: 3,
                metro_north: 4,
                access_a_ride: 5,
                bridges_tunnels: 6,
            },
            daily_ridership: 28,
            raw_text_field: "MTA Aggregate".into(),
            pre_pandemic_comparison: 42.5,
        }
    }

    #[test]
    fn projects_fields_without_recomputing() {
        let rows = project(&[cleaned()]);
        let r = &rows[0];
        assert_eq!(r.daily_ridership, 28);
        assert_eq!(r.subway_ridership, 1);
        assert_eq!(r.bridges_tunnels_ridership, 6);
        assert_eq!(r.pre_pandemic_comparison, 42.5);
    }

    #[test]
    fn batch_has_eleven_ordered_columns() -> Result<()> {
        let batch = to_record_batch(&project(&[cleaned(), cleaned()]))?;
        assert_eq!(batch.num_columns(), OUTPUT_COLUMNS.len());
        assert_eq!(batch.num_rows(), 2);
        let dates = batch
            .column(0)
            .as_any()
            .downcast_ref::<Date32Array>()
            .expect("date32 column");
        assert_eq!(days_to_date(dates.value(0)), NaiveDate::from_ymd_opt(2020, 3, 1));
        let metro = batch
            .column(7)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("int64 column");
        assert_eq!(metro.value(1), 4);
        assert_eq!(metro.null_count(), 0);
        Ok(())
    }

    #[test]
    fn epoch_conversion() {
        let d = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        assert_eq!(Date32Type::from_naive_date(d), 18322);
        assert_eq!(days_to_date(18322), Some(d));
        assert_eq!(days_to_date(1), NaiveDate::from_ymd_opt(1970, 1, 2));
        assert_eq!(days_to_date(i32::MAX), None);
    }
}
