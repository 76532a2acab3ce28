use std::collections::HashSet;
use tracing::{debug, instrument};

use crate::schema::CleanedRecord;

/// One record per `(ride_date, station_id)`.
///
/// Records are stable-sorted by date, so rows sharing a date keep their source
/// order, and the first of each key group survives. Later duplicates are
/// discarded whole, never merged.
#[instrument(level = "info", skip_all, fields(rows = records.len()))]
pub fn dedup_records(mut records: Vec<CleanedRecord>) -> Vec<CleanedRecord> {
    records.sort_by_key(|r| r.ride_date);

    let mut seen = HashSet::with_capacity(records.len());
    let before = records.len();
    records.retain(|r| seen.insert(r.key()));

    debug!(removed = before - records.len(), "deduplicated");
    records
}
