use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::error::PipelineError;
use crate::process::utils::{parse_count, parse_real};
use crate::process::RawTable;
use crate::schema::{AliasTable, ColumnIndex, LogicalField, ModeCounts, StagingRecord};

/// Column positions for every logical field, resolved once per run.
/// `None` means the source has no such column and the field defaults to 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub date: usize,
    pub modes: ModeCounts<Option<usize>>,
    pub staten_island_railway: Option<usize>,
    pub pre_pandemic_comparison: Option<usize>,
}

impl ResolvedColumns {
    /// Optional logical fields with no matching source column.
    pub fn defaulted_fields(&self) -> Vec<LogicalField> {
        let optional = [
            (LogicalField::Subway, self.modes.subway),
            (LogicalField::Bus, self.modes.bus),
            (LogicalField::Lirr, self.modes.lirr),
            (LogicalField::MetroNorth, self.modes.metro_north),
            (LogicalField::AccessARide, self.modes.access_a_ride),
            (LogicalField::BridgesTunnels, self.modes.bridges_tunnels),
            (LogicalField::StatenIslandRailway, self.staten_island_railway),
            (
                LogicalField::PrePandemicComparison,
                self.pre_pandemic_comparison,
            ),
        ];
        optional
            .into_iter()
            .filter(|(_, pos)| pos.is_none())
            .map(|(field, _)| field)
            .collect()
    }
}

/// Constant values every staged row carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDefaults {
    pub station_id: i64,
    pub raw_text: String,
}

impl Default for StagingDefaults {
    fn default() -> Self {
        Self {
            station_id: crate::config::DEFAULT_STATION_ID,
            raw_text: crate::config::DEFAULT_RAW_TEXT.to_string(),
        }
    }
}

/// Probe the alias table against the header row. A missing date column is
/// fatal; any other missing column is logged once and defaulted.
#[instrument(level = "debug", skip_all, fields(columns = headers.len()))]
pub fn resolve_columns(headers: &[String], aliases: &AliasTable) -> Result<ResolvedColumns> {
    let index = ColumnIndex::from_headers(headers);
    debug!(mapping = ?index.raw_names(), "normalized source columns");

    let position = |field: LogicalField| aliases.probe(field, &index).map(|c| c.position);

    let date = position(LogicalField::Date).ok_or_else(|| PipelineError::MissingDateColumn {
        headers: headers.to_vec(),
    })?;

    let resolved = ResolvedColumns {
        date,
        modes: ModeCounts {
            subway: position(LogicalField::Subway),
            bus: position(LogicalField::Bus),
            lirr: position(LogicalField::Lirr),
            metro_north: position(LogicalField::MetroNorth),
            access_a_ride: position(LogicalField::AccessARide),
            bridges_tunnels: position(LogicalField::BridgesTunnels),
        },
        staten_island_railway: position(LogicalField::StatenIslandRailway),
        pre_pandemic_comparison: position(LogicalField::PrePandemicComparison),
    };

    for field in resolved.defaulted_fields() {
        info!(field = %field, "source column absent, defaulting to 0");
    }

    Ok(resolved)
}

/// Non-blank cell at `pos`; short rows read as blank.
fn cell(row: &[String], pos: usize) -> Option<&str> {
    row.get(pos)
        .map(|s| s.as_str())
        .filter(|s| !s.trim().is_empty())
}

/// Absent column → 0, present but blank/non-numeric → null.
fn count_at(row: &[String], pos: Option<usize>) -> Option<i64> {
    match pos {
        None => Some(0),
        Some(p) => cell(row, p).and_then(parse_count),
    }
}

pub fn stage_row(
    row: &[String],
    columns: &ResolvedColumns,
    defaults: &StagingDefaults,
) -> StagingRecord {
    let modes = columns.modes.map(|pos| count_at(row, pos));
    let staten_island = count_at(row, columns.staten_island_railway);

    // A null addend nulls the whole sum; the cleaner later maps that to 0.
    let daily_ridership = modes
        .to_array()
        .into_iter()
        .chain(std::iter::once(staten_island))
        .try_fold(0i64, |acc, v| v.map(|v| acc.saturating_add(v)));

    let pre_pandemic_comparison = match columns.pre_pandemic_comparison {
        None => Some(0.0),
        Some(p) => cell(row, p).and_then(parse_real),
    };

    StagingRecord {
        ride_date_str: cell(row, columns.date).map(str::to_string),
        station_id: defaults.station_id,
        modes,
        daily_ridership,
        raw_text_field: defaults.raw_text.clone(),
        pre_pandemic_comparison,
    }
}

/// Stage every row. Rows are independent, so this runs on the rayon pool;
/// the indexed collect keeps source order.
#[instrument(level = "info", skip_all, fields(rows = table.rows.len()))]
pub fn stage_table(
    table: &RawTable,
    columns: &ResolvedColumns,
    defaults: &StagingDefaults,
) -> Vec<StagingRecord> {
    table
        .rows
        .par_iter()
        .map(|row| stage_row(row, columns, defaults))
        .collect()
}
