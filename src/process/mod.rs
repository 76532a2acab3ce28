// src/process/mod.rs
pub mod clean;
pub mod date_parser;
pub mod dedup;
pub mod project;
pub mod staging;
pub mod utils;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::{fs::File, io::Read, path::Path, time::Instant};
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::schema::OutputRow;

use self::{
    clean::clean_records,
    dedup::dedup_records,
    project::project,
    staging::{resolve_columns, stage_table, StagingDefaults},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Column names exactly as the source header spells them.
    pub headers: Vec<String>,
    /// Each data row, one String per field. Rows may be shorter than `headers`.
    pub rows: Vec<Vec<String>>,
}

/// Parse delimited text with one header row into a `RawTable`.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // tolerate ragged rows; missing cells read as blank
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(PipelineError::EmptyInput.into());
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open input file: {:?}", path.as_ref()))?;
    let table = read_csv(file)
        .with_context(|| format!("Failed to read input file: {:?}", path.as_ref()))?;
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded source table"
    );
    Ok(table)
}

/// Per-stage row counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub rows_read: usize,
    pub rows_dropped_bad_date: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
    /// Logical fields with no source column, defaulted to 0 for every row.
    pub defaulted_fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<OutputRow>,
    pub stats: PipelineStats,
}

/// Normalize → stage → clean → dedup → project.
///
/// Fails only when the date column cannot be found, before any row is
/// touched. Everything else is handled row by row.
#[instrument(level = "info", skip_all, fields(rows = table.rows.len()))]
pub fn run_pipeline(table: &RawTable, cfg: &PipelineConfig) -> Result<PipelineOutput> {
    let start = Instant::now();

    let aliases = cfg.alias_table()?;
    let columns = resolve_columns(&table.headers, &aliases)?;
    let defaults = StagingDefaults {
        station_id: cfg.station_id,
        raw_text: cfg.raw_text.clone(),
    };

    let staged = stage_table(table, &columns, &defaults);
    let cleaned = clean_records(staged, &cfg.caps());
    let before_dedup = cleaned.records.len();
    let records = dedup_records(cleaned.records);
    let rows = project(&records);

    let stats = PipelineStats {
        rows_read: table.rows.len(),
        rows_dropped_bad_date: cleaned.dropped_bad_date,
        duplicates_removed: before_dedup - records.len(),
        rows_written: rows.len(),
        defaulted_fields: columns
            .defaulted_fields()
            .iter()
            .map(|f| f.as_str().to_string())
            .collect(),
    };

    info!(
        read = stats.rows_read,
        dropped = stats.rows_dropped_bad_date,
        duplicates = stats.duplicates_removed,
        written = stats.rows_written,
        elapsed = ?start.elapsed(),
        "pipeline complete"
    );

    Ok(PipelineOutput { rows, stats })
}
