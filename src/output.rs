// src/output.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, Date32Array, Float64Array, Int64Array, StringArray},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tempfile::Builder;
use tracing::{info, instrument};

use crate::process::project::{days_to_date, to_record_batch};
use crate::schema::{OutputRow, OUTPUT_COLUMNS};

/// On-disk format of the cleaned table, picked from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => OutputFormat::Parquet,
            _ => OutputFormat::Csv,
        }
    }
}

/// Write into a uniquely named hidden sibling file, then rename it over
/// `path`. The temp file is removed on every failure path, including a
/// failed rename.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("output path {} has no file name", path.display()))?;
    let mut tmp = Builder::new()
        .prefix(&format!(".{}.", file_name.to_string_lossy()))
        .suffix(".tmp")
        .tempfile_in(&dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;

    write(tmp.as_file_mut())?;

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("renaming temp file -> {:?}", path))?;
    Ok(())
}

pub fn write_csv(path: &Path, rows: &[OutputRow]) -> Result<()> {
    write_atomically(path, |file| {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        // written explicitly so an empty table still carries the header row
        wtr.write_record(OUTPUT_COLUMNS)
            .context("writing CSV header")?;
        for row in rows {
            wtr.serialize(row).context("writing CSV row")?;
        }
        wtr.flush().context("flushing CSV writer")?;
        Ok(())
    })
}

pub fn write_parquet(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let batch = to_record_batch(rows)?;
    write_atomically(path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating parquet writer")?;
        writer.write(&batch).context("writing batch to parquet")?;
        writer.close().context("closing parquet writer")?;
        Ok(())
    })
}

/// Write `rows` to `path` in the format its extension names.
#[instrument(level = "info", skip(rows), fields(path = %path.display(), rows = rows.len()))]
pub fn write_output(path: &Path, rows: &[OutputRow]) -> Result<OutputFormat> {
    let format = OutputFormat::from_path(path);
    match format {
        OutputFormat::Csv => write_csv(path, rows)?,
        OutputFormat::Parquet => write_parquet(path, rows)?,
    }
    let size = fs::metadata(path).context("getting file metadata")?.len();
    info!(?format, bytes = size, "wrote cleaned table");
    Ok(format)
}

pub fn read_csv_rows(path: &Path) -> Result<Vec<OutputRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let row: OutputRow =
            result.with_context(|| format!("decoding {} at record {}", path.display(), idx))?;
        rows.push(row);
    }
    Ok(rows)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("missing column `{}`", name))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("column `{}` has unexpected type", name))
}

/// Turn one batch of the cleaned table back into rows.
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<OutputRow>> {
    let dates = column::<Date32Array>(batch, "ride_date")?;
    let text = column::<StringArray>(batch, "raw_text_field")?;
    let pct = column::<Float64Array>(batch, "pre_pandemic_comparison")?;
    let int = |name: &str| column::<Int64Array>(batch, name);
    let (station, daily) = (int("station_id")?, int("daily_ridership")?);
    let (subway, bus, lirr) = (
        int("subway_ridership")?,
        int("bus_ridership")?,
        int("lirr_ridership")?,
    );
    let (metro_north, aar, bt) = (
        int("metro_north_ridership")?,
        int("access_a_ride_ridership")?,
        int("bridges_tunnels_ridership")?,
    );

    (0..batch.num_rows())
        .map(|i| {
            let ride_date = days_to_date(dates.value(i))
                .ok_or_else(|| anyhow!("ride_date out of range at row {}", i))?;
            Ok(OutputRow {
                ride_date,
                station_id: station.value(i),
                daily_ridership: daily.value(i),
                raw_text_field: text.value(i).to_string(),
                subway_ridership: subway.value(i),
                bus_ridership: bus.value(i),
                lirr_ridership: lirr.value(i),
                metro_north_ridership: metro_north.value(i),
                access_a_ride_ridership: aar.value(i),
                bridges_tunnels_ridership: bt.value(i),
                pre_pandemic_comparison: pct.value(i),
            })
        })
        .collect()
}

pub fn read_parquet_rows(path: &Path) -> Result<Vec<OutputRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?
        .build()
        .context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.context("reading parquet batch")?;
        rows.extend(batch_to_rows(&batch)?);
    }
    Ok(rows)
}

/// Read a cleaned table written by `write_output`.
pub fn read_output(path: &Path) -> Result<Vec<OutputRow>> {
    match OutputFormat::from_path(path) {
        OutputFormat::Csv => read_csv_rows(path),
        OutputFormat::Parquet => read_parquet_rows(path),
    }
}
