// src/report.rs
//! Descriptive statistics over the cleaned table.

use anyhow::{Context, Result};
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::Path};

use crate::process::PipelineStats;
use crate::schema::{OutputRow, OUTPUT_COLUMNS};

/// count/mean/std/min/quartiles/max of one numeric column. Everything but
/// `count` is None on an empty table; `std` is also None for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Most frequent value of a column and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopValue {
    pub column: String,
    pub value: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub numeric: Vec<NumericSummary>,
    pub top_values: Vec<TopValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineStats>,
}

const TEXT_COLUMNS: [&str; 2] = ["ride_date", "raw_text_field"];

fn numeric_value(row: &OutputRow, column: &str) -> Option<f64> {
    let v = match column {
        "station_id" => row.station_id as f64,
        "daily_ridership" => row.daily_ridership as f64,
        "subway_ridership" => row.subway_ridership as f64,
        "bus_ridership" => row.bus_ridership as f64,
        "lirr_ridership" => row.lirr_ridership as f64,
        "metro_north_ridership" => row.metro_north_ridership as f64,
        "access_a_ride_ridership" => row.access_a_ride_ridership as f64,
        "bridges_tunnels_ridership" => row.bridges_tunnels_ridership as f64,
        "pre_pandemic_comparison" => row.pre_pandemic_comparison,
        _ => return None,
    };
    Some(v)
}

fn text_value(row: &OutputRow, column: &str) -> Option<String> {
    match column {
        "ride_date" => Some(row.ride_date.to_string()),
        "raw_text_field" => Some(row.raw_text_field.clone()),
        _ => None,
    }
}

/// Linear interpolation between closest ranks, over a sorted slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn summarize_numeric(column: &str, mut values: Vec<f64>) -> NumericSummary {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let mean = (n > 0).then(|| values.iter().sum::<f64>() / n as f64);
    let std = mean.filter(|_| n > 1).map(|m| {
        let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    NumericSummary {
        column: column.to_string(),
        count: n,
        mean,
        std,
        min: values.first().copied(),
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.50),
        p75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

/// Highest count wins; ties go to the smallest value.
fn top_numeric(column: &str, values: &[f64]) -> TopValue {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    for run in sorted.chunk_by(|a, b| a == b) {
        if best.map_or(true, |(_, freq)| run.len() > freq) {
            best = Some((run[0], run.len()));
        }
    }

    TopValue {
        column: column.to_string(),
        value: best.map(|(v, _)| format_number(v)),
        freq: best.map_or(0, |(_, f)| f),
    }
}

/// Highest count wins; ties go to the lexicographically first value.
fn top_text(column: &str, values: Vec<String>) -> TopValue {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (value, freq) in counts {
        if best.as_ref().map_or(true, |(_, f)| freq > *f) {
            best = Some((value, freq));
        }
    }

    TopValue {
        column: column.to_string(),
        freq: best.as_ref().map_or(0, |(_, f)| *f),
        value: best.map(|(v, _)| v),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

/// Build the report for a cleaned table.
pub fn summarize(rows: &[OutputRow]) -> SummaryReport {
    let mut numeric = Vec::new();
    let mut top_values = Vec::with_capacity(OUTPUT_COLUMNS.len());

    for column in OUTPUT_COLUMNS {
        if TEXT_COLUMNS.contains(&column) {
            let texts = rows.iter().filter_map(|r| text_value(r, column)).collect();
            top_values.push(top_text(column, texts));
        } else {
            let nums: Vec<f64> = rows.iter().filter_map(|r| numeric_value(r, column)).collect();
            top_values.push(top_numeric(column, &nums));
            numeric.push(summarize_numeric(column, nums));
        }
    }

    SummaryReport {
        rows: rows.len(),
        numeric,
        top_values,
        pipeline: None,
    }
}

impl SummaryReport {
    pub fn with_pipeline_stats(mut self, stats: PipelineStats) -> Self {
        self.pipeline = Some(stats);
        self
    }

    /// Human-readable rendering: one statistics table plus a top-value table.
    pub fn render(&self) -> String {
        let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));

        let mut stats = Table::new();
        stats.set_format(*format::consts::FORMAT_BOX_CHARS);
        stats.set_titles(Row::new(
            ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
                .iter()
                .map(|h| Cell::new(h).style_spec("b"))
                .collect(),
        ));
        for s in &self.numeric {
            stats.add_row(Row::new(vec![
                Cell::new(&s.column),
                Cell::new(&s.count.to_string()).style_spec("r"),
                Cell::new(&opt(s.mean)).style_spec("r"),
                Cell::new(&opt(s.std)).style_spec("r"),
                Cell::new(&opt(s.min)).style_spec("r"),
                Cell::new(&opt(s.p25)).style_spec("r"),
                Cell::new(&opt(s.p50)).style_spec("r"),
                Cell::new(&opt(s.p75)).style_spec("r"),
                Cell::new(&opt(s.max)).style_spec("r"),
            ]));
        }

        let mut tops = Table::new();
        tops.set_format(*format::consts::FORMAT_BOX_CHARS);
        tops.set_titles(Row::new(
            ["column", "top", "freq"]
                .iter()
                .map(|h| Cell::new(h).style_spec("b"))
                .collect(),
        ));
        for t in &self.top_values {
            tops.add_row(Row::new(vec![
                Cell::new(&t.column),
                Cell::new(t.value.as_deref().unwrap_or("-")),
                Cell::new(&t.freq.to_string()).style_spec("r"),
            ]));
        }

        let mut out = format!("Cleaned rows: {}\n", self.rows);
        if let Some(p) = &self.pipeline {
            out.push_str(&format!(
                "Rows read: {}, dropped (bad date): {}, duplicates removed: {}\n",
                p.rows_read, p.rows_dropped_bad_date, p.duplicates_removed
            ));
            if !p.defaulted_fields.is_empty() {
                out.push_str(&format!(
                    "Defaulted to 0 (no source column): {}\n",
                    p.defaulted_fields.join(", ")
                ));
            }
        }
        out.push_str("\n--- Descriptive statistics ---\n");
        out.push_str(&stats.to_string());
        out.push_str("\n--- Most frequent values ---\n");
        out.push_str(&tops.to_string());
        out
    }
}

/// JSON when `path` ends in `.json`, the rendered tables otherwise.
pub fn write_report(path: &Path, report: &SummaryReport) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));
    let body = if is_json {
        let mut s = serde_json::to_string_pretty(report).context("serializing report")?;
        s.push('\n');
        s
    } else {
        report.render()
    };
    fs::write(path, body).with_context(|| format!("writing report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn row(day: u32, subway: i64, pct: f64) -> OutputRow {
        OutputRow {
            ride_date: NaiveDate::from_ymd_opt(2021, 6, day).unwrap(),
            station_id: 1,
            daily_ridership: subway,
            raw_text_field: "MTA Aggregate".into(),
            subway_ridership: subway,
            bus_ridership: 0,
            lirr_ridership: 0,
            metro_north_ridership: 0,
            access_a_ride_ridership: 0,
            bridges_tunnels_ridership: 0,
            pre_pandemic_comparison: pct,
        }
    }

    fn numeric<'a>(report: &'a SummaryReport, column: &str) -> &'a NumericSummary {
        report.numeric.iter().find(|s| s.column == column).unwrap()
    }

    #[test]
    fn describes_numeric_columns() {
        let rows = vec![row(1, 10, 1.0), row(2, 20, 2.0), row(3, 30, 3.0), row(4, 40, 4.0)];
        let report = summarize(&rows);
        assert_eq!(report.rows, 4);
        assert_eq!(report.numeric.len(), 9);

        let s = numeric(&report, "subway_ridership");
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(25.0));
        assert_eq!(s.min, Some(10.0));
        assert_eq!(s.p25, Some(17.5));
        assert_eq!(s.p50, Some(25.0));
        assert_eq!(s.p75, Some(32.5));
        assert_eq!(s.max, Some(40.0));
        let std = s.std.unwrap();
        assert!((std - 12.909_944).abs() < 1e-5);
    }

    #[test]
    fn most_frequent_values() {
        let rows = vec![row(1, 10, 5.0), row(2, 30, 5.0), row(3, 30, 7.5), row(4, 10, 7.5)];
        let report = summarize(&rows);
        let top = |c: &str| report.top_values.iter().find(|t| t.column == c).unwrap().clone();

        let subway = top("subway_ridership");
        assert_eq!(subway.value.as_deref(), Some("10"));
        assert_eq!(subway.freq, 2);
        assert_eq!(top("pre_pandemic_comparison").value.as_deref(), Some("5"));
        assert_eq!(top("raw_text_field").freq, 4);
        assert_eq!(top("ride_date").value.as_deref(), Some("2021-06-01"));
    }

    #[test]
    fn empty_table() {
        let report = summarize(&[]);
        let s = numeric(&report, "daily_ridership");
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, None);
        assert_eq!(s.std, None);
        assert_eq!(report.numeric.len(), 9);
        assert!(report.top_values.iter().all(|t| t.value.is_none()));
        assert!(report.render().contains("Cleaned rows: 0"));
    }

    #[test]
    fn writes_text_and_json() -> Result<()> {
        let dir = tempdir()?;
        let report = summarize(&[row(1, 10, 1.0)]).with_pipeline_stats(PipelineStats {
            rows_read: 3,
            rows_dropped_bad_date: 1,
            duplicates_removed: 1,
            rows_written: 1,
            defaulted_fields: vec!["lirr".into()],
        });

        let txt = dir.path().join("summary.txt");
        write_report(&txt, &report)?;
        let text = fs::read_to_string(&txt)?;
        assert!(text.contains("subway_ridership"));
        assert!(text.contains("Defaulted to 0 (no source column): lirr"));

        let json = dir.path().join("summary.json");
        write_report(&json, &report)?;
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json)?)?;
        assert_eq!(value["rows"], 1);
        assert_eq!(value["pipeline"]["rows_read"], 3);
        Ok(())
    }
}
