use anyhow::{Context, Result};
use clap::Parser;
use ridership::{
    config::PipelineConfig,
    output::write_output,
    process::{load_csv, run_pipeline},
    report::{summarize, write_report},
};
use std::{path::PathBuf, time::Instant};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Clean the MTA daily ridership table into the staging output schema"
)]
struct Args {
    /// YAML file with pipeline settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Raw ridership CSV
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Cleaned table; `.parquet` writes Parquet, anything else CSV
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Summary report; `.json` writes JSON, anything else text tables
    #[arg(short, long)]
    report: Option<PathBuf>,
}

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let start = Instant::now();

    // ─── 2) resolve settings ─────────────────────────────────────────
    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    cfg.input = args.input.or(cfg.input);
    cfg.output = args.output.or(cfg.output);
    cfg.report = args.report.or(cfg.report);

    let input = cfg
        .input
        .clone()
        .context("no input path given (use --input or `input:` in the config)")?;
    let output = cfg
        .output
        .clone()
        .context("no output path given (use --output or `output:` in the config)")?;

    // ─── 3) load + clean ─────────────────────────────────────────────
    let table = load_csv(&input)?;
    let result = run_pipeline(&table, &cfg)?;

    // ─── 4) write outputs ────────────────────────────────────────────
    write_output(&output, &result.rows)?;
    info!(path = %output.display(), rows = result.rows.len(), "cleaned table saved");

    if let Some(report_path) = &cfg.report {
        let report = summarize(&result.rows).with_pipeline_stats(result.stats.clone());
        write_report(report_path, &report)?;
        info!(path = %report_path.display(), "summary report saved");
    }

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
