use anyhow::{Context, Result};
use clap::Parser;
use ridership::{
    output::read_output,
    report::{summarize, write_report},
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Print descriptive statistics for a cleaned ridership table.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Cleaned table written by `ridership` (CSV or Parquet)
    table: PathBuf,
    /// Also save the report here (`.json` for JSON)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr) // Log to stderr
        .init();

    let args = Args::parse();
    tracing::info!(path = %args.table.display(), "summarizing cleaned table");

    let rows = read_output(&args.table)
        .with_context(|| format!("reading cleaned table {}", args.table.display()))?;
    if rows.is_empty() {
        tracing::warn!("cleaned table has no rows");
    }

    let report = summarize(&rows);
    println!("{}", report.render());

    if let Some(out) = &args.out {
        write_report(out, &report)?;
        tracing::info!(path = %out.display(), "report saved");
    }
    Ok(())
}
