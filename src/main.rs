use anyhow::Result;
use clap::Parser;
use ginicast::{init_logging, pipeline, Config};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Harmonize inequality and development indicators into one country-year dataset"
)]
struct Args {
    /// YAML config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn run(args: &Args) -> Result<()> {
    let cfg = Config::load(args.config.as_deref())?;
    let summary = pipeline::run(&cfg)?;
    info!(
        rows = summary.policy.rows_out,
        columns = summary.columns.len(),
        dropped_columns = summary.policy.dropped_columns.len(),
        sha256 = %summary.dataset_sha256,
        "dataset written to {}",
        summary.dataset.display()
    );
    Ok(())
}

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    init_logging("info");
    info!("startup");

    // ─── 2) harmonize ────────────────────────────────────────────────
    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("harmonization failed: {:#}", e);
        exit(1);
    }
}
