use anyhow::Result;
use clap::Parser;
use ginicast::{init_logging, pipeline, Config};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about = "Fit one ARIMA(1,1,1) per country on the final dataset")]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the minimum number of observed points per country
    #[arg(long)]
    min_points: Option<usize>,
}

fn run(args: &Args) -> Result<()> {
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(n) = args.min_points {
        cfg.model.min_points = n;
        cfg.validate()?;
    }

    let summary = pipeline::train_models(&cfg)?;
    for (country, reason) in &summary.report.skipped {
        info!(country = %country, reason = %reason, "no model");
    }
    info!(
        trained = summary.report.trained.len(),
        skipped = summary.report.skipped.len(),
        "models written to {}",
        summary.artifact.display()
    );
    Ok(())
}

fn main() {
    init_logging("info");
    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("training failed: {:#}", e);
        exit(1);
    }
}
