use anyhow::Result;
use clap::Parser;
use ginicast::{dataset, explore, init_logging, Config};
use std::{path::PathBuf, process::exit};
use tracing::error;

#[derive(Parser)]
#[command(author, version, about = "Distribution and yearly average of the Gini coefficient")]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read this dataset instead of output.dataset
    #[arg(long)]
    dataset: Option<PathBuf>,

    #[arg(long, default_value_t = explore::DEFAULT_BINS)]
    bins: usize,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

fn run(args: &Args) -> Result<()> {
    let cfg = Config::load(args.config.as_deref())?;
    let path = args.dataset.as_ref().unwrap_or(&cfg.output.dataset);
    let panel = dataset::read_gini_panel(path)?;
    let summary = explore::explore(&panel, args.bins);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render());
    }
    Ok(())
}

fn main() {
    init_logging("warn");
    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{:#}", e);
        exit(1);
    }
}
