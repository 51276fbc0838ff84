use anyhow::{bail, Result};
use clap::Parser;
use ginicast::{dashboard::Dashboard, init_logging, Config};
use std::{path::PathBuf, process::exit};
use tracing::error;

#[derive(Parser)]
#[command(author, version, about = "Gini coefficient forecasts per country")]
struct Args {
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Country to show (a name from --list)
    #[arg(long)]
    country: Option<String>,

    /// Print the countries that have a model
    #[arg(long)]
    list: bool,

    /// Forecast horizon; defaults to model.target_year
    #[arg(long)]
    target_year: Option<i32>,

    /// Serve models trained on a different dataset file, with a warning
    #[arg(long)]
    allow_stale: bool,
}

fn run(args: &Args) -> Result<()> {
    let cfg = Config::load(args.config.as_deref())?;
    let dash = Dashboard::open(&cfg.output.dataset, &cfg.output.models, args.allow_stale)?;

    let countries = dash.countries();
    if args.list {
        for c in &countries {
            println!("{}", c);
        }
        return Ok(());
    }

    // no selection: first entry, as the selector would show it
    let country = match (&args.country, countries.first()) {
        (Some(c), _) => c.as_str(),
        (None, Some(c)) => *c,
        (None, None) => bail!("the model artifact holds no countries"),
    };
    let target = args.target_year.unwrap_or(cfg.model.target_year);

    print!("{}", dash.view(country, target).render());
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
