// src/pipeline/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::config::Config;
use crate::country::CountryResolver;
use crate::dataset;
use crate::history::{RunRow, TableHistory};
use crate::load::{self, SourceReport};
use crate::merge;
use crate::model::{train::TrainingReport, ModelArtifact};
use crate::policy::{self, PolicyReport};

/// What one harmonization run did, written next to the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub started_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub anchor_rows: usize,
    pub merged_rows: usize,
    pub policy: PolicyReport,
    pub columns: Vec<String>,
    pub dataset: PathBuf,
    pub dataset_sha256: String,
    pub parquet: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub dataset_sha256: String,
    pub artifact: PathBuf,
    pub report: TrainingReport,
}

fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let tmp = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, value)?;
        w.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;
    Ok(())
}

fn record_run(cfg: &Config, row: RunRow) -> Result<()> {
    let history = TableHistory::<RunRow>::new_runs(&cfg.output.history_dir)?;
    history.add(&row)?;
    history.vacuum()
}

/// Load, resolve, merge, clean and persist the final dataset.
#[tracing::instrument(level = "info", skip(cfg))]
pub fn run(cfg: &Config) -> Result<PipelineSummary> {
    let started_at = Utc::now();
    let resolver = CountryResolver::new(cfg.resolver.accept_aliases);

    // 1) anchor + indicator sources
    let (anchor, anchor_report) = load::load_anchor("gini", &cfg.sources.gini, &resolver)
        .context("loading inequality source")?;
    let anchor_rows = anchor.rows.len();
    let mut sources = vec![anchor_report];
    let mut tables = Vec::new();
    for (label, src) in cfg.sources.indicator_sources() {
        let (table, report) = load::load_indicator(label, src, &resolver)
            .with_context(|| format!("loading {} source", label))?;
        tables.push((label.to_string(), table));
        sources.push(report);
    }

    // 2) left joins on the anchor
    let merged = merge::merge_all(anchor, &tables);
    let merged_rows = merged.len();

    // 3) missing-data policy
    let (table, policy) = policy::apply(merged, &cfg.policy);
    if table.is_empty() {
        warn!("final dataset is empty");
    }

    // 4) persist
    let out = &cfg.output;
    dataset::write_csv(&table, &out.dataset)?;
    if let Some(pq) = &out.parquet {
        dataset::write_parquet(&table, pq)?;
    }
    let dataset_sha256 = dataset::sha256_file(&out.dataset)?;

    let summary = PipelineSummary {
        started_at,
        sources,
        anchor_rows,
        merged_rows,
        policy,
        columns: dataset::header(&table),
        dataset: out.dataset.clone(),
        dataset_sha256,
        parquet: out.parquet.clone(),
    };
    write_json(&summary, &out.report).context("writing harmonize report")?;

    // 5) run ledger
    record_run(
        cfg,
        RunRow::finished_now(
            "harmonize",
            out.dataset.display().to_string(),
            summary.dataset_sha256.clone(),
            table.len() as u64,
            started_at,
        ),
    )?;

    info!(
        rows = table.len(),
        columns = summary.columns.len(),
        path = %out.dataset.display(),
        "harmonization complete"
    );
    Ok(summary)
}

/// Fit per-country models on the persisted dataset and write the artifact.
#[tracing::instrument(level = "info", skip(cfg))]
pub fn train_models(cfg: &Config) -> Result<TrainingSummary> {
    let started_at = Utc::now();
    let out = &cfg.output;

    let dataset_sha256 = dataset::sha256_file(&out.dataset)
        .with_context(|| format!("checksumming {:?}", out.dataset))?;
    let panel = dataset::read_gini_panel(&out.dataset)?;

    let (models, report) = crate::model::train::train(&panel, &cfg.model);
    let artifact = ModelArtifact::new(dataset_sha256.clone(), models);
    artifact.write(&out.models)?;

    record_run(
        cfg,
        RunRow::finished_now(
            "train",
            out.models.display().to_string(),
            dataset_sha256.clone(),
            artifact.models.len() as u64,
            started_at,
        ),
    )?;

    Ok(TrainingSummary {
        dataset_sha256,
        artifact: out.models.clone(),
        report,
    })
}
