// src/config/mod.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::HarmonizeError;

/// Text encoding of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    #[serde(default = "default_encoding")]
    pub encoding: Encoding,
    /// Title lines preceding the header row.
    #[serde(default)]
    pub skip_rows: usize,
}

fn default_encoding() -> Encoding {
    Encoding::Latin1
}

impl SourceConfig {
    fn new(path: &str, skip_rows: usize) -> Self {
        Self {
            path: PathBuf::from(path),
            encoding: Encoding::Latin1,
            skip_rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub gini: SourceConfig,
    pub gdp_per_capita: SourceConfig,
    pub health_expenditure: SourceConfig,
    pub enrollment: SourceConfig,
    pub labour_force: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            gini: SourceConfig::new("Data/Gini Index/economic-inequality-gini-index.csv", 0),
            gdp_per_capita: SourceConfig::new(
                "Data/GDP per Capita/SYB66_230_202310_GDP and GDP Per Capita.csv",
                1,
            ),
            health_expenditure: SourceConfig::new(
                "Data/Expenditure on Health/SYB66_325_202310_Expenditure on health.csv",
                1,
            ),
            enrollment: SourceConfig::new(
                "Data/Enrollment in primary, lower secondary and upper secondary education levels/SYB66_309_202310_Education.csv",
                1,
            ),
            labour_force: SourceConfig::new(
                "Data/Labor Force and Unemployment/SYB66_329_202310_Labour Force and Unemployment.csv",
                1,
            ),
        }
    }
}

impl SourcesConfig {
    /// The long-format sources in join order, with their labels.
    pub fn indicator_sources(&self) -> [(&'static str, &SourceConfig); 4] {
        [
            ("gdp_per_capita", &self.gdp_per_capita),
            ("health_expenditure", &self.health_expenditure),
            ("enrollment", &self.enrollment),
            ("labour_force", &self.labour_force),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dataset: PathBuf,
    /// Optional Parquet copy of the final dataset.
    pub parquet: Option<PathBuf>,
    pub report: PathBuf,
    pub models: PathBuf,
    pub history_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("final_dataset.csv"),
            parquet: None,
            report: PathBuf::from("harmonize_report.json"),
            models: PathBuf::from("gini_models_arima.json"),
            history_dir: PathBuf::from("history"),
        }
    }
}

/// How a column sitting exactly on the sparsity threshold is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdBoundary {
    /// Drop when `missing >= threshold`.
    DropAtThreshold,
    /// Drop only when `missing > threshold`.
    KeepAtThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub max_missing_fraction: f64,
    pub boundary: ThresholdBoundary,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_missing_fraction: 0.5,
            boundary: ThresholdBoundary::DropAtThreshold,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Also admit registered aliases ("Viet Nam", "Russian Federation", ...).
    pub accept_aliases: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub min_points: usize,
    pub target_year: i32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            min_points: 5,
            target_year: 2030,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub policy: PolicyConfig,
    pub resolver: ResolverConfig,
    pub model: ModelConfig,
}

impl Config {
    /// Read a YAML config, or fall back to the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            None => Self::default(),
            Some(p) => {
                if !p.exists() {
                    return Err(HarmonizeError::MissingInput {
                        path: p.to_path_buf(),
                    }
                    .into());
                }
                let text =
                    fs::read_to_string(p).with_context(|| format!("reading config {:?}", p))?;
                serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", p))?
            }
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let f = self.policy.max_missing_fraction;
        if !(f > 0.0 && f <= 1.0) {
            bail!("policy.max_missing_fraction must be in (0, 1], got {}", f);
        }
        if self.model.min_points < 5 {
            bail!(
                "model.min_points must be at least 5 for ARIMA(1,1,1), got {}",
                self.model.min_points
            );
        }
        Ok(())
    }
}
