// src/model/artifact.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

use super::Arima;
use crate::error::HarmonizeError;

pub const FORMAT_VERSION: u32 = 1;

/// One country's fitted model plus the span it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryModel {
    pub first_year: i32,
    pub last_year: i32,
    /// Observed (not interpolated) points used for the fit.
    pub observations: usize,
    pub arima: Arima,
}

/// Persisted {country → model} mapping, tied to the dataset it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub order: (usize, usize, usize),
    pub dataset_sha256: String,
    pub trained_at: DateTime<Utc>,
    pub models: BTreeMap<String, CountryModel>,
}

impl ModelArtifact {
    pub fn new(dataset_sha256: String, models: BTreeMap<String, CountryModel>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            order: super::ORDER,
            dataset_sha256,
            trained_at: Utc::now(),
            models,
        }
    }

    /// Country names with a model, sorted.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn get(&self, country: &str) -> Option<&CountryModel> {
        self.models.get(country)
    }

    /// Write as pretty JSON via a temp file and rename.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
        }
        let tmp = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
            let mut w = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut w, self).context("serializing model artifact")?;
            w.flush()?;
        }
        fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;
        info!(path = %path.display(), models = self.models.len(), "wrote model artifact");
        Ok(())
    }

    /// Load and check the format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarmonizeError::MissingInput {
                path: path.to_path_buf(),
            }
            .into());
        }
        let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing model artifact {:?}", path))?;
        if artifact.format_version != FORMAT_VERSION {
            return Err(HarmonizeError::ArtifactVersion {
                found: artifact.format_version,
                expected: FORMAT_VERSION,
            }
            .into());
        }
        debug!(path = %path.display(), models = artifact.models.len(), "loaded model artifact");
        Ok(artifact)
    }

    /// Err when the artifact was trained on a different dataset file.
    pub fn check_fresh(&self, current_sha256: &str) -> Result<(), HarmonizeError> {
        if self.dataset_sha256 == current_sha256 {
            Ok(())
        } else {
            Err(HarmonizeError::StaleArtifact {
                trained: self.dataset_sha256.clone(),
                current: current_sha256.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Predictor;
    use tempfile::tempdir;

    fn artifact() -> ModelArtifact {
        let mut arima = Arima::new(1, 1, 1).unwrap();
        arima.fit(&[0.50, 0.49, 0.47, 0.48, 0.46, 0.45]).unwrap();
        let mut models = BTreeMap::new();
        models.insert(
            "Chile".to_string(),
            CountryModel {
                first_year: 2000,
                last_year: 2005,
                observations: 6,
                arima,
            },
        );
        ModelArtifact::new("abc123".into(), models)
    }

    #[test]
    fn json_round_trip_preserves_forecasts() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gini_models_arima.json");
        let a = artifact();
        a.write(&path)?;

        let b = ModelArtifact::load(&path)?;
        assert_eq!(b.countries().collect::<Vec<_>>(), vec!["Chile"]);
        let before = a.get("Chile").unwrap().arima.predict(5)?;
        let after = b.get("Chile").unwrap().arima.predict(5)?;
        for (x, y) in before.iter().zip(&after) {
            assert!((x - y).abs() < 1e-12);
        }
        assert!(!dir.path().join("gini_models_arima.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn checksum_mismatch_is_stale() {
        let a = artifact();
        assert!(a.check_fresh("abc123").is_ok());
        assert!(matches!(
            a.check_fresh("def456"),
            Err(HarmonizeError::StaleArtifact { .. })
        ));
    }

    #[test]
    fn unknown_format_version_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("m.json");
        let mut a = artifact();
        a.format_version = 99;
        a.write(&path)?;

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarmonizeError>(),
            Some(HarmonizeError::ArtifactVersion { found: 99, expected: 1 })
        ));
        Ok(())
    }
}
