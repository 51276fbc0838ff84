// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures that callers need to tell apart from generic I/O or parse errors.
#[derive(Debug, Error)]
pub enum HarmonizeError {
    #[error("input file {path:?} not found")]
    MissingInput { path: PathBuf },

    #[error("schema drift in {source_name}: {}", .mismatches.join("; "))]
    SchemaDrift {
        source_name: String,
        mismatches: Vec<String>,
    },

    #[error("{path:?} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("model artifact format version {found} is not supported (expected {expected})")]
    ArtifactVersion { found: u32, expected: u32 },

    #[error(
        "model artifact was trained on dataset {trained} but the current dataset is {current}; re-run training"
    )]
    StaleArtifact { trained: String, current: String },
}
