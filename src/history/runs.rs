// src/history/runs.rs

use anyhow::Result;
use arrow::{
    array::{Array, ArrayRef, StringArray, TimestampMicrosecondArray, UInt64Array},
    datatypes::{DataType as ArrowDataType, Field, Schema as ArrowSchema, TimeUnit},
    record_batch::RecordBatch,
};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use std::{path::PathBuf, sync::Arc};

use super::{HistoryRow, TableHistory};

/// One pipeline or training run and the artifact it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub run_key: String,
    /// `harmonize` or `train`.
    pub stage: String,
    pub artifact: String,
    pub sha256: String,
    pub rows: u64,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

impl RunRow {
    /// A run that finishes now. Timestamps are kept at the stored microsecond precision.
    pub fn finished_now(
        stage: &str,
        artifact: impl Into<String>,
        sha256: impl Into<String>,
        rows: u64,
        started: DateTime<Utc>,
    ) -> Self {
        let started = started.trunc_subsecs(6);
        Self {
            run_key: format!("{}-{}", stage, started.format("%Y%m%dT%H%M%S%6f")),
            stage: stage.to_string(),
            artifact: artifact.into(),
            sha256: sha256.into(),
            rows,
            started,
            finished: Utc::now().trunc_subsecs(6),
        }
    }
}

fn micros(batch: &RecordBatch, col: usize, row: usize) -> Option<DateTime<Utc>> {
    let arr = batch
        .column(col)
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()?;
    DateTime::from_timestamp_micros(arr.value(row))
}

fn utf8(batch: &RecordBatch, col: usize, row: usize) -> Option<String> {
    let arr = batch.column(col).as_any().downcast_ref::<StringArray>()?;
    (!arr.is_null(row)).then(|| arr.value(row).to_string())
}

impl HistoryRow for RunRow {
    const KEY_COLUMN: usize = 0;

    fn partition_date(&self) -> NaiveDate {
        self.finished.date_naive()
    }

    fn schema() -> ArrowSchema {
        ArrowSchema::new(vec![
            Field::new("run_key", ArrowDataType::Utf8, false),
            Field::new("stage", ArrowDataType::Utf8, false),
            Field::new("artifact", ArrowDataType::Utf8, false),
            Field::new("sha256", ArrowDataType::Utf8, false),
            Field::new("rows", ArrowDataType::UInt64, false),
            Field::new(
                "started",
                ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            ),
            Field::new(
                "finished",
                ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
                false,
            ),
        ])
    }

    fn to_arrays(&self) -> Vec<ArrayRef> {
        vec![
            Arc::new(StringArray::from(vec![self.run_key.clone()])),
            Arc::new(StringArray::from(vec![self.stage.clone()])),
            Arc::new(StringArray::from(vec![self.artifact.clone()])),
            Arc::new(StringArray::from(vec![self.sha256.clone()])),
            Arc::new(UInt64Array::from(vec![self.rows])),
            Arc::new(TimestampMicrosecondArray::from(vec![self.started.timestamp_micros()])),
            Arc::new(TimestampMicrosecondArray::from(vec![self.finished.timestamp_micros()])),
        ]
    }

    fn unique_key(&self) -> String {
        self.run_key.clone()
    }

    fn from_batch(batch: &RecordBatch, row: usize) -> Option<Self> {
        let rows = batch.column(4).as_any().downcast_ref::<UInt64Array>()?;
        Some(Self {
            run_key: utf8(batch, 0, row)?,
            stage: utf8(batch, 1, row)?,
            artifact: utf8(batch, 2, row)?,
            sha256: utf8(batch, 3, row)?,
            rows: rows.value(row),
            started: micros(batch, 5, row)?,
            finished: micros(batch, 6, row)?,
        })
    }
}

impl TableHistory<RunRow> {
    pub fn new_runs(base: impl Into<PathBuf>) -> Result<Self> {
        TableHistory::new(base, "runs")
    }
}
