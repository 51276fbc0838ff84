// src/history/mod.rs
pub mod runs;

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::Schema as ArrowSchema,
    record_batch::RecordBatch,
};
use chrono::{NaiveDate, Utc};
use glob::glob;
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::BufWriter,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::debug;

pub use runs::RunRow;

/// A row type stored in a [`TableHistory`].
pub trait HistoryRow: Sized {
    /// Column index of the unique key in the schema. Must be a Utf8 column.
    const KEY_COLUMN: usize;

    /// Partition date for the hive-style `date=YYYYMMDD` directory.
    fn partition_date(&self) -> NaiveDate;

    fn schema() -> ArrowSchema;

    /// Single-row column arrays matching `schema()`.
    fn to_arrays(&self) -> Vec<ArrayRef>;

    /// Dedupe key; also used in the file name, so keep it path-safe.
    fn unique_key(&self) -> String;

    /// Decode one row of a stored batch.
    fn from_batch(batch: &RecordBatch, row: usize) -> Option<Self>;

    /// Read the key of a stored row back out.
    fn extract_key(batch: &RecordBatch, row: usize) -> Option<String> {
        batch
            .column(Self::KEY_COLUMN)
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string())
    }
}

/// Append-only, date-partitioned Parquet table with an in-memory key index.
pub struct TableHistory<R: HistoryRow> {
    table_dir: PathBuf,
    schema: Arc<ArrowSchema>,
    seen: Mutex<HashSet<String>>,
    _marker: PhantomData<R>,
}

fn parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(glob(&format!("{}/*.parquet", dir.display()))?
        .filter_map(Result::ok)
        .collect())
}

fn partitions(table_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for part in fs::read_dir(table_dir)
        .with_context(|| format!("listing `{}`", table_dir.display()))?
    {
        let part = part?;
        if part.file_type()?.is_dir() {
            dirs.push(part.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(1024)
        .build()?;
    reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("reading `{}`", path.display()))
}

impl<R: HistoryRow> TableHistory<R> {
    /// Open `<base_dir>/<table>` and index the keys already stored there.
    pub fn new(base_dir: impl Into<PathBuf>, table: &str) -> Result<Self> {
        let table_dir = base_dir.into().join(table);
        fs::create_dir_all(&table_dir)
            .with_context(|| format!("could not create `{}`", table_dir.display()))?;

        let mut seen = HashSet::new();
        for dir in partitions(&table_dir)? {
            for path in parquet_files(&dir)? {
                for batch in read_batches(&path)? {
                    seen.extend((0..batch.num_rows()).filter_map(|i| R::extract_key(&batch, i)));
                }
            }
        }
        debug!(table, rows = seen.len(), "opened history table");

        Ok(Self {
            table_dir,
            schema: Arc::new(R::schema()),
            seen: Mutex::new(seen),
            _marker: PhantomData,
        })
    }

    /// Append one row as its own file. Returns false when the key is already stored.
    pub fn add(&self, row: &R) -> Result<bool> {
        let key = row.unique_key();
        {
            let mut seen = self
                .seen
                .lock()
                .map_err(|_| anyhow!("history index lock poisoned"))?;
            if !seen.insert(key.clone()) {
                return Ok(false);
            }
        }

        let partition = format!("date={}", row.partition_date().format("%Y%m%d"));
        let dir = self.table_dir.join(partition);
        fs::create_dir_all(&dir)?;

        let ts = Utc::now().timestamp_micros();
        let fname = format!("{}---{}.parquet", key, ts);
        let tmp = dir.join(format!("{}.tmp", fname));
        let final_path = dir.join(&fname);

        let batch = RecordBatch::try_new(self.schema.clone(), row.to_arrays())
            .context("building history batch")?;
        let file = File::create(&tmp).with_context(|| format!("creating `{}`", tmp.display()))?;
        let mut writer = ArrowWriter::try_new(BufWriter::new(file), self.schema.clone(), None)?;
        writer.write(&batch)?;
        writer.close()?;
        fs::rename(&tmp, &final_path)?;
        debug!(key = %key, path = %final_path.display(), "appended history row");
        Ok(true)
    }

    /// Whether a row with this key is stored.
    pub fn get(&self, key: &str) -> bool {
        self.seen
            .lock()
            .map(|seen| seen.contains(key))
            .unwrap_or(false)
    }

    /// Every stored row, partitions in date order.
    pub fn rows(&self) -> Result<Vec<R>> {
        let mut out = Vec::new();
        for dir in partitions(&self.table_dir)? {
            for path in parquet_files(&dir)? {
                for batch in read_batches(&path)? {
                    out.extend((0..batch.num_rows()).filter_map(|i| R::from_batch(&batch, i)));
                }
            }
        }
        Ok(out)
    }

    /// Rewrite each partition as a single `consolidated.parquet`.
    pub fn vacuum(&self) -> Result<()> {
        for dir in partitions(&self.table_dir)? {
            let files = parquet_files(&dir)?;
            if files.len() < 2 {
                continue;
            }

            let tmp = dir.join("consolidated.parquet.tmp");
            let file = File::create(&tmp)?;
            let props = WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build();
            let mut writer =
                ArrowWriter::try_new(BufWriter::new(file), self.schema.clone(), Some(props))?;
            for p in &files {
                for batch in read_batches(p)? {
                    writer.write(&batch)?;
                }
            }
            writer.close()?;
            let cons = dir.join("consolidated.parquet");
            fs::rename(&tmp, &cons)?;

            for p in files {
                if p.file_name().and_then(|n| n.to_str()) != Some("consolidated.parquet") {
                    fs::remove_file(&p)?;
                }
            }
            debug!(partition = %dir.display(), "vacuumed partition");
        }
        Ok(())
    }
}
