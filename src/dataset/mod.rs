// src/dataset/mod.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use csv::{ReaderBuilder, WriterBuilder};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use sha2::{Digest, Sha256};
use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

use crate::columns;
use crate::error::HarmonizeError;
use crate::load::utils::{clean_header, non_empty, parse_number, parse_year};
use crate::merge::HarmonizedTable;

/// Column names of the persisted table, in file order.
pub fn header(table: &HarmonizedTable) -> Vec<String> {
    let mut cols = vec![columns::COUNTRY.to_string()];
    if table.has_code {
        cols.push(columns::COUNTRY_CODE.to_string());
    }
    cols.push(columns::YEAR.to_string());
    cols.push(columns::GINI.to_string());
    cols.extend(table.columns.iter().cloned());
    cols
}

fn fmt_num(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Sibling temp path used for write-then-rename.
fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".into());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write the final dataset as CSV, atomically.
#[tracing::instrument(level = "info", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn write_csv<P: AsRef<Path>>(table: &HarmonizedTable, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let tmp = tmp_path(path);

    {
        let mut w = WriterBuilder::new()
            .from_path(&tmp)
            .with_context(|| format!("creating {:?}", tmp))?;
        w.write_record(header(table))?;
        for r in &table.rows {
            let mut rec = Vec::with_capacity(4 + r.values.len());
            rec.push(r.country.clone());
            if table.has_code {
                rec.push(r.code.clone().unwrap_or_default());
            }
            rec.push(r.year.to_string());
            rec.push(fmt_num(r.gini));
            rec.extend(r.values.iter().map(|v| fmt_num(*v)));
            w.write_record(&rec)?;
        }
        w.flush().context("flushing dataset CSV")?;
    }

    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;
    info!(rows = table.rows.len(), columns = header(table).len(), "wrote dataset CSV");
    Ok(())
}

/// Arrow schema of the persisted table.
pub fn arrow_schema(table: &HarmonizedTable) -> Schema {
    let mut fields = vec![Field::new(columns::COUNTRY, DataType::Utf8, false)];
    if table.has_code {
        fields.push(Field::new(columns::COUNTRY_CODE, DataType::Utf8, true));
    }
    fields.push(Field::new(columns::YEAR, DataType::Int32, false));
    fields.push(Field::new(columns::GINI, DataType::Float64, true));
    fields.extend(
        table
            .columns
            .iter()
            .map(|c| Field::new(c, DataType::Float64, true)),
    );
    Schema::new(fields)
}

/// Write the same table as a single Parquet file.
#[tracing::instrument(level = "info", skip(table, path), fields(path = %path.as_ref().display()))]
pub fn write_parquet<P: AsRef<Path>>(table: &HarmonizedTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let schema = Arc::new(arrow_schema(table));

    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        table.rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
    ))];
    if table.has_code {
        arrays.push(Arc::new(StringArray::from(
            table.rows.iter().map(|r| r.code.as_deref()).collect::<Vec<_>>(),
        )));
    }
    arrays.push(Arc::new(Int32Array::from(
        table.rows.iter().map(|r| r.year).collect::<Vec<_>>(),
    )));
    arrays.push(Arc::new(Float64Array::from(
        table.rows.iter().map(|r| r.gini).collect::<Vec<_>>(),
    )));
    for i in 0..table.columns.len() {
        arrays.push(Arc::new(Float64Array::from(
            table.rows.iter().map(|r| r.values[i]).collect::<Vec<_>>(),
        )));
    }

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building dataset batch")?;
    let tmp = tmp_path(path);
    let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema, Some(props))
        .context("creating Arrow writer for dataset")?;
    writer.write(&batch).context("writing dataset batch")?;
    writer.close().context("closing dataset writer")?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;
    info!(rows = batch.num_rows(), "wrote dataset Parquet");
    Ok(())
}

/// Hex SHA-256 of a file's bytes.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {:?} for checksum", path))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Per-country Gini series read back from the final dataset, sorted by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiniPanel {
    series: BTreeMap<String, Vec<(i32, f64)>>,
}

impl GiniPanel {
    pub fn from_observations<I>(obs: I) -> Self
    where
        I: IntoIterator<Item = (String, i32, f64)>,
    {
        let mut seen = HashSet::new();
        let mut series: BTreeMap<String, Vec<(i32, f64)>> = BTreeMap::new();
        for (country, year, gini) in obs {
            // first occurrence of a (country, year) wins
            if !seen.insert((country.clone(), year)) {
                continue;
            }
            series.entry(country).or_default().push((year, gini));
        }
        for points in series.values_mut() {
            points.sort_by_key(|(y, _)| *y);
        }
        Self { series }
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn series(&self, country: &str) -> Option<&[(i32, f64)]> {
        self.series.get(country).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(i32, f64)])> {
        self.series.iter().map(|(c, s)| (c.as_str(), s.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn observations(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

/// Read Country / Year / Gini Coefficient from the final dataset, by column name.
/// Rows missing any of the three are dropped.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_gini_panel<P: AsRef<Path>>(path: P) -> Result<GiniPanel> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HarmonizeError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {:?}", path))?;
    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {:?}", path))?
        .iter()
        .map(clean_header)
        .collect();
    let position = |name: &str| -> Result<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            HarmonizeError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            }
            .into()
        })
    };
    let (ci, yi, gi) = (
        position(columns::COUNTRY)?,
        position(columns::YEAR)?,
        position(columns::GINI)?,
    );

    let mut obs = Vec::new();
    let mut skipped = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let rec = result.with_context(|| format!("CSV parse error in {:?} at record {}", path, idx))?;
        let country = rec.get(ci).and_then(non_empty);
        let year = rec.get(yi).and_then(parse_year);
        let gini = rec.get(gi).and_then(parse_number);
        match (country, year, gini) {
            (Some(c), Some(y), Some(g)) => obs.push((c, y, g)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "dropped dataset rows missing country, year or gini");
    }

    let panel = GiniPanel::from_observations(obs);
    info!(
        countries = panel.len(),
        observations = panel.observations(),
        "loaded gini panel"
    );
    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::HarmonizedRecord;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    fn sample() -> HarmonizedTable {
        HarmonizedTable {
            has_code: true,
            columns: vec!["GDP per capita (US dollars)".into()],
            rows: vec![
                HarmonizedRecord {
                    country: "Chile".into(),
                    code: Some("CHL".into()),
                    year: 2001,
                    gini: Some(0.52),
                    values: vec![Some(12000.5)],
                },
                HarmonizedRecord {
                    country: "Chile".into(),
                    code: Some("CHL".into()),
                    year: 2000,
                    gini: Some(0.55),
                    values: vec![Some(11000.0)],
                },
                HarmonizedRecord {
                    country: "Cote d'Ivoire".into(),
                    code: None,
                    year: 2000,
                    gini: Some(0.41),
                    values: vec![None],
                },
            ],
        }
    }

    #[test]
    fn csv_round_trips_through_named_columns() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("final_dataset.csv");
        write_csv(&sample(), &path)?;

        let text = fs::read_to_string(&path)?;
        let first = text.lines().next().unwrap();
        assert_eq!(
            first,
            "Country,Country Code,Year,Gini Coefficient,GDP per capita (US dollars)"
        );

        let panel = read_gini_panel(&path)?;
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.series("Chile"), Some(&[(2000, 0.55), (2001, 0.52)][..]));
        assert_eq!(panel.series("Cote d'Ivoire"), Some(&[(2000, 0.41)][..]));
        Ok(())
    }

    #[test]
    fn reader_tolerates_dropped_code_column_and_reordering() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("d.csv");
        fs::write(
            &path,
            "Year,Gini Coefficient,Country,Extra\n2000,0.3,Norway,1\n2000,0.9,Norway,2\n,0.2,Norway,3\n2001,,Norway,4\n",
        )?;
        let panel = read_gini_panel(&path)?;
        assert_eq!(panel.series("Norway"), Some(&[(2000, 0.3)][..]));
        Ok(())
    }

    #[test]
    fn reader_rejects_missing_named_column() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("d.csv");
        fs::write(&path, "T,T.1,T.2,T.3\nChile,CHL,2000,0.5\n")?;
        let err = read_gini_panel(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarmonizeError>(),
            Some(HarmonizeError::MissingColumn { column, .. }) if column == "Country"
        ));
        Ok(())
    }

    #[test]
    fn parquet_copy_has_all_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("final_dataset.parquet");
        write_parquet(&sample(), &path)?;

        let reader = SerializedFileReader::new(File::open(&path)?)?;
        assert_eq!(reader.metadata().file_metadata().num_rows(), 3);
        assert_eq!(reader.metadata().file_metadata().schema_descr().num_columns(), 5);
        Ok(())
    }

    #[test]
    fn checksum_changes_with_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.csv");
        fs::write(&path, "abc")?;
        let a = sha256_file(&path)?;
        assert_eq!(
            a,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        fs::write(&path, "abd")?;
        assert_ne!(sha256_file(&path)?, a);
        Ok(())
    }
}
