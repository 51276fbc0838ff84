// src/load/mod.rs
pub mod pivot;
pub mod records;
pub mod schema;
pub mod utils;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::{fs, io::Cursor, path::Path};
use tracing::{debug, info, warn};

use crate::config::{Encoding, SourceConfig};
use crate::country::{CountryResolver, ResolutionReport};
use crate::error::HarmonizeError;
use pivot::{IndicatorTable, LongRecord};
use records::{GiniRecord, SeriesRecord};
use schema::{GINI_SCHEMA, SERIES_SCHEMA};

#[derive(Debug)]
pub struct RawTable {
    /// Header cells as they appear in the file.
    pub headers: Vec<String>,
    /// Every non-blank row after the header.
    pub rows: Vec<Vec<String>>,
}

/// Read a CSV file into memory: decode it, skip `skip_rows` title records, take the
/// next record as the header and keep the rest as data.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_raw_table<P: AsRef<Path>>(
    path: P,
    encoding: Encoding,
    skip_rows: usize,
) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HarmonizeError::MissingInput {
            path: path.to_path_buf(),
        }
        .into());
    }
    let bytes = fs::read(path).with_context(|| format!("reading {:?}", path))?;
    let text = utils::decode(&bytes, encoding);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {:?} at record {}", path, idx))?;
        if idx < skip_rows {
            continue;
        }
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if headers.is_none() {
            headers = Some(cells);
            continue;
        }
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(cells);
    }

    let headers = headers.ok_or_else(|| HarmonizeError::SchemaDrift {
        source_name: path.display().to_string(),
        mismatches: vec![format!("no header row after skipping {} rows", skip_rows)],
    })?;
    debug!(columns = headers.len(), rows = rows.len(), "read raw table");
    Ok(RawTable { headers, rows })
}

/// One anchor row: the inequality observation for a (country, year).
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorRecord {
    pub country: String,
    pub code: Option<String>,
    pub year: i32,
    pub gini: Option<f64>,
}

/// The inequality table. Rows keep file order; duplicates are left for the final dedupe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorTable {
    pub rows: Vec<AnchorRecord>,
}

/// Per-source counts collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceReport {
    pub label: String,
    pub rows_read: usize,
    pub resolution: ResolutionReport,
    pub bad_year: usize,
    pub missing_value: usize,
    pub empty_indicator: usize,
    /// Distinct (country, year) keys in the loaded table.
    pub keys: usize,
    pub indicators: Vec<String>,
}

/// Load the inequality extract that anchors the merge.
#[tracing::instrument(level = "info", skip(cfg, resolver), fields(path = %cfg.path.display()))]
pub fn load_anchor(
    label: &str,
    cfg: &SourceConfig,
    resolver: &CountryResolver,
) -> Result<(AnchorTable, SourceReport)> {
    let raw = read_raw_table(&cfg.path, cfg.encoding, cfg.skip_rows)?;
    GINI_SCHEMA.validate(label, &raw.headers)?;

    let records: Vec<GiniRecord> = raw.rows.iter().map(|r| GiniRecord::from_row(r)).collect();
    let rows_read = records.len();
    let (records, resolution) = resolver.filter(label, records);

    let mut report = SourceReport {
        label: label.to_string(),
        rows_read,
        resolution,
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let (Some(country), Some(year)) = (rec.country, rec.year) else {
            report.bad_year += 1;
            continue;
        };
        if rec.gini.is_none() {
            report.missing_value += 1;
        }
        rows.push(AnchorRecord {
            country,
            code: rec.code,
            year,
            gini: rec.gini,
        });
    }

    report.keys = rows
        .iter()
        .map(|r| (r.country.as_str(), r.year))
        .collect::<std::collections::HashSet<_>>()
        .len();
    report.indicators = vec![crate::columns::GINI.to_string()];
    if report.bad_year > 0 {
        warn!(source = label, dropped = report.bad_year, "dropped rows without a parsable year");
    }
    info!(source = label, rows = rows.len(), keys = report.keys, "loaded anchor table");

    Ok((AnchorTable { rows }, report))
}

/// Load one UN yearbook table and pivot it to wide form.
#[tracing::instrument(level = "info", skip(cfg, resolver), fields(path = %cfg.path.display()))]
pub fn load_indicator(
    label: &str,
    cfg: &SourceConfig,
    resolver: &CountryResolver,
) -> Result<(IndicatorTable, SourceReport)> {
    let raw = read_raw_table(&cfg.path, cfg.encoding, cfg.skip_rows)?;
    SERIES_SCHEMA.validate(label, &raw.headers)?;

    let records: Vec<SeriesRecord> = raw.rows.iter().map(|r| SeriesRecord::from_row(r)).collect();
    let rows_read = records.len();
    let (records, resolution) = resolver.filter(label, records);

    let mut report = SourceReport {
        label: label.to_string(),
        rows_read,
        resolution,
        ..Default::default()
    };

    let mut long = Vec::with_capacity(records.len());
    for rec in records {
        let (Some(country), Some(year)) = (rec.country, rec.year) else {
            report.bad_year += 1;
            continue;
        };
        let Some(indicator) = rec.series else {
            report.empty_indicator += 1;
            continue;
        };
        if rec.value.is_none() {
            report.missing_value += 1;
        }
        long.push(LongRecord {
            country,
            year,
            indicator,
            value: rec.value,
        });
    }

    let table = IndicatorTable::pivot(long);
    report.keys = table.len();
    report.indicators = table.indicators().map(str::to_string).collect();
    if report.bad_year > 0 || report.empty_indicator > 0 {
        warn!(
            source = label,
            bad_year = report.bad_year,
            empty_indicator = report.empty_indicator,
            "dropped unusable rows"
        );
    }
    info!(
        source = label,
        keys = table.len(),
        indicators = table.num_indicators(),
        "pivoted indicator table"
    );

    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(content: &[u8], skip_rows: usize) -> Result<(NamedTempFile, SourceConfig)> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content)?;
        let cfg = SourceConfig {
            path: tmp.path().to_path_buf(),
            encoding: Encoding::Latin1,
            skip_rows,
        };
        Ok((tmp, cfg))
    }

    #[test]
    fn yearbook_table_pivots_with_mean() -> Result<()> {
        crate::init_test_logging();
        let content = b"T13,GDP and GDP per capita,,,,,\n\
Region/Country/Area,,Year,Series,Value,Footnotes,Source\n\
1,\"Total, all countries or areas\",2010,GDP per capita (US dollars),\"9,541\",,UNSD\n\
152,Chile,2010,GDP per capita (US dollars),\"12,000\",,UNSD\n\
152,Chile,2010,GDP per capita (US dollars),\"13,000\",Revised.,UNSD\n\
152,Chile,2010,GDP real rates of growth (percent),5.8,,UNSD\n\
152,Chile,2015,GDP per capita (US dollars),...,,UNSD\n\
384,C\xf4te d'Ivoire,2010,GDP per capita (US dollars),1200,,UNSD\n\
,,,,,,\n";
        let (_tmp, cfg) = source_file(content, 1)?;

        let (table, report) = load_indicator("gdp", &cfg, &CountryResolver::default())?;

        assert_eq!(report.rows_read, 6);
        assert_eq!(report.resolution.dropped, 2);
        assert_eq!(report.missing_value, 1);
        assert_eq!(table.get("Chile", 2010, "GDP per capita (US dollars)"), Some(12500.0));
        assert_eq!(table.get("Chile", 2010, "GDP real rates of growth (percent)"), Some(5.8));
        assert!(table.row("Chile", 2015).is_none());
        assert_eq!(report.indicators.len(), 2);
        Ok(())
    }

    #[test]
    fn anchor_keeps_rows_with_missing_gini() -> Result<()> {
        let content = b"Entity,Code,Year,Gini coefficient\n\
Chile,CHL,2000,0.55\n\
Chile,CHL,2003,\n\
World,OWID_WRL,2000,0.6\n\
Norway,NOR,abc,0.25\n\
Peru,PER,-2000000000,0.45\n";
        let (_tmp, cfg) = source_file(content, 0)?;

        let (anchor, report) = load_anchor("gini", &cfg, &CountryResolver::default())?;
        assert_eq!(anchor.rows.len(), 2);
        assert_eq!(anchor.rows[1].gini, None);
        assert_eq!(anchor.rows[0].code.as_deref(), Some("CHL"));
        assert_eq!(report.bad_year, 2);
        assert_eq!(report.resolution.unresolved.get("World"), Some(&1));
        Ok(())
    }

    #[test]
    fn off_by_one_skip_is_schema_drift() -> Result<()> {
        let content = b"T13,GDP,,,,,\n\
Region/Country/Area,,Year,Series,Value,Footnotes,Source\n\
152,Chile,2010,GDP per capita (US dollars),100,,UNSD\n";
        let (_tmp, cfg) = source_file(content, 2)?;

        let err = load_indicator("gdp", &cfg, &CountryResolver::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarmonizeError>(),
            Some(HarmonizeError::SchemaDrift { .. })
        ));
        Ok(())
    }

    #[test]
    fn missing_file_is_reported() {
        let cfg = SourceConfig {
            path: "/nonexistent/gini.csv".into(),
            encoding: Encoding::Latin1,
            skip_rows: 0,
        };
        let err = load_anchor("gini", &cfg, &CountryResolver::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarmonizeError>(),
            Some(HarmonizeError::MissingInput { .. })
        ));
    }
}
