// src/load/records.rs

use super::schema::{GINI_SCHEMA, SERIES_SCHEMA};
use super::utils::{non_empty, parse_number, parse_year};
use crate::country::HasCountry;

/// One row of the inequality extract.
#[derive(Debug, Clone, PartialEq)]
pub struct GiniRecord {
    pub country: Option<String>,
    pub code: Option<String>,
    pub year: Option<i32>,
    pub gini: Option<f64>,
}

impl GiniRecord {
    /// Build from a row already validated against `GINI_SCHEMA`.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |field: &str| row.get(GINI_SCHEMA.position(field)).map(String::as_str);
        Self {
            country: cell("country").and_then(non_empty),
            code: cell("code").and_then(non_empty),
            year: cell("year").and_then(parse_year),
            gini: cell("gini").and_then(parse_number),
        }
    }
}

impl HasCountry for GiniRecord {
    fn raw_country(&self) -> Option<&str> {
        self.country.as_deref()
    }
    fn set_country(&mut self, canonical: &str) {
        self.country = Some(canonical.to_string());
    }
}

/// One row of a UN yearbook long-format table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub code: Option<String>,
    pub country: Option<String>,
    pub year: Option<i32>,
    pub series: Option<String>,
    pub value: Option<f64>,
    pub footnotes: Option<String>,
    pub source: Option<String>,
}

impl SeriesRecord {
    /// Build from a row already validated against `SERIES_SCHEMA`.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |field: &str| row.get(SERIES_SCHEMA.position(field)).map(String::as_str);
        Self {
            code: cell("code").and_then(non_empty),
            country: cell("country").and_then(non_empty),
            year: cell("year").and_then(parse_year),
            series: cell("series").and_then(non_empty),
            value: cell("value").and_then(parse_number),
            footnotes: cell("footnotes").and_then(non_empty),
            source: cell("source").and_then(non_empty),
        }
    }
}

impl HasCountry for SeriesRecord {
    fn raw_country(&self) -> Option<&str> {
        self.country.as_deref()
    }
    fn set_country(&mut self, canonical: &str) {
        self.country = Some(canonical.to_string());
    }
}
