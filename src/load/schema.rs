// src/load/schema.rs

use once_cell::sync::Lazy;
use regex::Regex;

use super::utils::clean_header;
use crate::error::HarmonizeError;

/// One expected column: the field it feeds and the header spellings accepted for it.
pub struct ColumnRule {
    pub field: &'static str,
    pub header: Regex,
}

impl ColumnRule {
    fn new(field: &'static str, pattern: &str) -> Self {
        Self {
            field,
            // patterns are compile-time literals below
            header: Regex::new(pattern).expect("static header pattern"),
        }
    }
}

/// The declared shape of a source file's header row.
pub struct SourceSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnRule>,
}

/// Our World in Data inequality extract: Entity, Code, Year, Gini coefficient.
pub static GINI_SCHEMA: Lazy<SourceSchema> = Lazy::new(|| SourceSchema {
    name: "gini",
    columns: vec![
        ColumnRule::new("country", r"(?i)^(entity|country)$"),
        ColumnRule::new("code", r"(?i)^(code|country code)$"),
        ColumnRule::new("year", r"(?i)^year$"),
        ColumnRule::new("gini", r"(?i)^gini"),
    ],
});

/// UN Statistical Yearbook table layout. The country name sits under a blank header.
pub static SERIES_SCHEMA: Lazy<SourceSchema> = Lazy::new(|| SourceSchema {
    name: "un_yearbook_series",
    columns: vec![
        ColumnRule::new("code", r"(?i)^(region/country/area|code)$"),
        ColumnRule::new("country", r"(?i)^(country)?$"),
        ColumnRule::new("year", r"(?i)^year$"),
        ColumnRule::new("series", r"(?i)^series$"),
        ColumnRule::new("value", r"(?i)^value$"),
        ColumnRule::new("footnotes", r"(?i)^footnotes$"),
        ColumnRule::new("source", r"(?i)^source$"),
    ],
});

impl SourceSchema {
    /// Check the header row by name and position. Every mismatch is reported, nothing is renamed.
    pub fn validate(&self, source_label: &str, headers: &[String]) -> Result<(), HarmonizeError> {
        let mut mismatches = Vec::new();

        if headers.len() != self.columns.len() {
            mismatches.push(format!(
                "expected {} columns ({}), found {}",
                self.columns.len(),
                self.columns
                    .iter()
                    .map(|c| c.field)
                    .collect::<Vec<_>>()
                    .join(", "),
                headers.len()
            ));
        }

        for (idx, (rule, raw)) in self.columns.iter().zip(headers).enumerate() {
            let header = clean_header(raw);
            if !rule.header.is_match(&header) {
                mismatches.push(format!(
                    "column {} is `{}`, expected {} matching /{}/",
                    idx,
                    header,
                    rule.field,
                    rule.header.as_str()
                ));
            }
        }

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(HarmonizeError::SchemaDrift {
                source_name: format!("{} ({})", source_label, self.name),
                mismatches,
            })
        }
    }

    /// Position of `field` in a validated header row.
    pub fn position(&self, field: &str) -> usize {
        self.columns
            .iter()
            .position(|c| c.field == field)
            .unwrap_or_else(|| panic!("{} declares no `{}` column", self.name, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_owid_and_yearbook_headers() {
        GINI_SCHEMA
            .validate(
                "gini",
                &headers(&["\u{feff}Entity", "Code", "Year", "Gini coefficient"]),
            )
            .unwrap();
        SERIES_SCHEMA
            .validate(
                "gdp",
                &headers(&[
                    "Region/Country/Area",
                    "",
                    "Year",
                    "Series",
                    "Value",
                    "Footnotes",
                    "Source",
                ]),
            )
            .unwrap();
    }

    #[test]
    fn data_row_used_as_header_is_drift() {
        // skipping one line too many turns the first data row into the header
        let err = SERIES_SCHEMA
            .validate(
                "gdp",
                &headers(&[
                    "1",
                    "Total, all countries or areas",
                    "2010",
                    "GDP in current prices (millions of US dollars)",
                    "66,596,950",
                    "",
                    "United Nations Statistics Division",
                ]),
            )
            .unwrap_err();
        match err {
            HarmonizeError::SchemaDrift { mismatches, .. } => {
                assert!(mismatches.len() >= 5, "{:?}", mismatches);
                assert!(mismatches[0].contains("column 0 is `1`"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reordered_columns_are_named_in_error() {
        let err = GINI_SCHEMA
            .validate("gini", &headers(&["Entity", "Year", "Code", "Gini"]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("column 1 is `Year`"), "{err}");
        assert!(err.contains("column 2 is `Code`"), "{err}");
    }

    #[test]
    fn wrong_column_count_is_drift() {
        let err = GINI_SCHEMA
            .validate("gini", &headers(&["Entity", "Code", "Year"]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("expected 4 columns"), "{err}");
    }
}
