// src/merge/mod.rs

use std::collections::HashSet;
use tracing::{info, warn};

use crate::load::{pivot::IndicatorTable, AnchorTable};

/// One (country, year) row of the wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedRecord {
    pub country: String,
    pub code: Option<String>,
    pub year: i32,
    pub gini: Option<f64>,
    /// Indicator cells, aligned with `HarmonizedTable::columns`.
    pub values: Vec<Option<f64>>,
}

/// The wide per-country-year table.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedTable {
    /// Whether the Country Code column is still part of the table.
    pub has_code: bool,
    /// Indicator column names, in join order.
    pub columns: Vec<String>,
    pub rows: Vec<HarmonizedRecord>,
}

impl HarmonizedTable {
    /// Start the join chain from the anchor, with no indicator columns yet.
    pub fn from_anchor(anchor: AnchorTable) -> Self {
        let rows = anchor
            .rows
            .into_iter()
            .map(|r| HarmonizedRecord {
                country: r.country,
                code: r.code,
                year: r.year,
                gini: r.gini,
                values: Vec::new(),
            })
            .collect();
        Self {
            has_code: true,
            columns: Vec::new(),
            rows,
        }
    }

    /// Left-join one source on (country, year). Anchor rows are never dropped;
    /// rows without a match get missing cells for the new columns.
    pub fn left_join(&mut self, label: &str, table: &IndicatorTable) {
        let taken: HashSet<String> = self.columns.iter().cloned().collect();
        let mut source_cols = Vec::with_capacity(table.num_indicators());
        for ind in table.indicators() {
            let name = if taken.contains(ind) {
                let qualified = format!("{} [{}]", ind, label);
                warn!(source = label, column = ind, renamed = %qualified, "indicator name collision");
                qualified
            } else {
                ind.to_string()
            };
            source_cols.push((ind.to_string(), name));
        }

        let mut matched = 0usize;
        for row in &mut self.rows {
            match table.row(&row.country, row.year) {
                Some(cells) => {
                    matched += 1;
                    row.values
                        .extend(source_cols.iter().map(|(ind, _)| cells.get(ind).copied()));
                }
                None => row.values.extend(std::iter::repeat(None).take(source_cols.len())),
            }
        }

        info!(
            source = label,
            columns = source_cols.len(),
            matched,
            rows = self.rows.len(),
            "left-joined source"
        );
        self.columns
            .extend(source_cols.into_iter().map(|(_, name)| name));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Join the anchor with every source, in order.
pub fn merge_all(anchor: AnchorTable, sources: &[(String, IndicatorTable)]) -> HarmonizedTable {
    let mut table = HarmonizedTable::from_anchor(anchor);
    for (label, source) in sources {
        table.left_join(label, source);
    }
    table
}
