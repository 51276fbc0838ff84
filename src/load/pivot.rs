// src/load/pivot.rs

use std::collections::{BTreeMap, BTreeSet};

/// A long-format observation after country resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub country: String,
    pub year: i32,
    pub indicator: String,
    pub value: Option<f64>,
}

pub type CountryYear = (String, i32);

/// Wide form of one source: (country, year) → {indicator → mean value}.
///
/// Only present values are stored. A key or indicator whose values were all
/// missing does not appear at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorTable {
    indicators: BTreeSet<String>,
    cells: BTreeMap<CountryYear, BTreeMap<String, f64>>,
}

#[derive(Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl IndicatorTable {
    /// Pivot long records. Duplicate (country, year, indicator) triples are averaged.
    pub fn pivot<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LongRecord>,
    {
        let mut acc: BTreeMap<CountryYear, BTreeMap<String, MeanAcc>> = BTreeMap::new();

        for rec in records {
            let Some(v) = rec.value else { continue };
            let m = acc
                .entry((rec.country, rec.year))
                .or_default()
                .entry(rec.indicator)
                .or_default();
            m.sum += v;
            m.n += 1;
        }

        let mut indicators = BTreeSet::new();
        let cells = acc
            .into_iter()
            .map(|(key, by_ind)| {
                let row: BTreeMap<String, f64> = by_ind
                    .into_iter()
                    .map(|(ind, m)| {
                        indicators.insert(ind.clone());
                        (ind, m.sum / m.n as f64)
                    })
                    .collect();
                (key, row)
            })
            .collect();

        Self { indicators, cells }
    }

    /// Indicator names in sorted order.
    pub fn indicators(&self) -> impl Iterator<Item = &str> {
        self.indicators.iter().map(String::as_str)
    }

    pub fn num_indicators(&self) -> usize {
        self.indicators.len()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, country: &str, year: i32, indicator: &str) -> Option<f64> {
        self.cells
            .get(&(country.to_string(), year))
            .and_then(|row| row.get(indicator))
            .copied()
    }

    pub fn row(&self, country: &str, year: i32) -> Option<&BTreeMap<String, f64>> {
        self.cells.get(&(country.to_string(), year))
    }

    /// Back to long form, ordered by country, year, indicator.
    pub fn melt(&self) -> Vec<LongRecord> {
        self.cells
            .iter()
            .flat_map(|((country, year), row)| {
                row.iter().map(move |(ind, v)| LongRecord {
                    country: country.clone(),
                    year: *year,
                    indicator: ind.clone(),
                    value: Some(*v),
                })
            })
            .collect()
    }
}
