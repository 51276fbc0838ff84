// src/policy/mod.rs

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::{PolicyConfig, ThresholdBoundary};
use crate::merge::{HarmonizedRecord, HarmonizedTable};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyReport {
    pub rows_in: usize,
    pub rows_missing_target: usize,
    /// Missing-cell count at which a column is dropped (per the boundary rule).
    pub threshold: f64,
    pub dropped_columns: Vec<String>,
    pub imputed_cells: usize,
    pub duplicates_removed: usize,
    pub rows_out: usize,
}

/// Apply the missing-data policy once, after all joins:
/// 1) drop rows without the target value,
/// 2) drop sparse indicator columns against a threshold fixed on the step-1 row count
///    (Country Code is part of the fixed leading columns and never dropped),
/// 3) mean-impute the remaining numeric gaps,
/// 4) drop exact duplicate rows, keeping the first.
///
/// Row order is whatever the join chain produced.
#[tracing::instrument(level = "info", skip(table, cfg), fields(rows = table.rows.len()))]
pub fn apply(mut table: HarmonizedTable, cfg: &PolicyConfig) -> (HarmonizedTable, PolicyReport) {
    let mut report = PolicyReport {
        rows_in: table.rows.len(),
        ..Default::default()
    };

    // 1) target is non-negotiable
    table.rows.retain(|r| r.gini.is_some());
    report.rows_missing_target = report.rows_in - table.rows.len();

    // 2) sparse columns, static threshold
    let n = table.rows.len();
    let threshold = n as f64 * cfg.max_missing_fraction;
    report.threshold = threshold;
    let too_sparse = |missing: usize| match cfg.boundary {
        ThresholdBoundary::DropAtThreshold => missing as f64 >= threshold,
        ThresholdBoundary::KeepAtThreshold => missing as f64 > threshold,
    };

    let keep: Vec<bool> = (0..table.columns.len())
        .map(|i| {
            let missing = table.rows.iter().filter(|r| r.values[i].is_none()).count();
            !too_sparse(missing)
        })
        .collect();
    if keep.iter().any(|k| !k) {
        let mut columns = Vec::with_capacity(table.columns.len());
        for (name, k) in table.columns.drain(..).zip(&keep) {
            if *k {
                columns.push(name);
            } else {
                debug!(column = %name, "dropping sparse column");
                report.dropped_columns.push(name);
            }
        }
        table.columns = columns;
        for r in &mut table.rows {
            let mut flags = keep.iter();
            r.values.retain(|_| *flags.next().unwrap_or(&false));
        }
    }

    // 3) mean imputation over the surviving rows
    for i in 0..table.columns.len() {
        let present: Vec<f64> = table.rows.iter().filter_map(|r| r.values[i]).collect();
        if present.is_empty() || present.len() == n {
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        for r in &mut table.rows {
            if r.values[i].is_none() {
                r.values[i] = Some(mean);
                report.imputed_cells += 1;
            }
        }
    }

    // 4) exact duplicates, first occurrence wins
    let before = table.rows.len();
    let mut seen = HashSet::with_capacity(before);
    table.rows.retain(|r| seen.insert(row_key(r)));
    report.duplicates_removed = before - table.rows.len();
    report.rows_out = table.rows.len();

    info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        missing_target = report.rows_missing_target,
        dropped_columns = report.dropped_columns.len(),
        imputed = report.imputed_cells,
        duplicates = report.duplicates_removed,
        "applied missing-data policy"
    );
    (table, report)
}

type RowKey = (String, Option<String>, i32, Option<u64>, Vec<Option<u64>>);

fn row_key(r: &HarmonizedRecord) -> RowKey {
    (
        r.country.clone(),
        r.code.clone(),
        r.year,
        r.gini.map(bits),
        r.values.iter().map(|v| v.map(bits)).collect(),
    )
}

/// Bit pattern for equality, with -0.0 folded onto 0.0.
fn bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, code: Option<&str>, year: i32, gini: Option<f64>, values: &[Option<f64>]) -> HarmonizedRecord {
        HarmonizedRecord {
            country: country.into(),
            code: code.map(str::to_string),
            year,
            gini,
            values: values.to_vec(),
        }
    }

    fn table(columns: &[&str], rows: Vec<HarmonizedRecord>) -> HarmonizedTable {
        HarmonizedTable {
            has_code: true,
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn rows_without_target_are_dropped_first() {
        let t = table(
            &["A"],
            vec![
                rec("Chile", Some("CHL"), 2000, Some(0.5), &[Some(1.0)]),
                rec("Chile", Some("CHL"), 2001, None, &[Some(2.0)]),
            ],
        );
        let (out, report) = apply(t, &PolicyConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(report.rows_missing_target, 1);
        assert!(out.rows.iter().all(|r| r.gini.is_some()));
    }

    fn boundary_table() -> HarmonizedTable {
        // column A: 2 of 4 missing (exactly 50%), B: 3 of 4 missing, C: 1 of 4 missing
        table(
            &["A", "B", "C"],
            vec![
                rec("Chile", Some("CHL"), 2000, Some(0.50), &[Some(1.0), None, Some(10.0)]),
                rec("Chile", Some("CHL"), 2001, Some(0.51), &[None, None, Some(20.0)]),
                rec("Peru", Some("PER"), 2000, Some(0.45), &[Some(3.0), Some(7.0), None]),
                rec("Peru", Some("PER"), 2001, Some(0.44), &[None, None, Some(30.0)]),
            ],
        )
    }

    #[test]
    fn exactly_half_missing_is_dropped_by_default() {
        let (out, report) = apply(boundary_table(), &PolicyConfig::default());
        assert_eq!(report.threshold, 2.0);
        assert_eq!(out.columns, vec!["C"]);
        assert_eq!(report.dropped_columns, vec!["A", "B"]);
        assert!(out.has_code);
    }

    #[test]
    fn exactly_half_missing_is_kept_with_keep_boundary() {
        let cfg = PolicyConfig {
            boundary: ThresholdBoundary::KeepAtThreshold,
            ..Default::default()
        };
        let (out, report) = apply(boundary_table(), &cfg);
        assert_eq!(out.columns, vec!["A", "C"]);
        assert_eq!(report.dropped_columns, vec!["B"]);
        // A is imputed with mean(1, 3)
        assert_eq!(out.rows[1].values, vec![Some(2.0), Some(20.0)]);
    }

    #[test]
    fn gaps_are_filled_with_column_mean() {
        let (out, report) = apply(boundary_table(), &PolicyConfig::default());
        assert_eq!(out.rows[2].values, vec![Some(20.0)]);
        assert_eq!(report.imputed_cells, 1);
    }

    #[test]
    fn sparse_country_code_is_kept() {
        let t = table(
            &[],
            vec![
                rec("Chile", None, 2000, Some(0.5), &[]),
                rec("Peru", None, 2000, Some(0.4), &[]),
                rec("Norway", Some("NOR"), 2000, Some(0.3), &[]),
            ],
        );
        let (out, report) = apply(t, &PolicyConfig::default());
        assert!(out.has_code);
        assert_eq!(out.rows[2].code.as_deref(), Some("NOR"));
        assert!(report.dropped_columns.is_empty());
    }

    #[test]
    fn missing_codes_with_duplicates_stay_stable_on_rerun() {
        let t = table(
            &[],
            vec![
                rec("Chile", None, 2000, Some(0.5), &[]),
                rec("Peru", Some("PER"), 2000, Some(0.4), &[]),
                rec("Peru", Some("PER"), 2000, Some(0.4), &[]),
                rec("Peru", Some("PER"), 2000, Some(0.4), &[]),
            ],
        );
        let cfg = PolicyConfig::default();
        let (once, first) = apply(t, &cfg);
        assert_eq!(once.len(), 2);
        assert_eq!(first.duplicates_removed, 2);

        let (twice, second) = apply(once.clone(), &cfg);
        assert_eq!(once, twice);
        assert!(twice.has_code);
        assert!(second.dropped_columns.is_empty());
    }

    #[test]
    fn rows_equal_after_imputation_are_deduplicated() {
        let t = table(
            &["A"],
            vec![
                rec("Chile", None, 2000, Some(0.5), &[Some(2.0)]),
                rec("Chile", None, 2000, Some(0.5), &[None]),
                rec("Chile", None, 2000, Some(0.5), &[Some(2.0)]),
            ],
        );
        let cfg = PolicyConfig::default();
        let (out, report) = apply(t, &cfg);
        assert_eq!(out.len(), 1);
        assert_eq!(report.duplicates_removed, 2);
    }

    #[test]
    fn policy_is_idempotent() {
        let cfg = PolicyConfig::default();
        let (once, _) = apply(boundary_table(), &cfg);
        let (twice, report) = apply(once.clone(), &cfg);
        assert_eq!(once, twice);
        assert_eq!(report.rows_missing_target, 0);
        assert!(report.dropped_columns.is_empty());
        assert_eq!(report.imputed_cells, 0);
        assert_eq!(report.duplicates_removed, 0);
    }

    #[test]
    fn row_order_is_kept() {
        let (out, _) = apply(boundary_table(), &PolicyConfig::default());
        let keys: Vec<_> = out.rows.iter().map(|r| (r.country.as_str(), r.year)).collect();
        assert_eq!(
            keys,
            vec![("Chile", 2000), ("Chile", 2001), ("Peru", 2000), ("Peru", 2001)]
        );
    }
}
