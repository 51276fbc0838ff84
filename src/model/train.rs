// src/model/train.rs

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::{Arima, CountryModel, Predictor, ORDER};
use crate::config::ModelConfig;
use crate::dataset::GiniPanel;

/// Why a country got no model. The `Display` text is what the skip log shows.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("insufficient data: {points} observed points, {required} required")]
    InsufficientData { points: usize, required: usize },
    #[error("fit failed: {error}")]
    FitFailed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingReport {
    pub countries: usize,
    pub trained: Vec<String>,
    pub skipped: BTreeMap<String, SkipReason>,
}

/// Fill interior gaps of a year-sorted series by linear interpolation,
/// giving one point per year from first to last.
pub fn interpolate(points: &[(i32, f64)]) -> Vec<(i32, f64)> {
    let mut out = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        let ((y0, v0), (y1, v1)) = (pair[0], pair[1]);
        out.push((y0, v0));
        let span = (y1 - y0) as f64;
        for y in (y0 + 1)..y1 {
            let t = (y - y0) as f64 / span;
            out.push((y, v0 + t * (v1 - v0)));
        }
    }
    if let Some(last) = points.last() {
        out.push(*last);
    }
    out
}

/// Fit one country's series.
pub fn fit_country(points: &[(i32, f64)], cfg: &ModelConfig) -> Result<CountryModel, SkipReason> {
    if points.len() < cfg.min_points {
        return Err(SkipReason::InsufficientData {
            points: points.len(),
            required: cfg.min_points,
        });
    }
    let (p, d, q) = ORDER;
    let mut arima = Arima::new(p, d, q).map_err(|e| SkipReason::FitFailed {
        error: e.to_string(),
    })?;
    let series: Vec<f64> = interpolate(points).into_iter().map(|(_, v)| v).collect();
    arima.fit(&series).map_err(|e| SkipReason::FitFailed {
        error: e.to_string(),
    })?;

    Ok(CountryModel {
        first_year: points[0].0,
        last_year: points[points.len() - 1].0,
        observations: points.len(),
        arima,
    })
}

/// Fit every country in the panel on the rayon pool.
#[tracing::instrument(level = "info", skip(panel, cfg), fields(countries = panel.len()))]
pub fn train(panel: &GiniPanel, cfg: &ModelConfig) -> (BTreeMap<String, CountryModel>, TrainingReport) {
    let work: Vec<(&str, &[(i32, f64)])> = panel.iter().collect();
    let results: Vec<(String, Result<CountryModel, SkipReason>)> = work
        .par_iter()
        .map(|(country, points)| (country.to_string(), fit_country(points, cfg)))
        .collect();

    let mut models = BTreeMap::new();
    let mut report = TrainingReport {
        countries: results.len(),
        ..Default::default()
    };
    for (country, result) in results {
        match result {
            Ok(model) => {
                report.trained.push(country.clone());
                models.insert(country, model);
            }
            Err(reason) => {
                warn!(country = %country, reason = %reason, "skipping country");
                report.skipped.insert(country, reason);
            }
        }
    }

    info!(
        trained = report.trained.len(),
        skipped = report.skipped.len(),
        "training finished"
    );
    (models, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(rows: &[(&str, i32, f64)]) -> GiniPanel {
        GiniPanel::from_observations(rows.iter().map(|(c, y, g)| (c.to_string(), *y, *g)))
    }

    #[test]
    fn interior_gaps_are_interpolated() {
        let s = interpolate(&[(2000, 0.40), (2003, 0.46), (2004, 0.47)]);
        let years: Vec<i32> = s.iter().map(|(y, _)| *y).collect();
        assert_eq!(years, vec![2000, 2001, 2002, 2003, 2004]);
        assert!((s[1].1 - 0.42).abs() < 1e-12);
        assert!((s[2].1 - 0.44).abs() < 1e-12);
    }

    #[test]
    fn interpolating_short_series() {
        assert!(interpolate(&[]).is_empty());
        assert_eq!(interpolate(&[(2000, 0.4)]), vec![(2000, 0.4)]);
    }

    #[test]
    fn five_points_fit_four_points_skip() {
        crate::init_test_logging();
        let p = panel(&[
            ("Chile", 2000, 0.55),
            ("Chile", 2001, 0.54),
            ("Chile", 2003, 0.52),
            ("Chile", 2005, 0.50),
            ("Chile", 2006, 0.49),
            ("Peru", 2000, 0.50),
            ("Peru", 2001, 0.49),
            ("Peru", 2002, 0.47),
            ("Peru", 2003, 0.46),
        ]);
        let (models, report) = train(&p, &ModelConfig::default());

        assert_eq!(models.keys().collect::<Vec<_>>(), vec!["Chile"]);
        let chile = &models["Chile"];
        assert_eq!((chile.first_year, chile.last_year), (2000, 2006));
        assert_eq!(chile.observations, 5);
        assert_eq!(report.trained, vec!["Chile"]);
        assert_eq!(
            report.skipped.get("Peru"),
            Some(&SkipReason::InsufficientData {
                points: 4,
                required: 5
            })
        );
        assert_eq!(
            report.skipped["Peru"].to_string(),
            "insufficient data: 4 observed points, 5 required"
        );
    }

    #[test]
    fn training_is_deterministic() {
        let rows: Vec<(String, i32, f64)> = ["Chile", "Peru", "Norway", "Kenya"]
            .iter()
            .enumerate()
            .flat_map(|(i, c)| {
                (0..8).map(move |t| (c.to_string(), 2000 + t, 0.3 + 0.01 * i as f64 + 0.002 * (t * t) as f64))
            })
            .collect();
        let p = GiniPanel::from_observations(rows);
        let (a, _) = train(&p, &ModelConfig::default());
        let (b, _) = train(&p, &ModelConfig::default());
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }
}
