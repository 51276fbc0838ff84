// src/dashboard/mod.rs
pub mod chart;

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use crate::dataset::{self, GiniPanel};
use crate::model::{ModelArtifact, Predictor};

/// What the dashboard shows for one country.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The country's data already reaches the target year; nothing is forecast.
    AlreadyCovered { last_year: i32 },
    NoModel,
    /// The dataset holds no observations for the country.
    NoData,
    ForecastFailed { error: String },
    Forecast {
        /// (year, value) from the forecast origin + 1 through the target year.
        points: Vec<(i32, f64)>,
        summary: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub country: String,
    pub target_year: i32,
    pub history: Vec<(i32, f64)>,
    pub outcome: Outcome,
}

impl DashboardView {
    /// The final predicted value, if a forecast was made.
    pub fn prediction(&self) -> Option<f64> {
        match &self.outcome {
            Outcome::Forecast { points, .. } => points.last().map(|(_, v)| *v),
            _ => None,
        }
    }

    /// The user-facing notice or headline.
    pub fn message(&self) -> String {
        let c = &self.country;
        match &self.outcome {
            Outcome::AlreadyCovered { .. } => {
                format!("{} already has data up to or beyond {}.", c, self.target_year)
            }
            Outcome::NoModel => format!("No model available for {}.", c),
            Outcome::NoData => format!("No data available for {}.", c),
            Outcome::ForecastFailed { error } => format!("Error during forecasting: {}", error),
            Outcome::Forecast { points, .. } => {
                let v = points.last().map(|(_, v)| *v).unwrap_or(f64::NAN);
                format!(
                    "Predicted Gini Coefficient for {} in {}: {:.4}",
                    c, self.target_year, v
                )
            }
        }
    }

    /// Plain-text rendering: headline, chart and summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.message());
        out.push('\n');
        if let Outcome::Forecast { points, summary } = &self.outcome {
            out.push('\n');
            out.push_str(&chart::render(
                &format!("Gini Coefficient Trend for {}", self.country),
                &self.history,
                points,
            ));
            out.push('\n');
            out.push_str(summary);
            out.push('\n');
        }
        out
    }
}

/// "From Y0 to Y1, C's Gini Coefficient increased from V0 to V1."
pub fn summary_sentence(country: &str, history: &[(i32, f64)]) -> Option<String> {
    let (y0, v0) = *history.first()?;
    let (y1, v1) = *history.last()?;
    let trend = if v1 > v0 {
        "increased"
    } else if v1 < v0 {
        "decreased"
    } else {
        "remained stable"
    };
    Some(format!(
        "From {} to {}, {}'s Gini Coefficient {} from {:.4} to {:.4}.",
        y0, y1, country, trend, v0, v1
    ))
}

/// Decide what to show for `country`. `history` must be sorted by year.
/// The model is only asked to predict when the target lies past the last observed year.
pub fn build_view(
    country: &str,
    history: &[(i32, f64)],
    model: Option<&dyn Predictor>,
    target_year: i32,
) -> DashboardView {
    let origin = history.last().map(|&(y, _)| y);
    build_view_from(country, history, model, origin, target_year)
}

/// As [`build_view`], but forecast years are counted from `origin`, the last
/// year the model was fitted on, instead of the last observed year.
pub fn build_view_from(
    country: &str,
    history: &[(i32, f64)],
    model: Option<&dyn Predictor>,
    origin: Option<i32>,
    target_year: i32,
) -> DashboardView {
    let outcome = match (model, history.last()) {
        (None, _) => Outcome::NoModel,
        (Some(_), None) => Outcome::NoData,
        (Some(_), Some(&(last_year, _))) if target_year <= last_year => {
            Outcome::AlreadyCovered { last_year }
        }
        (Some(model), Some(&(last_year, _))) => {
            let origin = origin.unwrap_or(last_year);
            if target_year <= origin {
                Outcome::AlreadyCovered { last_year: origin }
            } else {
                match model.predict((target_year - origin) as usize) {
                    Ok(values) => Outcome::Forecast {
                        points: ((origin + 1)..=target_year).zip(values).collect(),
                        summary: summary_sentence(country, history).unwrap_or_default(),
                    },
                    Err(e) => Outcome::ForecastFailed {
                        error: e.to_string(),
                    },
                }
            }
        }
    };

    DashboardView {
        country: country.to_string(),
        target_year,
        history: history.to_vec(),
        outcome,
    }
}

/// Dataset and models, loaded once and read-only afterwards.
pub struct Dashboard {
    panel: GiniPanel,
    artifact: ModelArtifact,
}

impl Dashboard {
    /// Load both files. A dataset whose checksum differs from the one the models
    /// were trained on is an error unless `allow_stale` is set.
    #[tracing::instrument(level = "info", skip(dataset_path, artifact_path))]
    pub fn open(dataset_path: &Path, artifact_path: &Path, allow_stale: bool) -> Result<Self> {
        let artifact = ModelArtifact::load(artifact_path)?;
        let current = dataset::sha256_file(dataset_path)?;
        if let Err(e) = artifact.check_fresh(&current) {
            if !allow_stale {
                return Err(e.into());
            }
            warn!(error = %e, "serving forecasts from a stale model artifact");
        }
        let panel = dataset::read_gini_panel(dataset_path)?;
        info!(
            countries = artifact.models.len(),
            trained_at = %artifact.trained_at,
            "dashboard ready"
        );
        Ok(Self { panel, artifact })
    }

    pub fn from_parts(panel: GiniPanel, artifact: ModelArtifact) -> Self {
        Self { panel, artifact }
    }

    /// Selector options: countries with a model, sorted.
    pub fn countries(&self) -> Vec<&str> {
        self.artifact.countries().collect()
    }

    pub fn view(&self, country: &str, target_year: i32) -> DashboardView {
        let history = self.panel.series(country).unwrap_or(&[]);
        let Some(fitted) = self.artifact.get(country) else {
            return build_view(country, history, None, target_year);
        };
        if let Some(&(data_last, _)) = history.last() {
            if data_last != fitted.last_year {
                warn!(
                    country,
                    data_last_year = data_last,
                    model_last_year = fitted.last_year,
                    "model was fitted on a different span; forecasting from its last year"
                );
            }
        }
        build_view_from(
            country,
            history,
            Some(&fitted.arima as &dyn Predictor),
            Some(fitted.last_year),
            target_year,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArimaError;
    use std::cell::Cell;

    /// Returns a fixed step per year and counts calls.
    struct Counting {
        calls: Cell<usize>,
        start: f64,
        step: f64,
    }

    impl Counting {
        fn new(start: f64, step: f64) -> Self {
            Self {
                calls: Cell::new(0),
                start,
                step,
            }
        }
    }

    impl Predictor for Counting {
        fn fit(&mut self, _data: &[f64]) -> Result<(), ArimaError> {
            Ok(())
        }

        fn predict(&self, steps: usize) -> Result<Vec<f64>, ArimaError> {
            self.calls.set(self.calls.get() + 1);
            Ok((1..=steps).map(|i| self.start + self.step * i as f64).collect())
        }

        fn is_fitted(&self) -> bool {
            true
        }
    }

    #[test]
    fn target_already_reached_makes_no_forecast_call() {
        let model = Counting::new(0.4, 0.01);
        let history = [(2020, 0.40), (2030, 0.41)];
        let view = build_view("Chile", &history, Some(&model as &dyn Predictor), 2030);

        assert_eq!(view.outcome, Outcome::AlreadyCovered { last_year: 2030 });
        assert_eq!(view.message(), "Chile already has data up to or beyond 2030.");
        assert_eq!(model.calls.get(), 0);
        assert_eq!(view.prediction(), None);
    }

    #[test]
    fn increasing_history_reads_increased_with_four_decimals() {
        let model = Counting::new(0.45, 0.001);
        let history = [(2000, 0.41), (2010, 0.425), (2020, 0.45)];
        let view = build_view("Chile", &history, Some(&model as &dyn Predictor), 2030);

        assert_eq!(model.calls.get(), 1);
        let Outcome::Forecast { points, summary } = &view.outcome else {
            panic!("expected a forecast, got {:?}", view.outcome);
        };
        assert_eq!(points.len(), 10);
        assert_eq!(points[0].0, 2021);
        assert_eq!(points[9].0, 2030);
        assert_eq!(
            summary,
            "From 2000 to 2020, Chile's Gini Coefficient increased from 0.4100 to 0.4500."
        );
        assert!(view.message().ends_with("in 2030: 0.4600"));
    }

    #[test]
    fn decreasing_and_flat_summaries() {
        assert_eq!(
            summary_sentence("Peru", &[(2000, 0.5), (2010, 0.45)]).unwrap(),
            "From 2000 to 2010, Peru's Gini Coefficient decreased from 0.5000 to 0.4500."
        );
        assert_eq!(
            summary_sentence("Peru", &[(2000, 0.5), (2010, 0.5)]).unwrap(),
            "From 2000 to 2010, Peru's Gini Coefficient remained stable from 0.5000 to 0.5000."
        );
        assert_eq!(summary_sentence("Peru", &[]), None);
    }

    #[test]
    fn missing_model_is_a_notice() {
        let view = build_view("Norway", &[(2000, 0.25)], None, 2030);
        assert_eq!(view.outcome, Outcome::NoModel);
        assert_eq!(view.message(), "No model available for Norway.");
    }

    #[test]
    fn forecast_errors_are_shown_not_raised() {
        let unfitted = crate::model::Arima::new(1, 1, 1).unwrap();
        let view = build_view("Chile", &[(2000, 0.5)], Some(&unfitted as &dyn Predictor), 2030);
        assert!(matches!(view.outcome, Outcome::ForecastFailed { .. }));
        assert!(view.message().starts_with("Error during forecasting"));
    }

    #[test]
    fn rendered_view_contains_chart_and_summary() {
        let model = Counting::new(0.45, 0.001);
        let view = build_view("Chile", &[(2018, 0.44), (2020, 0.45)], Some(&model as &dyn Predictor), 2023);
        let text = view.render();
        assert!(text.contains("Gini Coefficient Trend for Chile"));
        assert!(text.contains("From 2018 to 2020"));
    }

    fn fitted_through(last_year: i32) -> ModelArtifact {
        let mut arima = crate::model::Arima::new(1, 1, 1).unwrap();
        arima.fit(&[0.50, 0.49, 0.47, 0.48, 0.46, 0.45]).unwrap();
        let mut models = std::collections::BTreeMap::new();
        models.insert(
            "Chile".to_string(),
            crate::model::CountryModel {
                first_year: last_year - 5,
                last_year,
                observations: 6,
                arima,
            },
        );
        ModelArtifact::new("abc123".into(), models)
    }

    #[test]
    fn stale_model_labels_forecast_from_its_own_last_year() {
        crate::init_test_logging();
        // dataset gained 2006..=2008 after the model was fitted through 2005
        let obs = (2000..=2008).map(|y| ("Chile".to_string(), y, 0.5 - 0.005 * (y - 2000) as f64));
        let dash = Dashboard::from_parts(GiniPanel::from_observations(obs), fitted_through(2005));

        let view = dash.view("Chile", 2010);
        let Outcome::Forecast { points, .. } = &view.outcome else {
            panic!("expected a forecast, got {:?}", view.outcome);
        };
        let years: Vec<i32> = points.iter().map(|(y, _)| *y).collect();
        assert_eq!(years, (2006..=2010).collect::<Vec<_>>());
        let expected = dash.artifact.get("Chile").unwrap().arima.predict(5).unwrap();
        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn target_inside_model_span_is_covered() {
        crate::init_test_logging();
        let obs = (2000..=2003).map(|y| ("Chile".to_string(), y, 0.5));
        let dash = Dashboard::from_parts(GiniPanel::from_observations(obs), fitted_through(2005));

        let view = dash.view("Chile", 2004);
        assert_eq!(view.outcome, Outcome::AlreadyCovered { last_year: 2005 });
        assert_eq!(view.prediction(), None);
    }
}
