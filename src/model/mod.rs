// src/model/mod.rs
pub mod arima;
pub mod artifact;
pub mod train;

use thiserror::Error;

pub use arima::Arima;
pub use artifact::{CountryModel, ModelArtifact};

/// The fixed order fitted for every country.
pub const ORDER: (usize, usize, usize) = (1, 1, 1);

#[derive(Debug, Error)]
pub enum ArimaError {
    #[error("invalid order {name}: {reason}")]
    InvalidOrder {
        name: &'static str,
        reason: &'static str,
    },

    #[error("need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("model has not been fitted")]
    NotFitted,
}

/// A fitted univariate forecaster.
pub trait Predictor {
    fn fit(&mut self, data: &[f64]) -> Result<(), ArimaError>;

    /// Forecast the next `steps` values after the fitted series.
    fn predict(&self, steps: usize) -> Result<Vec<f64>, ArimaError>;

    fn is_fitted(&self) -> bool;
}
