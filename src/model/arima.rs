// src/model/arima.rs

use serde::{Deserialize, Serialize};

use super::{ArimaError, Predictor};

/// ARIMA(p, d, q) fitted with Yule-Walker AR coefficients and MA terms taken
/// from the residual autocorrelation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arima {
    p: usize,
    d: usize,
    q: usize,
    ar_coeffs: Vec<f64>,
    ma_coeffs: Vec<f64>,
    constant: f64,
    /// Last value of the series at each differencing level, outermost first.
    anchors: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    fitted: bool,
}

impl Arima {
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self, ArimaError> {
        if p > 10 {
            return Err(ArimaError::InvalidOrder {
                name: "p",
                reason: "AR order must be <= 10",
            });
        }
        if d > 2 {
            return Err(ArimaError::InvalidOrder {
                name: "d",
                reason: "differencing order must be <= 2",
            });
        }
        if q > 10 {
            return Err(ArimaError::InvalidOrder {
                name: "q",
                reason: "MA order must be <= 10",
            });
        }
        Ok(Self {
            p,
            d,
            q,
            ar_coeffs: vec![0.0; p],
            ma_coeffs: vec![0.0; q],
            constant: 0.0,
            anchors: Vec::new(),
            differenced: Vec::new(),
            residuals: Vec::new(),
            fitted: false,
        })
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coeffs
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coeffs
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Fewest points a fit accepts.
    pub fn min_points(&self) -> usize {
        self.p + self.d + self.q + 2
    }

    fn difference(data: &[f64]) -> Vec<f64> {
        data.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Integrate forecasts back through each differencing level.
    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut result = forecasts.to_vec();
        for last in self.anchors.iter().rev() {
            let mut level = *last;
            for v in result.iter_mut() {
                level += *v;
                *v = level;
            }
        }
        result
    }

    fn estimate_ar(&self, data: &[f64]) -> Vec<f64> {
        if self.p == 0 {
            return Vec::new();
        }
        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();

        let autocorr: Vec<f64> = (0..=self.p)
            .map(|k| (k..n).map(|i| centered[i] * centered[i - k]).sum::<f64>() / n as f64)
            .collect();

        // Levinson-Durbin
        let mut coeffs = vec![0.0; self.p];
        if autocorr[0].abs() > 1e-10 {
            coeffs[0] = autocorr[1] / autocorr[0];
            for k in 1..self.p {
                let mut num = autocorr[k + 1];
                let mut denom = autocorr[0];
                for j in 0..k {
                    num -= coeffs[j] * autocorr[k - j];
                    denom -= coeffs[j] * autocorr[j + 1];
                }
                if denom.abs() > 1e-10 {
                    let new_coeff = num / denom;
                    let old = coeffs.clone();
                    coeffs[k] = new_coeff;
                    for j in 0..k {
                        coeffs[j] = old[j] - new_coeff * old[k - 1 - j];
                    }
                }
            }
        }
        coeffs
    }

    fn estimate_ma(&self, residuals: &[f64]) -> Vec<f64> {
        if self.q == 0 || residuals.is_empty() {
            return vec![0.0; self.q];
        }
        let n = residuals.len();
        let mean = residuals.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = residuals.iter().map(|x| x - mean).collect();
        let var = centered.iter().map(|x| x * x).sum::<f64>() / n as f64;

        let mut coeffs = vec![0.0; self.q];
        if var.abs() > 1e-10 {
            for (k, c) in coeffs.iter_mut().enumerate() {
                let cov = ((k + 1)..n)
                    .map(|i| centered[i] * centered[i - k - 1])
                    .sum::<f64>()
                    / n as f64;
                // keep the MA part invertible
                *c = (cov / var).clamp(-0.99, 0.99);
            }
        }
        coeffs
    }
}

impl Predictor for Arima {
    fn fit(&mut self, data: &[f64]) -> Result<(), ArimaError> {
        let required = self.min_points();
        if data.len() < required {
            return Err(ArimaError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ArimaError::InvalidData(
                "series contains NaN or infinite values".into(),
            ));
        }

        let mut anchors = Vec::with_capacity(self.d);
        let mut series = data.to_vec();
        for _ in 0..self.d {
            anchors.push(series[series.len() - 1]);
            series = Self::difference(&series);
        }

        self.ar_coeffs = self.estimate_ar(&series);

        let n = series.len();
        let mean = series.iter().sum::<f64>() / n as f64;
        self.constant = mean;
        let mut residuals = vec![0.0; n];
        for i in self.p..n {
            let mut prediction = self.constant;
            for j in 0..self.p {
                prediction += self.ar_coeffs[j] * (series[i - j - 1] - mean);
            }
            residuals[i] = series[i] - prediction;
        }
        self.ma_coeffs = self.estimate_ma(&residuals);

        self.anchors = anchors;
        self.differenced = series;
        self.residuals = residuals;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, steps: usize) -> Result<Vec<f64>, ArimaError> {
        if !self.fitted {
            return Err(ArimaError::NotFitted);
        }
        if steps == 0 {
            return Ok(Vec::new());
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut residuals = self.residuals.clone();
        for _ in 0..steps {
            let mut forecast = self.constant;
            for j in 0..self.p {
                forecast += self.ar_coeffs[j] * (extended[extended.len() - j - 1] - self.constant);
            }
            for j in 0..self.q {
                if residuals.len() > j {
                    forecast += self.ma_coeffs[j] * residuals[residuals.len() - j - 1];
                }
            }
            extended.push(forecast);
            // future shocks are zero in expectation
            residuals.push(0.0);
        }

        Ok(self.undifference(&extended[n..]))
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_validated() {
        assert!(Arima::new(1, 1, 1).is_ok());
        assert!(Arima::new(11, 0, 0).is_err());
        assert!(Arima::new(1, 3, 0).is_err());
    }

    #[test]
    fn five_points_are_enough_for_one_one_one() {
        let mut m = Arima::new(1, 1, 1).unwrap();
        assert_eq!(m.min_points(), 5);
        m.fit(&[0.40, 0.41, 0.43, 0.42, 0.44]).unwrap();
        assert!(m.is_fitted());
        assert_eq!(m.predict(3).unwrap().len(), 3);
    }

    #[test]
    fn four_points_are_rejected() {
        let mut m = Arima::new(1, 1, 1).unwrap();
        let err = m.fit(&[0.40, 0.41, 0.43, 0.42]).unwrap_err();
        assert!(matches!(
            err,
            ArimaError::InsufficientData {
                required: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn linear_trend_continues() {
        let data: Vec<f64> = (0..10).map(|i| 0.30 + 0.01 * i as f64).collect();
        let mut m = Arima::new(1, 1, 1).unwrap();
        m.fit(&data).unwrap();
        let f = m.predict(2).unwrap();
        assert!((f[0] - 0.40).abs() < 1e-9);
        assert!((f[1] - 0.41).abs() < 1e-9);
    }

    #[test]
    fn second_order_differencing_integrates_twice() {
        // quadratic: second differences are constant 2
        let data: Vec<f64> = (0..8).map(|i| (i * i) as f64).collect();
        let mut m = Arima::new(0, 2, 0).unwrap();
        m.fit(&data).unwrap();
        let f = m.predict(2).unwrap();
        assert!((f[0] - 64.0).abs() < 1e-9);
        assert!((f[1] - 81.0).abs() < 1e-9);
    }

    #[test]
    fn unfitted_model_cannot_predict() {
        let m = Arima::new(1, 1, 1).unwrap();
        assert!(matches!(m.predict(1), Err(ArimaError::NotFitted)));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut m = Arima::new(1, 1, 1).unwrap();
        let err = m.fit(&[0.1, 0.2, f64::NAN, 0.3, 0.4]).unwrap_err();
        assert!(matches!(err, ArimaError::InvalidData(_)));
    }
}
