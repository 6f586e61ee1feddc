//! Ordinary least squares trend on the period offset

use super::{ForecastModel, Projection};
use crate::error::{EngineError, Result};
use crate::stats::solve_least_squares;
use nalgebra::{DMatrix, DVector};

/// `y_t = a + b·t + e_t`, or `ln y_t = a + b·t + e_t` when `log_scale` is set.
///
/// Prediction standard error at offset `x0` is
/// `s·sqrt(1 + 1/n + (x0 - x̄)² / Sxx)` with `s²` the residual variance on
/// `n - 2` degrees of freedom. On the log scale the interval is computed in
/// logs and exponentiated, so bounds are asymmetric and stay positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearTrend {
    pub log_scale: bool,
}

impl LinearTrend {
    pub fn log_scale() -> Self {
        Self { log_scale: true }
    }
}

impl ForecastModel for LinearTrend {
    fn name(&self) -> &'static str {
        if self.log_scale {
            "log_linear_trend"
        } else {
            "linear_trend"
        }
    }

    fn min_points(&self) -> usize {
        3
    }

    fn project(&self, history: &[f64], horizon: usize, z: f64) -> Result<Projection> {
        let n = history.len();
        if n < self.min_points() {
            return Err(EngineError::insufficient(format!(
                "trend needs at least {} points, got {}",
                self.min_points(),
                n
            )));
        }
        let ys: Vec<f64> = if self.log_scale {
            if let Some(bad) = history.iter().find(|v| **v <= 0.0) {
                return Err(EngineError::invalid(format!(
                    "log-scale trend needs positive history, found {}",
                    bad
                )));
            }
            history.iter().map(|v| v.ln()).collect()
        } else {
            history.to_vec()
        };

        let x = DMatrix::from_fn(n, 2, |row, col| if col == 0 { 1.0 } else { row as f64 });
        let y = DVector::from_column_slice(&ys);
        let beta = solve_least_squares(&x, &y)
            .ok_or_else(|| EngineError::invalid("trend fit is ill-conditioned"))?;
        let (intercept, slope) = (beta[0], beta[1]);

        let ssr: f64 = ys
            .iter()
            .enumerate()
            .map(|(t, y)| {
                let e = y - (intercept + slope * t as f64);
                e * e
            })
            .sum();
        let s = (ssr / (n - 2) as f64).sqrt();

        let x_bar = (n - 1) as f64 / 2.0;
        let sxx: f64 = (0..n).map(|t| (t as f64 - x_bar).powi(2)).sum();

        let mut fit = Vec::with_capacity(horizon);
        let mut std_err = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let x0 = (n - 1 + h) as f64;
            fit.push(intercept + slope * x0);
            std_err.push(s * (1.0 + 1.0 / n as f64 + (x0 - x_bar).powi(2) / sxx).sqrt());
        }

        if !self.log_scale {
            return Ok(Projection::symmetric(fit, &std_err, z));
        }

        let logs = Projection::symmetric(fit, &std_err, z);
        Ok(Projection {
            point: logs.point.iter().map(|v| v.exp()).collect(),
            lower: logs.lower.iter().map(|v| v.exp()).collect(),
            upper: logs.upper.iter().map(|v| v.exp()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_line_has_tight_bounds() {
        let history = [5.0, 7.0, 9.0, 11.0];
        let p = LinearTrend::default().project(&history, 2, 1.96).unwrap();
        assert_relative_eq!(p.point[0], 13.0, max_relative = 1e-9);
        assert_relative_eq!(p.point[1], 15.0, max_relative = 1e-9);
        assert_relative_eq!(p.lower[0], 13.0, epsilon = 1e-6);
        assert_relative_eq!(p.upper[1], 15.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bounds_widen_with_horizon() {
        let history = [10.0, 13.0, 13.5, 17.0, 18.0, 21.5];
        let p = LinearTrend::default().project(&history, 4, 1.96).unwrap();
        let widths: Vec<f64> = p.lower.iter().zip(&p.upper).map(|(l, u)| u - l).collect();
        for pair in widths.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        for i in 0..4 {
            assert_relative_eq!(p.point[i] - p.lower[i], p.upper[i] - p.point[i], max_relative = 1e-9);
        }
    }

    #[test]
    fn test_log_scale_fits_growth_with_asymmetric_bounds() {
        let history = [100.0, 111.0, 120.0, 134.0, 145.0, 162.0];
        let p = LinearTrend::log_scale().project(&history, 3, 1.96).unwrap();
        assert!(p.point[0] > 162.0);
        for i in 0..3 {
            assert!(p.lower[i] > 0.0);
            assert!(p.upper[i] - p.point[i] > p.point[i] - p.lower[i]);
        }
    }

    #[test]
    fn test_direct_call_checks_length() {
        for short in [&[][..], &[1.0], &[1.0, 2.0]] {
            for model in [LinearTrend::default(), LinearTrend::log_scale()] {
                assert!(matches!(
                    model.project(short, 1, 1.96),
                    Err(EngineError::InsufficientData(_))
                ));
            }
        }
    }

    #[test]
    fn test_log_scale_rejects_non_positive() {
        let err = LinearTrend::log_scale().project(&[1.0, 0.0, 2.0], 1, 1.96).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }
}
