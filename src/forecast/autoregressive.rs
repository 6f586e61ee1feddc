//! AR(p) with intercept, fitted by least squares

use super::{ForecastModel, Projection};
use crate::error::{EngineError, Result};
use crate::stats::solve_least_squares;
use nalgebra::{DMatrix, DVector};

/// `y_t = c + φ_1·y_{t-1} + ... + φ_p·y_{t-p} + e_t`
///
/// Forecasts are produced recursively. The h-step variance is
/// `σ² · Σ_{j<h} ψ_j²` with `ψ` the moving-average weights of the fitted
/// process, so bounds are symmetric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autoregressive {
    pub order: usize,
}

impl Autoregressive {
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    fn fit(&self, history: &[f64]) -> Result<(f64, Vec<f64>, f64)> {
        let p = self.order;
        let rows = history.len() - p;
        let x = DMatrix::from_fn(rows, p + 1, |r, c| {
            if c == 0 {
                1.0
            } else {
                history[p + r - c]
            }
        });
        let y = DVector::from_iterator(rows, history[p..].iter().copied());
        let beta = solve_least_squares(&x, &y)
            .ok_or_else(|| EngineError::invalid("autoregressive fit is ill-conditioned"))?;

        // rows > p + 1 is guaranteed by min_points
        let residuals = &y - &x * &beta;
        let sigma2 = residuals.norm_squared() / (rows - (p + 1)) as f64;

        Ok((beta[0], beta.iter().skip(1).copied().collect(), sigma2))
    }
}

/// Moving-average weights ψ_0..ψ_{h-1}
fn psi_weights(phi: &[f64], horizon: usize) -> Vec<f64> {
    let mut psi = vec![1.0];
    for j in 1..horizon {
        let w: f64 = (1..=j.min(phi.len())).map(|i| phi[i - 1] * psi[j - i]).sum();
        psi.push(w);
    }
    psi
}

impl ForecastModel for Autoregressive {
    fn name(&self) -> &'static str {
        "autoregressive"
    }

    /// Enough rows to leave the residual variance one degree of freedom
    fn min_points(&self) -> usize {
        2 * self.order + 2
    }

    fn project(&self, history: &[f64], horizon: usize, z: f64) -> Result<Projection> {
        if self.order == 0 {
            return Err(EngineError::invalid("autoregressive order must be at least 1"));
        }
        if history.len() < self.min_points() {
            return Err(EngineError::insufficient(format!(
                "AR({}) needs at least {} points",
                self.order,
                self.min_points()
            )));
        }

        let (intercept, phi, sigma2) = self.fit(history)?;

        let mut path = history.to_vec();
        for _ in 0..horizon {
            let n = path.len();
            let next = intercept + phi.iter().enumerate().map(|(i, f)| f * path[n - 1 - i]).sum::<f64>();
            path.push(next);
        }
        let point = path.split_off(history.len());

        let psi = psi_weights(&phi, horizon);
        let mut cumulative = 0.0;
        let std_err: Vec<f64> = psi
            .iter()
            .map(|w| {
                cumulative += w * w;
                (sigma2 * cumulative).sqrt()
            })
            .collect();

        Ok(Projection::symmetric(point, &std_err, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_recovers_exact_ar1() {
        // y_t = 2 + 0.5·y_{t-1}, converging to 4
        let mut history = vec![10.0];
        for _ in 0..7 {
            let last = history[history.len() - 1];
            history.push(2.0 + 0.5 * last);
        }
        let p = Autoregressive::new(1).project(&history, 2, 1.96).unwrap();
        let last = history[history.len() - 1];
        assert_relative_eq!(p.point[0], 2.0 + 0.5 * last, max_relative = 1e-8);
        assert_relative_eq!(p.point[1], 2.0 + 0.5 * p.point[0], max_relative = 1e-8);
    }

    #[test]
    fn test_psi_weights_ar1() {
        let psi = psi_weights(&[0.5], 4);
        assert_eq!(psi, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_bounds_widen() {
        let history = [5.0, 6.2, 5.8, 6.9, 6.1, 7.3, 6.8, 7.9];
        let p = Autoregressive::new(2).project(&history, 4, 1.96).unwrap();
        for i in 1..4 {
            assert!(p.upper[i] - p.lower[i] >= p.upper[i - 1] - p.lower[i - 1]);
        }
    }

    #[test]
    fn test_order_zero_rejected() {
        assert!(matches!(
            Autoregressive::new(0).project(&[1.0, 2.0, 3.0], 1, 1.96),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_needs_points_for_residual_variance() {
        let model = Autoregressive::new(2);
        assert_eq!(model.min_points(), 6);
        // four points would fit AR(2) exactly and leave no residual variance
        for short in [&[1.0, 2.0][..], &[10.0, 14.0, 11.0, 17.0], &[10.0, 14.0, 11.0, 17.0, 13.0]] {
            assert!(matches!(
                model.project(short, 3, 1.96),
                Err(EngineError::InsufficientData(_))
            ));
        }
    }

    #[test]
    fn test_short_noisy_history_has_positive_width() {
        let history = [10.0, 14.0, 11.0, 17.0, 13.0, 16.0];
        let p = Autoregressive::new(2).project(&history, 3, 1.96).unwrap();
        for i in 0..3 {
            assert!(p.upper[i] - p.lower[i] > 1e-6);
        }
    }
}
