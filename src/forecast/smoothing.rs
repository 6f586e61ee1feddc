//! Exponential smoothing, simple and Holt linear
//!
//! The level starts at the first observation and, for Holt, the trend at the
//! first difference. The residual variance `σ²` is the mean squared one-step
//! error over the observations the initialization did not consume. The h-step
//! forecast variance is
//!
//! ```text
//! simple: σ² · (1 + (h - 1)·α²)
//! holt:   σ² · (1 + (h - 1)·(α² + α·β·h + β²·h·(2h - 1) / 6))
//! ```

use super::{ForecastModel, Projection};
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoothing {
    /// Level smoothing, in (0, 1]
    pub alpha: f64,
    /// Trend smoothing, in (0, 1]; `None` for simple smoothing
    pub beta: Option<f64>,
}

impl ExponentialSmoothing {
    pub fn simple(alpha: f64) -> Self {
        Self { alpha, beta: None }
    }

    pub fn holt(alpha: f64, beta: f64) -> Self {
        Self {
            alpha,
            beta: Some(beta),
        }
    }

    fn check(&self) -> Result<()> {
        let in_range = |v: f64| v > 0.0 && v <= 1.0;
        if !in_range(self.alpha) {
            return Err(EngineError::invalid(format!(
                "smoothing alpha must lie in (0, 1], got {}",
                self.alpha
            )));
        }
        if let Some(beta) = self.beta {
            if !in_range(beta) {
                return Err(EngineError::invalid(format!(
                    "smoothing beta must lie in (0, 1], got {}",
                    beta
                )));
            }
        }
        Ok(())
    }

    fn simple_projection(&self, history: &[f64], horizon: usize, z: f64) -> Projection {
        let alpha = self.alpha;
        let mut level = history[0];
        let mut sse = 0.0;
        for y in &history[1..] {
            let error = y - level;
            sse += error * error;
            level += alpha * error;
        }
        let sigma2 = sse / (history.len() - 1) as f64;

        let point = vec![level; horizon];
        let std_err: Vec<f64> = (1..=horizon)
            .map(|h| (sigma2 * (1.0 + (h - 1) as f64 * alpha * alpha)).sqrt())
            .collect();
        Projection::symmetric(point, &std_err, z)
    }

    fn holt_projection(&self, history: &[f64], beta: f64, horizon: usize, z: f64) -> Projection {
        let alpha = self.alpha;
        let mut level = history[1];
        let mut trend = history[1] - history[0];
        let mut sse = 0.0;
        for y in &history[2..] {
            let predicted = level + trend;
            let error = y - predicted;
            sse += error * error;
            let next_level = predicted + alpha * error;
            trend += beta * (next_level - level - trend);
            level = next_level;
        }
        let sigma2 = sse / (history.len() - 2) as f64;

        let point = (1..=horizon).map(|h| level + h as f64 * trend).collect();
        let std_err: Vec<f64> = (1..=horizon)
            .map(|h| {
                let h = h as f64;
                let growth = alpha * alpha + alpha * beta * h + beta * beta * h * (2.0 * h - 1.0) / 6.0;
                (sigma2 * (1.0 + (h - 1.0) * growth)).sqrt()
            })
            .collect();
        Projection::symmetric(point, &std_err, z)
    }
}

impl ForecastModel for ExponentialSmoothing {
    fn name(&self) -> &'static str {
        if self.beta.is_some() {
            "holt_linear"
        } else {
            "simple_exponential_smoothing"
        }
    }

    fn min_points(&self) -> usize {
        if self.beta.is_some() {
            3
        } else {
            2
        }
    }

    fn project(&self, history: &[f64], horizon: usize, z: f64) -> Result<Projection> {
        self.check()?;
        if history.len() < self.min_points() {
            return Err(EngineError::insufficient(format!(
                "{} needs at least {} points",
                self.name(),
                self.min_points()
            )));
        }
        Ok(match self.beta {
            None => self.simple_projection(history, horizon, z),
            Some(beta) => self.holt_projection(history, beta, horizon, z),
        })
    }
}
