//! Forecast projector
//!
//! Extrapolates a historical series into future periods with confidence
//! bounds. Every model implements [`ForecastModel`]; [`project`] checks the
//! request, turns the confidence level into a normal critical value and
//! stitches the model output onto the period axis that follows the history.
//!
//! Bounds are normal-theory intervals built from each model's forecast-error
//! variance: symmetric for models fitted on the natural scale, asymmetric for
//! a log-scale trend.

mod autoregressive;
mod linear;
mod smoothing;

pub use autoregressive::Autoregressive;
pub use linear::LinearTrend;
pub use smoothing::ExponentialSmoothing;

use crate::error::{EngineError, Result};
use crate::liability::{compute_liability, LiabilityResult};
use crate::series::{SeriesKind, TimeSeries};
use crate::stats::two_sided_z;
use log::debug;
use serde::{Deserialize, Serialize};

/// Default confidence level for forecast bounds
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Point forecast and bounds for each step ahead
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Projection {
    /// Symmetric bounds `point ± z × std_err`
    pub fn symmetric(point: Vec<f64>, std_err: &[f64], z: f64) -> Self {
        let lower = point.iter().zip(std_err).map(|(p, s)| p - z * s).collect();
        let upper = point.iter().zip(std_err).map(|(p, s)| p + z * s).collect();
        Self { point, lower, upper }
    }
}

/// A forecasting model family
pub trait ForecastModel {
    /// Name recorded on the produced [`ForecastSeries`]
    fn name(&self) -> &'static str;

    /// Fewest historical points the model can be fitted on
    fn min_points(&self) -> usize;

    /// Fit on `history` and project `horizon` steps ahead.
    ///
    /// `z` is the two-sided normal critical value for the requested
    /// confidence. Callers go through [`project`], which has already checked
    /// the horizon and the history length.
    fn project(&self, history: &[f64], horizon: usize, z: f64) -> Result<Projection>;
}

/// Model selection as configuration data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    LinearTrend {
        #[serde(default)]
        log_scale: bool,
    },
    ExponentialSmoothing {
        alpha: f64,
        #[serde(default)]
        beta: Option<f64>,
    },
    Autoregressive {
        order: usize,
    },
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::LinearTrend { log_scale: false }
    }
}

impl ModelSpec {
    pub fn build(&self) -> Box<dyn ForecastModel> {
        match *self {
            ModelSpec::LinearTrend { log_scale } => Box::new(LinearTrend { log_scale }),
            ModelSpec::ExponentialSmoothing { alpha, beta } => {
                Box::new(ExponentialSmoothing { alpha, beta })
            }
            ModelSpec::Autoregressive { order } => Box::new(Autoregressive { order }),
        }
    }
}

/// Extrapolated series with per-period bounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub forecast: TimeSeries,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub confidence: f64,
    pub model: String,
}

impl ForecastSeries {
    pub fn horizon(&self) -> usize {
        self.forecast.len()
    }

    pub fn lower_series(&self) -> TimeSeries {
        TimeSeries::new(self.forecast.start(), self.lower.clone())
    }

    pub fn upper_series(&self) -> TimeSeries {
        TimeSeries::new(self.forecast.start(), self.upper.clone())
    }
}

/// Project `historical` forward `horizon` periods at `confidence`
pub fn project(
    historical: &TimeSeries,
    horizon: usize,
    model: &dyn ForecastModel,
    confidence: f64,
) -> Result<ForecastSeries> {
    if horizon == 0 {
        return Err(EngineError::invalid("forecast horizon must be positive"));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(EngineError::invalid(format!(
            "confidence must lie in (0, 1), got {}",
            confidence
        )));
    }
    if historical.len() < model.min_points() {
        return Err(EngineError::insufficient(format!(
            "{} needs at least {} points, history has {}",
            model.name(),
            model.min_points(),
            historical.len()
        )));
    }
    if let Some((period, value)) = historical.iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::invalid(format!(
            "historical value at period {} is {}",
            period, value
        )));
    }

    debug!(
        "Projecting {} points {} periods ahead with {}",
        historical.len(),
        horizon,
        model.name()
    );

    let z = two_sided_z(confidence);
    let projection = model.project(historical.values(), horizon, z)?;

    Ok(ForecastSeries {
        forecast: TimeSeries::new(historical.end(), projection.point),
        lower: projection.lower,
        upper: projection.upper,
        confidence,
        model: model.name().to_string(),
    })
}

/// Central, low and high liability built from cost and count forecasts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardEstimate {
    pub central: LiabilityResult,
    pub low: LiabilityResult,
    pub high: LiabilityResult,
}

/// Feed forecasts into the calculator.
///
/// Bounds are floored at zero and counts rounded before validation, since a
/// wide interval on a short history can dip below zero. The rate series must
/// cover the forecast periods.
pub fn forward_liability(
    cost: &ForecastSeries,
    count: &ForecastSeries,
    rate: &TimeSeries,
) -> Result<ForwardEstimate> {
    let clean = |series: TimeSeries, kind: SeriesKind| {
        series.map(|_, v| kind.normalize(v.max(0.0)))
    };

    let run = |c: TimeSeries, n: TimeSeries| {
        compute_liability(
            &clean(c, SeriesKind::Cost),
            &clean(n, SeriesKind::Count),
            rate,
        )
    };

    Ok(ForwardEstimate {
        central: run(cost.forecast.clone(), count.forecast.clone())?,
        low: run(cost.lower_series(), count.lower_series())?,
        high: run(cost.upper_series(), count.upper_series())?,
    })
}
