//! Reduction of liability outcomes to risk statistics
//!
//! VaR at confidence `c` is the `c`-quantile of the liability totals (the
//! upper tail is the adverse one) and CVaR is the mean of the totals at or
//! above it. Quantiles interpolate linearly between order statistics.
//!
//! The solvency ratio of an outcome is `assets * asset_factor / total`.

use crate::error::{EngineError, Result};
use crate::liability::LiabilityResult;
use crate::simulation::SimulationRun;
use crate::stats::{self, quantile_sorted};
use serde::{Deserialize, Serialize};

/// Anything with a liability total
pub trait LiabilityOutcome {
    fn total(&self) -> f64;

    /// Multiplier on the base assets for this outcome
    fn asset_factor(&self) -> f64 {
        1.0
    }
}

impl LiabilityOutcome for LiabilityResult {
    fn total(&self) -> f64 {
        LiabilityResult::total(self)
    }
}

impl LiabilityOutcome for SimulationRun {
    fn total(&self) -> f64 {
        SimulationRun::total(self)
    }

    fn asset_factor(&self) -> f64 {
        self.asset_factor
    }
}

impl LiabilityOutcome for f64 {
    fn total(&self) -> f64 {
        *self
    }
}

/// Which statistics to report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Percentiles in [0, 100]
    pub percentiles: Vec<f64>,
    /// VaR/CVaR confidence levels in (0, 1)
    pub confidence_levels: Vec<f64>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            percentiles: vec![5.0, 25.0, 50.0, 75.0, 95.0],
            confidence_levels: vec![0.95, 0.99],
        }
    }
}

impl SummaryConfig {
    fn check(&self) -> Result<()> {
        if let Some(p) = self.percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
            return Err(EngineError::invalid(format!("percentile {} outside [0, 100]", p)));
        }
        if let Some(c) = self.confidence_levels.iter().find(|c| !(**c > 0.0 && **c < 1.0)) {
            return Err(EngineError::invalid(format!("confidence level {} outside (0, 1)", c)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentilePoint {
    pub percentile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TailRisk {
    pub confidence: f64,
    pub var: f64,
    pub cvar: f64,
}

/// Summary statistics of a set of liability totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for a single outcome
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Vec<PercentilePoint>,
    pub tail: Vec<TailRisk>,
}

impl RiskSummary {
    pub fn percentile(&self, percentile: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| p.percentile == percentile)
            .map(|p| p.value)
    }

    pub fn tail_at(&self, confidence: f64) -> Option<&TailRisk> {
        self.tail.iter().find(|t| t.confidence == confidence)
    }
}

/// Distribution of the solvency ratio across outcomes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvencySummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Lowest ratio
    pub worst: f64,
    /// Highest ratio
    pub best: f64,
    pub threshold: f64,
    /// Share of outcomes with a ratio at or above `threshold`
    pub probability: f64,
}

/// Summarize a collection of outcomes
pub fn summarize<T: LiabilityOutcome>(outcomes: &[T], config: &SummaryConfig) -> Result<RiskSummary> {
    summarize_totals(outcomes.iter().map(|o| o.total()).collect(), config)
}

fn summarize_totals(mut totals: Vec<f64>, config: &SummaryConfig) -> Result<RiskSummary> {
    if totals.is_empty() {
        return Err(EngineError::insufficient("no outcomes to summarize"));
    }
    check_total(&totals)?;
    config.check()?;

    totals.sort_by(f64::total_cmp);

    let count = totals.len();
    let mean = stats::mean(&totals);
    let std_dev = sample_std_dev(&totals);

    let percentiles = config
        .percentiles
        .iter()
        .map(|&p| PercentilePoint {
            percentile: p,
            value: quantile_sorted(&totals, p / 100.0),
        })
        .collect();

    let tail = config
        .confidence_levels
        .iter()
        .map(|&c| {
            let var = quantile_sorted(&totals, c);
            let start = totals.partition_point(|x| *x < var);
            let cvar = if start < count {
                stats::mean(&totals[start..])
            } else {
                var
            };
            TailRisk {
                confidence: c,
                var,
                cvar,
            }
        })
        .collect();

    Ok(RiskSummary {
        count,
        mean,
        std_dev,
        min: totals[0],
        max: totals[count - 1],
        percentiles,
        tail,
    })
}

/// Welford; 0 for fewer than two values
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut m2 = 0.0;
    let mut running = 0.0;
    for (i, x) in values.iter().enumerate() {
        let delta = x - running;
        running += delta / (i + 1) as f64;
        m2 += delta * (x - running);
    }
    (m2 / (values.len() - 1) as f64).sqrt()
}

fn check_total(totals: &[f64]) -> Result<()> {
    match totals.iter().position(|t| !t.is_finite()) {
        Some(i) => Err(EngineError::invalid(format!(
            "outcome {} has non-finite total {}",
            i, totals[i]
        ))),
        None => Ok(()),
    }
}

/// Share of outcomes whose total exceeds `threshold`
pub fn exceedance_probability<T: LiabilityOutcome>(outcomes: &[T], threshold: f64) -> Result<f64> {
    if outcomes.is_empty() {
        return Err(EngineError::insufficient("no outcomes"));
    }
    let above = outcomes.iter().filter(|o| o.total() > threshold).count();
    Ok(above as f64 / outcomes.len() as f64)
}

/// Share of outcomes whose solvency ratio reaches `min_ratio`
pub fn solvency_probability<T: LiabilityOutcome>(
    outcomes: &[T],
    assets: f64,
    min_ratio: f64,
) -> Result<f64> {
    if outcomes.is_empty() {
        return Err(EngineError::insufficient("no outcomes"));
    }
    let solvent = outcomes
        .iter()
        .filter(|o| {
            let total = o.total();
            total <= 0.0 || assets * o.asset_factor() / total >= min_ratio
        })
        .count();
    Ok(solvent as f64 / outcomes.len() as f64)
}

/// Reduce per-outcome solvency ratios against `base_assets`.
///
/// Every outcome needs a positive finite total, otherwise the ratio is
/// undefined and the call fails with `InvalidParameter`.
pub fn summarize_solvency<T: LiabilityOutcome>(
    outcomes: &[T],
    base_assets: f64,
    threshold: f64,
) -> Result<SolvencySummary> {
    if outcomes.is_empty() {
        return Err(EngineError::insufficient("no outcomes"));
    }
    if !base_assets.is_finite() || base_assets < 0.0 {
        return Err(EngineError::invalid(format!(
            "base assets must be finite and non-negative ({})",
            base_assets
        )));
    }
    if !threshold.is_finite() {
        return Err(EngineError::invalid(format!("solvency threshold {}", threshold)));
    }

    let ratios = outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| {
            let total = o.total();
            if total.is_finite() && total > 0.0 {
                Ok(base_assets * o.asset_factor() / total)
            } else {
                Err(EngineError::invalid(format!(
                    "outcome {} has total {}, solvency ratio undefined",
                    i, total
                )))
            }
        })
        .collect::<Result<Vec<f64>>>()?;

    let solvent = ratios.iter().filter(|r| **r >= threshold).count();
    Ok(SolvencySummary {
        count: ratios.len(),
        mean: stats::mean(&ratios),
        std_dev: sample_std_dev(&ratios),
        worst: ratios.iter().copied().fold(f64::INFINITY, f64::min),
        best: ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        threshold,
        probability: solvent as f64 / ratios.len() as f64,
    })
}

/// Collects totals one at a time, e.g. straight off a simulation stream
#[derive(Debug, Clone, Default)]
pub struct RiskAccumulator {
    totals: Vec<f64>,
}

impl RiskAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: LiabilityOutcome>(&mut self, outcome: &T) -> Result<()> {
        let total = outcome.total();
        if !total.is_finite() {
            return Err(EngineError::invalid(format!("non-finite total {}", total)));
        }
        self.totals.push(total);
        Ok(())
    }

    /// Push every run of a stream, stopping at the first error
    pub fn absorb<I>(&mut self, runs: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<SimulationRun>>,
    {
        for run in runs {
            self.push(&run?)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn summarize(&self, config: &SummaryConfig) -> Result<RiskSummary> {
        summarize_totals(self.totals.clone(), config)
    }
}
