//! Baseline series built from scalar pricing assumptions
//!
//! The per-pilgrim cost grows with Saudi-side inflation and with depreciation
//! of the home currency:
//!
//! ```text
//! C_t = C_0 × (1 + inflation)^t × (1 + depreciation)^t,   t = 1..=horizon
//! ```
//!
//! The total pilgrim queue is spread evenly over the horizon, and a flat
//! discount rate is applied in every year.

use super::{validate, TimeSeries, ValidatedBundle};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Scalar assumptions for a baseline liability run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineAssumptions {
    /// Total pilgrims waiting across the whole horizon
    pub total_pilgrims: u64,

    /// Cost per pilgrim today, currency units
    pub base_cost: f64,

    /// Annual cost inflation at the destination (fraction)
    pub inflation: f64,

    /// Annual depreciation of the home currency (fraction)
    pub currency_depreciation: f64,

    /// Annual discount rate (fraction)
    pub discount_rate: f64,

    /// Number of projection years
    pub horizon_years: u32,
}

impl BaselineAssumptions {
    /// Assumptions matching the published baseline
    pub fn default_baseline() -> Self {
        Self {
            total_pilgrims: 2_500_000,
            base_cost: 94_482_028.0,
            inflation: 0.035,
            currency_depreciation: 0.03,
            discount_rate: 0.065,
            horizon_years: 20,
        }
    }

    fn check(&self) -> Result<()> {
        if self.horizon_years == 0 {
            return Err(EngineError::invalid("horizon_years must be positive"));
        }
        for (name, value) in [
            ("inflation", self.inflation),
            ("currency_depreciation", self.currency_depreciation),
        ] {
            if !value.is_finite() || value <= -1.0 {
                return Err(EngineError::invalid(format!(
                    "{} must be finite and exceed -1 ({})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Cost per pilgrim for each projection year
    pub fn cost_series(&self) -> Result<TimeSeries> {
        self.check()?;
        let growth = (1.0 + self.inflation) * (1.0 + self.currency_depreciation);
        let values = (1..=self.horizon_years as i32)
            .map(|t| self.base_cost * growth.powi(t))
            .collect();
        Ok(TimeSeries::from_values(values))
    }

    /// Pilgrims departing each year: an even split, remainder to the earliest years
    pub fn count_series(&self) -> Result<TimeSeries> {
        self.check()?;
        let n = self.horizon_years as u64;
        let per_year = self.total_pilgrims / n;
        let remainder = self.total_pilgrims % n;
        let values = (0..n)
            .map(|year| (per_year + u64::from(year < remainder)) as f64)
            .collect();
        Ok(TimeSeries::from_values(values))
    }

    /// Flat discount rate for each projection year
    pub fn rate_series(&self) -> Result<TimeSeries> {
        self.check()?;
        Ok(TimeSeries::constant(0, self.horizon_years as usize, self.discount_rate))
    }

    /// Validated bundle for the whole baseline
    pub fn bundle(&self) -> Result<ValidatedBundle> {
        validate(self.cost_series()?, self.count_series()?, self.rate_series()?)
    }
}

impl Default for BaselineAssumptions {
    fn default() -> Self {
        Self::default_baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cost_compounds_inflation_and_depreciation() {
        let assumptions = BaselineAssumptions {
            base_cost: 100.0,
            inflation: 0.10,
            currency_depreciation: 0.0,
            horizon_years: 2,
            ..BaselineAssumptions::default_baseline()
        };
        let cost = assumptions.cost_series().unwrap();
        assert_relative_eq!(cost.values()[0], 110.0, max_relative = 1e-12);
        assert_relative_eq!(cost.values()[1], 121.0, max_relative = 1e-12);
    }

    #[test]
    fn test_counts_preserve_total() {
        let assumptions = BaselineAssumptions {
            total_pilgrims: 1_003,
            horizon_years: 10,
            ..BaselineAssumptions::default_baseline()
        };
        let counts = assumptions.count_series().unwrap();
        let total: f64 = counts.values().iter().sum();
        assert_eq!(total, 1_003.0);
        assert_eq!(counts.values()[0], 101.0);
        assert_eq!(counts.values()[9], 100.0);
    }

    #[test]
    fn test_default_baseline_bundle_is_valid() {
        let bundle = BaselineAssumptions::default_baseline().bundle().unwrap();
        assert_eq!(bundle.horizon(), 20);
        assert_eq!(bundle.count().values()[0], 125_000.0);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let assumptions = BaselineAssumptions {
            horizon_years: 0,
            ..BaselineAssumptions::default_baseline()
        };
        assert!(assumptions.bundle().is_err());
    }
}
