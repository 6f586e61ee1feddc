//! Discount factors for present-value calculations
//!
//! Factors are built incrementally, one period at a time:
//!
//! ```text
//! v_0 = 1 / (1 + r_0)
//! v_t = v_{t-1} / (1 + r_t)
//! ```
//!
//! so a long horizon of varying rates never goes through `powi`/`powf` and the
//! first period in the curve is discounted once.

use crate::error::{EngineError, Result};
use crate::series::{SeriesKind, TimeSeries};
use serde::{Deserialize, Serialize};

/// Cumulative discount factors for a contiguous run of periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Period index of the first factor
    start: u32,
    /// Cumulative discount factor per period
    factors: Vec<f64>,
}

impl DiscountCurve {
    /// Build from a per-period rate series
    pub fn from_rates(rates: &TimeSeries) -> Result<Self> {
        for (period, rate) in rates.iter() {
            SeriesKind::Rate.check(period, rate)?;
        }
        Ok(Self::from_checked_rates(rates.start(), rates.values()))
    }

    /// Build from rates that are already known to be finite and > -1
    pub(crate) fn from_checked_rates(start: u32, rates: &[f64]) -> Self {
        let mut factors = Vec::with_capacity(rates.len());
        let mut v = 1.0;
        for rate in rates {
            v /= 1.0 + rate;
            factors.push(v);
        }
        Self { start, factors }
    }

    /// Same annual rate for every period
    pub fn flat(annual_rate: f64, periods: usize) -> Result<Self> {
        Self::from_rates(&TimeSeries::constant(0, periods, annual_rate))
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// Discount factor at an absolute period index
    pub fn factor_at(&self, period: u32) -> Option<f64> {
        period
            .checked_sub(self.start)
            .and_then(|offset| self.factors.get(offset as usize).copied())
    }

    /// Present value of one amount per period
    pub fn pv_stream(&self, amounts: &[f64]) -> Result<f64> {
        if amounts.len() != self.factors.len() {
            return Err(EngineError::MisalignedSeries(format!(
                "{} amounts for {} discount periods",
                amounts.len(),
                self.factors.len()
            )));
        }
        Ok(amounts.iter().zip(&self.factors).map(|(a, v)| a * v).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_curve_matches_closed_form() {
        let curve = DiscountCurve::flat(0.06, 30).unwrap();
        for (t, v) in curve.factors().iter().enumerate() {
            let expected = 1.0 / 1.06_f64.powi(t as i32 + 1);
            assert_relative_eq!(*v, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_varying_rates_compound() {
        let rates = TimeSeries::from_values(vec![0.10, 0.0, 0.25]);
        let curve = DiscountCurve::from_rates(&rates).unwrap();
        assert_relative_eq!(curve.factors()[0], 1.0 / 1.1, max_relative = 1e-12);
        assert_relative_eq!(curve.factors()[1], 1.0 / 1.1, max_relative = 1e-12);
        assert_relative_eq!(curve.factors()[2], 1.0 / 1.1 / 1.25, max_relative = 1e-12);
    }

    #[test]
    fn test_rate_at_minus_one_rejected() {
        let rates = TimeSeries::from_values(vec![0.05, -1.0]);
        assert!(matches!(
            DiscountCurve::from_rates(&rates),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_factor_at_absolute_period() {
        let rates = TimeSeries::new(3, vec![0.0, 1.0]);
        let curve = DiscountCurve::from_rates(&rates).unwrap();
        assert_eq!(curve.factor_at(2), None);
        assert_eq!(curve.factor_at(3), Some(1.0));
        assert_eq!(curve.factor_at(4), Some(0.5));
    }

    #[test]
    fn test_pv_stream() {
        let curve = DiscountCurve::flat(0.0, 3).unwrap();
        assert_relative_eq!(curve.pv_stream(&[1.0, 2.0, 3.0]).unwrap(), 6.0);
        assert!(curve.pv_stream(&[1.0]).is_err());
    }
}
