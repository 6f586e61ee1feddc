//! Liability output structures

use serde::{Deserialize, Serialize};

/// Discounted contribution of a single period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodContribution {
    pub period: u32,
    pub cost: f64,
    pub count: f64,
    pub discount_factor: f64,
    /// cost × count, undiscounted
    pub nominal: f64,
    /// nominal × discount_factor
    pub present_value: f64,
}

/// Present-value liability with its per-period breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityResult {
    /// Total present value
    total: f64,

    /// One row per period, in period order
    breakdown: Vec<PeriodContribution>,
}

impl LiabilityResult {
    pub(crate) fn new(breakdown: Vec<PeriodContribution>) -> Self {
        let total = breakdown.iter().map(|row| row.present_value).sum();
        Self { total, breakdown }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn breakdown(&self) -> &[PeriodContribution] {
        &self.breakdown
    }

    /// Number of periods
    pub fn horizon(&self) -> usize {
        self.breakdown.len()
    }

    /// Contribution at an absolute period index
    pub fn contribution(&self, period: u32) -> Option<&PeriodContribution> {
        self.breakdown.iter().find(|row| row.period == period)
    }

    /// Undiscounted sum of cost × count
    pub fn nominal_total(&self) -> f64 {
        self.breakdown.iter().map(|row| row.nominal).sum()
    }
}
