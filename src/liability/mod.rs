//! Present-value liability calculator
//!
//! ```text
//! L = Σ_t cost_t × count_t × v_t
//! ```
//!
//! where `v_t` is the incrementally compounded discount factor from
//! [`DiscountCurve`]. The calculator holds no state: identical inputs give
//! bit-identical totals and breakdowns.

mod discount;
mod result;

pub use discount::DiscountCurve;
pub use result::{LiabilityResult, PeriodContribution};

use crate::error::Result;
use crate::series::{check_aligned, TimeSeries, ValidatedBundle};

/// Validate the three series and compute their present-value liability
pub fn compute_liability(
    cost: &TimeSeries,
    count: &TimeSeries,
    rate: &TimeSeries,
) -> Result<LiabilityResult> {
    check_aligned(cost, count, rate)?;
    Ok(calculate(cost, count, rate))
}

impl ValidatedBundle {
    /// Present-value liability of this bundle
    pub fn liability(&self) -> LiabilityResult {
        calculate(self.cost(), self.count(), self.rate())
    }
}

fn calculate(cost: &TimeSeries, count: &TimeSeries, rate: &TimeSeries) -> LiabilityResult {
    let curve = DiscountCurve::from_checked_rates(rate.start(), rate.values());

    let breakdown = cost
        .iter()
        .zip(count.values())
        .zip(curve.factors())
        .map(|(((period, c), n), v)| {
            let nominal = c * n;
            PeriodContribution {
                period,
                cost: c,
                count: *n,
                discount_factor: *v,
                nominal,
                present_value: nominal * v,
            }
        })
        .collect();

    LiabilityResult::new(breakdown)
}
