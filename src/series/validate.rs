//! Alignment and domain validation for (cost, count, rate) bundles

use super::{SeriesKind, TimeSeries};
use crate::error::{EngineError, Result};
use serde::Serialize;

/// Cost, count and rate series that passed validation together.
///
/// Fields are private: the only way to obtain a bundle is [`validate`], so a
/// bundle in hand is always aligned and in domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedBundle {
    cost: TimeSeries,
    count: TimeSeries,
    rate: TimeSeries,
}

/// Validate three series and take ownership of them as a bundle
pub fn validate(cost: TimeSeries, count: TimeSeries, rate: TimeSeries) -> Result<ValidatedBundle> {
    check_aligned(&cost, &count, &rate)?;
    Ok(ValidatedBundle { cost, count, rate })
}

/// Check alignment and domains without taking ownership
pub fn check_aligned(cost: &TimeSeries, count: &TimeSeries, rate: &TimeSeries) -> Result<()> {
    if cost.is_empty() {
        return Err(EngineError::invalid("series must contain at least one period"));
    }

    for (kind, series) in [(SeriesKind::Count, count), (SeriesKind::Rate, rate)] {
        if !series.same_index(cost) {
            return Err(EngineError::MisalignedSeries(format!(
                "{} covers periods {}..{} but cost covers {}..{}",
                kind,
                series.start(),
                series.end(),
                cost.start(),
                cost.end()
            )));
        }
    }

    for (kind, series) in [
        (SeriesKind::Cost, cost),
        (SeriesKind::Count, count),
        (SeriesKind::Rate, rate),
    ] {
        for (period, value) in series.iter() {
            kind.check(period, value)?;
        }
    }

    Ok(())
}

impl ValidatedBundle {
    pub fn cost(&self) -> &TimeSeries {
        &self.cost
    }

    pub fn count(&self) -> &TimeSeries {
        &self.count
    }

    pub fn rate(&self) -> &TimeSeries {
        &self.rate
    }

    pub fn series(&self, kind: SeriesKind) -> &TimeSeries {
        match kind {
            SeriesKind::Cost => &self.cost,
            SeriesKind::Count => &self.count,
            SeriesKind::Rate => &self.rate,
        }
    }

    /// Number of periods
    pub fn horizon(&self) -> usize {
        self.cost.len()
    }

    /// First period index
    pub fn start(&self) -> u32 {
        self.cost.start()
    }

    /// New bundle with one series replaced, revalidated
    pub fn with_series(&self, kind: SeriesKind, series: TimeSeries) -> Result<ValidatedBundle> {
        let (cost, count, rate) = match kind {
            SeriesKind::Cost => (series, self.count.clone(), self.rate.clone()),
            SeriesKind::Count => (self.cost.clone(), series, self.rate.clone()),
            SeriesKind::Rate => (self.cost.clone(), self.count.clone(), series),
        };
        validate(cost, count, rate)
    }

    /// Release the underlying series as (cost, count, rate)
    pub fn into_parts(self) -> (TimeSeries, TimeSeries, TimeSeries) {
        (self.cost, self.count, self.rate)
    }
}
