//! Aligned annual time series and their validation
//!
//! Three flavors share one shape: cost per pilgrim, pilgrim counts and
//! discount rates. Every calculation takes a [`ValidatedBundle`], which can
//! only be produced by [`validate`].

mod validate;
pub mod builder;
pub mod loader;

pub use validate::{check_aligned, validate, ValidatedBundle};
pub use builder::BaselineAssumptions;

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain flavor of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Cost per pilgrim, currency units, >= 0
    Cost,
    /// Pilgrim count, whole number >= 0
    Count,
    /// Per-period discount rate, > -1
    Rate,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Cost, SeriesKind::Count, SeriesKind::Rate];

    pub fn name(&self) -> &'static str {
        match self {
            SeriesKind::Cost => "cost",
            SeriesKind::Count => "count",
            SeriesKind::Rate => "rate",
        }
    }

    /// Check a single value against this flavor's domain
    pub fn check(&self, period: u32, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(EngineError::invalid(format!(
                "{} at period {} is not finite ({})",
                self.name(),
                period,
                value
            )));
        }
        match self {
            SeriesKind::Cost if value < 0.0 => Err(EngineError::invalid(format!(
                "cost at period {} is negative ({})",
                period, value
            ))),
            SeriesKind::Count if value < 0.0 => Err(EngineError::invalid(format!(
                "count at period {} is negative ({})",
                period, value
            ))),
            SeriesKind::Count if value.fract() != 0.0 => Err(EngineError::invalid(format!(
                "count at period {} is not a whole number ({})",
                period, value
            ))),
            SeriesKind::Rate if value <= -1.0 => Err(EngineError::invalid(format!(
                "rate at period {} must exceed -1 ({})",
                period, value
            ))),
            _ => Ok(()),
        }
    }

    /// Bring a perturbed value back onto this flavor's lattice.
    /// Counts are rounded to whole pilgrims; other flavors pass through.
    pub fn normalize(&self, value: f64) -> f64 {
        match self {
            SeriesKind::Count => value.round(),
            _ => value,
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SeriesKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" => Ok(SeriesKind::Cost),
            "count" => Ok(SeriesKind::Count),
            "rate" => Ok(SeriesKind::Rate),
            other => Err(EngineError::invalid(format!("unknown parameter '{}'", other))),
        }
    }
}

/// Ordered mapping from a contiguous run of period indices to values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// First period index (year offset)
    start: u32,
    /// One value per period, starting at `start`
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(start: u32, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    /// Series starting at period 0
    pub fn from_values(values: Vec<f64>) -> Self {
        Self::new(0, values)
    }

    /// Same value for `len` periods
    pub fn constant(start: u32, len: usize, value: f64) -> Self {
        Self::new(start, vec![value; len])
    }

    /// Build from `(period, value)` pairs in any order.
    ///
    /// The periods must form one contiguous run without duplicates.
    pub fn from_pairs(pairs: &[(u32, f64)]) -> Result<Self> {
        let mut sorted = pairs.to_vec();
        sorted.sort_by_key(|(period, _)| *period);

        let start = sorted.first().map(|(p, _)| *p).unwrap_or(0);
        for (offset, (period, _)) in sorted.iter().enumerate() {
            let expected = start as u64 + offset as u64;
            if *period as u64 != expected {
                return Err(EngineError::MisalignedSeries(format!(
                    "period indices are not contiguous: expected {}, found {}",
                    expected, period
                )));
            }
        }

        Ok(Self::new(start, sorted.into_iter().map(|(_, v)| v).collect()))
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last period index
    pub fn end(&self) -> u32 {
        self.start + self.values.len() as u32
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at an absolute period index
    pub fn get(&self, period: u32) -> Option<f64> {
        period
            .checked_sub(self.start)
            .and_then(|offset| self.values.get(offset as usize).copied())
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// `(period, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.start + i as u32, *v))
    }

    /// New series with `f(period, value)` applied to every point
    pub fn map<F>(&self, f: F) -> TimeSeries
    where
        F: Fn(u32, f64) -> f64,
    {
        TimeSeries::new(self.start, self.iter().map(|(p, v)| f(p, v)).collect())
    }

    /// True if both series cover the same periods
    pub fn same_index(&self, other: &TimeSeries) -> bool {
        self.start == other.start && self.values.len() == other.values.len()
    }
}
