//! CSV loaders for aligned liability inputs and historical series
//!
//! Aligned inputs use one row per period:
//!
//! ```text
//! period,cost,count,rate
//! 0,97841234.5,125000,0.065
//! ```
//!
//! Historical series use calendar years, which are mapped onto contiguous
//! period offsets from the first year in the file:
//!
//! ```text
//! year,value
//! 2022,85452883
//! ```

use super::{validate, TimeSeries, ValidatedBundle};
use crate::error::{EngineError, Result};
use csv::Reader;
use log::debug;
use std::path::Path;

/// Raw CSV row for aligned inputs
#[derive(Debug, serde::Deserialize)]
struct BundleRow {
    #[serde(alias = "Period")]
    period: u32,
    #[serde(alias = "Cost")]
    cost: f64,
    #[serde(alias = "Count")]
    count: f64,
    #[serde(alias = "Rate")]
    rate: f64,
}

/// Raw CSV row for a historical series
#[derive(Debug, serde::Deserialize)]
struct HistoricalRow {
    #[serde(alias = "Year")]
    year: i32,
    #[serde(alias = "Value")]
    value: f64,
}

/// A historical series anchored to a calendar year
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    /// Calendar year of period 0
    pub base_year: i32,
    pub series: TimeSeries,
}

impl HistoricalSeries {
    /// Calendar year for a period index of this series (or of its forecast)
    pub fn year_of(&self, period: u32) -> i32 {
        self.base_year + period as i32
    }
}

/// Load and validate aligned inputs from a CSV file
pub fn load_bundle<P: AsRef<Path>>(path: P) -> Result<ValidatedBundle> {
    let reader = Reader::from_path(path.as_ref())?;
    debug!("Loading liability inputs from {}", path.as_ref().display());
    read_bundle(reader)
}

/// Load and validate aligned inputs from any reader
pub fn load_bundle_from_reader<R: std::io::Read>(reader: R) -> Result<ValidatedBundle> {
    read_bundle(Reader::from_reader(reader))
}

fn read_bundle<R: std::io::Read>(mut reader: Reader<R>) -> Result<ValidatedBundle> {
    let mut cost = Vec::new();
    let mut count = Vec::new();
    let mut rate = Vec::new();

    for result in reader.deserialize() {
        let row: BundleRow = result?;
        cost.push((row.period, row.cost));
        count.push((row.period, row.count));
        rate.push((row.period, row.rate));
    }

    if cost.is_empty() {
        return Err(EngineError::insufficient("input file contains no periods"));
    }
    debug!("Read {} periods", cost.len());

    validate(
        TimeSeries::from_pairs(&cost)?,
        TimeSeries::from_pairs(&count)?,
        TimeSeries::from_pairs(&rate)?,
    )
}

/// Load a historical `year,value` series from a CSV file
pub fn load_historical<P: AsRef<Path>>(path: P) -> Result<HistoricalSeries> {
    let reader = Reader::from_path(path.as_ref())?;
    debug!("Loading historical series from {}", path.as_ref().display());
    read_historical(reader)
}

/// Load a historical `year,value` series from any reader
pub fn load_historical_from_reader<R: std::io::Read>(reader: R) -> Result<HistoricalSeries> {
    read_historical(Reader::from_reader(reader))
}

fn read_historical<R: std::io::Read>(mut reader: Reader<R>) -> Result<HistoricalSeries> {
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: HistoricalRow = result?;
        if !row.value.is_finite() {
            return Err(EngineError::invalid(format!(
                "historical value for {} is not finite",
                row.year
            )));
        }
        rows.push(row);
    }

    let base_year = rows
        .iter()
        .map(|r| r.year)
        .min()
        .ok_or_else(|| EngineError::insufficient("historical file contains no rows"))?;

    let pairs: Vec<(u32, f64)> = rows
        .iter()
        .map(|r| ((r.year - base_year) as u32, r.value))
        .collect();

    Ok(HistoricalSeries {
        base_year,
        series: TimeSeries::from_pairs(&pairs)?,
    })
}
