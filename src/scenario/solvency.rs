//! Stress suite with solvency classification
//!
//! Each scenario stresses the liability through its adjustments and the asset
//! side through its `asset_factor`. The solvency ratio is assets / liability.

use super::{apply_scenario, ScenarioCatalog};
use crate::error::{EngineError, Result};
use crate::series::ValidatedBundle;
use serde::{Deserialize, Serialize};

/// Ratio cut-offs for the solvency status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolvencyThresholds {
    /// Ratio at or above which the fund is safe
    pub safe: f64,
    /// Ratio at or above which the fund is on watch
    pub watch: f64,
}

impl Default for SolvencyThresholds {
    fn default() -> Self {
        Self {
            safe: 1.2,
            watch: 1.0,
        }
    }
}

impl SolvencyThresholds {
    pub fn classify(&self, ratio: f64) -> SolvencyStatus {
        if ratio >= self.safe {
            SolvencyStatus::Safe
        } else if ratio >= self.watch {
            SolvencyStatus::Watch
        } else {
            SolvencyStatus::HighRisk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolvencyStatus {
    Safe,
    Watch,
    HighRisk,
}

/// Outcome of one scenario in the stress suite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressOutcome {
    pub scenario: String,
    pub description: String,
    pub liability: f64,
    pub assets: f64,
    /// Assets / liability; infinite when the stressed liability is zero
    pub solvency_ratio: f64,
    pub status: SolvencyStatus,
    /// Change in liability relative to the unstressed bundle, percent
    pub liability_change_pct: f64,
}

/// Run every scenario in the catalog against `base` and `base_assets`
pub fn run_stress_suite(
    base: &ValidatedBundle,
    catalog: &ScenarioCatalog,
    base_assets: f64,
    thresholds: &SolvencyThresholds,
) -> Result<Vec<StressOutcome>> {
    if !base_assets.is_finite() || base_assets < 0.0 {
        return Err(EngineError::invalid(format!(
            "base assets must be finite and non-negative ({})",
            base_assets
        )));
    }

    let base_liability = base.liability().total();

    catalog
        .iter()
        .map(|scenario| {
            let liability = apply_scenario(base, scenario)?.liability().total();
            let assets = base_assets * scenario.asset_factor();
            let solvency_ratio = if liability > 0.0 {
                assets / liability
            } else {
                f64::INFINITY
            };
            let liability_change_pct = if base_liability > 0.0 {
                (liability - base_liability) / base_liability * 100.0
            } else {
                0.0
            };

            Ok(StressOutcome {
                scenario: scenario.name().to_string(),
                description: scenario.description().to_string(),
                liability,
                assets,
                solvency_ratio,
                status: thresholds.classify(solvency_ratio),
                liability_change_pct,
            })
        })
        .collect()
}
