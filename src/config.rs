//! Engine configuration
//!
//! Every section has defaults, so a config file only needs the values that
//! differ:
//!
//! ```json
//! {
//!   "simulation": { "iterations": 20000, "workers": 4 },
//!   "forecast": { "model": { "model": "autoregressive", "order": 2 } }
//! }
//! ```

use crate::aggregate::SummaryConfig;
use crate::error::Result;
use crate::forecast::{ModelSpec, DEFAULT_CONFIDENCE};
use crate::scenario::SolvencyThresholds;
use crate::series::{BaselineAssumptions, SeriesKind};
use crate::simulation::{CorrelationMatrix, Distribution, DistributionSpec, SimulationConfig};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Forecast settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub model: ModelSpec,
    pub confidence: f64,
    /// Periods to project beyond the history
    pub horizon: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelSpec::default(),
            confidence: DEFAULT_CONFIDENCE,
            horizon: 5,
        }
    }
}

/// Stochastic inputs for the simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticConfig {
    pub specs: Vec<DistributionSpec>,
    pub correlation: Option<CorrelationMatrix>,
    /// Factor on the base assets per iteration; `null` holds assets fixed
    pub asset_factor: Option<Distribution>,
}

impl Default for StochasticConfig {
    /// Cost factor ~ N(1, 0.15), rate shift ~ N(0, 0.005), asset factor ~ N(1, 0.10)
    fn default() -> Self {
        Self {
            specs: vec![
                DistributionSpec::new(
                    "cost_factor",
                    SeriesKind::Cost,
                    Distribution::Normal {
                        mean: 1.0,
                        std_dev: 0.15,
                    },
                ),
                DistributionSpec::new(
                    "rate_shift",
                    SeriesKind::Rate,
                    Distribution::Normal {
                        mean: 0.0,
                        std_dev: 0.005,
                    },
                )
                .shift(),
            ],
            correlation: None,
            asset_factor: Some(Distribution::Normal {
                mean: 1.0,
                std_dev: 0.10,
            }),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub baseline: BaselineAssumptions,
    /// Fund assets backing the liability, currency units
    pub base_assets: f64,
    pub simulation: SimulationConfig,
    pub stochastic: StochasticConfig,
    pub summary: SummaryConfig,
    pub forecast: ForecastConfig,
    pub solvency: SolvencyThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline: BaselineAssumptions::default_baseline(),
            base_assets: 180.5e12,
            simulation: SimulationConfig::default(),
            stochastic: StochasticConfig::default(),
            summary: SummaryConfig::default(),
            forecast: ForecastConfig::default(),
            solvency: SolvencyThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_path(path: &Path) -> Result<Self> {
        debug!("Loading engine configuration from {}", path.display());
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.baseline.total_pilgrims, 2_500_000);
        assert_eq!(config.baseline.horizon_years, 20);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.summary.confidence_levels, vec![0.95, 0.99]);
        assert_eq!(config.forecast.confidence, 0.95);
        assert_eq!(config.solvency.safe, 1.2);
        assert_eq!(config.base_assets, 180.5e12);
        assert_eq!(config.stochastic.specs.len(), 2);
        assert_eq!(
            config.stochastic.asset_factor,
            Some(Distribution::Normal {
                mean: 1.0,
                std_dev: 0.10
            })
        );
    }

    #[test]
    fn test_asset_factor_can_be_disabled() {
        let config = EngineConfig::from_json_str(r#"{ "stochastic": { "asset_factor": null } }"#).unwrap();
        assert_eq!(config.stochastic.asset_factor, None);
        assert_eq!(config.stochastic.specs.len(), 2);

        let json = r#"{ "stochastic": { "asset_factor": { "family": "log_normal", "mu": 0.0, "sigma": 0.1 } } }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(
            config.stochastic.asset_factor,
            Some(Distribution::LogNormal { mu: 0.0, sigma: 0.1 })
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "simulation": { "iterations": 500, "workers": 4 },
            "forecast": { "model": { "model": "autoregressive", "order": 2 } },
            "baseline": { "discount_rate": 0.05 }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.simulation.iterations, 500);
        assert_eq!(config.simulation.workers, 4);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.forecast.model, ModelSpec::Autoregressive { order: 2 });
        assert_eq!(config.forecast.horizon, 5);
        assert_eq!(config.baseline.discount_rate, 0.05);
        assert_eq!(config.baseline.base_cost, 94_482_028.0);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(EngineConfig::from_json_str("{ not json").is_err());
    }
}
