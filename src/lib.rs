//! Pilgrim Liability - risk engine for long-horizon pilgrim obligations
//!
//! This library provides:
//! - Validation of aligned cost, count and discount-rate series
//! - Present-value liability with a per-period breakdown
//! - Data-driven stress scenarios and a solvency stress suite
//! - One-at-a-time sensitivity sweeps
//! - Forecasting of historical series with confidence bounds
//! - Seeded, cancellable Monte Carlo simulation
//! - Aggregation of outcomes into VaR/CVaR risk summaries

pub mod aggregate;
pub mod config;
pub mod error;
pub mod forecast;
pub mod liability;
pub mod scenario;
pub mod sensitivity;
pub mod series;
pub mod simulation;
pub mod stats;

// Re-export commonly used types
pub use aggregate::{
    summarize, summarize_solvency, RiskAccumulator, RiskSummary, SolvencySummary, SummaryConfig,
};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use forecast::{project, ForecastModel, ForecastSeries, ModelSpec};
pub use liability::{compute_liability, LiabilityResult};
pub use scenario::{apply_scenario, Scenario, ScenarioCatalog};
pub use sensitivity::{analyze_sensitivity, PerturbationMode, SensitivityPoint};
pub use series::{validate, BaselineAssumptions, SeriesKind, TimeSeries, ValidatedBundle};
pub use simulation::{
    run_simulation, run_simulation_parallel, simulate, CancellationToken, DistributionSpec,
    SimulationBatch, SimulationRun,
};
