//! One-at-a-time sensitivity sweeps
//!
//! For every grid value the named parameter series is perturbed as a whole,
//! the other two series are held fixed and the calculator is rerun. The
//! analyzer only returns the raw `(perturbation, result)` pairs; elasticities
//! and percentage changes are derived from them by the helpers below.

use crate::error::{EngineError, Result};
use crate::liability::LiabilityResult;
use crate::series::{SeriesKind, TimeSeries, ValidatedBundle};
use crate::stats::mean;
use log::warn;
use serde::{Deserialize, Serialize};

/// How a grid value perturbs the parameter series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerturbationMode {
    /// value + grid point
    #[default]
    Additive,
    /// value × grid point
    Multiplicative,
}

impl PerturbationMode {
    pub fn apply(&self, value: f64, perturbation: f64) -> f64 {
        match self {
            PerturbationMode::Additive => value + perturbation,
            PerturbationMode::Multiplicative => value * perturbation,
        }
    }
}

/// Calculator output for one grid value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityPoint {
    pub parameter: SeriesKind,
    /// The grid value that was applied
    pub perturbation: f64,
    /// The perturbed parameter series fed to the calculator
    pub perturbed: TimeSeries,
    pub result: LiabilityResult,
}

impl SensitivityPoint {
    pub fn total(&self) -> f64 {
        self.result.total()
    }

    /// %ΔOutput / %ΔInput against the unperturbed bundle.
    ///
    /// The input change is measured on the mean of the parameter series.
    /// `None` when either base is zero or the input did not move.
    pub fn elasticity(&self, base: &ValidatedBundle, base_result: &LiabilityResult) -> Option<f64> {
        elasticity(
            mean(base.series(self.parameter).values()),
            base_result.total(),
            mean(self.perturbed.values()),
            self.total(),
        )
    }
}

/// Sweep one parameter (`"cost"`, `"count"` or `"rate"`) through `grid`
pub fn analyze_sensitivity(
    base: &ValidatedBundle,
    parameter: &str,
    grid: &[f64],
    mode: PerturbationMode,
) -> Result<Vec<SensitivityPoint>> {
    let kind: SeriesKind = parameter.parse()?;
    analyze_kind(base, kind, grid, mode)
}

/// Sweep several parameters, each through its own grid, in the given order
pub fn sweep(
    base: &ValidatedBundle,
    grids: &[(&str, Vec<f64>)],
    mode: PerturbationMode,
) -> Result<Vec<SensitivityPoint>> {
    let mut points = Vec::new();
    for (parameter, grid) in grids {
        points.extend(analyze_sensitivity(base, parameter, grid, mode)?);
    }
    Ok(points)
}

fn analyze_kind(
    base: &ValidatedBundle,
    kind: SeriesKind,
    grid: &[f64],
    mode: PerturbationMode,
) -> Result<Vec<SensitivityPoint>> {
    if grid.is_empty() {
        return Err(EngineError::insufficient(format!(
            "perturbation grid for {} is empty",
            kind
        )));
    }
    if let Some(bad) = grid.iter().find(|g| !g.is_finite()) {
        return Err(EngineError::invalid(format!(
            "perturbation grid for {} contains {}",
            kind, bad
        )));
    }

    let source = base.series(kind);
    let points = grid
        .iter()
        .map(|&perturbation| {
            let perturbed = source.map(|_, v| kind.normalize(mode.apply(v, perturbation)));
            let result = base.with_series(kind, perturbed.clone())?.liability();
            Ok(SensitivityPoint {
                parameter: kind,
                perturbation,
                perturbed,
                result,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if kind == SeriesKind::Rate && !is_non_increasing_in_rate(&points) {
        warn!("Liability increased with a pointwise higher rate series in sensitivity sweep");
    }

    Ok(points)
}

/// True if no pointwise-higher rate series produced a higher total.
///
/// Intended for the points of a rate sweep; pairs whose rate series are not
/// ordered pointwise are not compared.
pub fn is_non_increasing_in_rate(points: &[SensitivityPoint]) -> bool {
    points.iter().all(|lower| {
        points.iter().all(|higher| {
            let dominates = higher
                .perturbed
                .values()
                .iter()
                .zip(lower.perturbed.values())
                .all(|(h, l)| h >= l);
            !dominates || higher.total() <= lower.total()
        })
    })
}

/// Percentage change of `value` relative to `base`
pub fn change_percent(base: f64, value: f64) -> f64 {
    (value - base) / base * 100.0
}

/// Proportional change in output per proportional change in input
pub fn elasticity(base_input: f64, base_output: f64, input: f64, output: f64) -> Option<f64> {
    if base_input == 0.0 || base_output == 0.0 || input == base_input {
        return None;
    }
    let input_change = (input - base_input) / base_input;
    let output_change = (output - base_output) / base_output;
    Some(output_change / input_change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{validate, BaselineAssumptions};
    use approx::assert_relative_eq;

    fn small_bundle() -> ValidatedBundle {
        validate(
            TimeSeries::from_values(vec![100.0, 110.0, 121.0]),
            TimeSeries::from_values(vec![1_000.0, 1_000.0, 1_000.0]),
            TimeSeries::from_values(vec![0.05, 0.05, 0.05]),
        )
        .unwrap()
    }

    #[test]
    fn test_returns_one_point_per_grid_value_in_order() {
        let base = small_bundle();
        let grid = [0.9, 1.0, 1.1];
        let points =
            analyze_sensitivity(&base, "cost", &grid, PerturbationMode::Multiplicative).unwrap();

        assert_eq!(points.len(), 3);
        for (point, g) in points.iter().zip(grid) {
            assert_eq!(point.perturbation, g);
            assert_eq!(point.parameter, SeriesKind::Cost);
        }
        assert_eq!(points[1].result, base.liability());
    }

    #[test]
    fn test_other_series_held_fixed() {
        let base = small_bundle();
        let points =
            analyze_sensitivity(&base, "count", &[2.0], PerturbationMode::Multiplicative).unwrap();
        let row = &points[0].result.breakdown()[0];
        assert_eq!(row.cost, 100.0);
        assert_eq!(row.count, 2_000.0);
        assert_relative_eq!(points[0].total(), base.liability().total() * 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rate_monotonicity_verified() {
        let base = BaselineAssumptions::default_baseline().bundle().unwrap();
        let grid: Vec<f64> = (-4..=6).map(|i| i as f64 * 0.01).collect();
        let points = analyze_sensitivity(&base, "rate", &grid, PerturbationMode::Additive).unwrap();

        assert!(is_non_increasing_in_rate(&points));
        for pair in points.windows(2) {
            assert!(pair[1].total() < pair[0].total());
        }
    }

    #[test]
    fn test_cost_elasticity_is_one() {
        let base = small_bundle();
        let base_result = base.liability();
        let points =
            analyze_sensitivity(&base, "cost", &[1.1], PerturbationMode::Multiplicative).unwrap();
        let e = points[0].elasticity(&base, &base_result).unwrap();
        assert_relative_eq!(e, 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_unknown_parameter_and_bad_grid() {
        let base = small_bundle();
        assert!(matches!(
            analyze_sensitivity(&base, "inflation", &[1.0], PerturbationMode::Additive),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(matches!(
            analyze_sensitivity(&base, "rate", &[], PerturbationMode::Additive),
            Err(EngineError::InsufficientData(_))
        ));
        assert!(matches!(
            analyze_sensitivity(&base, "rate", &[-1.5], PerturbationMode::Additive),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_sweep_concatenates_parameters() {
        let base = small_bundle();
        let points = sweep(
            &base,
            &[("cost", vec![0.9, 1.1]), ("rate", vec![0.8, 1.0, 1.2])],
            PerturbationMode::Multiplicative,
        )
        .unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].parameter, SeriesKind::Cost);
        assert_eq!(points[4].parameter, SeriesKind::Rate);
    }

    #[test]
    fn test_change_percent_and_elasticity_helpers() {
        assert_relative_eq!(change_percent(200.0, 250.0), 25.0);
        assert_eq!(elasticity(0.0, 1.0, 1.0, 2.0), None);
        assert_eq!(elasticity(1.0, 1.0, 1.0, 2.0), None);
        assert_relative_eq!(elasticity(1.0, 10.0, 1.1, 12.0).unwrap(), 2.0, max_relative = 1e-9);
    }
}
