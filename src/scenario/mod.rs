//! Stress scenarios as data
//!
//! A [`Scenario`] is an immutable, named list of adjustments. Each adjustment
//! targets one series, selects a set of periods and applies one operator:
//!
//! - `shift`: add a delta
//! - `scale`: multiply by a factor
//! - `override`: replace the value
//!
//! Adjustments resolve in declared order, each one operating on the output of
//! the ones before it, so a later operator on the same period wins. Applying
//! a scenario always builds new series; the base bundle is never touched.
//!
//! Scenario definitions live in JSON (see `data/scenarios/stress_scenarios.json`)
//! and are loaded into a [`ScenarioCatalog`].

mod catalog;
pub mod solvency;

pub use catalog::{ScenarioCatalog, BUILTIN_SCENARIOS_JSON};
pub use solvency::{run_stress_suite, SolvencyStatus, SolvencyThresholds, StressOutcome};

use crate::error::{EngineError, Result};
use crate::series::{validate, SeriesKind, TimeSeries, ValidatedBundle};
use serde::{Deserialize, Serialize};

/// Operator applied to each selected value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentOp {
    /// Additive delta
    Shift(f64),
    /// Multiplicative factor
    Scale(f64),
    /// Replacement value
    Override(f64),
}

impl AdjustmentOp {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            AdjustmentOp::Shift(delta) => value + delta,
            AdjustmentOp::Scale(factor) => value * factor,
            AdjustmentOp::Override(replacement) => replacement,
        }
    }

    fn operand(&self) -> f64 {
        match *self {
            AdjustmentOp::Shift(x) | AdjustmentOp::Scale(x) | AdjustmentOp::Override(x) => x,
        }
    }
}

/// Periods an adjustment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSelector {
    #[default]
    All,
    /// Inclusive range of absolute period indices
    Range { from: u32, to: u32 },
}

impl PeriodSelector {
    pub fn contains(&self, period: u32) -> bool {
        match *self {
            PeriodSelector::All => true,
            PeriodSelector::Range { from, to } => (from..=to).contains(&period),
        }
    }
}

/// One perturbation of one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub target: SeriesKind,
    pub op: AdjustmentOp,
    #[serde(default)]
    pub periods: PeriodSelector,
}

impl Adjustment {
    pub fn new(target: SeriesKind, op: AdjustmentOp) -> Self {
        Self {
            target,
            op,
            periods: PeriodSelector::All,
        }
    }

    /// Restrict to an inclusive period range
    pub fn between(mut self, from: u32, to: u32) -> Self {
        self.periods = PeriodSelector::Range { from, to };
        self
    }
}

fn default_asset_factor() -> f64 {
    1.0
}

/// Everything about a scenario except its name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    #[serde(default)]
    pub description: String,

    /// Multiplier on the asset side, used by the solvency stress suite
    #[serde(default = "default_asset_factor")]
    pub asset_factor: f64,

    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

impl ScenarioDefinition {
    pub fn new(description: impl Into<String>, adjustments: Vec<Adjustment>) -> Self {
        Self {
            description: description.into(),
            asset_factor: 1.0,
            adjustments,
        }
    }

    pub fn with_asset_factor(mut self, asset_factor: f64) -> Self {
        self.asset_factor = asset_factor;
        self
    }
}

/// Named, immutable stress scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    name: String,
    #[serde(flatten)]
    definition: ScenarioDefinition,
}

impl Scenario {
    /// Build a scenario, rejecting non-finite operands and inverted ranges
    pub fn new(name: impl Into<String>, definition: ScenarioDefinition) -> Result<Self> {
        let scenario = Self {
            name: name.into(),
            definition,
        };
        scenario.check()?;
        Ok(scenario)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid("scenario name must not be empty"));
        }
        if !self.definition.asset_factor.is_finite() || self.definition.asset_factor < 0.0 {
            return Err(EngineError::invalid(format!(
                "scenario '{}' has invalid asset factor {}",
                self.name, self.definition.asset_factor
            )));
        }
        for (i, adj) in self.definition.adjustments.iter().enumerate() {
            if !adj.op.operand().is_finite() {
                return Err(EngineError::invalid(format!(
                    "scenario '{}' adjustment {} has a non-finite operand",
                    self.name, i
                )));
            }
            if let PeriodSelector::Range { from, to } = adj.periods {
                if from > to {
                    return Err(EngineError::invalid(format!(
                        "scenario '{}' adjustment {} has range {}..={}",
                        self.name, i, from, to
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.definition.description
    }

    pub fn asset_factor(&self) -> f64 {
        self.definition.asset_factor
    }

    pub fn adjustments(&self) -> &[Adjustment] {
        &self.definition.adjustments
    }

    /// Apply this scenario's adjustments for `kind` to a single series.
    ///
    /// Returns a new series; counts are rounded to whole pilgrims after all
    /// adjustments have resolved.
    pub fn apply_to(&self, series: &TimeSeries, kind: SeriesKind) -> TimeSeries {
        let start = series.start();
        let mut values = series.values().to_vec();

        for adj in self.adjustments().iter().filter(|a| a.target == kind) {
            for (offset, value) in values.iter_mut().enumerate() {
                if adj.periods.contains(start + offset as u32) {
                    *value = adj.op.apply(*value);
                }
            }
        }

        TimeSeries::new(start, values.into_iter().map(|v| kind.normalize(v)).collect())
    }
}

/// Apply a scenario to a whole bundle, producing a new validated bundle
pub fn apply_scenario(base: &ValidatedBundle, scenario: &Scenario) -> Result<ValidatedBundle> {
    validate(
        scenario.apply_to(base.cost(), SeriesKind::Cost),
        scenario.apply_to(base.count(), SeriesKind::Count),
        scenario.apply_to(base.rate(), SeriesKind::Rate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_bundle() -> ValidatedBundle {
        validate(
            TimeSeries::from_values(vec![100.0, 100.0, 100.0]),
            TimeSeries::from_values(vec![10.0, 10.0, 10.0]),
            TimeSeries::from_values(vec![0.05, 0.05, 0.05]),
        )
        .unwrap()
    }

    fn scenario(adjustments: Vec<Adjustment>) -> Scenario {
        Scenario::new("test", ScenarioDefinition::new("", adjustments)).unwrap()
    }

    #[test]
    fn test_operators() {
        assert_eq!(AdjustmentOp::Shift(2.0).apply(3.0), 5.0);
        assert_eq!(AdjustmentOp::Scale(2.0).apply(3.0), 6.0);
        assert_eq!(AdjustmentOp::Override(7.0).apply(3.0), 7.0);
    }

    #[test]
    fn test_declared_order_later_wins() {
        let s = scenario(vec![
            Adjustment::new(SeriesKind::Cost, AdjustmentOp::Override(50.0)).between(1, 1),
            Adjustment::new(SeriesKind::Cost, AdjustmentOp::Scale(2.0)),
            Adjustment::new(SeriesKind::Cost, AdjustmentOp::Override(1.0)).between(2, 2),
        ]);
        let adjusted = apply_scenario(&base_bundle(), &s).unwrap();
        assert_eq!(adjusted.cost().values(), &[200.0, 100.0, 1.0]);
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = base_bundle();
        let snapshot = base.clone();
        let s = scenario(vec![
            Adjustment::new(SeriesKind::Cost, AdjustmentOp::Scale(3.0)),
            Adjustment::new(SeriesKind::Count, AdjustmentOp::Shift(5.0)),
            Adjustment::new(SeriesKind::Rate, AdjustmentOp::Override(0.1)),
        ]);
        let adjusted = apply_scenario(&base, &s).unwrap();
        assert_eq!(base, snapshot);
        assert_ne!(adjusted, base);
    }

    #[test]
    fn test_counts_rounded() {
        let s = scenario(vec![Adjustment::new(SeriesKind::Count, AdjustmentOp::Scale(1.16))]);
        let adjusted = apply_scenario(&base_bundle(), &s).unwrap();
        assert_eq!(adjusted.count().values(), &[12.0, 12.0, 12.0]);
    }

    #[test]
    fn test_rate_pushed_out_of_domain_fails() {
        let s = scenario(vec![Adjustment::new(SeriesKind::Rate, AdjustmentOp::Shift(-1.05))]);
        let err = apply_scenario(&base_bundle(), &s).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }

    #[test]
    fn test_invalid_definitions_rejected() {
        let nan = Scenario::new(
            "nan",
            ScenarioDefinition::new("", vec![Adjustment::new(SeriesKind::Cost, AdjustmentOp::Scale(f64::NAN))]),
        );
        assert!(nan.is_err());

        let inverted = Scenario::new(
            "inverted",
            ScenarioDefinition::new(
                "",
                vec![Adjustment::new(SeriesKind::Cost, AdjustmentOp::Scale(1.1)).between(3, 1)],
            ),
        );
        assert!(inverted.is_err());
    }

    #[test]
    fn test_adjustment_json_shape() {
        let json = r#"{"target": "rate", "op": {"shift": -0.01}, "periods": {"range": {"from": 0, "to": 4}}}"#;
        let adj: Adjustment = serde_json::from_str(json).unwrap();
        assert_eq!(adj.target, SeriesKind::Rate);
        assert_eq!(adj.op, AdjustmentOp::Shift(-0.01));
        assert!(adj.periods.contains(4));
        assert!(!adj.periods.contains(5));

        let all: Adjustment = serde_json::from_str(r#"{"target": "cost", "op": {"scale": 1.1}}"#).unwrap();
        assert_eq!(all.periods, PeriodSelector::All);
    }
}
