//! Registry of named scenarios
//!
//! Scenarios are registered once and never replaced. The built-in stress set
//! is compiled in from `data/scenarios/stress_scenarios.json`; any other file
//! with the same shape can be loaded at runtime instead.

use super::{Scenario, ScenarioDefinition};
use crate::error::{EngineError, Result};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Built-in stress scenario definitions
pub const BUILTIN_SCENARIOS_JSON: &str = include_str!("../../data/scenarios/stress_scenarios.json");

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    scenarios: Vec<Scenario>,
}

/// Registered scenarios in registration order
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in stress scenarios
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_SCENARIOS_JSON)
    }

    /// Load a catalog from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        debug!("Loading scenario catalog from {}", path.display());
        let file = File::open(path)?;
        let parsed: CatalogFile = serde_json::from_reader(BufReader::new(file))?;
        Self::from_scenarios(parsed.scenarios)
    }

    /// Load a catalog from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: CatalogFile = serde_json::from_str(json)?;
        Self::from_scenarios(parsed.scenarios)
    }

    fn from_scenarios(scenarios: Vec<Scenario>) -> Result<Self> {
        let mut catalog = Self::new();
        for scenario in scenarios {
            catalog.insert(scenario)?;
        }
        Ok(catalog)
    }

    /// Register a new scenario under `name`
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: ScenarioDefinition,
    ) -> Result<&Scenario> {
        self.insert(Scenario::new(name, definition)?)
    }

    fn insert(&mut self, scenario: Scenario) -> Result<&Scenario> {
        scenario.check()?;
        if self.contains(scenario.name()) {
            return Err(EngineError::DuplicateScenario(scenario.name().to_string()));
        }
        debug!(
            "Registered scenario '{}' with {} adjustments",
            scenario.name(),
            scenario.adjustments().len()
        );
        self.scenarios.push(scenario);
        Ok(&self.scenarios[self.scenarios.len() - 1])
    }

    pub fn get(&self, name: &str) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| EngineError::UnknownScenario(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenarios.iter().any(|s| s.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
