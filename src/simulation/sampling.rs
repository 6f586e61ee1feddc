//! Stochastic inputs for the simulator
//!
//! Every spec is driven by one standard normal draw. Correlation is imposed on
//! the normals through the Cholesky factor of the correlation matrix and each
//! draw is then mapped to its family, so uniform inputs are correlated through
//! a Gaussian copula.

use crate::error::{EngineError, Result};
use crate::series::{SeriesKind, TimeSeries};
use crate::stats::normal_cdf;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution as _, StandardNormal};
use serde::{Deserialize, Serialize};

/// Distribution family and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64 },
    /// `exp(mu + sigma·z)`
    LogNormal { mu: f64, sigma: f64 },
    Uniform { low: f64, high: f64 },
}

impl Distribution {
    /// Point mass at `value`
    pub fn fixed(value: f64) -> Self {
        Distribution::Normal {
            mean: value,
            std_dev: 0.0,
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        let ok = match *self {
            Distribution::Normal { mean, std_dev } => {
                mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0
            }
            Distribution::LogNormal { mu, sigma } => {
                mu.is_finite() && sigma.is_finite() && sigma >= 0.0
            }
            Distribution::Uniform { low, high } => low.is_finite() && high.is_finite() && low <= high,
        };
        if ok {
            Ok(())
        } else {
            Err(EngineError::invalid(format!("invalid distribution parameters {:?}", self)))
        }
    }

    /// Map a standard normal draw to this family
    pub fn from_standard_normal(&self, z: f64) -> f64 {
        match *self {
            Distribution::Normal { mean, std_dev } => mean + std_dev * z,
            Distribution::LogNormal { mu, sigma } => (mu + sigma * z).exp(),
            Distribution::Uniform { low, high } => low + (high - low) * normal_cdf(z),
        }
    }

    /// One independent draw
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let z: f64 = StandardNormal.sample(rng);
        self.from_standard_normal(z)
    }
}

/// How a sample perturbs its target series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    /// Multiply every period by the sample
    #[default]
    Scale,
    /// Add the sample to every period
    Shift,
}

impl Application {
    pub fn apply(&self, value: f64, sample: f64) -> f64 {
        match self {
            Application::Scale => value * sample,
            Application::Shift => value + sample,
        }
    }
}

/// One stochastic input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    pub name: String,
    pub target: SeriesKind,
    pub distribution: Distribution,
    #[serde(default)]
    pub application: Application,
}

impl DistributionSpec {
    pub fn new(name: impl Into<String>, target: SeriesKind, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            target,
            distribution,
            application: Application::Scale,
        }
    }

    pub fn shift(mut self) -> Self {
        self.application = Application::Shift;
        self
    }

    /// Perturb `series` with `sample`, rounding counts
    pub fn perturb(&self, series: &TimeSeries, sample: f64) -> TimeSeries {
        series.map(|_, v| self.target.normalize(self.application.apply(v, sample)))
    }
}

/// Symmetric correlation matrix across specs, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn new(dim: usize, values: Vec<f64>) -> Result<Self> {
        let matrix = Self { dim, values };
        matrix.check()?;
        Ok(matrix)
    }

    pub fn identity(dim: usize) -> Self {
        let mut values = vec![0.0; dim * dim];
        for i in 0..dim {
            values[i * dim + i] = 1.0;
        }
        Self { dim, values }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.dim + col]
    }

    fn check(&self) -> Result<()> {
        if self.values.len() != self.dim * self.dim {
            return Err(EngineError::invalid(format!(
                "correlation matrix of dimension {} needs {} entries, got {}",
                self.dim,
                self.dim * self.dim,
                self.values.len()
            )));
        }
        for i in 0..self.dim {
            if self.get(i, i) != 1.0 {
                return Err(EngineError::invalid("correlation diagonal must be 1"));
            }
            for j in 0..i {
                let rho = self.get(i, j);
                if !rho.is_finite() || rho.abs() > 1.0 || rho != self.get(j, i) {
                    return Err(EngineError::invalid(format!(
                        "correlation entry ({}, {}) is invalid",
                        i, j
                    )));
                }
            }
        }
        Ok(())
    }

    /// Lower Cholesky factor; fails if the matrix is not positive definite
    fn cholesky(&self) -> Result<DMatrix<f64>> {
        let m = DMatrix::from_row_slice(self.dim, self.dim, &self.values);
        m.cholesky()
            .map(|c| c.l())
            .ok_or_else(|| EngineError::invalid("correlation matrix is not positive definite"))
    }
}

/// Draws one sample per spec from a caller-supplied generator
#[derive(Debug, Clone)]
pub struct Sampler {
    specs: Vec<DistributionSpec>,
    cholesky: Option<DMatrix<f64>>,
}

impl Sampler {
    pub fn new(specs: Vec<DistributionSpec>, correlation: Option<&CorrelationMatrix>) -> Result<Self> {
        for spec in &specs {
            spec.distribution.check().map_err(|_| {
                EngineError::invalid(format!(
                    "distribution '{}' has invalid parameters {:?}",
                    spec.name, spec.distribution
                ))
            })?;
        }

        let cholesky = match correlation {
            Some(corr) if corr.dim() != specs.len() => {
                return Err(EngineError::MisalignedSeries(format!(
                    "correlation matrix has dimension {} for {} specs",
                    corr.dim(),
                    specs.len()
                )))
            }
            Some(corr) => {
                corr.check()?;
                Some(corr.cholesky()?)
            }
            None => None,
        };

        Ok(Self { specs, cholesky })
    }

    pub fn specs(&self) -> &[DistributionSpec] {
        &self.specs
    }

    /// One sample per spec, in spec order
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let z: Vec<f64> = self
            .specs
            .iter()
            .map(|_| -> f64 { StandardNormal.sample(&mut *rng) })
            .collect();

        let z = match &self.cholesky {
            Some(l) => (l * DVector::from_vec(z)).iter().copied().collect(),
            None => z,
        };

        self.specs
            .iter()
            .zip(z)
            .map(|(spec, z)| spec.distribution.from_standard_normal(z))
            .collect()
    }
}
