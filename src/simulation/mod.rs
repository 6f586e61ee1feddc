//! Monte Carlo simulator
//!
//! Each iteration owns its generator: a `ChaCha8Rng` seeded from the caller's
//! seed with the iteration index as stream number. An iteration therefore
//! depends only on `(seed, index, base bundle)` and the output is the same
//! whether iterations run lazily through a [`SimulationStream`], in one batch
//! or spread over a rayon pool.
//!
//! Iterations that produce a non-finite sample or a bundle that fails
//! validation are skipped and counted. Once the skipped share of the requested
//! iterations exceeds `max_failure_fraction` the run fails with
//! [`EngineError::BatchFailure`]. A cancellation token is polled between
//! iterations; cancelling yields a batch marked [`BatchStatus::Partial`].
//!
//! An optional asset factor is drawn after the spec samples from the same
//! generator and recorded on the run, so solvency can be assessed against
//! stochastic assets.

mod sampling;

pub use sampling::{Application, CorrelationMatrix, Distribution, DistributionSpec, Sampler};

use crate::error::{EngineError, Result};
use crate::liability::LiabilityResult;
use crate::series::{SeriesKind, ValidatedBundle};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Run settings, usually read from the engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub iterations: u64,
    pub seed: u64,
    /// Worker threads; 1 runs on the calling thread
    pub workers: usize,
    /// Largest tolerated share of skipped iterations, in [0, 1]
    pub max_failure_fraction: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            seed: 42,
            workers: 1,
            max_failure_fraction: 0.05,
        }
    }
}

/// Cooperative cancellation flag shared with the simulator
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A sampled input value for one iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampledParameter {
    pub name: String,
    pub target: SeriesKind,
    pub value: f64,
}

/// Liability for one iteration, tagged with what was sampled
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub iteration: u64,
    pub samples: Vec<SampledParameter>,
    /// Multiplier on the base assets; 1 when assets are not simulated
    pub asset_factor: f64,
    pub result: LiabilityResult,
}

impl SimulationRun {
    pub fn total(&self) -> f64 {
        self.result.total()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Complete,
    /// Cancelled before every requested iteration was attempted
    Partial,
}

/// Collected runs of one simulation call
#[derive(Debug, Clone, Serialize)]
pub struct SimulationBatch {
    pub status: BatchStatus,
    pub requested: u64,
    pub attempted: u64,
    pub skipped: u64,
    completed: u64,
    /// Completed runs in iteration order. A batch drained from a stream holds
    /// only the runs the stream had not yet yielded.
    pub runs: Vec<SimulationRun>,
}

impl SimulationBatch {
    /// Iterations that produced a run; `completed + skipped == attempted`
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn is_partial(&self) -> bool {
        self.status == BatchStatus::Partial
    }

    pub fn totals(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.total()).collect()
    }
}

/// A base bundle with its stochastic inputs, ready to run
#[derive(Debug, Clone)]
pub struct MonteCarlo<'a> {
    base: &'a ValidatedBundle,
    sampler: Sampler,
    asset_factor: Option<Distribution>,
    max_failure_fraction: f64,
}

impl<'a> MonteCarlo<'a> {
    pub fn new(
        base: &'a ValidatedBundle,
        specs: Vec<DistributionSpec>,
        correlation: Option<&CorrelationMatrix>,
    ) -> Result<Self> {
        Ok(Self {
            base,
            sampler: Sampler::new(specs, correlation)?,
            asset_factor: None,
            max_failure_fraction: SimulationConfig::default().max_failure_fraction,
        })
    }

    pub fn with_max_failure_fraction(mut self, fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(EngineError::invalid(format!(
                "max_failure_fraction must lie in [0, 1], got {}",
                fraction
            )));
        }
        self.max_failure_fraction = fraction;
        Ok(self)
    }

    /// Draw a factor on the base assets in every iteration
    pub fn with_asset_factor(mut self, distribution: Distribution) -> Result<Self> {
        distribution.check().map_err(|_| {
            EngineError::invalid(format!(
                "asset factor has invalid parameters {:?}",
                distribution
            ))
        })?;
        self.asset_factor = Some(distribution);
        Ok(self)
    }

    /// Run one iteration
    pub fn iteration(&self, seed: u64, index: u64) -> Result<SimulationRun> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(index);

        let values = self.sampler.sample(&mut rng);
        let mut bundle = self.base.clone();
        let mut samples = Vec::with_capacity(values.len());

        for (spec, value) in self.sampler.specs().iter().zip(values) {
            if !value.is_finite() {
                return Err(EngineError::invalid(format!(
                    "'{}' sampled a non-finite value in iteration {}",
                    spec.name, index
                )));
            }
            let perturbed = spec.perturb(bundle.series(spec.target), value);
            bundle = bundle.with_series(spec.target, perturbed)?;
            samples.push(SampledParameter {
                name: spec.name.clone(),
                target: spec.target,
                value,
            });
        }

        let asset_factor = match &self.asset_factor {
            Some(distribution) => {
                let factor = distribution.sample(&mut rng);
                if !factor.is_finite() || factor < 0.0 {
                    return Err(EngineError::invalid(format!(
                        "asset factor {} in iteration {} is not a finite non-negative value",
                        factor, index
                    )));
                }
                factor
            }
            None => 1.0,
        };

        Ok(SimulationRun {
            iteration: index,
            samples,
            asset_factor,
            result: bundle.liability(),
        })
    }

    /// Lazy sequence of runs
    pub fn stream(&self, iterations: u64, seed: u64, token: &CancellationToken) -> SimulationStream<'a> {
        info!("Starting simulation: {} iterations, seed {}", iterations, seed);
        SimulationStream {
            plan: self.clone(),
            seed,
            requested: iterations,
            next: 0,
            skipped: 0,
            completed: 0,
            token: token.clone(),
            cancelled: false,
            failed: false,
        }
    }

    /// Run every iteration on the calling thread
    pub fn run(&self, iterations: u64, seed: u64, token: &CancellationToken) -> Result<SimulationBatch> {
        self.stream(iterations, seed, token).into_batch()
    }

    /// Run on `workers` threads; runs come back in iteration order
    pub fn run_parallel(
        &self,
        iterations: u64,
        seed: u64,
        workers: usize,
        token: &CancellationToken,
    ) -> Result<SimulationBatch> {
        if workers == 0 {
            return Err(EngineError::invalid("workers must be at least 1"));
        }
        if workers == 1 {
            return self.run(iterations, seed, token);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EngineError::invalid(format!("cannot build worker pool: {}", e)))?;

        info!(
            "Starting simulation: {} iterations, seed {}, {} workers",
            iterations, seed, workers
        );

        let limit = self.failure_limit(iterations);
        let skipped = AtomicU64::new(0);
        let chunk = iterations.div_ceil(workers as u64).max(1);
        let ranges: Vec<Range<u64>> = (0..iterations)
            .step_by(chunk as usize)
            .map(|lo| lo..(lo + chunk).min(iterations))
            .collect();

        let chunks: Vec<ChunkOutcome> = pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| self.run_chunk(range, seed, token, &skipped, limit))
                .collect()
        });

        let mut runs = Vec::new();
        let mut attempted = 0;
        let mut cancelled = false;
        for chunk in chunks {
            attempted += chunk.attempted;
            cancelled |= chunk.cancelled;
            runs.extend(chunk.runs);
        }

        let completed = runs.len() as u64;
        self.finish(iterations, attempted, skipped.into_inner(), completed, cancelled, runs)
    }

    /// Dispatch on the configured worker count
    pub fn run_with(&self, config: &SimulationConfig, token: &CancellationToken) -> Result<SimulationBatch> {
        self.run_parallel(config.iterations, config.seed, config.workers, token)
    }

    fn run_chunk(
        &self,
        range: Range<u64>,
        seed: u64,
        token: &CancellationToken,
        skipped: &AtomicU64,
        limit: u64,
    ) -> ChunkOutcome {
        let mut outcome = ChunkOutcome::default();
        for index in range {
            if token.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            if skipped.load(Ordering::Relaxed) > limit {
                break;
            }
            outcome.attempted += 1;
            match self.iteration(seed, index) {
                Ok(run) => outcome.runs.push(run),
                Err(e) => {
                    debug!("Skipping iteration {}: {}", index, e);
                    skipped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        outcome
    }

    /// Most skipped iterations tolerated out of `requested`
    fn failure_limit(&self, requested: u64) -> u64 {
        (self.max_failure_fraction * requested as f64).floor() as u64
    }

    fn batch_failure(&self, skipped: u64, attempted: u64) -> EngineError {
        warn!("Simulation failed: {} of {} iterations skipped", skipped, attempted);
        EngineError::BatchFailure {
            skipped,
            attempted,
            threshold: self.max_failure_fraction * 100.0,
        }
    }

    fn finish(
        &self,
        requested: u64,
        attempted: u64,
        skipped: u64,
        completed: u64,
        cancelled: bool,
        runs: Vec<SimulationRun>,
    ) -> Result<SimulationBatch> {
        if skipped > self.failure_limit(requested) {
            return Err(self.batch_failure(skipped, attempted));
        }
        let status = if cancelled && attempted < requested {
            info!("Simulation cancelled after {} of {} iterations", attempted, requested);
            BatchStatus::Partial
        } else {
            BatchStatus::Complete
        };
        info!("Simulation finished: {} runs, {} skipped", completed, skipped);
        Ok(SimulationBatch {
            status,
            requested,
            attempted,
            skipped,
            completed,
            runs,
        })
    }
}

#[derive(Default)]
struct ChunkOutcome {
    runs: Vec<SimulationRun>,
    attempted: u64,
    cancelled: bool,
}

/// Lazily produced simulation runs.
///
/// Yields `Ok(run)` per completed iteration and stops at the requested count
/// or on cancellation. Skipped iterations are not yielded; if they exceed the
/// failure threshold a single `Err(BatchFailure)` is yielded and the stream
/// ends. The sequence can only be replayed by building a new stream with the
/// same seed.
pub struct SimulationStream<'a> {
    plan: MonteCarlo<'a>,
    seed: u64,
    requested: u64,
    next: u64,
    skipped: u64,
    completed: u64,
    token: CancellationToken,
    cancelled: bool,
    failed: bool,
}

impl<'a> SimulationStream<'a> {
    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn attempted(&self) -> u64 {
        self.next
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn status(&self) -> BatchStatus {
        if self.cancelled && self.next < self.requested {
            BatchStatus::Partial
        } else {
            BatchStatus::Complete
        }
    }

    /// Drain the remaining iterations into a batch. Runs already yielded
    /// are counted in `completed` but not repeated in `runs`.
    pub fn into_batch(mut self) -> Result<SimulationBatch> {
        let mut runs = Vec::new();
        for item in self.by_ref() {
            runs.push(item?);
        }
        self.plan.finish(
            self.requested,
            self.next,
            self.skipped,
            self.completed,
            self.cancelled,
            runs,
        )
    }
}

impl Iterator for SimulationStream<'_> {
    type Item = Result<SimulationRun>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && !self.cancelled && self.next < self.requested {
            if self.token.is_cancelled() {
                self.cancelled = true;
                break;
            }

            let index = self.next;
            self.next += 1;

            match self.plan.iteration(self.seed, index) {
                Ok(run) => {
                    self.completed += 1;
                    return Some(Ok(run));
                }
                Err(e) => {
                    debug!("Skipping iteration {}: {}", index, e);
                    self.skipped += 1;
                    if self.skipped > self.plan.failure_limit(self.requested) {
                        self.failed = true;
                        return Some(Err(self.plan.batch_failure(self.skipped, self.next)));
                    }
                }
            }
        }
        None
    }
}

/// Lazy simulation over independent inputs
pub fn simulate<'a>(
    base: &'a ValidatedBundle,
    specs: Vec<DistributionSpec>,
    iterations: u64,
    seed: u64,
    token: &CancellationToken,
) -> Result<SimulationStream<'a>> {
    Ok(MonteCarlo::new(base, specs, None)?.stream(iterations, seed, token))
}

/// Run a whole simulation over independent inputs on the calling thread
pub fn run_simulation(
    base: &ValidatedBundle,
    specs: Vec<DistributionSpec>,
    iterations: u64,
    seed: u64,
    token: &CancellationToken,
) -> Result<SimulationBatch> {
    MonteCarlo::new(base, specs, None)?.run(iterations, seed, token)
}

/// As [`run_simulation`], spread over `workers` threads
pub fn run_simulation_parallel(
    base: &ValidatedBundle,
    specs: Vec<DistributionSpec>,
    iterations: u64,
    seed: u64,
    workers: usize,
    token: &CancellationToken,
) -> Result<SimulationBatch> {
    MonteCarlo::new(base, specs, None)?.run_parallel(iterations, seed, workers, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{validate, BaselineAssumptions, TimeSeries};
    use std::thread;
    use std::time::Duration;

    fn base() -> ValidatedBundle {
        BaselineAssumptions::default_baseline().bundle().unwrap()
    }

    fn cost_and_rate_specs() -> Vec<DistributionSpec> {
        vec![
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
                Distribution::Uniform {
                    low: -0.01,
                    high: 0.01,
                },
            )
            .shift(),
        ]
    }

    fn fingerprint(batch: &SimulationBatch) -> Vec<(u64, Vec<u64>, u64)> {
        batch
            .runs
            .iter()
            .map(|r| {
                (
                    r.iteration,
                    r.samples.iter().map(|s| s.value.to_bits()).collect(),
                    r.total().to_bits(),
                )
            })
            .collect()
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let base = base();
        let token = CancellationToken::new();
        let a = run_simulation(&base, cost_and_rate_specs(), 200, 42, &token).unwrap();
        let b = run_simulation(&base, cost_and_rate_specs(), 200, 42, &token).unwrap();
        assert_eq!(a.status, BatchStatus::Complete);
        assert_eq!(a.completed(), 200);
        assert_eq!(fingerprint(&a), fingerprint(&b));

        let c = run_simulation(&base, cost_and_rate_specs(), 200, 43, &token).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn test_worker_count_does_not_change_results() {
        let base = base();
        let token = CancellationToken::new();
        let single = run_simulation(&base, cost_and_rate_specs(), 157, 7, &token).unwrap();
        for workers in [2, 3, 8] {
            let multi =
                run_simulation_parallel(&base, cost_and_rate_specs(), 157, 7, workers, &token).unwrap();
            assert_eq!(fingerprint(&single), fingerprint(&multi));
        }
    }

    #[test]
    fn test_stream_matches_batch() {
        let base = base();
        let token = CancellationToken::new();
        let streamed: Vec<SimulationRun> = simulate(&base, cost_and_rate_specs(), 50, 9, &token)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let batch = run_simulation(&base, cost_and_rate_specs(), 50, 9, &token).unwrap();
        assert_eq!(streamed, batch.runs);
    }

    #[test]
    fn test_zero_variance_reproduces_deterministic_total() {
        let base = base();
        let expected = base.liability().total();
        let specs = vec![
            DistributionSpec::new("cost_factor", SeriesKind::Cost, Distribution::fixed(1.0)),
            DistributionSpec::new("rate_shift", SeriesKind::Rate, Distribution::fixed(0.0)).shift(),
        ];
        let batch = run_simulation(&base, specs, 25, 1, &CancellationToken::new()).unwrap();
        for run in &batch.runs {
            assert_eq!(run.total(), expected);
        }
    }

    #[test]
    fn test_pre_cancelled_returns_empty_partial() {
        let token = CancellationToken::new();
        token.cancel();
        let batch = run_simulation(&base(), cost_and_rate_specs(), 100, 42, &token).unwrap();
        assert_eq!(batch.status, BatchStatus::Partial);
        assert_eq!(batch.completed(), 0);

        let parallel =
            run_simulation_parallel(&base(), cost_and_rate_specs(), 100, 42, 4, &token).unwrap();
        assert!(parallel.is_partial());
    }

    #[test]
    fn test_cancel_mid_stream_stops_at_next_poll() {
        let base = base();
        let token = CancellationToken::new();
        let mut stream = simulate(&base, cost_and_rate_specs(), 100, 42, &token).unwrap();

        let first: Vec<SimulationRun> = stream.by_ref().take(10).collect::<Result<_>>().unwrap();
        assert_eq!(first.len(), 10);

        token.cancel();
        assert!(stream.next().is_none());
        assert_eq!(stream.status(), BatchStatus::Partial);
        assert_eq!(stream.completed(), 10);
        assert!(stream.completed() <= stream.requested());

        let batch = stream.into_batch().unwrap();
        assert!(batch.is_partial());
        assert!(batch.runs.is_empty());
        assert_eq!(batch.attempted, 10);
        assert_eq!(batch.completed(), 10);
        assert_eq!(batch.completed() + batch.skipped, batch.attempted);
    }

    #[test]
    fn test_partly_consumed_stream_counts_add_up() {
        let base = base();
        let token = CancellationToken::new();
        let mut stream = simulate(&base, cost_and_rate_specs(), 30, 5, &token).unwrap();
        let taken: Vec<SimulationRun> = stream.by_ref().take(12).collect::<Result<_>>().unwrap();

        let batch = stream.into_batch().unwrap();
        assert_eq!(batch.status, BatchStatus::Complete);
        assert_eq!(batch.completed(), 30);
        assert_eq!(batch.runs.len(), 18);
        assert_eq!(batch.completed() + batch.skipped, batch.attempted);
        assert_eq!(taken[11].iteration + 1, batch.runs[0].iteration);
    }

    #[test]
    fn test_cancel_during_parallel_run() {
        let base = base();
        let plan = MonteCarlo::new(&base, cost_and_rate_specs(), None).unwrap();
        let token = CancellationToken::new();
        let canceller = {
            let token = token.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                token.cancel();
            })
        };

        let requested = 400_000;
        let batch = plan.run_parallel(requested, 42, 4, &token).unwrap();
        canceller.join().unwrap();

        assert!(batch.is_partial());
        assert!(batch.attempted < requested);
        assert_eq!(batch.completed() + batch.skipped, batch.attempted);
        assert!(batch.runs.windows(2).all(|w| w[0].iteration < w[1].iteration));
        for run in batch.runs.iter().step_by(97) {
            assert_eq!(run, &plan.iteration(42, run.iteration).unwrap());
        }
    }

    #[test]
    fn test_asset_factor_is_recorded_and_drawn_last() {
        let base = base();
        let token = CancellationToken::new();
        let plain = MonteCarlo::new(&base, cost_and_rate_specs(), None)
            .unwrap()
            .run(40, 11, &token)
            .unwrap();
        let with_assets = MonteCarlo::new(&base, cost_and_rate_specs(), None)
            .unwrap()
            .with_asset_factor(Distribution::Normal {
                mean: 1.0,
                std_dev: 0.10,
            })
            .unwrap()
            .run(40, 11, &token)
            .unwrap();

        assert_eq!(fingerprint(&plain), fingerprint(&with_assets));
        assert!(plain.runs.iter().all(|r| r.asset_factor == 1.0));
        assert!(with_assets.runs.iter().all(|r| r.asset_factor > 0.0));
        assert!(with_assets.runs.iter().any(|r| r.asset_factor != 1.0));

        let parallel = MonteCarlo::new(&base, cost_and_rate_specs(), None)
            .unwrap()
            .with_asset_factor(Distribution::Normal {
                mean: 1.0,
                std_dev: 0.10,
            })
            .unwrap()
            .run_parallel(40, 11, 3, &token)
            .unwrap();
        let factors = |b: &SimulationBatch| b.runs.iter().map(|r| r.asset_factor).collect::<Vec<_>>();
        assert_eq!(factors(&with_assets), factors(&parallel));
    }

    #[test]
    fn test_negative_asset_factor_skips_iteration() {
        let base = base();
        let plan = MonteCarlo::new(&base, cost_and_rate_specs(), None)
            .unwrap()
            .with_asset_factor(Distribution::fixed(-0.5))
            .unwrap();
        assert!(plan.iteration(1, 0).is_err());
        let err = plan.run(20, 1, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, EngineError::BatchFailure { .. }));

        assert!(MonteCarlo::new(&base, cost_and_rate_specs(), None)
            .unwrap()
            .with_asset_factor(Distribution::Uniform { low: 1.0, high: 0.5 })
            .is_err());
    }

    #[test]
    fn test_failures_within_threshold_are_skipped() {
        // Costs scaled by a factor that is sometimes negative
        let base = base();
        let specs = vec![DistributionSpec::new(
            "cost_factor",
            SeriesKind::Cost,
            Distribution::Normal {
                mean: 1.0,
                std_dev: 0.6,
            },
        )];
        let batch = MonteCarlo::new(&base, specs, None)
            .unwrap()
            .with_max_failure_fraction(0.2)
            .unwrap()
            .run(400, 3, &CancellationToken::new())
            .unwrap();
        assert!(batch.skipped > 0);
        assert_eq!(batch.completed() + batch.skipped, 400);
        assert!(batch.runs.iter().all(|r| r.samples[0].value >= 0.0));
    }

    #[test]
    fn test_too_many_failures_fail_the_batch() {
        let bundle = validate(
            TimeSeries::from_values(vec![100.0; 3]),
            TimeSeries::from_values(vec![10.0; 3]),
            TimeSeries::from_values(vec![0.05; 3]),
        )
        .unwrap();
        // Shifting rates by about -2 always leaves the rate domain
        let specs = vec![DistributionSpec::new(
            "rate_shift",
            SeriesKind::Rate,
            Distribution::Normal {
                mean: -2.0,
                std_dev: 0.01,
            },
        )
        .shift()];
        let token = CancellationToken::new();

        let err = run_simulation(&bundle, specs.clone(), 50, 1, &token).unwrap_err();
        assert!(matches!(err, EngineError::BatchFailure { .. }));

        let err = run_simulation_parallel(&bundle, specs, 50, 1, 4, &token).unwrap_err();
        assert!(matches!(err, EngineError::BatchFailure { .. }));
    }

    #[test]
    fn test_invalid_settings() {
        let base = base();
        assert!(MonteCarlo::new(&base, cost_and_rate_specs(), None)
            .unwrap()
            .with_max_failure_fraction(1.5)
            .is_err());
        assert!(run_simulation_parallel(&base, cost_and_rate_specs(), 10, 1, 0, &CancellationToken::new()).is_err());
    }
}
