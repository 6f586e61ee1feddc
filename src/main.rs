//! Pilgrim Liability CLI
//!
//! Runs the baseline liability, the stress suite, a sensitivity sweep, an
//! optional forecast and a Monte Carlo simulation, then prints a report.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use pilgrim_liability::aggregate::{solvency_probability, summarize_solvency, RiskSummary, SolvencySummary};
use pilgrim_liability::forecast::{project, ForecastSeries};
use pilgrim_liability::scenario::{run_stress_suite, ScenarioCatalog, StressOutcome};
use pilgrim_liability::sensitivity::{change_percent, sweep, PerturbationMode, SensitivityPoint};
use pilgrim_liability::series::loader::{load_bundle, load_historical, HistoricalSeries};
use pilgrim_liability::simulation::{BatchStatus, CancellationToken, MonteCarlo};
use pilgrim_liability::{summarize, EngineConfig, LiabilityResult};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "pilgrim_liability", version, about = "Pilgrim liability risk engine")]
struct Cli {
    /// Aligned inputs as CSV (period,cost,count,rate); defaults to the configured baseline
    #[arg(long)]
    series: Option<PathBuf>,

    /// Scenario catalog as JSON; defaults to the built-in stress set
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Engine configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Historical cost series as CSV (year,value) to forecast
    #[arg(long)]
    historical: Option<PathBuf>,

    #[arg(long)]
    iterations: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    workers: Option<usize>,

    /// Fund assets backing the liability
    #[arg(long)]
    assets: Option<f64>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SensitivityRow {
    parameter: String,
    perturbation: f64,
    total: f64,
    change_pct: f64,
}

#[derive(Serialize)]
struct SimulationReport {
    status: BatchStatus,
    completed: u64,
    skipped: u64,
    summary: RiskSummary,
    solvency: SolvencySummary,
    solvency_probability: f64,
}

#[derive(Serialize)]
struct Report {
    generated_at: DateTime<Utc>,
    baseline: LiabilityResult,
    assets: f64,
    stress: Vec<StressOutcome>,
    sensitivity: Vec<SensitivityRow>,
    forecast: Option<ForecastSeries>,
    simulation: SimulationReport,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(iterations) = cli.iterations {
        config.simulation.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }
    if let Some(workers) = cli.workers {
        config.simulation.workers = workers;
    }
    let assets = cli.assets.unwrap_or(config.base_assets);

    let bundle = match &cli.series {
        Some(path) => load_bundle(path)
            .with_context(|| format!("Failed to load series from {}", path.display()))?,
        None => config.baseline.bundle().context("Invalid baseline assumptions")?,
    };
    let baseline = bundle.liability();

    let catalog = match &cli.scenarios {
        Some(path) => ScenarioCatalog::from_json_path(path)
            .with_context(|| format!("Failed to load scenarios from {}", path.display()))?,
        None => ScenarioCatalog::builtin().context("Built-in scenarios are invalid")?,
    };
    let stress = run_stress_suite(&bundle, &catalog, assets, &config.solvency)?;

    let rate_points = sweep(
        &bundle,
        &[("rate", vec![-0.02, -0.01, 0.0, 0.01, 0.02])],
        PerturbationMode::Additive,
    )?;
    let factor_points = sweep(
        &bundle,
        &[("cost", vec![0.9, 1.0, 1.1]), ("count", vec![0.9, 1.0, 1.1])],
        PerturbationMode::Multiplicative,
    )?;
    let sensitivity = rate_points
        .iter()
        .chain(&factor_points)
        .map(|p| sensitivity_row(&baseline, p))
        .collect();

    let historical = match &cli.historical {
        Some(path) => Some(
            load_historical(path)
                .with_context(|| format!("Failed to load history from {}", path.display()))?,
        ),
        None => None,
    };
    let forecast = match &historical {
        Some(hist) => {
            let model = config.forecast.model.build();
            Some(project(
                &hist.series,
                config.forecast.horizon,
                model.as_ref(),
                config.forecast.confidence,
            )?)
        }
        None => None,
    };

    let start = Instant::now();
    let token = CancellationToken::new();
    let mut plan = MonteCarlo::new(
        &bundle,
        config.stochastic.specs.clone(),
        config.stochastic.correlation.as_ref(),
    )?
    .with_max_failure_fraction(config.simulation.max_failure_fraction)?;
    if let Some(factor) = config.stochastic.asset_factor {
        plan = plan.with_asset_factor(factor)?;
    }
    let batch = plan
        .run_with(&config.simulation, &token)
        .context("Simulation failed")?;
    let elapsed = start.elapsed();

    let summary = summarize(&batch.runs, &config.summary)?;
    let simulation = SimulationReport {
        status: batch.status,
        completed: batch.completed(),
        skipped: batch.skipped,
        solvency: summarize_solvency(&batch.runs, assets, config.solvency.watch)?,
        solvency_probability: solvency_probability(&batch.runs, assets, config.solvency.safe)?,
        summary,
    };

    let report = Report {
        generated_at: Utc::now(),
        baseline,
        assets,
        stress,
        sensitivity,
        forecast,
        simulation,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, historical.as_ref(), elapsed);
    }
    Ok(())
}

fn sensitivity_row(baseline: &LiabilityResult, point: &SensitivityPoint) -> SensitivityRow {
    SensitivityRow {
        parameter: point.parameter.to_string(),
        perturbation: point.perturbation,
        total: point.total(),
        change_pct: change_percent(baseline.total(), point.total()),
    }
}

fn trillions(value: f64) -> f64 {
    value / 1e12
}

fn print_report(report: &Report, historical: Option<&HistoricalSeries>, elapsed: std::time::Duration) {
    println!("Pilgrim Liability Report");
    println!("========================");
    println!("Generated: {}\n", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));

    println!("Baseline liability ({} periods):", report.baseline.horizon());
    println!("{:>6} {:>16} {:>12} {:>10} {:>16}", "Period", "Cost", "Count", "DF", "PV (T)");
    println!("{}", "-".repeat(64));
    for row in report.baseline.breakdown() {
        println!(
            "{:>6} {:>16.2} {:>12.0} {:>10.6} {:>16.4}",
            row.period,
            row.cost,
            row.count,
            row.discount_factor,
            trillions(row.present_value)
        );
    }
    println!("  Total PV: {:.4} T", trillions(report.baseline.total()));
    println!("  Assets:   {:.4} T\n", trillions(report.assets));

    println!("Stress scenarios:");
    println!(
        "{:<32} {:>14} {:>14} {:>8} {:>10} {:>9}",
        "Scenario", "Liability (T)", "Assets (T)", "Ratio", "Status", "Change %"
    );
    println!("{}", "-".repeat(92));
    for outcome in &report.stress {
        println!(
            "{:<32} {:>14.4} {:>14.4} {:>8.3} {:>10} {:>+9.2}",
            outcome.scenario,
            trillions(outcome.liability),
            trillions(outcome.assets),
            outcome.solvency_ratio,
            format!("{:?}", outcome.status),
            outcome.liability_change_pct
        );
    }

    println!("\nSensitivity:");
    println!("{:<8} {:>12} {:>16} {:>10}", "Param", "Shock", "Total (T)", "Change %");
    println!("{}", "-".repeat(50));
    for row in &report.sensitivity {
        println!(
            "{:<8} {:>12.4} {:>16.4} {:>+10.2}",
            row.parameter,
            row.perturbation,
            trillions(row.total),
            row.change_pct
        );
    }

    if let (Some(fc), Some(hist)) = (&report.forecast, historical) {
        println!(
            "\nForecast ({}, {:.0}% bounds):",
            fc.model,
            fc.confidence * 100.0
        );
        println!("{:>6} {:>16} {:>16} {:>16}", "Year", "Lower", "Forecast", "Upper");
        for (i, (period, value)) in fc.forecast.iter().enumerate() {
            println!(
                "{:>6} {:>16.0} {:>16.0} {:>16.0}",
                hist.year_of(period),
                fc.lower[i],
                value,
                fc.upper[i]
            );
        }
    }

    let sim = &report.simulation;
    println!(
        "\nMonte Carlo ({:?}, {} runs, {} skipped, {:?}):",
        sim.status, sim.completed, sim.skipped, elapsed
    );
    println!("  Mean:    {:.4} T", trillions(sim.summary.mean));
    println!("  Std dev: {:.4} T", trillions(sim.summary.std_dev));
    for p in &sim.summary.percentiles {
        println!("  P{:<6} {:.4} T", p.percentile, trillions(p.value));
    }
    for t in &sim.summary.tail {
        println!(
            "  VaR {:.0}%: {:.4} T   CVaR: {:.4} T",
            t.confidence * 100.0,
            trillions(t.var),
            trillions(t.cvar)
        );
    }
    let ratio = &sim.solvency;
    println!(
        "  Solvency ratio: mean {:.3}, std {:.3}, worst {:.3}, best {:.3}",
        ratio.mean, ratio.std_dev, ratio.worst, ratio.best
    );
    println!("  P(ratio >= {:.2}): {:.2}%", ratio.threshold, ratio.probability * 100.0);
    println!("  P(ratio >= safe): {:.2}%", sim.solvency_probability * 100.0);
}
