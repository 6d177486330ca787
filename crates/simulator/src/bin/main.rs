//! Command-line entry point for the jobflow simulation.

use clap::Parser;
use jobflow_network::{top, LogDestination, PipelineConfig};
use jobflow_simulation::Coordinator;
use jobflow_simulator::RunReport;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Deterministic load-balancing pipeline simulation.
#[derive(Parser, Debug)]
#[command(name = "jobflow-sim", version, about)]
struct Args {
    /// Simulated run length in seconds.
    #[arg(long, default_value_t = 60.0)]
    duration: f64,

    /// Random seed for the workers' service-time draws.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Interval between generated jobs, in seconds.
    #[arg(long, default_value_t = 0.3)]
    generator_period: f64,

    /// Interval between dispatches, in seconds.
    #[arg(long, default_value_t = 1.0)]
    dispatch_interval: f64,

    /// Mean worker compute time, in seconds.
    #[arg(long, default_value_t = 0.5)]
    mean_service: f64,

    /// Fixed persistence round duration, in seconds.
    #[arg(long, default_value_t = 1.0)]
    persistence_time: f64,

    /// Append run events to this file as well as the console.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Suppress per-event console output; print only the report.
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn log_destination(&self) -> LogDestination {
        if self.quiet {
            LogDestination::Quiet
        } else if let Some(path) = &self.log_file {
            LogDestination::File(path.clone())
        } else {
            LogDestination::Stdout
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = PipelineConfig::new()
        .with_generator_period(Duration::from_secs_f64(args.generator_period))
        .with_dispatch_interval(Duration::from_secs_f64(args.dispatch_interval))
        .with_worker_mean_service(Duration::from_secs_f64(args.mean_service))
        .with_persistence_service_time(Duration::from_secs_f64(args.persistence_time))
        .with_seed(args.seed)
        .with_log(args.log_destination());

    info!(
        seed = args.seed,
        duration_secs = args.duration,
        "starting pipeline simulation"
    );

    let mut coordinator = Coordinator::new(top(&config)?);
    coordinator.run_until(Duration::from_secs_f64(args.duration))?;

    let report = RunReport::from_run(&config, coordinator.output(), coordinator.now());
    println!("{report}");
    Ok(())
}
