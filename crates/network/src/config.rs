//! Configuration for a pipeline run.

use jobflow_core::RunLog;
use jobflow_types::WORKER_POOL_SIZE;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where the run-event log goes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LogDestination {
    /// Console only.
    #[default]
    Stdout,

    /// Console plus an append-mode file.
    File(PathBuf),

    /// Discard run events (tests).
    Quiet,
}

/// Immutable configuration for one simulation run.
///
/// Supplied at construction; nothing here can change mid-run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Interval between generated jobs.
    pub generator_period: Duration,

    /// Interval between dispatches of queued jobs.
    pub dispatch_interval: Duration,

    /// Mean compute duration per worker slot.
    pub worker_mean_service: [Duration; WORKER_POOL_SIZE],

    /// Fixed duration of one persistence round.
    pub persistence_service_time: Duration,

    /// Random seed for the workers' service-time draws.
    pub seed: u64,

    /// Run-event log destination.
    pub log: LogDestination,
}

impl PipelineConfig {
    /// Create a configuration with the standard run parameters.
    pub fn new() -> Self {
        Self {
            generator_period: Duration::from_millis(300),
            dispatch_interval: Duration::from_secs(1),
            worker_mean_service: [Duration::from_millis(500); WORKER_POOL_SIZE],
            persistence_service_time: Duration::from_secs(1),
            seed: 42,
            log: LogDestination::default(),
        }
    }

    /// Set the generator period.
    pub fn with_generator_period(mut self, period: Duration) -> Self {
        self.generator_period = period;
        self
    }

    /// Set the dispatch interval.
    pub fn with_dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    /// Set the same mean compute duration for every worker.
    pub fn with_worker_mean_service(mut self, mean: Duration) -> Self {
        self.worker_mean_service = [mean; WORKER_POOL_SIZE];
        self
    }

    /// Set per-worker mean compute durations.
    pub fn with_worker_mean_services(mut self, means: [Duration; WORKER_POOL_SIZE]) -> Self {
        self.worker_mean_service = means;
        self
    }

    /// Set the persistence service time.
    pub fn with_persistence_service_time(mut self, time: Duration) -> Self {
        self.persistence_service_time = time;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the run-event log destination.
    pub fn with_log(mut self, log: LogDestination) -> Self {
        self.log = log;
        self
    }

    /// Open the configured run-event sink.
    pub fn open_log(&self) -> Arc<RunLog> {
        Arc::new(match &self.log {
            LogDestination::Stdout => RunLog::stdout(),
            LogDestination::File(path) => RunLog::to_file(path),
            LogDestination::Quiet => RunLog::quiet(),
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
