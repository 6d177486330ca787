//! Run summary with latency percentiles.

use hdrhistogram::Histogram;
use jobflow_network::PipelineConfig;
use jobflow_types::Message;
use std::fmt;
use std::time::Duration;

/// Summary of one simulation run.
///
/// Latency is measured per job from its generation instant (the job id
/// times the generator period, which is exact under the deterministic
/// clock) to its appearance on the completed output.
pub struct RunReport {
    duration: Duration,
    completed: u64,
    latencies: Histogram<u64>,
}

impl RunReport {
    /// Summarize the collected external output of a closed-loop run.
    pub fn from_run(
        config: &PipelineConfig,
        output: &[(Duration, Message)],
        duration: Duration,
    ) -> Self {
        let mut latencies =
            Histogram::<u64>::new(3).expect("three significant figures is a valid precision");
        let mut completed = 0u64;

        for (finished_at, message) in output {
            let Some(job) = message.as_job() else { continue };
            completed += 1;

            let sequence = u32::try_from(job.0).unwrap_or(u32::MAX);
            let generated_at = config.generator_period * sequence;
            if let Some(latency) = finished_at.checked_sub(generated_at) {
                let _ = latencies.record(latency.as_micros() as u64);
            }
        }

        Self {
            duration,
            completed,
            latencies,
        }
    }

    /// Jobs that reached the completed output.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Simulated span the report covers.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Completions per simulated second.
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.completed as f64 / secs
        }
    }

    /// Median end-to-end job latency.
    pub fn p50_latency(&self) -> Duration {
        Duration::from_micros(self.latencies.value_at_quantile(0.5))
    }

    /// 99th-percentile end-to-end job latency.
    pub fn p99_latency(&self) -> Duration {
        Duration::from_micros(self.latencies.value_at_quantile(0.99))
    }

    /// Worst observed end-to-end job latency.
    pub fn max_latency(&self) -> Duration {
        Duration::from_micros(self.latencies.max())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulated time:  {:.1}s", self.duration.as_secs_f64())?;
        writeln!(f, "Jobs completed:  {}", self.completed)?;
        writeln!(f, "Throughput:      {:.2} jobs/s", self.throughput())?;
        write!(
            f,
            "Latency p50/p99/max: {:.3}s / {:.3}s / {:.3}s",
            self.p50_latency().as_secs_f64(),
            self.p99_latency().as_secs_f64(),
            self.max_latency().as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobflow_network::LogDestination;
    use jobflow_types::{JobId, WorkerId};

    fn config() -> PipelineConfig {
        // 1s generator period keeps the arithmetic easy to follow.
        PipelineConfig::new()
            .with_generator_period(Duration::from_secs(1))
            .with_log(LogDestination::Quiet)
    }

    #[test]
    fn test_counts_and_latency() {
        // Job 1 generated at 1s, finished at 3s: latency 2s.
        // Job 2 generated at 2s, finished at 6s: latency 4s.
        let output = vec![
            (Duration::from_secs(3), Message::Job(JobId(1))),
            (Duration::from_secs(6), Message::Job(JobId(2))),
        ];
        let report = RunReport::from_run(&config(), &output, Duration::from_secs(10));

        assert_eq!(report.completed(), 2);
        assert!((report.throughput() - 0.2).abs() < 1e-9);
        assert_eq!(report.max_latency(), Duration::from_secs(4));
        assert!(report.p50_latency() >= Duration::from_secs(2));
    }

    #[test]
    fn test_non_job_messages_ignored() {
        let output = vec![(Duration::from_secs(1), Message::Worker(WorkerId(1)))];
        let report = RunReport::from_run(&config(), &output, Duration::from_secs(10));
        assert_eq!(report.completed(), 0);
        assert_eq!(report.max_latency(), Duration::ZERO);
    }

    #[test]
    fn test_empty_run() {
        let report = RunReport::from_run(&config(), &[], Duration::ZERO);
        assert_eq!(report.completed(), 0);
        assert_eq!(report.throughput(), 0.0);
    }
}
