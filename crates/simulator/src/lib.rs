//! jobflow simulator
//!
//! Command-line front end for the deterministic pipeline simulation.
//! Builds the closed-loop topology from CLI flags, runs it for a span
//! of simulated time, and summarizes completions and end-to-end job
//! latency.
//!
//! # Example
//!
//! ```ignore
//! use jobflow_network::{top, LogDestination, PipelineConfig};
//! use jobflow_simulation::Coordinator;
//! use jobflow_simulator::RunReport;
//! use std::time::Duration;
//!
//! let config = PipelineConfig::new().with_seed(7).with_log(LogDestination::Quiet);
//! let mut coordinator = Coordinator::new(top(&config)?);
//! coordinator.run_until(Duration::from_secs(60))?;
//!
//! let report = RunReport::from_run(&config, coordinator.output(), coordinator.now());
//! println!("{report}");
//! ```

pub mod report;

pub use report::RunReport;
