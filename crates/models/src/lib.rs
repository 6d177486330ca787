//! Atomic components of the jobflow pipeline.
//!
//! Each component is a timed state machine implementing the
//! [`Atomic`](jobflow_core::Atomic) contract:
//!
//! - [`JobGenerator`]: periodic source of job identifiers
//! - [`Dispatcher`]: FIFO queue routing jobs to the worker pool by
//!   `id % 3`
//! - [`Worker`]: per-slot FIFO queue with a two-stage life cycle per
//!   job (compute, then a persistence round trip)
//! - [`PersistenceServer`]: single shared FIFO serving persistence
//!   requests from all workers, one in flight at a time
//!
//! Components own their queues exclusively and interact only through
//! messages routed by the coupling graph.

mod dispatcher;
mod generator;
mod store;
mod worker;

pub use dispatcher::Dispatcher;
pub use generator::JobGenerator;
pub use store::PersistenceServer;
pub use worker::Worker;
