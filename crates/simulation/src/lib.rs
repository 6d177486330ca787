//! Deterministic coordinator for the jobflow pipeline.
//!
//! This crate executes a [`Topology`](jobflow_network::Topology) of
//! timed state machines under a single logical clock. Given the same
//! topology and seed, it produces identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Coordinator                        │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  next instant = min(last event + time advance,     │ │
//! │  │                     earliest scheduled input)      │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  imminent components: output, routed through the   │ │
//! │  │  coupling graph into per-component input bags      │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  transitions, internal before external, in         │ │
//! │  │  component-index order                             │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Simultaneous events
//!
//! Events landing on the same instant resolve identically everywhere:
//! components are visited in index order, and a component that is both
//! due to fire and receiving input performs its internal transition
//! first, then the external transition with zero elapsed time. A job
//! reaching the dispatcher at the exact moment it fires therefore
//! queues behind the in-flight dispatch.

mod coordinator;
mod error;
mod stats;

pub use coordinator::Coordinator;
pub use error::SimulationError;
pub use stats::SimulationStats;
