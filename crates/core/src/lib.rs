//! Core contract for the jobflow timed state machines.
//!
//! This crate provides the abstractions every pipeline component is
//! built on:
//!
//! - [`Atomic`]: the four-operation contract (internal transition,
//!   external transition, output, time advance)
//! - [`TimeAdvance`]: tagged remaining time, so passivity is a variant
//!   rather than a floating-point infinity sentinel
//! - [`PortId`], [`InputBag`], [`OutputBag`]: named single-typed ports
//!   delivering a bag of messages per logical instant
//! - [`ModelError`]: the contract violations a component can report
//! - [`RunLog`]: the timestamped run-event sink injected by the
//!   composition root
//!
//! # Architecture
//!
//! Components are:
//! - **Synchronous**: No async, no `.await`
//! - **Deterministic**: Same state + same inputs = same outputs
//! - **Pure-ish**: Mutate self, write run-log lines, but perform no
//!   other I/O
//!
//! The clock and all message delivery live in the coordinator
//! (`jobflow-simulation`), which drives components exclusively through
//! the [`Atomic`] operations.

mod atomic;
mod error;
mod log;
mod port;

pub use atomic::{Atomic, TimeAdvance};
pub use error::ModelError;
pub use log::RunLog;
pub use port::{InputBag, OutputBag, PortId};
