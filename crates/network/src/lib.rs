//! Static wiring of the jobflow pipeline.
//!
//! A [`Topology`] is an explicit directed graph of `(component, port)`
//! nodes, built once at startup and immutable during a run. Fan-in is
//! resolved by bag union, fan-out by duplication; every coupling
//! connects ports of the same declared message kind.
//!
//! Two fixed assemblies are provided:
//!
//! - [`pipeline`]: dispatcher, three workers, and the shared
//!   persistence server, with one external job input and one merged
//!   external output
//! - [`top`]: the closed loop, adding the periodic generator in front
//!   of the pipeline

mod config;
mod graph;
mod wiring;

pub use config::{LogDestination, PipelineConfig};
pub use graph::{ComponentId, Endpoint, Topology, TopologyError};
pub use wiring::{pipeline, top, PIPELINE_IN, PIPELINE_OUT};
