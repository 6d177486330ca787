//! The fixed pipeline assemblies.

use crate::{ComponentId, PipelineConfig, Topology, TopologyError};
use jobflow_core::{PortId, RunLog};
use jobflow_models::{Dispatcher, JobGenerator, PersistenceServer, Worker};
use jobflow_types::{MessageKind, WorkerId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// External input port of the open pipeline (jobs in).
pub const PIPELINE_IN: PortId = PortId("in");

/// External output port (finished jobs out, merged across workers).
pub const PIPELINE_OUT: PortId = PortId("out");

/// Derive a worker's RNG seed from the run seed and its slot.
fn worker_seed(seed: u64, slot: u64) -> u64 {
    seed.wrapping_add(slot).wrapping_mul(0x517cc1b727220a95)
}

/// Assemble dispatcher, workers, and persistence server with their
/// internal couplings and the merged external output. Returns the
/// dispatcher's id for the caller to feed.
fn assemble(
    topology: &mut Topology,
    config: &PipelineConfig,
    log: &Arc<RunLog>,
) -> Result<ComponentId, TopologyError> {
    let dispatcher = topology.add_component(
        "dispatcher",
        Box::new(Dispatcher::new(config.dispatch_interval, Arc::clone(log))),
        &[(Dispatcher::IN, MessageKind::Job)],
        &[
            (Dispatcher::OUT[0], MessageKind::Job),
            (Dispatcher::OUT[1], MessageKind::Job),
            (Dispatcher::OUT[2], MessageKind::Job),
        ],
    );

    let store = topology.add_component(
        "store",
        Box::new(PersistenceServer::new(
            config.persistence_service_time,
            Arc::clone(log),
        )),
        &[(PersistenceServer::IN, MessageKind::Worker)],
        &[
            (PersistenceServer::ACK_OUT[0], MessageKind::Worker),
            (PersistenceServer::ACK_OUT[1], MessageKind::Worker),
            (PersistenceServer::ACK_OUT[2], MessageKind::Worker),
        ],
    );

    topology.external_output(PIPELINE_OUT, MessageKind::Job);

    for worker_id in WorkerId::ALL {
        let slot = worker_id.index();
        let rng = ChaCha8Rng::seed_from_u64(worker_seed(config.seed, slot as u64));
        let worker = topology.add_component(
            format!("worker-{}", worker_id.0),
            Box::new(Worker::new(
                worker_id,
                config.worker_mean_service[slot],
                rng,
                Arc::clone(log),
            )),
            &[
                (Worker::JOB_IN, MessageKind::Job),
                (Worker::ACK_IN, MessageKind::Worker),
            ],
            &[
                (Worker::DONE_OUT, MessageKind::Job),
                (Worker::PERSIST_OUT, MessageKind::Worker),
            ],
        );

        topology.couple(dispatcher, Dispatcher::OUT[slot], worker, Worker::JOB_IN)?;
        topology.couple(worker, Worker::PERSIST_OUT, store, PersistenceServer::IN)?;
        topology.couple(store, PersistenceServer::ACK_OUT[slot], worker, Worker::ACK_IN)?;
        topology.couple_output(worker, Worker::DONE_OUT, PIPELINE_OUT)?;
    }

    Ok(dispatcher)
}

/// The open pipeline: dispatcher, three workers, shared persistence
/// server. Jobs come in on [`PIPELINE_IN`]; finished jobs leave merged
/// on [`PIPELINE_OUT`].
pub fn pipeline(config: &PipelineConfig) -> Result<Topology, TopologyError> {
    let mut topology = Topology::new();
    let log = config.open_log();
    let dispatcher = assemble(&mut topology, config, &log)?;

    topology.external_input(PIPELINE_IN, MessageKind::Job);
    topology.couple_input(PIPELINE_IN, dispatcher, Dispatcher::IN)?;
    Ok(topology)
}

/// The closed loop: the periodic generator feeding the pipeline. Only
/// [`PIPELINE_OUT`] is exposed.
pub fn top(config: &PipelineConfig) -> Result<Topology, TopologyError> {
    let mut topology = Topology::new();
    let log = config.open_log();
    let dispatcher = assemble(&mut topology, config, &log)?;

    let generator = topology.add_component(
        "generator",
        Box::new(JobGenerator::new(config.generator_period, log)),
        &[],
        &[(JobGenerator::OUT, MessageKind::Job)],
    );
    topology.couple(generator, JobGenerator::OUT, dispatcher, Dispatcher::IN)?;
    Ok(topology)
}
