//! Shared persistence server.

use jobflow_core::{Atomic, InputBag, ModelError, OutputBag, PortId, RunLog, TimeAdvance};
use jobflow_types::{Message, WorkerId, WORKER_POOL_SIZE};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Single shared persistence server.
///
/// Requests from all workers queue in strict arrival order and are
/// served one at a time, each taking the same fixed duration. The
/// acknowledgement goes out on the port statically dedicated to the
/// requesting worker, never anywhere else.
pub struct PersistenceServer {
    queue: VecDeque<WorkerId>,
    sigma: TimeAdvance,
    service_time: Duration,
    completed: u64,
    now: Duration,
    log: Arc<RunLog>,
}

impl PersistenceServer {
    /// Shared input port all workers request on.
    pub const IN: PortId = PortId("persist_in");

    /// Acknowledgement ports, one per worker slot.
    pub const ACK_OUT: [PortId; WORKER_POOL_SIZE] = [
        PortId("ack_out_1"),
        PortId("ack_out_2"),
        PortId("ack_out_3"),
    ];

    pub fn new(service_time: Duration, log: Arc<RunLog>) -> Self {
        Self {
            queue: VecDeque::new(),
            sigma: TimeAdvance::Passive,
            service_time,
            completed: 0,
            now: Duration::ZERO,
            log,
        }
    }

    /// Number of requests waiting or in flight.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Requests acknowledged so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl Atomic for PersistenceServer {
    fn internal(&mut self) -> Result<(), ModelError> {
        if self.sigma.is_passive() {
            return Err(ModelError::SpontaneousInternal);
        }
        self.queue
            .pop_front()
            .ok_or(ModelError::EmptyQueue { context: "acknowledgement" })?;

        self.sigma = if self.queue.is_empty() {
            TimeAdvance::Passive
        } else {
            TimeAdvance::ActiveIn(self.service_time)
        };
        Ok(())
    }

    fn external(&mut self, elapsed: Duration, inputs: &InputBag) -> Result<(), ModelError> {
        self.now += elapsed;
        self.sigma = self.sigma.after(elapsed)?;

        for worker in inputs.workers_on(Self::IN) {
            self.log.record(
                self.now,
                format_args!("Store receives request from {} on {}", worker, Self::IN),
            );
            let was_empty = self.queue.is_empty();
            self.queue.push_back(worker);
            if was_empty {
                self.sigma = TimeAdvance::ActiveIn(self.service_time);
            }
        }
        Ok(())
    }

    fn output(&mut self, outputs: &mut OutputBag) -> Result<(), ModelError> {
        let remaining = self.sigma.remaining().ok_or(ModelError::SpontaneousInternal)?;
        self.now += remaining;

        // Peek only; the internal transition pops after the send.
        let worker = *self
            .queue
            .front()
            .ok_or(ModelError::EmptyQueue { context: "acknowledgement output" })?;
        self.completed += 1;
        self.log.record(
            self.now,
            format_args!(
                "Store acknowledges {} on {} ({} persisted)",
                worker,
                Self::ACK_OUT[worker.index()],
                self.completed
            ),
        );
        outputs.push(Self::ACK_OUT[worker.index()], Message::Worker(worker));
        Ok(())
    }

    fn time_advance(&self) -> TimeAdvance {
        self.sigma
    }
}
