//! FIFO dispatcher routing jobs to the worker pool.

use jobflow_core::{Atomic, InputBag, ModelError, OutputBag, PortId, RunLog, TimeAdvance};
use jobflow_types::{JobId, Message, WORKER_POOL_SIZE};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// FIFO dispatcher.
///
/// Jobs queue in arrival order and leave one per dispatch interval,
/// routed to a worker by `id % 3` (residue 0 on output 1, residue 1 on
/// output 2, residue 2 on output 3). The dispatch timer arms when the
/// first job reaches an empty queue and is not restarted by further
/// arrivals while already running.
pub struct Dispatcher {
    queue: VecDeque<JobId>,
    sigma: TimeAdvance,
    interval: Duration,
    now: Duration,
    log: Arc<RunLog>,
}

impl Dispatcher {
    /// Input port carrying jobs from the source.
    pub const IN: PortId = PortId("dispatcher_in");

    /// Output ports, one per worker slot, indexed by routing residue.
    pub const OUT: [PortId; WORKER_POOL_SIZE] = [
        PortId("dispatcher_out_1"),
        PortId("dispatcher_out_2"),
        PortId("dispatcher_out_3"),
    ];

    pub fn new(interval: Duration, log: Arc<RunLog>) -> Self {
        Self {
            queue: VecDeque::new(),
            sigma: TimeAdvance::Passive,
            interval,
            now: Duration::ZERO,
            log,
        }
    }

    /// Number of queued jobs.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

impl Atomic for Dispatcher {
    fn internal(&mut self) -> Result<(), ModelError> {
        if self.sigma.is_passive() {
            return Err(ModelError::SpontaneousInternal);
        }
        // Drop the job just routed by the output function.
        self.queue
            .pop_front()
            .ok_or(ModelError::EmptyQueue { context: "dispatch" })?;

        self.sigma = if self.queue.is_empty() {
            TimeAdvance::Passive
        } else {
            TimeAdvance::ActiveIn(self.interval)
        };
        Ok(())
    }

    fn external(&mut self, elapsed: Duration, inputs: &InputBag) -> Result<(), ModelError> {
        self.now += elapsed;
        self.sigma = self.sigma.after(elapsed)?;

        for job in inputs.jobs_on(Self::IN) {
            self.log.record(
                self.now,
                format_args!("Dispatcher receives {} on {}", job, Self::IN),
            );
            let was_empty = self.queue.is_empty();
            self.queue.push_back(job);
            if was_empty {
                self.sigma = TimeAdvance::ActiveIn(self.interval);
            }
        }
        Ok(())
    }

    fn output(&mut self, outputs: &mut OutputBag) -> Result<(), ModelError> {
        let remaining = self.sigma.remaining().ok_or(ModelError::SpontaneousInternal)?;
        self.now += remaining;

        // Peek only; the internal transition pops after the send.
        if let Some(&job) = self.queue.front() {
            let worker = job.assigned_worker();
            let port = Self::OUT[job.residue()];
            self.log.record(
                self.now,
                format_args!("Dispatcher sends {} to {} on {}", job, worker, port),
            );
            outputs.push(port, Message::Job(job));
        }
        Ok(())
    }

    fn time_advance(&self) -> TimeAdvance {
        self.sigma
    }
}
