//! Worker with a two-stage life cycle per job.

use jobflow_core::{Atomic, InputBag, ModelError, OutputBag, PortId, RunLog, TimeAdvance};
use jobflow_types::{JobId, Message, WorkerId};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One worker of the pool.
///
/// Each admitted job goes through two stages: COMPUTE, with an
/// exponentially distributed duration, then PERSIST-WAIT, a round trip
/// to the shared persistence server. The front of the queue stays the
/// in-flight job until its acknowledgement arrives; only then is it
/// popped and emitted on the completed output.
pub struct Worker {
    id: WorkerId,
    queue: VecDeque<JobId>,
    /// False while computing, true while awaiting the persistence
    /// acknowledgement.
    waiting: bool,
    current: Option<JobId>,
    sigma: TimeAdvance,
    mean_service: Duration,
    rng: ChaCha8Rng,
    now: Duration,
    log: Arc<RunLog>,
}

impl Worker {
    /// Input port carrying jobs from the dispatcher.
    pub const JOB_IN: PortId = PortId("job_in");

    /// Input port carrying persistence acknowledgements.
    pub const ACK_IN: PortId = PortId("ack_in");

    /// Output port carrying finished jobs.
    pub const DONE_OUT: PortId = PortId("done_out");

    /// Output port carrying persistence requests (the worker's own
    /// identity; the job id stays local).
    pub const PERSIST_OUT: PortId = PortId("persist_out");

    pub fn new(id: WorkerId, mean_service: Duration, rng: ChaCha8Rng, log: Arc<RunLog>) -> Self {
        Self {
            id,
            queue: VecDeque::new(),
            waiting: false,
            current: None,
            sigma: TimeAdvance::Passive,
            mean_service,
            rng,
            now: Duration::ZERO,
            log,
        }
    }

    /// This worker's pool identity.
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Number of queued jobs, including the one in flight.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the worker is awaiting a persistence acknowledgement.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// One exponential draw with rate `1 / mean`, via inverse CDF on a
    /// uniform sample. Non-positive draws are retried, never folded to
    /// a magnitude.
    fn sample_service(&mut self) -> Duration {
        let mean = self.mean_service.as_secs_f64();
        loop {
            let u: f64 = self.rng.gen();
            let draw = -mean * (1.0 - u).ln();
            if draw > 0.0 && draw.is_finite() {
                return Duration::from_secs_f64(draw);
            }
        }
    }

    /// Begin the COMPUTE stage for the job at the front of the queue.
    fn start_compute(&mut self, job: JobId) {
        self.current = Some(job);
        self.log
            .record(self.now, format_args!("{} starts computing {}", self.id, job));
        let service = self.sample_service();
        self.sigma = TimeAdvance::ActiveIn(service);
    }
}

impl Atomic for Worker {
    fn internal(&mut self) -> Result<(), ModelError> {
        if self.sigma.is_passive() {
            return Err(ModelError::SpontaneousInternal);
        }
        if !self.waiting {
            // Compute finished; the request was just emitted. Hold the
            // job at the queue front until the acknowledgement returns.
            self.waiting = true;
            self.sigma = TimeAdvance::Passive;
        } else {
            let done = self
                .queue
                .pop_front()
                .ok_or(ModelError::EmptyQueue { context: "completion" })?;
            debug_assert_eq!(Some(done), self.current);
            self.current = None;
            self.waiting = false;

            match self.queue.front().copied() {
                Some(next) => self.start_compute(next),
                None => self.sigma = TimeAdvance::Passive,
            }
        }
        Ok(())
    }

    fn external(&mut self, elapsed: Duration, inputs: &InputBag) -> Result<(), ModelError> {
        self.now += elapsed;
        self.sigma = self.sigma.after(elapsed)?;

        for job in inputs.jobs_on(Self::JOB_IN) {
            self.log.record(
                self.now,
                format_args!("{} receives {} on {}", self.id, job, Self::JOB_IN),
            );
            self.queue.push_back(job);
            if self.queue.len() == 1 && !self.waiting {
                self.start_compute(job);
            }
        }

        for ack in inputs.workers_on(Self::ACK_IN) {
            debug_assert_eq!(ack, self.id, "acknowledgement routed to the wrong worker");
            if self.waiting {
                if let Some(job) = self.current {
                    self.log.record(
                        self.now,
                        format_args!(
                            "{} receives persistence ack for {} on {}",
                            self.id,
                            job,
                            Self::ACK_IN
                        ),
                    );
                }
                // Urgent: complete at this very instant.
                self.sigma = TimeAdvance::IMMEDIATE;
            }
        }
        Ok(())
    }

    fn output(&mut self, outputs: &mut OutputBag) -> Result<(), ModelError> {
        let remaining = self.sigma.remaining().ok_or(ModelError::SpontaneousInternal)?;
        self.now += remaining;

        if self.waiting {
            let job = self
                .current
                .ok_or(ModelError::EmptyQueue { context: "completed output" })?;
            self.log.record(
                self.now,
                format_args!("{} finishes {} on {}", self.id, job, Self::DONE_OUT),
            );
            outputs.push(Self::DONE_OUT, Message::Job(job));
        } else {
            let job = self
                .current
                .ok_or(ModelError::EmptyQueue { context: "persistence request" })?;
            self.log.record(
                self.now,
                format_args!("{} requests persistence for {} on {}", self.id, job, Self::PERSIST_OUT),
            );
            outputs.push(Self::PERSIST_OUT, Message::Worker(self.id));
        }
        Ok(())
    }

    fn time_advance(&self) -> TimeAdvance {
        self.sigma
    }
}
