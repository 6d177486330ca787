//! Periodic job source.

use jobflow_core::{Atomic, InputBag, ModelError, OutputBag, PortId, RunLog, TimeAdvance};
use jobflow_types::{JobId, Message};
use std::sync::Arc;
use std::time::Duration;

/// Periodic source of job identifiers.
///
/// Emits `1, 2, 3, …` at times `period, 2·period, 3·period, …`. Never
/// passive, never receives input.
pub struct JobGenerator {
    next_id: JobId,
    period: Duration,
    now: Duration,
    log: Arc<RunLog>,
}

impl JobGenerator {
    /// Output port carrying the emitted job identifiers.
    pub const OUT: PortId = PortId("generator_out");

    pub fn new(period: Duration, log: Arc<RunLog>) -> Self {
        Self {
            next_id: JobId::FIRST,
            period,
            now: Duration::ZERO,
            log,
        }
    }

    /// The identifier the next emission will carry.
    pub fn next_id(&self) -> JobId {
        self.next_id
    }
}

impl Atomic for JobGenerator {
    fn internal(&mut self) -> Result<(), ModelError> {
        self.next_id = self.next_id.next();
        Ok(())
    }

    fn external(&mut self, _elapsed: Duration, _inputs: &InputBag) -> Result<(), ModelError> {
        Err(ModelError::NoInputs)
    }

    fn output(&mut self, outputs: &mut OutputBag) -> Result<(), ModelError> {
        self.now += self.period;
        self.log.record(
            self.now,
            format_args!("Generator emits {} on {}", self.next_id, Self::OUT),
        );
        outputs.push(Self::OUT, Message::Job(self.next_id));
        Ok(())
    }

    fn time_advance(&self) -> TimeAdvance {
        TimeAdvance::ActiveIn(self.period)
    }
}
