//! Shared helpers for coordinator integration tests.

use jobflow_core::{Atomic, InputBag, ModelError, OutputBag, PortId, TimeAdvance};
use jobflow_types::Message;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Events recorded by a [`Collector`], as `(time, message)` pairs.
pub type Recorded = Arc<Mutex<Vec<(Duration, Message)>>>;

/// Passive probe that records every message it receives together with
/// the simulated time of arrival. Wire it to any output port under
/// test.
pub struct Collector {
    now: Duration,
    seen: Recorded,
}

impl Collector {
    pub const IN: PortId = PortId("collector_in");

    pub fn new() -> (Self, Recorded) {
        let seen: Recorded = Arc::default();
        (
            Self {
                now: Duration::ZERO,
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }
}

impl Atomic for Collector {
    fn internal(&mut self) -> Result<(), ModelError> {
        Err(ModelError::SpontaneousInternal)
    }

    fn external(&mut self, elapsed: Duration, inputs: &InputBag) -> Result<(), ModelError> {
        self.now += elapsed;
        let mut seen = self.seen.lock().unwrap();
        for message in inputs.on(Self::IN) {
            seen.push((self.now, *message));
        }
        Ok(())
    }

    fn output(&mut self, _outputs: &mut OutputBag) -> Result<(), ModelError> {
        Err(ModelError::SpontaneousInternal)
    }

    fn time_advance(&self) -> TimeAdvance {
        TimeAdvance::Passive
    }
}

/// Snapshot a collector's recordings.
pub fn drain(recorded: &Recorded) -> Vec<(Duration, Message)> {
    recorded.lock().unwrap().clone()
}
