//! The four-operation contract for timed state machines.

use crate::{InputBag, ModelError, OutputBag};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

/// Remaining simulated time until a component's next internal event.
///
/// A component is either passive (no internal event scheduled) or
/// active with a finite remaining duration. Folding the phase flag and
/// the remaining-time counter into one tagged value makes the invariant
/// `passive ⇔ σ = ∞` structural: arithmetic on an infinite sigma is
/// unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAdvance {
    /// No internal event scheduled; only input can wake the component.
    Passive,

    /// The next internal event fires after this much simulated time.
    ActiveIn(Duration),
}

impl TimeAdvance {
    /// An internal event due immediately (urgent, zero-duration).
    pub const IMMEDIATE: Self = TimeAdvance::ActiveIn(Duration::ZERO);

    /// Whether the component is passive.
    pub fn is_passive(&self) -> bool {
        matches!(self, TimeAdvance::Passive)
    }

    /// Whether the component has an internal event scheduled.
    pub fn is_active(&self) -> bool {
        !self.is_passive()
    }

    /// The remaining duration, if active.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            TimeAdvance::Passive => None,
            TimeAdvance::ActiveIn(d) => Some(*d),
        }
    }

    /// Subtract elapsed time from the remaining counter.
    ///
    /// This is the bookkeeping every external transition performs
    /// before computing new effects. Passive components are unaffected.
    /// Elapsed time overshooting the remaining counter of an active
    /// component means the caller's clock ran past a due internal
    /// event, which is a scheduling contract violation.
    pub fn after(self, elapsed: Duration) -> Result<Self, ModelError> {
        match self {
            TimeAdvance::Passive => Ok(TimeAdvance::Passive),
            TimeAdvance::ActiveIn(remaining) => remaining
                .checked_sub(elapsed)
                .map(TimeAdvance::ActiveIn)
                .ok_or(ModelError::ElapsedExceedsRemaining { remaining, elapsed }),
        }
    }
}

impl Ord for TimeAdvance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TimeAdvance::Passive, TimeAdvance::Passive) => Ordering::Equal,
            (TimeAdvance::Passive, TimeAdvance::ActiveIn(_)) => Ordering::Greater,
            (TimeAdvance::ActiveIn(_), TimeAdvance::Passive) => Ordering::Less,
            (TimeAdvance::ActiveIn(a), TimeAdvance::ActiveIn(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for TimeAdvance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeAdvance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeAdvance::Passive => write!(f, "passive"),
            TimeAdvance::ActiveIn(d) => write!(f, "active({}s)", d.as_secs_f64()),
        }
    }
}

/// A timed state machine driven by the coordinator.
///
/// The coordinator invokes these operations under a strict protocol:
///
/// - [`output`](Atomic::output) is called immediately before
///   [`internal`](Atomic::internal), when the component's remaining
///   time is about to elapse, and emits zero or more messages.
/// - [`internal`](Atomic::internal) fires when elapsed time equals the
///   remaining counter; it receives no input.
/// - [`external`](Atomic::external) fires when input arrives before the
///   remaining counter has elapsed; `elapsed` is the simulated time
///   since this component's last event and must be subtracted from the
///   remaining counter before computing new effects.
/// - [`time_advance`](Atomic::time_advance) reports the remaining
///   counter unchanged.
///
/// No two operations on the same component ever interleave; execution
/// is single-threaded and cooperative.
pub trait Atomic {
    /// Internal transition: the scheduled timeout fired.
    fn internal(&mut self) -> Result<(), ModelError>;

    /// External transition: a bag of input arrived after `elapsed`
    /// simulated time since this component's last event.
    fn external(&mut self, elapsed: Duration, inputs: &InputBag) -> Result<(), ModelError>;

    /// Output function: emit messages for the internal event about to
    /// fire. Takes `&mut self` because emission updates bookkeeping
    /// (the local clock, in-flight identifiers, completion counters).
    fn output(&mut self, outputs: &mut OutputBag) -> Result<(), ModelError>;

    /// Remaining simulated time until the next internal event.
    fn time_advance(&self) -> TimeAdvance;
}
