//! Contract violations a component can report.

use std::time::Duration;
use thiserror::Error;

/// Logical errors in the timed-automaton contract.
///
/// None of these occur in a correct closed-loop run; each marks a bug
/// in a component or in the engine driving it, so they are surfaced as
/// errors rather than silently absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An internal transition (or its output) was invoked while the
    /// component was passive.
    #[error("internal transition invoked while passive")]
    SpontaneousInternal,

    /// An external transition was handed an elapsed time larger than
    /// the component's remaining time, meaning the engine's clock ran
    /// past a due internal event.
    #[error("elapsed time {elapsed:?} exceeds remaining time {remaining:?}")]
    ElapsedExceedsRemaining {
        /// Remaining time before the next scheduled internal event.
        remaining: Duration,
        /// Elapsed time supplied by the engine.
        elapsed: Duration,
    },

    /// Input was delivered to a component that declares no input ports.
    #[error("input delivered to a component without input ports")]
    NoInputs,

    /// A queue guaranteed non-empty by the state invariant was empty.
    #[error("empty queue during {context}")]
    EmptyQueue {
        /// Which operation observed the violation.
        context: &'static str,
    },
}
