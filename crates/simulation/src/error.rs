//! Coordinator errors.

use jobflow_core::{ModelError, PortId};
use jobflow_types::MessageKind;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while driving a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// A component reported a contract violation.
    #[error("'{component}' at t={at:?}: {source}")]
    Component {
        /// Registered name of the failing component.
        component: String,
        /// Simulated time of the failing operation.
        at: Duration,
        #[source]
        source: ModelError,
    },

    /// An input was scheduled on a port the topology does not expose.
    #[error("no external input port named '{0}'")]
    UnknownInputPort(PortId),

    /// An input was scheduled with the wrong message kind for its port.
    #[error("port '{port}' carries {expected} values, got {found}")]
    InputKindMismatch {
        port: PortId,
        expected: MessageKind,
        found: MessageKind,
    },

    /// An input was scheduled before the current simulated time.
    #[error("input on '{port}' scheduled at {at:?}, but the clock is already at {now:?}")]
    InputInPast {
        port: PortId,
        at: Duration,
        now: Duration,
    },
}
