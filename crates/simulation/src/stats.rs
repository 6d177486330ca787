//! Run statistics.

/// Statistics collected during a simulation run.
///
/// Two runs with the same topology and seed produce identical
/// statistics; the determinism tests compare these structs wholesale.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimulationStats {
    /// Logical instants processed.
    pub instants: u64,
    /// Internal transitions fired.
    pub internal_transitions: u64,
    /// External transitions fired.
    pub external_transitions: u64,
    /// Messages routed over internal couplings.
    pub messages_routed: u64,
    /// Externally scheduled inputs delivered.
    pub inputs_injected: u64,
    /// Messages emitted on external output ports.
    pub outputs_emitted: u64,
}

impl SimulationStats {
    /// Total transitions of either kind.
    pub fn transitions(&self) -> u64 {
        self.internal_transitions + self.external_transitions
    }
}
