//! The deterministic simulation loop.

use crate::{SimulationError, SimulationStats};
use jobflow_core::{InputBag, ModelError, OutputBag, PortId};
use jobflow_network::{ComponentId, Topology};
use jobflow_types::Message;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, trace};

/// Single-threaded engine advancing a logical clock over a topology.
///
/// Per instant the coordinator identifies the imminent components
/// (elapsed time equals their remaining time), invokes their output
/// functions, routes the emissions through the coupling graph, merges
/// in any externally scheduled inputs, and then applies transitions in
/// component-index order, internal before external for a component
/// hit by both. Nothing here consumes randomness; all stochasticity
/// lives inside the components' seeded generators, so a run is fully
/// determined by its topology.
pub struct Coordinator {
    topology: Topology,
    /// Time of each component's most recent transition.
    last_event: Vec<Duration>,
    now: Duration,
    /// Externally scheduled inputs, by delivery time, in scheduling
    /// order within an instant.
    pending_inputs: BTreeMap<Duration, Vec<(PortId, Message)>>,
    /// Events collected from the external output ports.
    collected: Vec<(Duration, Message)>,
    stats: SimulationStats,
    input_bags: Vec<InputBag>,
    scratch: OutputBag,
}

impl Coordinator {
    /// Create a coordinator over a fully wired topology.
    pub fn new(topology: Topology) -> Self {
        let n = topology.component_count();
        debug!(components = n, "created coordinator");
        Self {
            topology,
            last_event: vec![Duration::ZERO; n],
            now: Duration::ZERO,
            pending_inputs: BTreeMap::new(),
            collected: Vec::new(),
            stats: SimulationStats::default(),
            input_bags: vec![InputBag::new(); n],
            scratch: OutputBag::new(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run statistics so far.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Everything emitted on the external output ports, in emission
    /// order.
    pub fn output(&self) -> &[(Duration, Message)] {
        &self.collected
    }

    /// Schedule a message on an external input port.
    ///
    /// Inputs scheduled for the same instant are delivered as one bag,
    /// in scheduling order.
    pub fn schedule_input(
        &mut self,
        port: PortId,
        at: Duration,
        message: Message,
    ) -> Result<(), SimulationError> {
        let expected = self
            .topology
            .input_kind(port)
            .ok_or(SimulationError::UnknownInputPort(port))?;
        if expected != message.kind() {
            return Err(SimulationError::InputKindMismatch {
                port,
                expected,
                found: message.kind(),
            });
        }
        if at < self.now {
            return Err(SimulationError::InputInPast { port, at, now: self.now });
        }
        self.pending_inputs.entry(at).or_default().push((port, message));
        Ok(())
    }

    /// Advance the clock, processing every instant up to and including
    /// `end`. The clock always lands on `end`, even when no events
    /// remain before it.
    pub fn run_until(&mut self, end: Duration) -> Result<(), SimulationError> {
        trace!(end_secs = end.as_secs_f64(), "running simulation step");

        while let Some(t) = self.next_instant() {
            if t > end {
                break;
            }
            self.step_instant(t)?;
        }

        if self.now < end {
            self.now = end;
        }

        trace!(
            instants = self.stats.instants,
            transitions = self.stats.transitions(),
            final_time = ?self.now,
            "simulation step complete"
        );
        Ok(())
    }

    /// The earliest upcoming instant: the soonest scheduled internal
    /// event or external input, if any.
    fn next_instant(&self) -> Option<Duration> {
        let next_internal = self
            .topology
            .ids()
            .filter_map(|id| {
                self.topology
                    .model(id)
                    .time_advance()
                    .remaining()
                    .map(|d| self.last_event[id.0] + d)
            })
            .min();
        let next_external = self.pending_inputs.keys().next().copied();

        match (next_internal, next_external) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Process one logical instant.
    fn step_instant(&mut self, t: Duration) -> Result<(), SimulationError> {
        self.now = t;
        self.stats.instants += 1;

        for bag in &mut self.input_bags {
            bag.clear();
        }

        // Imminent set: elapsed time equals remaining time, exactly.
        let imminent: Vec<ComponentId> = self
            .topology
            .ids()
            .filter(|id| {
                self.topology
                    .model(*id)
                    .time_advance()
                    .remaining()
                    .is_some_and(|d| self.last_event[id.0] + d == t)
            })
            .collect();

        trace!(time = ?t, imminent = imminent.len(), "processing instant");

        // Output phase: imminent components emit, emissions are routed
        // through the static couplings. Fan-in bags union in source
        // index order; fan-out duplicates to every target.
        for &id in &imminent {
            let mut outputs = std::mem::take(&mut self.scratch);
            outputs.clear();
            let result = self.topology.model_mut(id).output(&mut outputs);
            self.attribute(id, result)?;

            for (port, message) in outputs.entries() {
                for target in self.topology.targets_of(id, port) {
                    self.input_bags[target.component.0].push(target.port, message);
                    self.stats.messages_routed += 1;
                }
                if let Some(external) = self.topology.external_target_of(id, port) {
                    trace!(time = ?t, %message, port = %external, "external output");
                    self.collected.push((t, message));
                    self.stats.outputs_emitted += 1;
                }
            }
            self.scratch = outputs;
        }

        // Externally scheduled inputs join the instant's bags after the
        // routed emissions.
        if let Some(batch) = self.pending_inputs.remove(&t) {
            for (port, message) in batch {
                let targets = self
                    .topology
                    .input_targets(port)
                    .ok_or(SimulationError::UnknownInputPort(port))?;
                for target in targets {
                    self.input_bags[target.component.0].push(target.port, message);
                }
                self.stats.inputs_injected += 1;
            }
        }

        // Transition phase, in component-index order; internal before
        // external when a component is due for both.
        for id in self.topology.ids() {
            let is_imminent = imminent.contains(&id);
            if is_imminent {
                let result = self.topology.model_mut(id).internal();
                self.attribute(id, result)?;
                self.last_event[id.0] = t;
                self.stats.internal_transitions += 1;
            }

            if !self.input_bags[id.0].is_empty() {
                let elapsed = t - self.last_event[id.0];
                let bag = std::mem::take(&mut self.input_bags[id.0]);
                let result = self.topology.model_mut(id).external(elapsed, &bag);
                self.input_bags[id.0] = bag;
                self.attribute(id, result)?;
                self.last_event[id.0] = t;
                self.stats.external_transitions += 1;
            }
        }

        Ok(())
    }

    /// Attach the component name and timestamp to a model error.
    fn attribute(&self, id: ComponentId, result: Result<(), ModelError>) -> Result<(), SimulationError> {
        result.map_err(|source| SimulationError::Component {
            component: self.topology.name(id).to_string(),
            at: self.now,
            source,
        })
    }
}
