//! The coupling graph.

use jobflow_core::{Atomic, PortId};
use jobflow_types::MessageKind;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Index of a component within a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// One `(component, port)` node of the coupling graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Endpoint {
    pub component: ComponentId,
    pub port: PortId,
}

/// Errors raised while declaring the wiring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),

    #[error("component '{component}' declares no port named '{port}' in that direction")]
    UndeclaredPort { component: String, port: PortId },

    #[error("port '{from}' carries {from_kind} values but '{to}' expects {to_kind}")]
    KindMismatch {
        from: PortId,
        from_kind: MessageKind,
        to: PortId,
        to_kind: MessageKind,
    },

    #[error("coupling from '{from}' to '{to}' declared twice")]
    DuplicateCoupling { from: PortId, to: PortId },

    #[error("no external port named '{0}'")]
    UnknownExternalPort(PortId),
}

struct Component {
    name: String,
    model: Box<dyn Atomic>,
    inputs: Vec<(PortId, MessageKind)>,
    outputs: Vec<(PortId, MessageKind)>,
}

/// An explicit directed graph of components and port couplings.
///
/// All declarations happen before the topology is handed to the
/// coordinator; nothing is rewired during a run. `BTreeMap`s keep
/// every iteration order deterministic.
#[derive(Default)]
pub struct Topology {
    components: Vec<Component>,
    /// Internal couplings: source endpoint to its fan-out targets.
    couplings: BTreeMap<(ComponentId, PortId), Vec<Endpoint>>,
    /// External input ports and the internal endpoints they feed.
    inputs: BTreeMap<PortId, (MessageKind, Vec<Endpoint>)>,
    /// Internal endpoints surfaced on an external output port.
    outputs: BTreeMap<(ComponentId, PortId), PortId>,
    /// Declared external output ports.
    output_ports: BTreeMap<PortId, MessageKind>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with its declared input and output ports.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        model: Box<dyn Atomic>,
        inputs: &[(PortId, MessageKind)],
        outputs: &[(PortId, MessageKind)],
    ) -> ComponentId {
        let id = ComponentId(self.components.len());
        self.components.push(Component {
            name: name.into(),
            model,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        });
        id
    }

    /// Declare an internal coupling from an output port to an input
    /// port. Fan-out is multiple couplings from the same source;
    /// fan-in is multiple couplings into the same target.
    pub fn couple(
        &mut self,
        from: ComponentId,
        from_port: PortId,
        to: ComponentId,
        to_port: PortId,
    ) -> Result<(), TopologyError> {
        let from_kind = self.output_kind(from, from_port)?;
        let to_kind = self.component_input_kind(to, to_port)?;
        if from_kind != to_kind {
            return Err(TopologyError::KindMismatch {
                from: from_port,
                from_kind,
                to: to_port,
                to_kind,
            });
        }

        let targets = self.couplings.entry((from, from_port)).or_default();
        let target = Endpoint { component: to, port: to_port };
        if targets.contains(&target) {
            return Err(TopologyError::DuplicateCoupling { from: from_port, to: to_port });
        }
        targets.push(target);
        Ok(())
    }

    /// Declare an external input port.
    pub fn external_input(&mut self, port: PortId, kind: MessageKind) {
        self.inputs.entry(port).or_insert((kind, Vec::new()));
    }

    /// Route an external input port to a component's input port.
    pub fn couple_input(
        &mut self,
        port: PortId,
        to: ComponentId,
        to_port: PortId,
    ) -> Result<(), TopologyError> {
        let to_kind = self.component_input_kind(to, to_port)?;
        let (kind, targets) = self
            .inputs
            .get_mut(&port)
            .ok_or(TopologyError::UnknownExternalPort(port))?;
        if *kind != to_kind {
            return Err(TopologyError::KindMismatch {
                from: port,
                from_kind: *kind,
                to: to_port,
                to_kind,
            });
        }
        targets.push(Endpoint { component: to, port: to_port });
        Ok(())
    }

    /// Declare an external output port.
    pub fn external_output(&mut self, port: PortId, kind: MessageKind) {
        self.output_ports.entry(port).or_insert(kind);
    }

    /// Surface a component's output port on an external output port.
    /// Several sources may merge onto the same external port.
    pub fn couple_output(
        &mut self,
        from: ComponentId,
        from_port: PortId,
        port: PortId,
    ) -> Result<(), TopologyError> {
        let from_kind = self.output_kind(from, from_port)?;
        let kind = *self
            .output_ports
            .get(&port)
            .ok_or(TopologyError::UnknownExternalPort(port))?;
        if from_kind != kind {
            return Err(TopologyError::KindMismatch {
                from: from_port,
                from_kind,
                to: port,
                to_kind: kind,
            });
        }
        self.outputs.insert((from, from_port), port);
        Ok(())
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component ids in deterministic (registration) order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> {
        (0..self.components.len()).map(ComponentId)
    }

    /// The component's registered name.
    pub fn name(&self, id: ComponentId) -> &str {
        &self.components[id.0].name
    }

    /// Mutable access to the component's state machine.
    pub fn model_mut(&mut self, id: ComponentId) -> &mut dyn Atomic {
        self.components[id.0].model.as_mut()
    }

    /// Shared access to the component's state machine.
    pub fn model(&self, id: ComponentId) -> &dyn Atomic {
        self.components[id.0].model.as_ref()
    }

    /// Internal targets of a source endpoint (empty if uncoupled).
    pub fn targets_of(&self, from: ComponentId, from_port: PortId) -> &[Endpoint] {
        self.couplings
            .get(&(from, from_port))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The external output port a source endpoint is surfaced on.
    pub fn external_target_of(&self, from: ComponentId, from_port: PortId) -> Option<PortId> {
        self.outputs.get(&(from, from_port)).copied()
    }

    /// The internal endpoints fed by an external input port.
    pub fn input_targets(&self, port: PortId) -> Option<&[Endpoint]> {
        self.inputs.get(&port).map(|(_, targets)| targets.as_slice())
    }

    /// The declared kind of an external input port.
    pub fn input_kind(&self, port: PortId) -> Option<MessageKind> {
        self.inputs.get(&port).map(|(kind, _)| *kind)
    }

    fn component(&self, id: ComponentId) -> Result<&Component, TopologyError> {
        self.components.get(id.0).ok_or(TopologyError::UnknownComponent(id))
    }

    fn output_kind(&self, id: ComponentId, port: PortId) -> Result<MessageKind, TopologyError> {
        let component = self.component(id)?;
        component
            .outputs
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| TopologyError::UndeclaredPort {
                component: component.name.clone(),
                port,
            })
    }

    fn component_input_kind(&self, id: ComponentId, port: PortId) -> Result<MessageKind, TopologyError> {
        let component = self.component(id)?;
        component
            .inputs
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| TopologyError::UndeclaredPort {
                component: component.name.clone(),
                port,
            })
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("components", &self.components.iter().map(|c| &c.name).collect::<Vec<_>>())
            .field("couplings", &self.couplings)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}
