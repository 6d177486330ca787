//! Named ports and per-instant message bags.

use jobflow_types::{JobId, Message, WorkerId};
use std::fmt;

/// A named port on a component.
///
/// Port names are static and unique within a component; across the
/// topology a port is identified by the `(component, port)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub &'static str);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The bag of messages delivered to one component within one logical
/// instant.
///
/// Entries preserve routing order, which the engine keeps deterministic
/// (source components in index order, emissions in emission order), so
/// "bag order" is well defined for FIFO appends.
#[derive(Debug, Default, Clone)]
pub struct InputBag {
    entries: Vec<(PortId, Message)>,
}

impl InputBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a message to a port.
    pub fn push(&mut self, port: PortId, message: Message) {
        self.entries.push((port, message));
    }

    /// Whether no messages were delivered this instant.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of delivered messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All messages delivered to `port`, in bag order.
    pub fn on(&self, port: PortId) -> impl Iterator<Item = &Message> {
        self.entries
            .iter()
            .filter(move |(p, _)| *p == port)
            .map(|(_, m)| m)
    }

    /// Job identifiers delivered to `port`, in bag order.
    pub fn jobs_on(&self, port: PortId) -> impl Iterator<Item = JobId> + '_ {
        self.on(port).filter_map(Message::as_job)
    }

    /// Worker identifiers delivered to `port`, in bag order.
    pub fn workers_on(&self, port: PortId) -> impl Iterator<Item = WorkerId> + '_ {
        self.on(port).filter_map(Message::as_worker)
    }

    /// Drop all entries, keeping the allocation for the next instant.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Messages emitted by one component's output function within one
/// logical instant.
#[derive(Debug, Default, Clone)]
pub struct OutputBag {
    entries: Vec<(PortId, Message)>,
}

impl OutputBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a message on a port.
    pub fn push(&mut self, port: PortId, message: Message) {
        self.entries.push((port, message));
    }

    /// Whether nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emitted `(port, message)` pairs in emission order.
    pub fn entries(&self) -> impl Iterator<Item = (PortId, Message)> + '_ {
        self.entries.iter().copied()
    }

    /// Drop all entries, keeping the allocation for the next instant.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
