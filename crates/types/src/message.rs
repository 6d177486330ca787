//! Message envelope delivered over ports.

use crate::{JobId, WorkerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value delivered over a port within one logical instant.
///
/// Every port carries exactly one of these variants, declared when the
/// port is registered; the coupling graph only connects ports of the
/// same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// A job identifier (generator output, dispatcher routing, worker
    /// completions).
    Job(JobId),

    /// A worker identifier (persistence requests and acknowledgements).
    Worker(WorkerId),
}

impl Message {
    /// The declared kind this message matches.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Job(_) => MessageKind::Job,
            Message::Worker(_) => MessageKind::Worker,
        }
    }

    /// The job identifier, if this is a job message.
    pub fn as_job(&self) -> Option<JobId> {
        match self {
            Message::Job(id) => Some(*id),
            Message::Worker(_) => None,
        }
    }

    /// The worker identifier, if this is a worker message.
    pub fn as_worker(&self) -> Option<WorkerId> {
        match self {
            Message::Worker(id) => Some(*id),
            Message::Job(_) => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Job(id) => write!(f, "{id}"),
            Message::Worker(id) => write!(f, "{id}"),
        }
    }
}

/// The value type a port is declared to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Job identifiers.
    Job,
    /// Worker identifiers.
    Worker,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Job => write!(f, "job"),
            MessageKind::Worker => write!(f, "worker"),
        }
    }
}
