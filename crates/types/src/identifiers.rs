//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of workers in the pool. The routing rule and the wiring are
/// fixed around this size.
pub const WORKER_POOL_SIZE: usize = 3;

/// Job identifier.
///
/// Assigned monotonically by the generator, starting at 1, unique for
/// the run. Jobs carry no payload beyond their identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// The first job identifier of a run.
    pub const FIRST: Self = JobId(1);

    /// Get the next job identifier.
    pub fn next(self) -> Self {
        JobId(self.0 + 1)
    }

    /// Residue of this id under the worker-routing rule (`id % 3`).
    pub fn residue(self) -> usize {
        (self.0 % WORKER_POOL_SIZE as u64) as usize
    }

    /// The worker this job is routed to.
    pub fn assigned_worker(self) -> WorkerId {
        WorkerId::from_residue(self.residue())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.0)
    }
}

/// Worker identifier, 1-based as in the pool wiring (workers 1..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub u8);

impl WorkerId {
    /// All workers in the pool, in wiring order.
    pub const ALL: [WorkerId; WORKER_POOL_SIZE] = [WorkerId(1), WorkerId(2), WorkerId(3)];

    /// Map a routing residue (`id % 3`) to the worker wired to that
    /// dispatcher output: residue 0 goes to worker 1, residue 1 to
    /// worker 2, residue 2 to worker 3.
    ///
    /// # Panics
    ///
    /// Panics if `residue` is not a valid residue modulo the pool size.
    pub fn from_residue(residue: usize) -> Self {
        assert!(residue < WORKER_POOL_SIZE, "residue out of range: {residue}");
        WorkerId(residue as u8 + 1)
    }

    /// Zero-based index into per-worker arrays (ports, state vectors).
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Worker({})", self.0)
    }
}
