//! Core types for the jobflow pipeline.
//!
//! This crate provides the foundational types used throughout the
//! simulation:
//!
//! - **Identifiers**: [`JobId`], [`WorkerId`]
//! - **Messages**: [`Message`], the envelope delivered over ports, and
//!   [`MessageKind`], the declared value type of a port
//!
//! This crate is self-contained and does not depend on any other
//! workspace crates, making it the foundation layer.

mod identifiers;
mod message;

pub use identifiers::{JobId, WorkerId, WORKER_POOL_SIZE};
pub use message::{Message, MessageKind};
