//! Shared identifier types for the saga orchestrator.

pub mod types;

pub use types::{EventId, TransactionId};
