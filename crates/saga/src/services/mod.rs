//! External collaborator traits and in-memory implementations.

pub mod ledger;
pub mod publisher;

pub use ledger::DeliveryLedger;
pub use publisher::{InMemoryPublisher, PublishedMessage, Publisher};
