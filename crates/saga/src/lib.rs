//! Transition engine and orchestrator runtime for topic-routed sagas.
//!
//! Participants do their local work and report an outcome on a channel; the
//! orchestrator decides, from who reported and what they reported, which
//! channel receives the next instruction. No locks, no two-phase commit.
//!
//! - [`channel`]: the closed set of channels a deployment addresses
//! - [`topology`]: the `(party, outcome) -> channel` table, built from [`config`]
//! - [`engine`]: the pure routing function over envelopes
//! - [`codec`]: JSON encoding at the broker boundary
//! - [`orchestrator`]: the side-effecting runtime around the engine

pub mod channel;
pub mod codec;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod party;
pub mod progress;
pub mod services;
pub mod state;
pub mod topology;

pub use channel::{Channel, ChannelRegistry};
pub use codec::JsonCodec;
pub use config::{FailurePolicy, ParticipantConfig, RuleConfig, TopologyConfig};
pub use engine::SagaEngine;
pub use envelope::{Envelope, EnvelopeBuilder, HistoryEntry, ReplayKey};
pub use error::{Result, SagaError};
pub use orchestrator::SagaOrchestrator;
pub use outcome::Outcome;
pub use party::Party;
pub use progress::SagaProgress;
pub use services::{DeliveryLedger, InMemoryPublisher, PublishedMessage, Publisher};
pub use state::SagaStatus;
pub use topology::{Participant, Topology, TransitionRule, TransitionTable};
