//! The orchestration engine: a pure function from an inbound envelope to
//! the outbound one.
//!
//! Saga state lives in the envelope history, never in the engine. Given the
//! same inbound envelope the engine always returns the same outbound
//! envelope, including its ID, so redelivered messages are safe to retry.

use std::sync::Arc;

use common::EventId;

use crate::channel::Channel;
use crate::envelope::{Envelope, HistoryEntry};
use crate::error::{Result, SagaError};
use crate::outcome::Outcome;
use crate::party::Party;
use crate::topology::Topology;

/// Note recorded when a saga ends successfully.
pub const FINISHED_SUCCESS_NOTE: &str = "Saga finished successfully";
/// Note recorded when a saga ends with errors.
pub const FINISHED_FAIL_NOTE: &str = "Saga finished with errors";

/// Applies the topology's transition table to inbound envelopes.
#[derive(Debug, Clone)]
pub struct SagaEngine {
    topology: Arc<Topology>,
}

impl SagaEngine {
    pub fn new(topology: Arc<Topology>) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Rejects envelopes that cannot be routed at all.
    fn check(&self, inbound: &Envelope) -> Result<()> {
        inbound.validate()?;
        if !self.topology.is_registered(&inbound.party) {
            return Err(SagaError::MalformedEnvelope(format!(
                "unknown party '{}'",
                inbound.party
            )));
        }
        Ok(())
    }

    /// Resolves the channel the inbound envelope should be routed to.
    pub fn resolve(&self, inbound: &Envelope) -> Result<&Channel> {
        self.check(inbound)?;
        self.topology.next_channel(&inbound.party, inbound.outcome)
    }

    /// Produces the next envelope of the saga.
    pub fn advance(&self, inbound: &Envelope) -> Result<Envelope> {
        let channel = self.resolve(inbound)?.clone();
        let entry = HistoryEntry::new(
            inbound.party.clone(),
            inbound.outcome,
            channel.clone(),
            inbound.created_at,
        );
        tracing::debug!(
            transaction_id = %inbound.transaction_id,
            party = %inbound.party,
            outcome = %inbound.outcome,
            %channel,
            "resolved saga transition"
        );
        Ok(successor(inbound, inbound.party.clone(), inbound.outcome, channel, entry))
    }

    /// Like [`advance`](Self::advance), recording `note` in the new history entry.
    pub fn advance_with_note(
        &self,
        inbound: &Envelope,
        note: impl Into<String>,
    ) -> Result<Envelope> {
        let mut outbound = self.advance(inbound)?;
        if let Some(entry) = outbound.history.last_mut() {
            entry.message = Some(note.into());
        }
        Ok(outbound)
    }

    /// Closes a saga that arrived on one of the two terminal channels,
    /// producing the orchestrator's announcement for `notify-ending`.
    pub fn conclude(&self, inbound: &Envelope, terminal: &Channel) -> Result<Envelope> {
        inbound.validate()?;
        let (outcome, note) = if *terminal == Channel::FINISH_SUCCESS {
            (Outcome::Success, FINISHED_SUCCESS_NOTE)
        } else if *terminal == Channel::FINISH_FAIL {
            (Outcome::Fail, FINISHED_FAIL_NOTE)
        } else {
            return Err(SagaError::MalformedEnvelope(format!(
                "'{terminal}' is not a terminal channel"
            )));
        };

        let entry = HistoryEntry::new(
            Party::Orchestrator,
            outcome,
            Channel::NOTIFY_ENDING,
            inbound.created_at,
        )
        .with_message(note);
        Ok(successor(
            inbound,
            Party::Orchestrator,
            outcome,
            Channel::NOTIFY_ENDING,
            entry,
        ))
    }

    /// Builds the envelope that parks a saga on the dead-letter channel after
    /// `error` stopped it.
    pub fn dead_letter(&self, inbound: &Envelope, error: &SagaError) -> Envelope {
        let channel = self.topology.dead_letter_channel().clone();
        let entry = HistoryEntry::new(
            inbound.party.clone(),
            inbound.outcome,
            channel.clone(),
            inbound.created_at,
        )
        .with_message(error.to_string());
        successor(inbound, inbound.party.clone(), inbound.outcome, channel, entry)
    }
}

/// Copies saga identity and payload into a new envelope bound for `channel`
/// with `entry` appended to the history.
fn successor(
    inbound: &Envelope,
    party: Party,
    outcome: Outcome,
    channel: Channel,
    entry: HistoryEntry,
) -> Envelope {
    let id = EventId::derived(
        inbound.id.unwrap_or(EventId::SAGA_NAMESPACE),
        &format!(
            "{}:{}:{}",
            inbound.transaction_id,
            inbound.history.len(),
            channel
        ),
    );
    let mut history = Vec::with_capacity(inbound.history.len() + 1);
    history.extend(inbound.history.iter().cloned());
    history.push(entry);

    Envelope {
        id: Some(id),
        transaction_id: inbound.transaction_id.clone(),
        order_id: inbound.order_id.clone(),
        created_at: inbound.created_at,
        party,
        outcome,
        channel,
        payload: inbound.payload.clone(),
        history,
    }
}
