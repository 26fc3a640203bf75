//! The saga event envelope and its audit history.

use chrono::{DateTime, Utc};
use common::{EventId, TransactionId};
use domain::Payload;
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::{Result, SagaError};
use crate::outcome::Outcome;
use crate::party::Party;

/// One past step of a saga: who reported what, and where it was routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub party: Party,
    pub outcome: Outcome,
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(party: Party, outcome: Outcome, channel: Channel, created_at: DateTime<Utc>) -> Self {
        Self {
            party,
            outcome,
            channel,
            message: None,
            created_at,
        }
    }

    /// Attaches a human-readable note.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Identity of a delivery within one saga: the transaction, how far its
/// history had grown, and the outcome being reported at that point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplayKey {
    pub transaction_id: TransactionId,
    pub history_len: usize,
    pub party: Party,
    pub outcome: Outcome,
}

/// The message passed between services for one saga step.
///
/// Envelopes are never edited after publication: every hop produces a new
/// envelope with the same transaction ID and a history one entry longer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Identity of this hop. Initiators may omit it; every envelope the
    /// engine produces carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,

    /// Identity of the saga; preserved across all hops.
    pub transaction_id: TransactionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Who is reporting.
    pub party: Party,

    /// What they report.
    pub outcome: Outcome,

    /// Where this envelope is destined.
    pub channel: Channel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,

    /// Prior steps, oldest first. Append-only.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Envelope {
    /// Creates a new envelope builder.
    pub fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::default()
    }

    /// Builds the reply a participant sends back to the orchestrator after
    /// finishing its step. History and payload are carried forward.
    pub fn reply(&self, party: Party, outcome: Outcome, created_at: DateTime<Utc>) -> Envelope {
        Envelope {
            id: Some(EventId::new()),
            party,
            outcome,
            channel: Channel::ORCHESTRATOR,
            created_at,
            ..self.clone()
        }
    }

    /// Replaces the payload, e.g. with a participant's updated aggregate.
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Returns the key used to recognise a redelivery of this envelope.
    pub fn replay_key(&self) -> ReplayKey {
        ReplayKey {
            transaction_id: self.transaction_id.clone(),
            history_len: self.history.len(),
            party: self.party.clone(),
            outcome: self.outcome,
        }
    }

    /// Returns the most recent history entry.
    pub fn last_step(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Checks the envelope's own shape; topology membership is checked by
    /// the engine.
    pub fn validate(&self) -> Result<()> {
        if self.transaction_id.is_blank() {
            return Err(SagaError::MalformedEnvelope(
                "missing transactionId".to_string(),
            ));
        }
        if self.party.as_str().trim().is_empty() {
            return Err(SagaError::MalformedEnvelope("missing party".to_string()));
        }
        if let Some(payload) = &self.payload {
            payload.validate().map_err(|e| {
                SagaError::MalformedEnvelope(format!("invalid {} payload: {e}", payload.kind()))
            })?;
        }
        Ok(())
    }
}

/// Builder for constructing envelopes.
#[derive(Debug, Default)]
pub struct EnvelopeBuilder {
    id: Option<EventId>,
    transaction_id: Option<TransactionId>,
    order_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    party: Option<Party>,
    outcome: Option<Outcome>,
    channel: Option<Channel>,
    payload: Option<Payload>,
    history: Vec<HistoryEntry>,
}

impl EnvelopeBuilder {
    /// Sets the envelope ID. If not set, a new ID will be generated.
    pub fn id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn transaction_id(mut self, id: impl Into<TransactionId>) -> Self {
        self.transaction_id = Some(id.into());
        self
    }

    pub fn order_id(mut self, id: impl Into<String>) -> Self {
        self.order_id = Some(id.into());
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn party(mut self, party: Party) -> Self {
        self.party = Some(party);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Appends a history entry.
    pub fn history_entry(mut self, entry: HistoryEntry) -> Self {
        self.history.push(entry);
        self
    }

    /// Builds the envelope, failing if a required field is missing.
    pub fn try_build(self) -> Result<Envelope> {
        let missing = |field: &str| SagaError::MalformedEnvelope(format!("missing {field}"));
        Ok(Envelope {
            id: Some(self.id.unwrap_or_default()),
            transaction_id: self.transaction_id.ok_or_else(|| missing("transactionId"))?,
            order_id: self.order_id,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            party: self.party.ok_or_else(|| missing("party"))?,
            outcome: self.outcome.ok_or_else(|| missing("outcome"))?,
            channel: self.channel.ok_or_else(|| missing("channel"))?,
            payload: self.payload,
            history: self.history,
        })
    }
}
