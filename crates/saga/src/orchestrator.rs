//! Orchestrator runtime: drives sagas by routing envelopes between channels.

use chrono::Utc;
use common::TransactionId;
use domain::Payload;

use crate::channel::Channel;
use crate::codec::JsonCodec;
use crate::engine::SagaEngine;
use crate::envelope::Envelope;
use crate::error::{Result, SagaError};
use crate::outcome::Outcome;
use crate::party::Party;
use crate::services::ledger::DeliveryLedger;
use crate::services::publisher::Publisher;

/// Note recorded on the first routed step of every saga.
pub const STARTED_NOTE: &str = "Saga started";

/// Channels the orchestrator consumes.
pub const CONSUMED_CHANNELS: [Channel; 4] = [
    Channel::START_SAGA,
    Channel::ORCHESTRATOR,
    Channel::FINISH_SUCCESS,
    Channel::FINISH_FAIL,
];

/// Routes saga envelopes: decodes inbound messages, asks the engine for the
/// next hop and publishes the result.
///
/// The engine is pure; this type adds the side effects around it: the
/// publisher, redelivery guarding, dead-lettering, logs and metrics.
pub struct SagaOrchestrator<P>
where
    P: Publisher,
{
    engine: SagaEngine,
    codec: JsonCodec,
    publisher: P,
    ledger: DeliveryLedger,
}

impl<P> SagaOrchestrator<P>
where
    P: Publisher,
{
    /// Creates a new orchestrator.
    pub fn new(engine: SagaEngine, codec: JsonCodec, publisher: P) -> Self {
        Self {
            engine,
            codec,
            publisher,
            ledger: DeliveryLedger::new(),
        }
    }

    /// Replaces the default redelivery ledger, e.g. to change its capacity.
    pub fn with_ledger(mut self, ledger: DeliveryLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn engine(&self) -> &SagaEngine {
        &self.engine
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn ledger(&self) -> &DeliveryLedger {
        &self.ledger
    }

    /// Starts a new saga and publishes its first step.
    #[tracing::instrument(skip_all, fields(transaction_id = %transaction_id))]
    pub async fn start_saga(
        &self,
        transaction_id: TransactionId,
        payload: Option<Payload>,
    ) -> Result<Envelope> {
        let mut builder = Envelope::builder()
            .transaction_id(transaction_id)
            .party(Party::Orchestrator)
            .outcome(Outcome::Success)
            .channel(Channel::START_SAGA)
            .created_at(Utc::now());
        if let Some(payload) = payload {
            builder = builder.payload(payload);
        }
        self.start_from(builder.try_build()?).await
    }

    /// Starts a saga from an envelope received on `start-saga`.
    ///
    /// Whatever the initiator reported, the first step is routed as the
    /// orchestrator's own `SUCCESS`.
    pub async fn start_from(&self, mut envelope: Envelope) -> Result<Envelope> {
        envelope.party = Party::Orchestrator;
        envelope.outcome = Outcome::Success;
        let outbound = self.route(&envelope, Some(STARTED_NOTE)).await?;

        metrics::counter!("saga_started_total").increment(1);
        tracing::info!(
            transaction_id = %outbound.transaction_id,
            channel = %outbound.channel,
            "saga started"
        );
        Ok(outbound)
    }

    /// Routes a participant's report to the next channel.
    pub async fn continue_saga(&self, inbound: &Envelope) -> Result<Envelope> {
        let outbound = self.route(inbound, None).await?;
        tracing::info!(
            transaction_id = %outbound.transaction_id,
            party = %inbound.party,
            outcome = %inbound.outcome,
            channel = %outbound.channel,
            "saga continued"
        );
        Ok(outbound)
    }

    /// Ends a saga that arrived on `finish-success` or `finish-fail` and
    /// announces it on `notify-ending`.
    pub async fn finish(&self, inbound: &Envelope, terminal: &Channel) -> Result<Envelope> {
        let outbound = self.engine.conclude(inbound, terminal)?;
        self.publish(&outbound).await?;
        self.ledger.close(&outbound.transaction_id);

        let result = if outbound.outcome == Outcome::Success {
            "success"
        } else {
            "fail"
        };
        metrics::counter!("saga_finished_total", "result" => result).increment(1);
        if outbound.outcome == Outcome::Success {
            tracing::info!(transaction_id = %outbound.transaction_id, "saga finished successfully");
        } else {
            tracing::warn!(transaction_id = %outbound.transaction_id, "saga finished with errors");
        }
        Ok(outbound)
    }

    /// Handles a raw message consumed from `channel`.
    ///
    /// Returns `Ok(None)` for a redelivery that was already handled.
    #[tracing::instrument(skip_all, fields(channel = %channel))]
    pub async fn handle(&self, channel: &Channel, body: &str) -> Result<Option<Envelope>> {
        let started = std::time::Instant::now();

        let inbound = match self.codec.decode_envelope(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                metrics::counter!("saga_malformed_envelopes_total").increment(1);
                tracing::warn!(error = %e, "rejected inbound message");
                return Err(e);
            }
        };

        let key = inbound.replay_key();
        if !self.ledger.claim(channel, &key) {
            metrics::counter!("saga_duplicate_envelopes_total").increment(1);
            tracing::info!(
                transaction_id = %inbound.transaction_id,
                history_len = key.history_len,
                "dropping redelivered envelope"
            );
            return Ok(None);
        }

        let result = self.dispatch(channel, inbound).await;
        if let Err(e) = &result {
            if e.is_malformed() {
                metrics::counter!("saga_malformed_envelopes_total").increment(1);
            }
            // Malformed envelopes stay claimed: a retry would fail the same
            // way. Dead-lettered sagas are already closed.
            if !e.is_operator_alert() && !e.is_malformed() {
                self.ledger.release(channel, &key);
            }
        }

        metrics::histogram!("saga_dispatch_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        result.map(Some)
    }

    async fn dispatch(&self, channel: &Channel, inbound: Envelope) -> Result<Envelope> {
        if *channel == Channel::START_SAGA {
            self.start_from(inbound).await
        } else if *channel == Channel::ORCHESTRATOR {
            self.continue_saga(&inbound).await
        } else if channel.is_terminal() {
            self.finish(&inbound, channel).await
        } else {
            Err(SagaError::MalformedEnvelope(format!(
                "channel '{channel}' is not consumed by the orchestrator"
            )))
        }
    }

    /// Advances `inbound` and publishes the result. An undefined transition
    /// parks the saga on the dead-letter channel before the error is returned.
    async fn route(&self, inbound: &Envelope, note: Option<&str>) -> Result<Envelope> {
        let advanced = match note {
            Some(note) => self.engine.advance_with_note(inbound, note),
            None => self.engine.advance(inbound),
        };

        match advanced {
            Ok(outbound) => {
                self.publish(&outbound).await?;
                metrics::counter!("saga_transitions_total").increment(1);
                Ok(outbound)
            }
            Err(error @ SagaError::UndefinedTransition { .. }) => {
                metrics::counter!("saga_undefined_transitions_total").increment(1);
                tracing::error!(
                    transaction_id = %inbound.transaction_id,
                    party = %inbound.party,
                    outcome = %inbound.outcome,
                    envelope = %self.codec.encode_lossy(inbound),
                    "no transition configured; dead-lettering saga"
                );
                let parked = self.engine.dead_letter(inbound, &error);
                if let Err(publish_error) = self.publish(&parked).await {
                    tracing::error!(
                        transaction_id = %inbound.transaction_id,
                        error = %publish_error,
                        "failed to publish to dead-letter channel; delivery left for retry"
                    );
                    return Err(publish_error);
                }
                self.ledger.close(&inbound.transaction_id);
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    async fn publish(&self, envelope: &Envelope) -> Result<()> {
        let body = self.codec.encode(envelope)?;
        self.publisher.publish(&envelope.channel, body).await
    }
}
