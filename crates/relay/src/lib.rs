//! Line-oriented host for the saga orchestrator.
//!
//! Reads `<channel>\t<json>` frames, hands each one to the orchestrator and
//! writes every published message back out in the same framing. A broker
//! bridge sits on either side of the pipe.

pub mod config;
pub mod error;
pub mod frame;
pub mod publisher;

use std::future::Future;
use std::sync::Arc;

use saga::{DeliveryLedger, Envelope, JsonCodec, SagaEngine, SagaOrchestrator, Topology};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

pub use config::Config;
pub use error::{RelayError, Result};
pub use frame::Frame;
pub use publisher::FramePublisher;

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Blank line.
    Ignored,
    /// The orchestrator routed the envelope and published the result.
    Routed(Box<Envelope>),
    /// A redelivery that was already handled.
    Duplicate,
}

/// Counters reported when the relay stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub frames: u64,
    pub routed: u64,
    pub duplicates: u64,
    pub rejected: u64,
    pub alerts: u64,
}

/// Drives a [`SagaOrchestrator`] from a stream of frames.
pub struct Relay {
    orchestrator: SagaOrchestrator<FramePublisher>,
    outbox: mpsc::UnboundedReceiver<Frame>,
    stats: RelayStats,
}

impl Relay {
    /// Creates a relay routing over `topology`.
    pub fn new(topology: Topology) -> Self {
        let (publisher, outbox) = FramePublisher::channel();
        let engine = SagaEngine::new(Arc::new(topology));
        Self {
            orchestrator: SagaOrchestrator::new(engine, JsonCodec::new(), publisher),
            outbox,
            stats: RelayStats::default(),
        }
    }

    /// Replaces the orchestrator's redelivery ledger.
    pub fn with_ledger(self, ledger: DeliveryLedger) -> Self {
        Self {
            orchestrator: self.orchestrator.with_ledger(ledger),
            ..self
        }
    }

    pub fn orchestrator(&self) -> &SagaOrchestrator<FramePublisher> {
        &self.orchestrator
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Parses one input line and hands the frame to the orchestrator.
    pub async fn process_line(&self, line: &str) -> Result<Disposition> {
        let registry = self.orchestrator.engine().topology().registry();
        let Some(frame) = Frame::parse(line, registry)? else {
            return Ok(Disposition::Ignored);
        };

        let handled = self.orchestrator.handle(&frame.channel, &frame.body).await?;
        Ok(match handled {
            Some(envelope) => Disposition::Routed(Box::new(envelope)),
            None => Disposition::Duplicate,
        })
    }

    /// Processes lines from `reader` until EOF or until `shutdown` resolves,
    /// writing published frames to `writer` after each line.
    ///
    /// Rejected lines are logged and skipped; only I/O failures stop the loop.
    pub async fn run<R, W, S>(&mut self, reader: R, mut writer: W, shutdown: S) -> Result<RelayStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let mut lines = reader.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping relay");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("input closed, stopping relay");
                        break;
                    };
                    let result = self.process_line(&line).await;
                    self.record(result);
                    self.flush(&mut writer).await?;
                }
            }
        }

        self.flush(&mut writer).await?;
        Ok(self.stats)
    }

    fn record(&mut self, result: Result<Disposition>) {
        match result {
            Ok(Disposition::Ignored) => return,
            Ok(Disposition::Routed(envelope)) => {
                self.stats.routed += 1;
                metrics::counter!("relay_frames_total", "result" => "routed").increment(1);
                tracing::debug!(
                    transaction_id = %envelope.transaction_id,
                    channel = %envelope.channel,
                    "frame routed"
                );
            }
            Ok(Disposition::Duplicate) => {
                self.stats.duplicates += 1;
                metrics::counter!("relay_frames_total", "result" => "duplicate").increment(1);
            }
            Err(e) if e.is_operator_alert() => {
                self.stats.alerts += 1;
                metrics::counter!("relay_frames_total", "result" => "alert").increment(1);
                tracing::error!(error = %e, "frame needs operator attention");
            }
            Err(e) => {
                self.stats.rejected += 1;
                metrics::counter!("relay_frames_total", "result" => "rejected").increment(1);
                tracing::warn!(error = %e, "skipping frame");
            }
        }
        self.stats.frames += 1;
    }

    async fn flush<W: AsyncWrite + Unpin>(&mut self, writer: &mut W) -> Result<()> {
        while let Ok(frame) = self.outbox.try_recv() {
            writer.write_all(frame.to_line().as_bytes()).await?;
        }
        writer.flush().await?;
        Ok(())
    }
}
