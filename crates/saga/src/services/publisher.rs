//! Publisher trait (the broker boundary) and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::channel::Channel;
use crate::error::{Result, SagaError};

/// Delivers encoded envelopes to a named channel.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes `body` to `channel`.
    async fn publish(&self, channel: &Channel, body: String) -> Result<()>;
}

/// A message captured by [`InMemoryPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub channel: Channel,
    pub body: String,
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    messages: Vec<PublishedMessage>,
    fail_on_publish: bool,
}

/// In-memory publisher for testing and dry runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to refuse every message.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_publish = fail;
    }

    /// Returns every message published so far, oldest first.
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .clone()
    }

    /// Returns the bodies published to `channel`, oldest first.
    pub fn published_to(&self, channel: &Channel) -> Vec<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .iter()
            .filter(|m| &m.channel == channel)
            .map(|m| m.body.clone())
            .collect()
    }

    /// Returns the number of messages published.
    pub fn message_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .len()
    }

    /// Removes and returns all captured messages.
    pub fn drain(&self) -> Vec<PublishedMessage> {
        std::mem::take(
            &mut self
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .messages,
        )
    }
}

#[async_trait]
impl Publisher for InMemoryPublisher {
    async fn publish(&self, channel: &Channel, body: String) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_publish {
            return Err(SagaError::Publish(format!(
                "broker unavailable for channel {channel}"
            )));
        }

        state.messages.push(PublishedMessage {
            channel: channel.clone(),
            body,
        });
        Ok(())
    }
}
