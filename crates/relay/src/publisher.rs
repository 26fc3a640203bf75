//! Publisher that hands outbound frames to the relay's writer.

use async_trait::async_trait;
use saga::{Channel, Publisher, SagaError};
use tokio::sync::mpsc;

use crate::frame::Frame;

/// Queues published messages as frames for the output writer.
#[derive(Debug, Clone)]
pub struct FramePublisher {
    tx: mpsc::UnboundedSender<Frame>,
}

impl FramePublisher {
    /// Creates a publisher and the receiving end the writer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Publisher for FramePublisher {
    async fn publish(&self, channel: &Channel, body: String) -> Result<(), SagaError> {
        self.tx
            .send(Frame::new(channel.clone(), body))
            .map_err(|_| SagaError::Publish("relay output closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_queues_frame() {
        let (publisher, mut rx) = FramePublisher::channel();
        publisher
            .publish(&Channel::NOTIFY_ENDING, "{}".to_string())
            .await
            .unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame, Frame::new(Channel::NOTIFY_ENDING, "{}"));
    }

    #[tokio::test]
    async fn test_publish_after_close_fails() {
        let (publisher, rx) = FramePublisher::channel();
        drop(rx);

        let err = publisher
            .publish(&Channel::ORCHESTRATOR, "{}".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, SagaError::Publish(_)));
    }
}
