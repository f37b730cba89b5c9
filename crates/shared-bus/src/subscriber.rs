//! # Bus Subscriber
//!
//! Receiving side of the in-memory bus. Used by tests and local consumers to
//! observe what the gateway published.

use crate::message::BusMessage;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("message bus closed")]
    Closed,
}

/// A subscription handle, optionally narrowed to one topic.
pub struct Subscription {
    receiver: broadcast::Receiver<BusMessage>,
    topic: Option<String>,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<BusMessage>, topic: Option<String>) -> Self {
        Self { receiver, topic }
    }

    fn matches(&self, message: &BusMessage) -> bool {
        self.topic
            .as_deref()
            .map_or(true, |topic| topic == message.topic)
    }

    /// Receive the next matching message. `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.matches(&message) {
                return Some(message);
            }
        }
    }

    /// Receive the next matching message without waiting.
    pub fn try_recv(&mut self) -> Result<Option<BusMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.matches(&message) {
                return Ok(Some(message));
            }
        }
    }

    /// Topic this subscription is narrowed to, if any.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}
