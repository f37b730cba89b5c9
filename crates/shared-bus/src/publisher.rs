//! # Message Publisher
//!
//! Defines the publishing side of the message bus.

use crate::message::BusMessage;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Publish failures. Surfaced to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The publisher was shut down.
    #[error("publisher closed")]
    Closed,

    /// The broker rejected or failed to acknowledge the message.
    #[error("broker error: {0}")]
    Broker(String),

    /// No acknowledgement within the publish timeout.
    #[error("publish timed out after {0} ms")]
    Timeout(u64),
}

/// Trait for publishing messages to the bus.
///
/// Implementations are shared across all in-flight requests and must be safe
/// for concurrent use without external locking.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a message. Returns once the bus accepted it.
    async fn publish(&self, message: BusMessage) -> Result<(), PublishError>;

    /// Total number of messages accepted.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the message bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for tests and single-process runs; deployments use the Kafka
/// publisher.
pub struct InMemoryMessageBus {
    sender: broadcast::Sender<BusMessage>,
    messages_published: AtomicU64,
    closed: AtomicBool,
    capacity: usize,
}

impl InMemoryMessageBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            messages_published: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            capacity,
        }
    }

    /// Subscribe to every topic.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.sender.subscribe(), None)
    }

    /// Subscribe to a single topic.
    #[must_use]
    pub fn subscribe_topic(&self, topic: impl Into<String>) -> Subscription {
        let topic = topic.into();
        debug!(topic = %topic, "New topic subscription created");
        Subscription::new(self.sender.subscribe(), Some(topic))
    }

    /// Reject every later publish with [`PublishError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryMessageBus {
    async fn publish(&self, message: BusMessage) -> Result<(), PublishError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PublishError::Closed);
        }

        let topic = message.topic.clone();
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(message) {
            Ok(receivers) => {
                debug!(topic = %topic, receivers = receivers, "Message published");
            }
            Err(_) => {
                // No subscribers attached; the write is still accepted.
                warn!(topic = %topic, "Message published with no subscribers");
            }
        }
        Ok(())
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
