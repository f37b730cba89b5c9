//! # Shared Bus - Message Bus for Command Publishing
//!
//! Write operations leave the gateway as binary records on the message bus.
//! The command service consumes them and applies them asynchronously.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │   Gateway    │                    │ Command Service  │
//! │              │    publish()       │                  │
//! │              │ ──────┐            │                  │
//! └──────────────┘       │            └──────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Message Bus │          │
//!                  │  (topics)    │ ─────────┘
//!                  └──────────────┘  consume
//! ```
//!
//! ## Implementations
//!
//! - [`InMemoryMessageBus`]: broadcast channel, for tests and local runs.
//! - `KafkaPublisher` (feature `kafka`): rdkafka producer.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

#[cfg(feature = "kafka")]
pub mod kafka;
pub mod message;
pub mod publisher;
pub mod subscriber;

pub use message::{BusMessage, EVENT_TYPE_HEADER, EVENT_VERSION_HEADER};
pub use publisher::{InMemoryMessageBus, MessagePublisher, PublishError};
pub use subscriber::{Subscription, SubscriptionError};

#[cfg(feature = "kafka")]
pub use kafka::{KafkaPublisher, KafkaSettings};

/// Messages buffered per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
