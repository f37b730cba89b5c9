//! # Kafka Publisher
//!
//! [`MessagePublisher`] backed by an rdkafka `FutureProducer`. The producer is
//! internally synchronized and shared by every request.

use crate::message::BusMessage;
use crate::publisher::{MessagePublisher, PublishError};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Connection settings for the Kafka producer.
#[derive(Debug, Clone)]
pub struct KafkaSettings {
    pub brokers: Vec<String>,
    pub client_id: String,
    /// How long to wait for the broker acknowledgement.
    pub publish_timeout: Duration,
}

pub struct KafkaPublisher {
    producer: FutureProducer,
    publish_timeout: Duration,
    messages_published: AtomicU64,
}

impl KafkaPublisher {
    /// Create the producer.
    ///
    /// - `acks=all`: wait for all in-sync replicas.
    /// - `enable.idempotence=true`: no duplicates within a producer session.
    /// - `linger.ms=10`: small batching window.
    pub fn new(settings: &KafkaSettings) -> Result<Self, KafkaError> {
        info!(brokers = ?settings.brokers, "Initializing Kafka producer");

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", settings.brokers.join(","))
            .set("client.id", &settings.client_id)
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("linger.ms", "10")
            .set(
                "message.timeout.ms",
                settings.publish_timeout.as_millis().to_string(),
            )
            .create()?;

        Ok(Self {
            producer,
            publish_timeout: settings.publish_timeout,
            messages_published: AtomicU64::new(0),
        })
    }
}

#[async_trait]
impl MessagePublisher for KafkaPublisher {
    async fn publish(&self, message: BusMessage) -> Result<(), PublishError> {
        let mut headers = OwnedHeaders::new_with_capacity(message.headers.len());
        for (name, value) in &message.headers {
            headers = headers.insert(Header {
                key: name.as_str(),
                value: Some(value.as_str()),
            });
        }

        let record = FutureRecord::to(&message.topic)
            .key(message.key.as_str())
            .payload(message.payload.as_ref())
            .headers(headers)
            .timestamp(message.timestamp.timestamp_millis());

        let start = Instant::now();
        match self
            .producer
            .send(record, Timeout::After(self.publish_timeout))
            .await
        {
            Ok((partition, offset)) => {
                self.messages_published.fetch_add(1, Ordering::Relaxed);
                debug!(
                    topic = %message.topic,
                    partition = partition,
                    offset = offset,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Message persisted to Kafka"
                );
                Ok(())
            }
            Err((KafkaError::MessageProduction(code), _)) if is_timeout(&code) => {
                error!(topic = %message.topic, "Kafka publish timed out");
                Err(PublishError::Timeout(self.publish_timeout.as_millis() as u64))
            }
            Err((err, _)) => {
                error!(topic = %message.topic, error = %err, "Kafka publish failed");
                Err(PublishError::Broker(err.to_string()))
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}

fn is_timeout(code: &rdkafka::types::RDKafkaErrorCode) -> bool {
    matches!(code, rdkafka::types::RDKafkaErrorCode::MessageTimedOut)
}
