//! # Bus Message
//!
//! The unit published to the bus: a binary record addressed to a topic, with
//! string headers for record metadata and trace propagation.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use shared_types::{BusRecord, RECORD_VERSION};
use std::collections::BTreeMap;

/// Header carrying the record type tag.
pub const EVENT_TYPE_HEADER: &str = "event-type";

/// Header carrying the record schema version.
pub const EVENT_VERSION_HEADER: &str = "event-version";

/// A message ready for publishing.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    /// Destination topic.
    pub topic: String,
    /// Partition key.
    pub key: String,
    /// Encoded record.
    pub payload: Bytes,
    /// Record metadata and propagation headers.
    pub headers: BTreeMap<String, String>,
    /// Time the message was created.
    pub timestamp: DateTime<Utc>,
}

impl BusMessage {
    /// Encode `record` into a message for `topic`, stamping the record type
    /// and schema version headers.
    pub fn from_record<R: BusRecord>(topic: impl Into<String>, record: &R) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(EVENT_TYPE_HEADER.to_string(), R::EVENT_TYPE.to_string());
        headers.insert(EVENT_VERSION_HEADER.to_string(), RECORD_VERSION.to_string());

        Self {
            topic: topic.into(),
            key: record.key().to_string(),
            payload: Bytes::from(record.encode_to_vec()),
            headers,
            timestamp: Utc::now(),
        }
    }

    /// Add or replace a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Decode the payload back into a record.
    pub fn decode<R: BusRecord>(&self) -> Result<R, prost::DecodeError> {
        R::decode(self.payload.clone())
    }
}
