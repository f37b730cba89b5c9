//! W3C Trace Context propagation.
//!
//! A [`TraceContext`] is created for every inbound request (continuing the
//! caller's trace when a valid `traceparent` header arrives) and rendered into
//! bus message headers and RPC metadata on the way out.

use http::{HeaderMap, HeaderValue};
use std::fmt;
use uuid::Uuid;

/// Header / metadata key carrying the trace context.
pub const TRACEPARENT: &str = "traceparent";

const VERSION: &str = "00";

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceContext {
    trace_id: [u8; 16],
    span_id: [u8; 8],
    sampled: bool,
}

impl TraceContext {
    /// Start a new trace.
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4().into_bytes(),
            span_id: new_span_id(),
            sampled: true,
        }
    }

    /// New span in the same trace.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id: new_span_id(),
            sampled: self.sampled,
        }
    }

    /// Parse `version-trace_id-parent_id-trace_flags`.
    ///
    /// All-zero ids and malformed fields are rejected.
    pub fn parse(traceparent: &str) -> Option<Self> {
        let parts: Vec<&str> = traceparent.trim().split('-').collect();
        if parts.len() != 4 || parts[0].len() != 2 || parts[0] == "ff" {
            return None;
        }

        let mut trace_id = [0u8; 16];
        let mut span_id = [0u8; 8];
        let mut flags = [0u8; 1];
        hex::decode_to_slice(parts[1], &mut trace_id).ok()?;
        hex::decode_to_slice(parts[2], &mut span_id).ok()?;
        hex::decode_to_slice(parts[3], &mut flags).ok()?;

        if trace_id == [0u8; 16] || span_id == [0u8; 8] {
            return None;
        }

        Some(Self {
            trace_id,
            span_id,
            sampled: flags[0] & 0x01 == 0x01,
        })
    }

    /// Continue the caller's trace if the headers carry one, else start a new one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .map(|parent| parent.child())
            .unwrap_or_else(Self::new_root)
    }

    pub fn to_traceparent(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            VERSION,
            hex::encode(self.trace_id),
            hex::encode(self.span_id),
            if self.sampled { "01" } else { "00" }
        )
    }

    /// Write `traceparent` into outgoing headers.
    pub fn inject(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.to_traceparent()) {
            headers.insert(TRACEPARENT, value);
        }
    }

    pub fn trace_id(&self) -> String {
        hex::encode(self.trace_id)
    }

    pub fn span_id(&self) -> String {
        hex::encode(self.span_id)
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled
    }
}

impl fmt::Debug for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_traceparent())
    }
}

fn new_span_id() -> [u8; 8] {
    let bytes = Uuid::new_v4().into_bytes();
    let mut span_id = [0u8; 8];
    span_id.copy_from_slice(&bytes[..8]);
    span_id
}
