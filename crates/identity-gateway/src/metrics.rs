//! Gateway metrics.
//!
//! Plain atomic counters, exported as JSON at `/metrics` or in Prometheus text
//! format with the `metrics` feature.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,

    // Authorization
    pub auth_rejected: AtomicU64,

    // Dispatch
    pub commands_published: AtomicU64,
    pub commands_failed: AtomicU64,
    pub queries_total: AtomicU64,
    pub queries_failed: AtomicU64,

    // Latency tracking
    pub total_latency_ms: AtomicU64,

    /// Requests per route key (`"POST /api/v1/groups"`)
    operations: RwLock<BTreeMap<String, AtomicU64>>,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished HTTP request
    pub fn record_request(&self, operation: &str, success: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if let Some(counter) = self.operations.read().get(operation) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.operations
            .write()
            .entry(operation.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auth_rejected(&self) {
        self.auth_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_command(&self, success: bool) {
        if success {
            self.commands_published.fetch_add(1, Ordering::Relaxed);
        } else {
            self.commands_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_query(&self, success: bool) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.queries_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Requests seen for one route key
    pub fn operation_count(&self, operation: &str) -> u64 {
        self.operations
            .read()
            .get(operation)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        for (name, help, value) in [
            (
                "identity_gateway_requests_total",
                "Total number of HTTP requests",
                self.requests_total.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_requests_success_total",
                "Successful requests",
                self.requests_success.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_requests_error_total",
                "Failed requests",
                self.requests_error.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_auth_rejected_total",
                "Requests refused by authorization",
                self.auth_rejected.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_commands_published_total",
                "Commands accepted by the message bus",
                self.commands_published.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_commands_failed_total",
                "Commands the message bus rejected",
                self.commands_failed.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_queries_total",
                "Queries sent to backend services",
                self.queries_total.load(Ordering::Relaxed),
            ),
            (
                "identity_gateway_queries_failed_total",
                "Queries that failed after retries",
                self.queries_failed.load(Ordering::Relaxed),
            ),
        ] {
            output.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n"
            ));
        }

        output.push_str(
            "# HELP identity_gateway_operation_requests_total Requests per route\n\
             # TYPE identity_gateway_operation_requests_total counter\n",
        );
        for (operation, count) in self.operations.read().iter() {
            output.push_str(&format!(
                "identity_gateway_operation_requests_total{{route=\"{}\"}} {}\n",
                operation,
                count.load(Ordering::Relaxed)
            ));
        }

        output.push_str(&format!(
            "# HELP identity_gateway_average_latency_ms Average request latency\n\
             # TYPE identity_gateway_average_latency_ms gauge\n\
             identity_gateway_average_latency_ms {:.2}\n",
            self.average_latency_ms()
        ));

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let operations: serde_json::Map<String, serde_json::Value> = self
            .operations
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed).into()))
            .collect();

        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "error": self.requests_error.load(Ordering::Relaxed),
            },
            "auth": {
                "rejected": self.auth_rejected.load(Ordering::Relaxed),
            },
            "commands": {
                "published": self.commands_published.load(Ordering::Relaxed),
                "failed": self.commands_failed.load(Ordering::Relaxed),
            },
            "queries": {
                "total": self.queries_total.load(Ordering::Relaxed),
                "failed": self.queries_failed.load(Ordering::Relaxed),
            },
            "operations": operations,
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

impl std::fmt::Debug for GatewayMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayMetrics")
            .field("requests_total", &self.requests_total.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    pub fn finish(self, operation: &str, success: bool) -> u64 {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics.record_request(operation, success, latency_ms);
        latency_ms
    }
}
