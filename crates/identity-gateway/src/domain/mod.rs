//! Domain types for the identity gateway.
//!
//! Configuration, error envelope and the per-request trace/cancellation context.

pub mod config;
pub mod context;
pub mod error;
pub mod trace;

// Re-exports for convenience
pub use config::{ConfigError, GatewayConfig};
pub use context::RequestContext;
pub use error::{status_for_code, ApiError, ApiResult, GatewayError};
pub use trace::{TraceContext, TRACEPARENT};
