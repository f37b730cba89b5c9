//! Identity Gateway - authentication, authorization and CQRS dispatch for the
//! identity services.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                           IDENTITY GATEWAY                            │
//! ├───────────────────────────────────────────────────────────────────────┤
//! │   REST (axum)                            RPC (tonic server layers)    │
//! │  ContextLayer → RequestLogger           GrpcLoggingLayer              │
//! │        │                                       │                      │
//! │  verify_session ──────┐        ┌────── GrpcAuthLayer                  │
//! │                       ▼        ▼                                      │
//! │              ┌──────────────────────────┐                             │
//! │              │      Authenticator       │  AccessControlTable         │
//! │              │  (route key → role)      │  + SessionCodec (HS256)     │
//! │              └────────────┬─────────────┘                             │
//! │                           │                                           │
//! │              ┌────────────┴─────────────┐                             │
//! │              │         Mediator         │                             │
//! │              └──────┬────────────┬──────┘                             │
//! │          send (Command)        ask (Query)                            │
//! │                 │                    │                                │
//! │                 │        RetryingTransport<LoggingTransport<gRPC>>    │
//! └─────────────────┼────────────────────┼────────────────────────────────┘
//!                   ▼                    ▼
//!              Message bus         Query services
//!           (command service)  (users, groups, memberships, auth)
//! ```
//!
//! Writes are acknowledged once the bus accepts the record; the command service
//! applies them asynchronously. Reads are answered synchronously. Every outbound
//! publish and call carries the inbound request's `traceparent`.
//!
//! # Usage
//!
//! ```ignore
//! use identity_gateway::{GatewayConfig, IdentityGatewayService};
//! use shared_bus::InMemoryMessageBus;
//!
//! let mut config = GatewayConfig::default();
//! config.session.jwt_secret = secret;
//! let service = IdentityGatewayService::connect(config, Arc::new(InMemoryMessageBus::new()))?;
//! service.serve_until(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod auth;
pub mod dispatch;
pub mod domain;
pub mod http;
pub mod interceptors;
pub mod metrics;
pub mod rpc;
pub mod service;

// Re-exports for public API
pub use auth::{AccessControlTable, AuthError, Authenticator, Session, SessionCodec, SessionError};
pub use dispatch::{Command, CommandKind, DispatchError, Mediator, Query};
pub use domain::config::GatewayConfig;
pub use domain::context::RequestContext;
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::trace::TraceContext;
pub use interceptors::{InterceptorManager, RetryPolicy};
pub use metrics::GatewayMetrics;
pub use rpc::transport::{QueryService, QueryTransport, QueryTransports};
pub use service::IdentityGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
