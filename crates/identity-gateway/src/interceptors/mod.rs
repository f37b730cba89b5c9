//! Cross-cutting policy around RPC calls.
//!
//! Server side: [`GrpcAuthLayer`] and [`GrpcLoggingLayer`] for a tonic server.
//! Client side: every outbound query transport is wrapped as
//! `RetryingTransport<LoggingTransport<_>>`, so each attempt is logged and
//! only the backend call itself is retried.

pub mod grpc_auth;
pub mod logging;
pub mod retry;

pub use grpc_auth::{GrpcAuthLayer, GrpcAuthService};
pub use logging::{GrpcLoggingLayer, GrpcLoggingService, LoggingTransport};
pub use retry::{parse_code, RetryPolicy, RetryingTransport};

use crate::auth::Authenticator;
use crate::domain::config::QueryConfig;
use crate::domain::error::GatewayError;
use crate::rpc::transport::{GrpcTransport, QueryService, QueryTransport, QueryTransports};
use std::sync::Arc;

/// Builds the interceptor chain for both directions.
#[derive(Debug, Clone)]
pub struct InterceptorManager {
    authenticator: Arc<Authenticator>,
    retry: RetryPolicy,
}

impl InterceptorManager {
    pub fn new(authenticator: Arc<Authenticator>, retry: RetryPolicy) -> Self {
        Self {
            authenticator,
            retry,
        }
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn server_auth_layer(&self) -> GrpcAuthLayer {
        GrpcAuthLayer::new(Arc::clone(&self.authenticator))
    }

    pub fn server_logging_layer(&self) -> GrpcLoggingLayer {
        GrpcLoggingLayer::new()
    }

    /// Wrap a raw transport with logging (inner) and retry (outer).
    pub fn client<T: QueryTransport>(
        &self,
        service: QueryService,
        transport: T,
    ) -> Arc<dyn QueryTransport> {
        Arc::new(RetryingTransport::new(
            LoggingTransport::new(transport, service.as_str()),
            self.retry.clone(),
        ))
    }

    /// One lazily connected, decorated gRPC transport per query service.
    pub fn connect(&self, config: &QueryConfig) -> Result<QueryTransports, GatewayError> {
        let connect = |service: QueryService, addr: &str| -> Result<_, GatewayError> {
            let transport =
                GrpcTransport::connect_lazy(addr, config.connect_timeout, config.call_timeout)?;
            Ok(self.client(service, transport))
        };

        Ok(QueryTransports::new(
            connect(QueryService::Users, &config.users_addr)?,
            connect(QueryService::Groups, &config.groups_addr)?,
            connect(QueryService::Memberships, &config.memberships_addr)?,
            connect(QueryService::Auth, &config.auth_addr)?,
        ))
    }
}
