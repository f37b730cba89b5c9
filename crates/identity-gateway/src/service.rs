//! Identity gateway service.
//!
//! Wires the session codec, access table, interceptors and mediator into the
//! REST router and runs it until shut down.

use crate::auth::{AccessControlTable, Authenticator, SessionCodec};
use crate::dispatch::Mediator;
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::http::{self, AppState};
use crate::interceptors::{InterceptorManager, RetryPolicy};
use crate::metrics::GatewayMetrics;
use crate::rpc::transport::QueryTransports;
use axum::Router;
use shared_bus::MessagePublisher;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

pub struct IdentityGatewayService {
    config: GatewayConfig,
    authenticator: Arc<Authenticator>,
    interceptors: InterceptorManager,
    mediator: Mediator,
    metrics: Arc<GatewayMetrics>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl IdentityGatewayService {
    /// Build the gateway over already decorated query transports.
    pub fn new(
        config: GatewayConfig,
        publisher: Arc<dyn MessagePublisher>,
        transports: QueryTransports,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let interceptors = Self::interceptors_for(&config)?;
        Ok(Self::assemble(config, publisher, interceptors, transports))
    }

    /// Build the gateway with one lazily connected gRPC transport per query
    /// service, decorated with the configured retry policy.
    pub fn connect(
        config: GatewayConfig,
        publisher: Arc<dyn MessagePublisher>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let interceptors = Self::interceptors_for(&config)?;
        let transports = interceptors.connect(&config.query)?;
        Ok(Self::assemble(config, publisher, interceptors, transports))
    }

    fn interceptors_for(config: &GatewayConfig) -> Result<InterceptorManager, GatewayError> {
        let codec = Arc::new(SessionCodec::from_config(&config.session));
        let table = Arc::new(AccessControlTable::for_routes(&config.http));
        info!(routes = table.len(), "Access control table built");

        let retry = RetryPolicy::try_from(&config.retry)?;
        Ok(InterceptorManager::new(
            Arc::new(Authenticator::new(table, codec)),
            retry,
        ))
    }

    fn assemble(
        config: GatewayConfig,
        publisher: Arc<dyn MessagePublisher>,
        interceptors: InterceptorManager,
        transports: QueryTransports,
    ) -> Self {
        let mediator = Mediator::new(publisher, transports, config.topics.clone());
        Self {
            authenticator: Arc::clone(interceptors.authenticator()),
            config,
            interceptors,
            mediator,
            metrics: Arc::new(GatewayMetrics::new()),
            shutdown_tx: None,
        }
    }

    /// Serve until [`shutdown`](Self::shutdown) is called.
    pub async fn start(&mut self) -> Result<(), GatewayError> {
        if self.shutdown_tx.is_some() {
            return Err(GatewayError::AlreadyStarted);
        }
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        self.serve_until(async move {
            let _ = shutdown_rx.await;
        })
        .await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn serve_until<F>(&self, signal: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(service = %self.config.service_name, "Starting identity gateway...");

        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        info!(addr = %addr, "Starting HTTP server");

        let server = axum::serve(listener, self.router()).with_graceful_shutdown(async move {
            signal.await;
            info!("Received shutdown signal");
        });

        if let Err(e) = server.await {
            error!(error = %e, "HTTP server error");
            return Err(GatewayError::Serve(e.to_string()));
        }

        info!("Identity gateway stopped");
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// REST router with all middleware attached.
    pub fn router(&self) -> Router {
        http::router(AppState {
            mediator: self.mediator.clone(),
            authenticator: Arc::clone(&self.authenticator),
            metrics: Arc::clone(&self.metrics),
            config: Arc::new(self.config.http.clone()),
        })
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    /// Interceptors for a tonic server fronted by the same access table.
    pub fn interceptors(&self) -> &InterceptorManager {
        &self.interceptors
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
