//! REST surface.
//!
//! Thin marshaling over the mediator: handlers validate the body, build a
//! command or query and map the outcome to a status code. Protected routes
//! sit behind [`verify::verify_session`].

pub mod auth;
pub mod context;
pub mod dto;
pub mod groups;
pub mod logger;
pub mod memberships;
pub mod users;
pub mod verify;

pub use context::{ContextLayer, ContextService};
pub use logger::{RequestLoggerLayer, RequestLoggerService};

use crate::auth::Authenticator;
use crate::dispatch::{Command, Mediator, Query};
use crate::domain::config::HttpConfig;
use crate::domain::context::RequestContext;
use crate::domain::error::ApiError;
use crate::metrics::GatewayMetrics;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use dto::Validate;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub mediator: Mediator,
    pub authenticator: Arc<Authenticator>,
    pub metrics: Arc<GatewayMetrics>,
    pub config: Arc<HttpConfig>,
}

impl AppState {
    /// Error as the client should see it.
    pub fn fail(&self, err: impl Into<ApiError>) -> ApiError {
        err.into().for_client(self.config.debug_errors_response)
    }

    /// Unwrap and validate a JSON body.
    pub fn body<T: Validate>(&self, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
        let Json(body) = payload.map_err(|rejection| {
            self.fail(ApiError::bad_request("invalid request body").with_detail(rejection.body_text()))
        })?;
        body.validate().map_err(|e| self.fail(e))?;
        Ok(body)
    }

    /// Publish a command, counting the outcome.
    pub async fn send<C: Command>(&self, ctx: &RequestContext, command: &C) -> Result<(), ApiError> {
        let result = self.mediator.send(ctx, command).await;
        self.metrics.record_command(result.is_ok());
        result.map_err(|e| self.fail(e))
    }

    /// Run a query, counting the outcome.
    pub async fn ask<Q: Query>(
        &self,
        ctx: &RequestContext,
        query: &Q,
    ) -> Result<Q::Response, ApiError> {
        let result = self.mediator.ask(ctx, query).await;
        self.metrics.record_query(result.is_ok());
        result.map_err(|e| self.fail(e))
    }
}

/// Full REST router: the four resources under the base path, plus `/health`
/// and `/metrics` at the root.
pub fn router(state: AppState) -> Router {
    let http = Arc::clone(&state.config);
    let base = http.base_path.trim_end_matches('/');

    let resources = Router::new()
        .nest(&http.users_path, users::routes())
        .nest(&http.groups_path, groups::routes())
        .nest(&http.memberships_path, memberships::routes())
        .nest(&http.auth_path, auth::routes())
        .route_layer(from_fn_with_state(state.clone(), verify::verify_session));

    let api = if base.is_empty() {
        resources
    } else {
        Router::new().nest(base, resources)
    };

    let root = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));
    #[cfg(feature = "metrics")]
    let root = root.route("/metrics/prometheus", get(prometheus));

    root.merge(api)
        .layer(RequestLoggerLayer::new(
            Arc::clone(&state.metrics),
            &http.ignore_log_urls,
        ))
        .layer(ContextLayer::new(http.request_timeout))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}

#[cfg(feature = "metrics")]
async fn prometheus(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
