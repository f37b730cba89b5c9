//! CQRS dispatch.
//!
//! Writes go to the message bus and return once the publish is accepted.
//! Reads go to the query services and return the backend reply. Both paths
//! carry the request's trace context and honour its cancellation.

pub mod command;
pub mod query;

pub use command::{Command, CommandKind};
pub use query::Query;

use crate::domain::config::TopicsConfig;
use crate::domain::context::RequestContext;
use crate::domain::error::{status_for_code, ApiError};
use crate::domain::trace::TRACEPARENT;
use crate::rpc::transport::{call, QueryTransports};
use axum::http::StatusCode;
use shared_bus::{BusMessage, MessagePublisher, PublishError};
use std::sync::Arc;
use thiserror::Error;
use tonic::Status;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Rejected before dispatch.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("publish to {topic} failed: {source}")]
    Publish {
        topic: String,
        #[source]
        source: PublishError,
    },

    #[error("query {method} failed: {status}")]
    Query {
        method: &'static str,
        status: Status,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl DispatchError {
    fn interrupted(ctx: &RequestContext) -> Self {
        if ctx.is_cancelled() {
            DispatchError::Cancelled
        } else {
            DispatchError::DeadlineExceeded
        }
    }

    /// Backend status code when the failure came from a query.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            DispatchError::Query { status, .. } => Some(status.code()),
            _ => None,
        }
    }

    pub fn to_status(&self) -> Status {
        match self {
            DispatchError::Validation(msg) => Status::invalid_argument(msg.clone()),
            DispatchError::Publish { .. } => Status::unavailable(self.to_string()),
            DispatchError::Query { status, .. } => status.clone(),
            DispatchError::Cancelled => Status::cancelled(self.to_string()),
            DispatchError::DeadlineExceeded => Status::deadline_exceeded(self.to_string()),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match &err {
            DispatchError::Validation(msg) => ApiError::bad_request(msg.clone()),
            DispatchError::Publish { .. } => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "message bus unavailable")
                    .with_detail(err.to_string())
            }
            DispatchError::Query { status, .. } => {
                ApiError::new(status_for_code(status.code()), status.code().description())
                    .with_detail(err.to_string())
            }
            DispatchError::Cancelled => {
                ApiError::new(StatusCode::REQUEST_TIMEOUT, "request cancelled")
            }
            DispatchError::DeadlineExceeded => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "request deadline exceeded")
            }
        }
    }
}

/// Single entry point for both write and read operations.
#[derive(Clone)]
pub struct Mediator {
    publisher: Arc<dyn MessagePublisher>,
    queries: QueryTransports,
    topics: Arc<TopicsConfig>,
}

impl Mediator {
    pub fn new(
        publisher: Arc<dyn MessagePublisher>,
        queries: QueryTransports,
        topics: TopicsConfig,
    ) -> Self {
        Self {
            publisher,
            queries,
            topics: Arc::new(topics),
        }
    }

    pub fn topics(&self) -> &TopicsConfig {
        &self.topics
    }

    /// Publish a command. Success means the bus accepted the record, not that
    /// the write has been applied.
    pub async fn send<C: Command>(
        &self,
        ctx: &RequestContext,
        command: &C,
    ) -> Result<(), DispatchError> {
        if command.key().is_empty() {
            return Err(DispatchError::Validation(format!(
                "{} requires an id",
                C::KIND
            )));
        }
        if ctx.is_done() {
            return Err(DispatchError::interrupted(ctx));
        }

        let topic = C::KIND.topic(&self.topics);
        let message = BusMessage::from_record(topic, command)
            .with_header(TRACEPARENT, ctx.trace().to_traceparent());

        match ctx.guard(self.publisher.publish(message)).await {
            Some(Ok(())) => {
                info!(
                    command = %C::KIND,
                    topic,
                    key = command.key(),
                    trace_id = %ctx.trace().trace_id(),
                    "Command published"
                );
                Ok(())
            }
            Some(Err(source)) => Err(DispatchError::Publish {
                topic: topic.to_string(),
                source,
            }),
            None => {
                debug!(command = %C::KIND, "Publish abandoned, request finished first");
                Err(DispatchError::interrupted(ctx))
            }
        }
    }

    /// Run a query against its backend service.
    pub async fn ask<Q: Query>(
        &self,
        ctx: &RequestContext,
        query: &Q,
    ) -> Result<Q::Response, DispatchError> {
        if ctx.is_done() {
            return Err(DispatchError::interrupted(ctx));
        }

        let transport = self.queries.get(Q::SERVICE);
        call(transport, ctx, Q::METHOD, query)
            .await
            .map_err(|status| match status.code() {
                tonic::Code::Cancelled if ctx.is_cancelled() => DispatchError::Cancelled,
                tonic::Code::DeadlineExceeded if ctx.is_expired() => {
                    DispatchError::DeadlineExceeded
                }
                _ => DispatchError::Query {
                    method: Q::METHOD,
                    status,
                },
            })
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("topics", &self.topics)
            .finish_non_exhaustive()
    }
}
