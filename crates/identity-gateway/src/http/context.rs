//! Request context middleware.
//!
//! Opens a span per request, continues the caller's `traceparent`, and hands
//! every handler a [`RequestContext`] bounded by the configured timeout. The
//! context is cancelled if the connection drops before the response is ready.

use crate::domain::context::RequestContext;
use crate::domain::trace::TraceContext;
use axum::{body::Body, http::Request, response::Response};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

#[derive(Clone)]
pub struct ContextLayer {
    timeout: Duration,
}

impl ContextLayer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl<S> Layer<S> for ContextLayer {
    type Service = ContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextService {
            inner,
            timeout: self.timeout,
        }
    }
}

#[derive(Clone)]
pub struct ContextService<S> {
    inner: S,
    timeout: Duration,
}

impl<S> Service<Request<Body>> for ContextService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let trace = TraceContext::from_headers(req.headers());
        let cancel = CancellationToken::new();
        let ctx = RequestContext::new(trace.clone())
            .with_timeout(self.timeout)
            .with_cancellation(cancel.clone());
        req.extensions_mut().insert(ctx);

        let span = info_span!(
            "request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            trace_id = %trace.trace_id(),
        );

        Box::pin(
            async move {
                // Dropped with the future when the client goes away.
                let on_drop = cancel.drop_guard();
                let result = inner.call(req).await;
                on_drop.disarm();

                result.map(|mut response| {
                    trace.inject(response.headers_mut());
                    response
                })
            }
            .instrument(span),
        )
    }
}
