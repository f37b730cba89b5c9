//! Call logging for both directions.
//!
//! Observes method, duration and outcome. Results pass through untouched.

use crate::domain::context::RequestContext;
use crate::domain::trace::TraceContext;
use crate::rpc::transport::QueryTransport;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;
use tonic::Status;
use tower::{Layer, Service};
use tracing::{debug, info_span, warn, Instrument};

/// Client side: logs every attempt made by the wrapped transport.
#[derive(Debug, Clone)]
pub struct LoggingTransport<T> {
    inner: T,
    service: &'static str,
}

impl<T> LoggingTransport<T> {
    pub fn new(inner: T, service: &'static str) -> Self {
        Self { inner, service }
    }
}

#[async_trait]
impl<T: QueryTransport> QueryTransport for LoggingTransport<T> {
    async fn unary(
        &self,
        ctx: &RequestContext,
        method: &str,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        let start = Instant::now();
        let result = self.inner.unary(ctx, method, request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let trace_id = ctx.trace().trace_id();

        match &result {
            Ok(reply) => debug!(
                service = self.service,
                method,
                trace_id = %trace_id,
                elapsed_ms,
                reply_bytes = reply.len(),
                "Query call completed"
            ),
            Err(status) => warn!(
                service = self.service,
                method,
                trace_id = %trace_id,
                elapsed_ms,
                code = ?status.code(),
                message = status.message(),
                "Query call failed"
            ),
        }
        result
    }
}

/// Server side: logs each inbound RPC inside a span carrying the caller's
/// trace id.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcLoggingLayer;

impl GrpcLoggingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for GrpcLoggingLayer {
    type Service = GrpcLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcLoggingService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct GrpcLoggingService<S> {
    inner: S,
}

impl<S, B, ResBody> Service<Request<B>> for GrpcLoggingService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::fmt::Display,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let method = req.uri().path().to_string();
        let trace = TraceContext::from_headers(req.headers());
        let span = info_span!("rpc", rpc.method = %method, trace_id = %trace.trace_id());

        Box::pin(async move {
            let start = Instant::now();
            let result = inner.call(req).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(response) => {
                    // Trailers-only responses (rejections) carry the status in headers
                    let grpc_status = response
                        .headers()
                        .get("grpc-status")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("0");
                    debug!(
                        method = %method,
                        elapsed_ms,
                        grpc_status,
                        "RPC served"
                    );
                }
                Err(e) => warn!(method = %method, elapsed_ms, error = %e, "RPC failed"),
            }
            result
        }
        .instrument(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    struct Fixed(Result<Bytes, Status>);

    #[async_trait]
    impl QueryTransport for Fixed {
        async fn unary(
            &self,
            _ctx: &RequestContext,
            _method: &str,
            _request: Bytes,
        ) -> Result<Bytes, Status> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_transport_result_unchanged() {
        let ctx = RequestContext::background();

        let ok = LoggingTransport::new(Fixed(Ok(Bytes::from_static(b"reply"))), "users");
        assert_eq!(
            ok.unary(&ctx, "/x.X/Y", Bytes::new()).await.unwrap(),
            Bytes::from_static(b"reply")
        );

        let failing = LoggingTransport::new(Fixed(Err(Status::not_found("missing"))), "users");
        let err = failing.unary(&ctx, "/x.X/Y", Bytes::new()).await.unwrap_err();
        assert_eq!(err.code(), tonic::Code::NotFound);
        assert_eq!(err.message(), "missing");
    }

    #[tokio::test]
    async fn test_server_layer_passthrough() {
        let svc = GrpcLoggingLayer::new().layer(service_fn(|_req: Request<()>| async {
            Ok::<_, Infallible>(Response::new("body"))
        }));

        let response = svc
            .oneshot(Request::builder().uri("/x.X/Y").body(()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.into_body(), "body");
    }
}
