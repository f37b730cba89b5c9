//! Request logger.
//!
//! One line per request with method, route, status and latency. Counts each
//! request against its route in [`GatewayMetrics`].

use crate::auth::http_route_key;
use crate::metrics::{GatewayMetrics, RequestTimer};
use axum::extract::MatchedPath;
use axum::{body::Body, http::Request, response::Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct RequestLoggerLayer {
    metrics: Arc<GatewayMetrics>,
    ignore: Arc<[String]>,
}

impl RequestLoggerLayer {
    pub fn new(metrics: Arc<GatewayMetrics>, ignore: &[String]) -> Self {
        Self {
            metrics,
            ignore: ignore.into(),
        }
    }
}

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggerService {
            inner,
            metrics: Arc::clone(&self.metrics),
            ignore: Arc::clone(&self.ignore),
        }
    }
}

#[derive(Clone)]
pub struct RequestLoggerService<S> {
    inner: S,
    metrics: Arc<GatewayMetrics>,
    ignore: Arc<[String]>,
}

impl<S> Service<Request<Body>> for RequestLoggerService<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let path = req.uri().path().to_string();
        if self.ignore.iter().any(|ignored| path.contains(ignored.as_str())) {
            return Box::pin(async move { inner.call(req).await });
        }

        let method = req.method().clone();
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map_or_else(|| path.clone(), |m| m.as_str().to_string());
        let operation = http_route_key(&method, &route);
        let timer = RequestTimer::new(Arc::clone(&self.metrics));

        Box::pin(async move {
            let result = inner.call(req).await;

            if let Ok(response) = &result {
                let status = response.status();
                let success = !status.is_client_error() && !status.is_server_error();
                let elapsed_ms = timer.finish(&operation, success);

                if status.is_server_error() {
                    error!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
                } else if status.is_client_error() {
                    warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request rejected");
                } else {
                    info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request handled");
                }
            }

            result
        })
    }
}
