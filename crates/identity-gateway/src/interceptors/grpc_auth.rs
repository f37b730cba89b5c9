//! Server-side RPC authorization.
//!
//! Works at the HTTP/2 request level so unary and streaming calls take the
//! same path: the route key is the request path (`/package.Service/Method`)
//! and the token comes from the `authorization` metadata entry. Refused calls
//! get a trailers-only response and never reach the handler.

use crate::auth::authenticator::{AuthError, Authenticator};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

/// Authorization layer for a tonic server
#[derive(Debug, Clone)]
pub struct GrpcAuthLayer {
    authenticator: Arc<Authenticator>,
}

impl GrpcAuthLayer {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S> Layer<S> for GrpcAuthLayer {
    type Service = GrpcAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcAuthService {
            inner,
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GrpcAuthService<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
}

impl<S, B, ResBody> Service<Request<B>> for GrpcAuthService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let decision = self
            .authenticator
            .authorize_grpc(req.uri().path(), req.headers());

        match decision {
            Ok(Some(session)) => {
                req.extensions_mut().insert(session);
                Box::pin(inner.call(req))
            }
            Ok(None) => Box::pin(inner.call(req)),
            Err(err) => {
                warn!(method = req.uri().path(), error = %err, "RPC call refused");
                Box::pin(async move { Ok(rejection(&err)) })
            }
        }
    }
}

/// Trailers-only gRPC response carrying the refusal status.
fn rejection<ResBody: Default>(err: &AuthError) -> Response<ResBody> {
    let status = err.to_status();
    let mut response = Response::new(ResBody::default());
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
    headers.insert("grpc-status", HeaderValue::from(status.code() as i32));
    if let Ok(message) = HeaderValue::from_str(status.message()) {
        headers.insert("grpc-message", message);
    }
    response
}
