//! Test harness: a full gateway router over an in-memory bus and a scripted
//! query backend.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use identity_gateway::auth::{AccessControlTable, Authenticator, Session, SessionCodec};
use identity_gateway::rpc::transport::{QueryService, QueryTransports};
use identity_gateway::{
    GatewayConfig, IdentityGatewayService, InterceptorManager, QueryTransport, RequestContext,
    RetryPolicy,
};
use parking_lot::Mutex;
use prost::Message;
use serde_json::Value;
use shared_bus::InMemoryMessageBus;
use shared_types::queries::{methods, ValidateReq, ValidateRes};
use shared_types::SessionType;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tonic::Status;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

type Handler = Box<dyn Fn(Bytes, usize) -> Result<Bytes, Status> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub trace_id: String,
}

/// Query backend that answers from per-method scripts and records each call.
#[derive(Default)]
pub struct ScriptedBackend {
    handlers: Mutex<HashMap<String, Arc<Handler>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    /// Script `method`. The handler gets the decoded request and the 1-based
    /// attempt number.
    pub fn on<Req, Res, F>(&self, method: &str, handler: F)
    where
        Req: Message + Default,
        Res: Message,
        F: Fn(Req, usize) -> Result<Res, Status> + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(move |raw, attempt| {
            let req = Req::decode(raw).map_err(|e| Status::invalid_argument(e.to_string()))?;
            handler(req, attempt).map(|res| Bytes::from(res.encode_to_vec()))
        });
        self.handlers
            .lock()
            .insert(method.to_string(), Arc::new(handler));
    }

    /// Every token is still valid.
    pub fn accept_tokens(&self) {
        self.on(methods::VALIDATE, |_: ValidateReq, _| {
            Ok(ValidateRes {
                user: None,
                status: 200,
            })
        });
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    pub fn trace_ids(&self, method: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.trace_id.clone())
            .collect()
    }
}

#[async_trait]
impl QueryTransport for ScriptedBackend {
    async fn unary(
        &self,
        ctx: &RequestContext,
        method: &str,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        let attempt = {
            let mut calls = self.calls.lock();
            calls.push(Call {
                method: method.to_string(),
                trace_id: ctx.trace().trace_id(),
            });
            calls.iter().filter(|c| c.method == method).count()
        };

        let handler = self.handlers.lock().get(method).cloned();
        match handler {
            Some(handler) => handler(request, attempt),
            None => Err(Status::unimplemented(method.to_string())),
        }
    }
}

/// Default test configuration: short backoff, only `Aborted` is retried.
pub fn config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.session.jwt_secret = SECRET.to_string();
    config.retry.backoff = Duration::from_millis(5);
    config.retry.retry_codes = vec!["Aborted".to_string()];
    config
}

pub struct Harness {
    pub router: Router,
    pub bus: Arc<InMemoryMessageBus>,
    pub backend: Arc<ScriptedBackend>,
    pub codec: SessionCodec,
    pub config: GatewayConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        let backend = Arc::new(ScriptedBackend::default());
        let bus = Arc::new(InMemoryMessageBus::new());

        let codec = SessionCodec::from_config(&config.session);
        let authenticator = Authenticator::new(
            Arc::new(AccessControlTable::for_routes(&config.http)),
            Arc::new(SessionCodec::from_config(&config.session)),
        );
        let interceptors = InterceptorManager::new(
            Arc::new(authenticator),
            RetryPolicy::try_from(&config.retry).unwrap(),
        );
        let transports = QueryTransports::new(
            interceptors.client(QueryService::Users, Arc::clone(&backend)),
            interceptors.client(QueryService::Groups, Arc::clone(&backend)),
            interceptors.client(QueryService::Memberships, Arc::clone(&backend)),
            interceptors.client(QueryService::Auth, Arc::clone(&backend)),
        );

        let service =
            IdentityGatewayService::new(config.clone(), bus.clone(), transports).unwrap();

        Self {
            router: service.router(),
            bus,
            backend,
            codec,
            config,
        }
    }

    pub fn token(&self, subject: &str, root: bool) -> String {
        self.codec.issue(subject, root, SessionType::User).unwrap().1
    }

    /// A correctly signed token that expired a minute ago.
    pub fn expired_token(&self, subject: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let session = Session {
            expires_at: now - 60,
            ..Session::new(subject, false, SessionType::User)
        };
        self.codec.encode(&session).unwrap()
    }

    pub async fn call(&self, req: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        Reply {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
