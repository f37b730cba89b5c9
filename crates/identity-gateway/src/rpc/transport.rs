//! Outbound query transport.

use super::codec::RawCodec;
use crate::domain::context::RequestContext;
use crate::domain::error::GatewayError;
use crate::domain::trace::TRACEPARENT;
use async_trait::async_trait;
use bytes::Bytes;
use http::uri::PathAndQuery;
use prost::Message;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tonic::metadata::MetadataValue;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;
use tracing::debug;

/// Backend query service a call is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryService {
    Users,
    Groups,
    Memberships,
    Auth,
}

impl QueryService {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryService::Users => "users",
            QueryService::Groups => "groups",
            QueryService::Memberships => "memberships",
            QueryService::Auth => "auth",
        }
    }
}

impl fmt::Display for QueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unary RPC on already-encoded bytes.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait QueryTransport: Send + Sync + 'static {
    async fn unary(
        &self,
        ctx: &RequestContext,
        method: &str,
        request: Bytes,
    ) -> Result<Bytes, Status>;
}

#[async_trait]
impl<T: QueryTransport + ?Sized> QueryTransport for Arc<T> {
    async fn unary(
        &self,
        ctx: &RequestContext,
        method: &str,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        (**self).unary(ctx, method, request).await
    }
}

/// Status for a call cut short by its request context.
pub fn interrupted(ctx: &RequestContext) -> Status {
    if ctx.is_cancelled() {
        Status::cancelled("request cancelled")
    } else {
        Status::deadline_exceeded("request deadline exceeded")
    }
}

/// Encode `request`, send it, decode the reply.
pub async fn call<Req, Res>(
    transport: &dyn QueryTransport,
    ctx: &RequestContext,
    method: &str,
    request: &Req,
) -> Result<Res, Status>
where
    Req: Message,
    Res: Message + Default,
{
    let reply = transport
        .unary(ctx, method, Bytes::from(request.encode_to_vec()))
        .await?;
    Res::decode(reply).map_err(|e| Status::internal(format!("cannot decode {method} reply: {e}")))
}

/// gRPC transport over a lazily connected channel.
#[derive(Clone)]
pub struct GrpcTransport {
    channel: Channel,
    call_timeout: Duration,
}

impl GrpcTransport {
    /// The connection is established on first use and re-established by the
    /// channel after failures.
    pub fn connect_lazy(
        addr: &str,
        connect_timeout: Duration,
        call_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let endpoint = Endpoint::from_shared(addr.to_string())
            .map_err(|e| GatewayError::Transport(format!("{addr}: {e}")))?
            .connect_timeout(connect_timeout);

        Ok(Self {
            channel: endpoint.connect_lazy(),
            call_timeout,
        })
    }

    pub fn from_channel(channel: Channel, call_timeout: Duration) -> Self {
        Self {
            channel,
            call_timeout,
        }
    }
}

#[async_trait]
impl QueryTransport for GrpcTransport {
    async fn unary(
        &self,
        ctx: &RequestContext,
        method: &str,
        request: Bytes,
    ) -> Result<Bytes, Status> {
        let path: PathAndQuery = method
            .parse()
            .map_err(|_| Status::internal(format!("invalid method path {method}")))?;

        let mut request = tonic::Request::new(request);
        let timeout = ctx
            .remaining()
            .map_or(self.call_timeout, |left| left.min(self.call_timeout));
        request.set_timeout(timeout);
        if let Ok(value) = MetadataValue::try_from(ctx.trace().to_traceparent()) {
            request.metadata_mut().insert(TRACEPARENT, value);
        }

        let mut client = tonic::client::Grpc::new(self.channel.clone());
        let call = async move {
            client
                .ready()
                .await
                .map_err(|e| Status::unavailable(format!("service not ready: {e}")))?;
            client.unary(request, path, RawCodec).await
        };

        match ctx.guard(call).await {
            Some(result) => result.map(tonic::Response::into_inner),
            None => {
                debug!(method, "Call abandoned, request finished first");
                Err(interrupted(ctx))
            }
        }
    }
}

impl fmt::Debug for GrpcTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcTransport")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

/// One shared, decorated transport per backend service.
#[derive(Clone)]
pub struct QueryTransports {
    users: Arc<dyn QueryTransport>,
    groups: Arc<dyn QueryTransport>,
    memberships: Arc<dyn QueryTransport>,
    auth: Arc<dyn QueryTransport>,
}

impl QueryTransports {
    pub fn new(
        users: Arc<dyn QueryTransport>,
        groups: Arc<dyn QueryTransport>,
        memberships: Arc<dyn QueryTransport>,
        auth: Arc<dyn QueryTransport>,
    ) -> Self {
        Self {
            users,
            groups,
            memberships,
            auth,
        }
    }

    /// Route every service through the same transport.
    pub fn uniform(transport: Arc<dyn QueryTransport>) -> Self {
        Self::new(
            transport.clone(),
            transport.clone(),
            transport.clone(),
            transport,
        )
    }

    pub fn get(&self, service: QueryService) -> &dyn QueryTransport {
        match service {
            QueryService::Users => self.users.as_ref(),
            QueryService::Groups => self.groups.as_ref(),
            QueryService::Memberships => self.memberships.as_ref(),
            QueryService::Auth => self.auth.as_ref(),
        }
    }
}

impl fmt::Debug for QueryTransports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryTransports").finish_non_exhaustive()
    }
}
