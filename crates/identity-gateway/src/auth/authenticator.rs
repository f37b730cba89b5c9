//! Authorization decision shared by the REST and RPC entry points.
//!
//! Only token extraction differs per transport. Both entry points build a
//! route key and delegate to [`Authenticator::authorize`].

use super::access::{http_route_key, rpc_route_key, AccessControlTable};
use super::session::{Session, SessionCodec, SessionError};
use crate::domain::error::ApiError;
use axum::http::StatusCode;
use http::{HeaderMap, Method};
use shared_types::Role;
use std::sync::Arc;
use thiserror::Error;
use tonic::metadata::MetadataMap;
use tracing::debug;

/// Header and metadata key carrying the bearer token.
pub const AUTHORIZATION: &str = "authorization";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Protected route, no token.
    #[error("unauthorized")]
    Unauthenticated,
    /// The codec rejected the token. The cause is kept so callers can tell
    /// expiry from tampering.
    #[error("invalid token: {0}")]
    InvalidToken(SessionError),
    #[error("permission denied")]
    PermissionDenied,
}

impl AuthError {
    pub fn to_status(&self) -> tonic::Status {
        match self {
            AuthError::Unauthenticated | AuthError::InvalidToken(_) => {
                tonic::Status::unauthenticated(self.to_string())
            }
            AuthError::PermissionDenied => tonic::Status::permission_denied(self.to_string()),
        }
    }
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        AuthError::InvalidToken(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => ApiError::unauthorized(),
            AuthError::InvalidToken(_) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized").with_detail(err.to_string())
            }
            AuthError::PermissionDenied => ApiError::forbidden(),
        }
    }
}

/// Strip an optional `Bearer ` scheme.
pub fn bearer_token(value: &str) -> &str {
    let value = value.trim();
    match value.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => value[7..].trim_start(),
        _ => value,
    }
}

/// Token from the `authorization` header, empty when absent.
pub fn token_from_headers(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(bearer_token)
        .unwrap_or_default()
}

/// Token from the `authorization` metadata entry, empty when absent.
pub fn token_from_metadata(metadata: &MetadataMap) -> &str {
    metadata
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(bearer_token)
        .unwrap_or_default()
}

/// Converts a route key and bearer token into a session or a refusal.
#[derive(Debug, Clone)]
pub struct Authenticator {
    table: Arc<AccessControlTable>,
    codec: Arc<SessionCodec>,
}

impl Authenticator {
    pub fn new(table: Arc<AccessControlTable>, codec: Arc<SessionCodec>) -> Self {
        Self { table, codec }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn table(&self) -> &AccessControlTable {
        &self.table
    }

    /// `Ok(None)` means the route is unprotected.
    pub fn authorize(&self, route_key: &str, token: &str) -> Result<Option<Session>, AuthError> {
        let Some(required) = self.table.lookup(route_key) else {
            return Ok(None);
        };

        if token.is_empty() {
            debug!(route = route_key, "No token on protected route");
            return Err(AuthError::Unauthenticated);
        }

        let session = self.codec.decode(token)?;

        let allowed = match required {
            Role::Root => session.is_root_admin,
            Role::Member => true,
            Role::Admin => false,
        };
        if !allowed {
            debug!(
                route = route_key,
                required = %required,
                subject = %session.subject_id,
                "Insufficient role"
            );
            return Err(AuthError::PermissionDenied);
        }

        Ok(Some(session))
    }

    /// REST entry point. `path` is the matched route template when available.
    pub fn authorize_http(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Option<Session>, AuthError> {
        self.authorize(&http_route_key(method, path), token_from_headers(headers))
    }

    /// RPC entry point for callers holding the raw HTTP/2 headers.
    pub fn authorize_grpc(
        &self,
        full_method: &str,
        headers: &HeaderMap,
    ) -> Result<Option<Session>, AuthError> {
        self.authorize(&rpc_route_key(full_method), token_from_headers(headers))
    }

    /// RPC entry point for callers holding decoded call metadata.
    pub fn authorize_metadata(
        &self,
        full_method: &str,
        metadata: &MetadataMap,
    ) -> Result<Option<Session>, AuthError> {
        self.authorize(&rpc_route_key(full_method), token_from_metadata(metadata))
    }
}
