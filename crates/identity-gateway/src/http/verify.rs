//! Session verification for protected REST routes.

use super::AppState;
use crate::auth::authenticator::token_from_headers;
use crate::domain::context::RequestContext;
use crate::domain::error::ApiError;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shared_types::queries::ValidateReq;
use shared_types::ValidationType;
use tracing::{debug, warn};

/// Backend status that marks a token as still valid.
pub const VALID_STATUS: i64 = 200;

/// Authorize the matched route, then confirm with the auth backend that the
/// token has not been revoked. The session is handed to the handler as a
/// request extension. Every refusal is a 401 `{"message":"unauthorized"}`.
pub async fn verify_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_string(), |m| m.as_str().to_string());

    let session = match state
        .authenticator
        .authorize_http(req.method(), &route, req.headers())
    {
        Ok(None) => return next.run(req).await,
        Ok(Some(session)) => session,
        Err(err) => {
            state.metrics.record_auth_rejected();
            debug!(%route, error = %err, "Request refused");
            return state
                .fail(ApiError::unauthorized().with_detail(err.to_string()))
                .into_response();
        }
    };

    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(RequestContext::background);
    let validate = ValidateReq {
        user_id: session.subject_id.clone(),
        access_token: token_from_headers(req.headers()).to_string(),
        validation_type: ValidationType::Token.as_i64(),
    };

    match state.mediator.ask(&ctx, &validate).await {
        Ok(res) if res.status == VALID_STATUS => {}
        Ok(res) => {
            state.metrics.record_auth_rejected();
            debug!(%route, subject = %session.subject_id, status = res.status, "Token rejected by auth service");
            return state.fail(ApiError::unauthorized()).into_response();
        }
        Err(err) => {
            state.metrics.record_auth_rejected();
            warn!(%route, error = %err, "Token validation failed");
            return state
                .fail(ApiError::unauthorized().with_detail(err.to_string()))
                .into_response();
        }
    }

    req.extensions_mut().insert(session);
    next.run(req).await
}
