//! `/auth` handlers: login, registration, token validation and revocation.
//!
//! Login and registration mint a USER session token and return it in the
//! `Authorization` response header.

use super::dto::{AuthResponse, AuthenticateDto, CreateUserDto, IdResponse, UpdatePasswordDto};
use super::verify::VALID_STATUS;
use super::{health, AppState};
use crate::auth::authenticator::token_from_headers;
use crate::auth::{Session, AUTHORIZATION};
use crate::domain::context::RequestContext;
use crate::domain::error::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use shared_types::events::{PasswordUpdate, TokenBlacklist};
use shared_types::queries::{AuthenticateReq, ValidateReq};
use shared_types::{SessionType, ValidationType};
use tracing::{debug, info};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(authenticate).get(validate).delete(invalidate))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/password", post(update_password))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvalidateResponse {
    id: Uuid,
    access_token: String,
}

fn with_token(
    state: &AppState,
    subject: &str,
    root: bool,
    body: impl IntoResponse,
) -> ApiResult<Response> {
    let (_, token) = state
        .authenticator
        .codec()
        .issue(subject, root, SessionType::User)
        .map_err(|e| state.fail(ApiError::internal(e.to_string())))?;
    let value = HeaderValue::from_str(&token)
        .map_err(|e| state.fail(ApiError::internal(e.to_string())))?;

    let mut response = body.into_response();
    response.headers_mut().insert(AUTHORIZATION, value);
    Ok(response)
}

async fn authenticate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<AuthenticateDto>, JsonRejection>,
) -> ApiResult<Response> {
    let dto = state.body(payload)?;
    let res = state
        .ask(
            &ctx,
            &AuthenticateReq {
                email: dto.email,
                password: dto.password,
            },
        )
        .await?;

    let user = match (&res.user, res.status) {
        (Some(user), VALID_STATUS) => user.clone(),
        (_, status) => {
            debug!(status, "Authentication refused");
            return Err(ApiError::unauthorized());
        }
    };

    info!(subject = %user.id, "User authenticated");
    with_token(&state, &user.id, user.root, Json(AuthResponse::from(res)))
}

async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CreateUserDto>, JsonRejection>,
) -> ApiResult<Response> {
    let dto = state.body(payload)?;
    let id = Uuid::new_v4();
    state.send(&ctx, &dto.into_record(id)).await?;

    with_token(
        &state,
        &id.to_string(),
        false,
        (StatusCode::CREATED, Json(IdResponse { id })),
    )
}

/// Ask the auth service about the presented token.
async fn validate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthResponse>> {
    let query = ValidateReq {
        user_id: session.subject_id,
        access_token: token_from_headers(&headers).to_string(),
        validation_type: ValidationType::Token.as_i64(),
    };
    let res = state.ask(&ctx, &query).await?;
    Ok(Json(res.into()))
}

/// Revoke the presented token.
async fn invalidate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
) -> ApiResult<Json<InvalidateResponse>> {
    let id = Uuid::new_v4();
    let record = TokenBlacklist {
        id: id.to_string(),
        access_token: token_from_headers(&headers).to_string(),
    };
    state.send(&ctx, &record).await?;

    Ok(Json(InvalidateResponse {
        id,
        access_token: record.access_token,
    }))
}

/// Check the current password with the auth service, then publish the change.
async fn update_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(session): Extension<Session>,
    payload: Result<Json<UpdatePasswordDto>, JsonRejection>,
) -> ApiResult<Json<IdResponse>> {
    let dto = state.body(payload)?;
    let id: Uuid = session
        .subject_id
        .parse()
        .map_err(|_| {
            state.fail(ApiError::unauthorized().with_detail("session subject is not a UUID"))
        })?;

    let check = ValidateReq {
        user_id: session.subject_id.clone(),
        access_token: dto.current_password.clone(),
        validation_type: ValidationType::Password.as_i64(),
    };
    let res = state.ask(&ctx, &check).await?;
    if res.status != VALID_STATUS {
        debug!(subject = %session.subject_id, status = res.status, "Current password rejected");
        return Err(ApiError::unauthorized());
    }

    let record = PasswordUpdate {
        id: session.subject_id,
        current_password: dto.current_password,
        new_password: dto.new_password,
    };
    state.send(&ctx, &record).await?;
    Ok(Json(IdResponse { id }))
}
