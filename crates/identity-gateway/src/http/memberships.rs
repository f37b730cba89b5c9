//! `/memberships` handlers.

use super::dto::{
    parse_id, CreateMembershipDto, IdResponse, MembershipResponse, UpdateMembershipDto,
};
use super::{health, AppState};
use crate::domain::context::RequestContext;
use crate::domain::error::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use shared_types::events::MembershipDelete;
use shared_types::queries::GetMembershipByIdReq;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/health", get(health))
        .route("/:id", get(get_by_id).put(update).delete(delete))
}

async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CreateMembershipDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let dto = state.body(payload)?;
    let id = Uuid::new_v4();
    state.send(&ctx, &dto.into_record(id)).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

async fn get_by_id(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MembershipResponse>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    let res = state
        .ask(&ctx, &GetMembershipByIdReq { id: id.to_string() })
        .await?;
    res.membership
        .map(|membership| Json(MembershipResponse::from(membership)))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "membership not found"))
}

async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateMembershipDto>, JsonRejection>,
) -> ApiResult<Json<UpdateMembershipDto>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    let dto = state.body(payload)?;
    state.send(&ctx, &dto.to_record(id)).await?;
    Ok(Json(dto))
}

async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<IdResponse>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    state
        .send(&ctx, &MembershipDelete { id: id.to_string() })
        .await?;
    Ok(Json(IdResponse { id }))
}
