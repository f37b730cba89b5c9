//! `/groups` handlers.

use super::dto::{
    parse_id, CreateGroupDto, GroupResponse, GroupsListResponse, IdResponse, PageQuery,
    UpdateGroupDto, UserMembershipsListResponse,
};
use super::{health, AppState};
use crate::auth::Session;
use crate::domain::context::RequestContext;
use crate::domain::error::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use shared_types::events::GroupDelete;
use shared_types::queries::{GetGroupByIdReq, GetUserMembershipReq, SearchGroupReq};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/:id", get(get_by_id).put(update).delete(delete))
        .route("/:id/users", get(users))
}

/// The caller becomes the group creator.
async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Extension(session): Extension<Session>,
    payload: Result<Json<CreateGroupDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let dto = state.body(payload)?;
    let id = Uuid::new_v4();
    state
        .send(&ctx, &dto.into_record(id, &session.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

async fn get_by_id(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<GroupResponse>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    let res = state
        .ask(&ctx, &GetGroupByIdReq { id: id.to_string() })
        .await?;
    res.group
        .map(|group| Json(GroupResponse::from(group)))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "group not found"))
}

async fn search(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<GroupsListResponse>> {
    let query = SearchGroupReq {
        search: page.search.clone(),
        page: page.page(),
        size: page.size(),
    };
    let res = state.ask(&ctx, &query).await?;
    Ok(Json(res.into()))
}

/// Members of the group.
async fn users(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<UserMembershipsListResponse>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    let query = GetUserMembershipReq {
        group_id: id.to_string(),
        page: page.page(),
        size: page.size(),
    };
    let res = state.ask(&ctx, &query).await?;
    Ok(Json(res.into()))
}

async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGroupDto>, JsonRejection>,
) -> ApiResult<Json<UpdateGroupDto>> {
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
        .send(&ctx, &GroupDelete { id: id.to_string() })
        .await?;
    Ok(Json(IdResponse { id }))
}
