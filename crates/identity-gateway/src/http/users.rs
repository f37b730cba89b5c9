//! `/users` handlers.

use super::dto::{
    parse_id, CreateUserDto, GroupMembershipsListResponse, IdResponse, PageQuery,
    UpdateUserDto, UserResponse, UsersListResponse,
};
use super::{health, AppState};
use crate::domain::context::RequestContext;
use crate::domain::error::{ApiError, ApiResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use shared_types::events::UserDelete;
use shared_types::queries::{GetGroupMembershipReq, GetUserByIdReq, SearchReq};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/:id", get(get_by_id).put(update).delete(delete))
        .route("/:id/groups", get(groups))
}

async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CreateUserDto>, JsonRejection>,
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
) -> ApiResult<Json<UserResponse>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    let res = state
        .ask(&ctx, &GetUserByIdReq { id: id.to_string() })
        .await?;
    res.user
        .map(|user| Json(UserResponse::from(user)))
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "user not found"))
}

async fn search(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<UsersListResponse>> {
    let query = SearchReq {
        search: page.search.clone(),
        page: page.page(),
        size: page.size(),
    };
    let res = state.ask(&ctx, &query).await?;
    Ok(Json(res.into()))
}

async fn groups(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<GroupMembershipsListResponse>> {
    let id = parse_id(&id).map_err(|e| state.fail(e))?;
    let query = GetGroupMembershipReq {
        user_id: id.to_string(),
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
    payload: Result<Json<UpdateUserDto>, JsonRejection>,
) -> ApiResult<Json<UpdateUserDto>> {
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
        .send(&ctx, &UserDelete { id: id.to_string() })
        .await?;
    Ok(Json(IdResponse { id }))
}
