use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::extract::{QueryParams, ResourceId, ValidatedJson};
use crate::services::accounts::{self, Aggregate, ListUsersQuery, UpdateUserRequest, UserPage};
use crate::AppState;

/// GET /users?search=&role=&page=&limit=
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListUsersQuery>,
) -> ApiResult<Json<UserPage>> {
    Ok(Json(accounts::list_users(&state, query).await?))
}

/// GET /users/:id
pub async fn get(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Aggregate>> {
    Ok(Json(accounts::get_user(&state, id).await?))
}

/// PUT /users/:id
pub async fn update(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<Aggregate>> {
    Ok(Json(accounts::update_user(&state, id, request).await?))
}

/// DELETE /users/:id (suspensão lógica)
pub async fn suspend(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Aggregate>> {
    Ok(Json(accounts::suspend_user(&state, id).await?))
}
