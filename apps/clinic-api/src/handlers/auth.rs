use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::services::authentication::{self, LoginRequest, Session};
use crate::services::registration::{self, RegisterRequest, Registration};
use crate::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Registration>)> {
    let registration = registration::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<Session>> {
    Ok(Json(authentication::login(&state, request).await?))
}
