use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use crate::domain::users::{Credentials, NewUser};

use super::error::ApiError;
use super::state::HttpState;

pub const USER_ID_HEADER: &str = "x-user-id";

pub async fn signup(
    State(state): State<HttpState>,
    Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.signup(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user_id": user.id, "username": user.username })),
    ))
}

pub async fn login(
    State(state): State<HttpState>,
    Json(body): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.login(body).await?;
    Ok(Json(json!({ "user_id": user.id })))
}

/// Pull the authenticated user id out of the `X-User-ID` header.
pub fn require_user_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("X-User-ID header is required"))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::unauthorized("Invalid user ID"))
}
