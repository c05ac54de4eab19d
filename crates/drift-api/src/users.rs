use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use drift_types::api::RegisterRequest;

use crate::AppState;
use crate::error::ApiError;

/// POST /api/users — registration. The credential is stored opaquely; the
/// serializer never writes it back out.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) =
        payload.map_err(|_| ApiError::Validation("Invalid registration data".into()))?;

    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("Username and password are required".into()));
    }

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let user = state
        .db
        .create_user(&req.username, &req.password, &req.timezone)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user(id)?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user))
}
