use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use drift_types::api::CreateTradeRequest;
use drift_types::models::MARKET_ORIGIN;

use crate::AppState;
use crate::error::ApiError;

/// POST /api/trades — append one trade record.
///
/// Referential integrity is enforced here rather than left to chance: both
/// parties must exist (the market sentinel 0 is allowed as the origin of a
/// collect), the postcard must exist, and a user cannot trade with
/// themselves. The trade itself never moves ownership.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateTradeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) =
        payload.map_err(|_| ApiError::Validation("Invalid trade data".into()))?;

    if req.from_id == req.to_id {
        return Err(ApiError::Validation("Cannot trade with yourself".into()));
    }
    if state.db.get_postcard(req.postcard_id)?.is_none() {
        return Err(ApiError::Validation("Unknown postcard".into()));
    }
    if state.db.get_user(req.to_id)?.is_none() {
        return Err(ApiError::Validation("Unknown recipient".into()));
    }
    if req.from_id != MARKET_ORIGIN && state.db.get_user(req.from_id)?.is_none() {
        return Err(ApiError::Validation("Unknown sender".into()));
    }

    let trade = state
        .db
        .create_trade(req.from_id, req.to_id, req.postcard_id)?;

    Ok((StatusCode::CREATED, Json(trade)))
}

/// GET /api/trades/:userId — trade history, both directions, newest first.
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let trades = state.db.get_trades_by_user(user_id)?;
    Ok(Json(trades))
}
