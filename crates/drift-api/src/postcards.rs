use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct OwnedQuery {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    2
}

/// GET /api/postcards?userId= — everything the user has recorded,
/// newest first.
pub async fn list_owned(
    State(state): State<AppState>,
    Query(query): Query<OwnedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Run blocking DB reads off the async runtime
    let db = state.clone();
    let postcards =
        tokio::task::spawn_blocking(move || db.db.get_postcards_by_user(query.user_id))
            .await
            .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(postcards))
}

/// GET /api/postcards/public?limit= — the trending gallery.
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let postcards = tokio::task::spawn_blocking(move || db.db.get_public_postcards(query.limit))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(postcards))
}

/// GET /api/postcards/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let postcard = state
        .db
        .get_postcard(id)?
        .ok_or(ApiError::NotFound("Postcard not found"))?;

    Ok(Json(postcard))
}

/// POST /api/postcards/:id/like — one increment per call. The UI debounces
/// repeat taps; the API does not.
pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let postcard = state
        .db
        .like_postcard(id)?
        .ok_or(ApiError::NotFound("Postcard not found"))?;

    Ok(Json(postcard))
}

/// GET /api/postcards/trade/:userId?count= — random public postcards from
/// other dreamers, for the exchange surface.
pub async fn trade_candidates(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<CandidateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let postcards = state.db.random_postcards_for_trade(user_id, query.count)?;
    Ok(Json(postcards))
}
