use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use drift_types::api::RecordRequest;

use crate::AppState;
use crate::error::ApiError;
use crate::pipeline;

/// POST /api/record — run the full recording pipeline and answer with the
/// freshly minted postcard.
pub async fn record(
    State(state): State<AppState>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload
        .map_err(|_| ApiError::Validation("Missing required data".into()))?;

    let postcard =
        pipeline::create_from_recording(&state.db, &state.generator, req.user_id, &req.audio_data)
            .await?;

    Ok((StatusCode::CREATED, Json(postcard)))
}
