//! The postcard-creation pipeline: raw audio in, persisted postcard out.

use md5::{Digest, Md5};

use drift_db::Database;
use drift_gen::Generator;
use drift_types::models::Postcard;

use crate::error::ApiError;

/// Turn one audio submission into one persisted postcard.
///
/// The user's `last_sleep_at` is touched as soon as validation passes —
/// the nightly ritual counts even if a later step fails. There is no
/// rollback across steps. The generator never fails (it degrades to
/// fallback content), so in practice the only failure modes are the two
/// validation checks up front.
pub async fn create_from_recording(
    db: &Database,
    generator: &Generator,
    user_id: i64,
    audio_data: &str,
) -> Result<Postcard, ApiError> {
    if audio_data.is_empty() {
        return Err(ApiError::Validation("Missing required data".into()));
    }
    db.get_user(user_id)?
        .ok_or_else(|| ApiError::Validation("Unknown user".into()))?;

    db.update_user_last_sleep(user_id)?;

    // Content fingerprint of the submission. Stored as-is; nothing reads
    // it back for dedup in the current design.
    let audio_hash = hex::encode(Md5::digest(audio_data.as_bytes()));

    let caption = generator.generate_caption(audio_data).await;
    let img_url = generator.generate_image(&caption).await;

    // Defensive re-check of the assembled record. Unreachable as long as
    // the generator keeps its no-empty-output contract.
    if caption.is_empty() || img_url.is_empty() {
        return Err(ApiError::Validation("Invalid postcard data".into()));
    }

    let postcard = db.create_postcard(user_id, &audio_hash, &img_url, &caption, 1)?;
    Ok(postcard)
}
