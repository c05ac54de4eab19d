use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trades with `from_id == MARKET_ORIGIN` record a "collect": the user
/// acquired a postcard from the open gallery rather than from another user.
pub const MARKET_ORIGIN: i64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Opaque credential. Never leaves the server.
    #[serde(skip_serializing)]
    pub password: String,
    /// IANA timezone name, e.g. "Europe/London".
    pub timezone: String,
    /// Set each time a recording run starts; None until the first one.
    pub last_sleep_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Postcard {
    pub id: i64,
    pub user_id: i64,
    pub audio_hash: String,
    #[serde(rename = "imgURL")]
    pub img_url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    /// 1 = visible in the public gallery, 0 = private.
    pub is_public: i64,
    pub likes: i64,
}

/// Append-only audit record of an exchange interest. Does not transfer
/// ownership of the postcard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub from_id: i64,
    pub to_id: i64,
    pub postcard_id: i64,
    pub created_at: DateTime<Utc>,
}
