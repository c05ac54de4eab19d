use serde::Deserialize;

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

// -- Recording --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub user_id: i64,
    /// Base64-encoded ambient audio captured by the client.
    pub audio_data: String,
}

// -- Trades --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTradeRequest {
    pub from_id: i64,
    pub to_id: i64,
    pub postcard_id: i64,
}
