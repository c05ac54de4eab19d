pub mod error;
pub mod pipeline;
pub mod postcards;
pub mod record;
pub mod trades;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use drift_db::Database;
use drift_gen::Generator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub generator: Generator,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", post(users::register))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/postcards", get(postcards::list_owned))
        .route("/api/postcards/public", get(postcards::list_public))
        .route("/api/postcards/trade/{user_id}", get(postcards::trade_candidates))
        .route("/api/postcards/{id}", get(postcards::get_one))
        .route("/api/postcards/{id}/like", post(postcards::like))
        .route("/api/record", post(record::record))
        .route("/api/trades", post(trades::create))
        .route("/api/trades/{user_id}", get(trades::list_for_user))
        .with_state(state)
}
