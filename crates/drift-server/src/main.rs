use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use drift_api::AppStateInner;
use drift_db::Database;
use drift_gen::Generator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drift=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("DRIFT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("DRIFT_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init storage. Without DRIFT_DB_PATH the store lives in memory and
    // vanishes on restart.
    let db = match std::env::var("DRIFT_DB_PATH") {
        Ok(path) => Database::open(&PathBuf::from(path))?,
        Err(_) => Database::open_in_memory()?,
    };
    db.seed_demo()?;

    let generator = Generator::from_env();

    let state = Arc::new(AppStateInner { db, generator });

    let app = drift_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Drift server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
