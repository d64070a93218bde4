//! Tubescope Web Server
//!
//! Run with: cargo run -p tubescope-web

use tracing::info;
use tracing_subscriber::EnvFilter;
use tubescope_common::Config;
use tubescope_db::Database;
use tubescope_web::{router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tubescope=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Tubescope Web Server...");

    let config = Config::load()?;
    let target = config.database.target();

    // Requests report their own database errors; an unreachable server at
    // startup is only logged.
    let db = Database::connect_lazy(&config.database);
    db.log_connection_check(&target).await;

    let state = AppState::new(db)?;
    let app = build_router(state, &config.server.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
