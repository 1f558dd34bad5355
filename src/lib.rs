pub mod api;
pub mod clock;
pub mod collectors;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod freshness;
pub mod models;
pub mod scheduler;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;

use clock::SystemClock;
use config::AppConfig;
use db::Store;

/// Opens the store, starts the refresh schedule, builds the router and
/// serves until the listener fails.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let db_path = config.database_path();
    let store = Store::open(&db_path, Arc::new(SystemClock))
        .with_context(|| format!("opening event store at {}", db_path.display()))?;
    tracing::info!(
        path = %db_path.display(),
        upcoming = store.count_upcoming()?,
        "event store ready"
    );

    let state = api::state::AppState::new(store, &config);
    match config.refresh_period() {
        Some(period) => {
            scheduler::spawn(Arc::clone(&state.gate), Arc::clone(&state.store), period);
        }
        None => tracing::info!("scheduled collection disabled"),
    }

    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid HOST:PORT combination {}:{}", config.host, config.port))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
