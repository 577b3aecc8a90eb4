//! HTTP surface: router assembly and the serve loop.

pub mod routes;
pub mod stream;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::core::config::Config;
use crate::core::error::AppResult;
use crate::download::orchestrator::Orchestrator;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    // Browser frontends live on other origins, so CORS stays wide open
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/download", post(routes::download))
        .route("/api/info", post(routes::info))
        .route("/api/file/{filename}", get(routes::file))
        .route("/api/list", get(routes::list))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until the process exits.
pub async fn run(config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> AppResult<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        config,
        orchestrator,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
