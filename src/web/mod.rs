pub mod error;
pub mod payload;
mod routes;
pub mod templates;

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::routing::{get, get_service};
use axum::Router;
use maud::Markup;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Store;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

/// Start the web server and run until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn serve(
    config: Config,
    store: Store,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let app = create_app(AppState { store }, &config.static_dir, config.max_body_bytes);

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
///
/// API routes live under `/api`. Other GET requests are served from
/// `static_dir`, falling back to the app shell so client-side routes work.
pub fn create_app(state: AppState, static_dir: &Path, max_body_bytes: usize) -> Router {
    info!(static_dir = %static_dir.display(), "Serving static files");

    let static_files = get_service(ServeDir::new(static_dir).fallback(app_shell.into_service()))
        .fallback(error::not_found);

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", routes::api_router())
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn app_shell() -> Markup {
    templates::render_app_shell()
}
