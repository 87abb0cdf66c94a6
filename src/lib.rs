//! Poll-taking HTTP service: users register and log in for a bearer token,
//! create polls with a fixed list of options, vote, and read tallies.
//!
//! Polls and users live in PostgreSQL when `DATABASE_URL` is set and in an
//! in-process store otherwise. See `.env.example` for the other settings.

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod controllers;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use config::Config;
use state::AppState;
use utils::error::{AppError, AppResult};

pub fn build_router(state: AppState) -> AppResult<Router> {
    let mut app = Router::new()
        .route("/", get(controllers::health::root))
        .merge(routes::auth_routes::auth_routes(state.clone()))
        .merge(routes::poll_routes::poll_routes(state.clone()))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = &state.config.cors_origin {
        let origin = origin.parse::<HeaderValue>().map_err(|_| {
            AppError::InternalError(format!("Failed to parse CORS origin: {}", origin))
        })?;

        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::header::AUTHORIZATION,
                ]),
        );
    }

    Ok(app.with_state(state))
}

pub async fn start_server() -> AppResult<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    controllers::health::mark_start();

    let config = Config::load()?;
    let addr = config.server_addr;

    info!("Initializing state...");
    let state = AppState::from_config(config).await?;
    let app = build_router(state)?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        AppError::InternalError(format!("Failed to bind to address {}: {}", addr, e))
    })?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::InternalError(format!("Server error: {}", e)))?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
