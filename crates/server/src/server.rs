//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Static serving of uploaded files under `/uploads`
//! - Middleware stack (logging, compression, CORS, timeouts)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{annotations, auth, health, images};
use crate::routes::{api_info, connection_test, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Middleware stack, outermost first:
/// 1. Tracing
/// 2. Request ID tracking
/// 3. Request logging
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let uploads = ServeDir::new(&state.config.upload_dir);

    let probe_routes = Router::new()
        .route("/", get(api_info))
        .route("/test", get(connection_test))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    let api_routes = Router::new()
        // Accounts
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        // Images
        .route("/upload", post(images::upload_images))
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .route("/images", get(images::list_images))
        // Annotations
        .route(
            "/bounding-boxes",
            get(annotations::list_bounding_boxes).post(annotations::save_bounding_boxes),
        );

    Router::new()
        .merge(probe_routes)
        .merge(api_routes)
        .nest_service("/uploads", uploads)
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the annotator HTTP server
///
/// Sets up JSON logging, connects the storage backend, makes sure the upload
/// directory exists and then serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    health::mark_server_start();

    let addr: SocketAddr = config.socket_addr()?;

    let state = Arc::new(ServerState::new(config.clone()).await?);
    state.ingestor.ensure_content_root().await?;

    let app = build_router(state);

    tracing::info!("Starting annotator server on {}", addr);
    tracing::info!(
        "Storage: {}, uploads in {}",
        config.storage.kind(),
        config.upload_dir.display()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Max files per upload: {}",
        config.timeout_secs,
        config.max_body_size_mb,
        config.max_upload_files
    );
    tracing::info!("CORS: {}", config.enable_cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
