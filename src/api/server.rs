//! HTTP server implementation for the pairing API

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers;
use crate::core::{AppState, ConfiguredAppState, Result};
use crate::storage::StorageImpl;

/// Creates the main application router with all routes and middleware
pub fn create_app<S: StorageImpl>(app_state: Arc<AppState<S>>) -> Router {
    // CORS is open to every origin
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let mut router = Router::new()
        .route("/", get(handlers::root_handler))
        // Pair routes
        .route("/pairs", get(handlers::get_pairs::<S>))
        .route("/pairs/reset", post(handlers::reset_pairs::<S>))
        // User routes
        .route(
            "/users",
            get(handlers::list_users::<S>).post(handlers::add_user::<S>),
        )
        .route("/users/{name}", delete(handlers::remove_user::<S>))
        // System routes
        .route("/health", get(handlers::health_check));

    if app_state.config.metrics.enable_prometheus {
        router = router.route("/metrics", get(handlers::metrics::<S>));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(app_state)
}

/// Serve `app` on `addr` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!("Server is running on http://{}", local_addr);
    info!("Health check available at http://{}/health", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Start the HTTP server for the configured AppState
pub async fn start_server<F>(configured_app_state: ConfiguredAppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let http_addr = configured_app_state.http_addr();
    info!("Starting pairing API server on {}", http_addr);

    let app = configured_app_state.router();
    serve_with_shutdown(http_addr, app, shutdown).await
}
