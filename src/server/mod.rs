//! HTTP service surface.
//!
//! Thin by design: every route parses its inputs, calls one engine or
//! simulator operation, and shapes the response. All interesting state
//! lives behind [`AppState`], shared across handlers via `Arc`.

pub mod handlers;
pub mod rate_limit;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::engine::Leaderboard;
use crate::server::rate_limit::RateLimiter;
use crate::simulator::Simulator;

/// State shared across all routes.
pub struct AppState {
    pub board: Arc<Leaderboard>,
    pub simulator: Simulator,
    pub config: Config,
}

/// Build the API router with CORS, request tracing, and rate limiting.
pub fn router(state: Arc<AppState>, limiter: Arc<RateLimiter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    return Router::new()
        .route("/api/leaderboard", get(handlers::leaderboard))
        .route("/api/search", get(handlers::search))
        .route("/api/seed", post(handlers::seed_users))
        .route("/api/users/{id}", get(handlers::get_user))
        .route("/api/users/{id}/rating", patch(handlers::update_rating))
        .route("/api/health", get(handlers::health))
        .route("/api/simulator/start", post(handlers::simulator_start))
        .route("/api/simulator/stop", post(handlers::simulator_stop))
        .route("/api/simulator/status", get(handlers::simulator_status))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
        .layer(cors)
        .with_state(state);
}

/// Serve until the shutdown future resolves.
///
/// The listener hands each connection's peer address to the rate
/// limiter via `ConnectInfo`.
pub async fn serve(
    router: Router,
    port: u16,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "leaderboard server listening");

    return axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;
}

/// Resolves on Ctrl-C / SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
