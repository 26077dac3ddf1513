//! Leaderboard server binary.
//!
//! Lifecycle: restore the snapshot if one exists, serve until a
//! shutdown signal arrives, then stop the simulator and write the
//! snapshot back out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing::warn;

use podium::config::Config;
use podium::engine::Leaderboard;
use podium::server;
use podium::server::rate_limit;
use podium::server::rate_limit::RateLimiter;
use podium::server::AppState;
use podium::simulator::Simulator;
use podium::snapshot::Snapshot;

const SNAPSHOT_PATH: &str = "data/leaderboard.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env();
    info!(
        port = config.port,
        initial_users = config.initial_users,
        update_interval_ms = config.update_interval_ms,
        min_rating = config.bounds.min,
        max_rating = config.bounds.max,
        "starting leaderboard server"
    );

    let board = Arc::new(Leaderboard::new(config.bounds));
    let snapshot = Snapshot::new(SNAPSHOT_PATH);

    if snapshot.exists() {
        match snapshot.load(&board) {
            Ok(count) => info!(count, "restored users from snapshot"),
            Err(err) => warn!(error = %err, "failed to load snapshot, starting empty"),
        }
    }

    let simulator = Simulator::new(
        Arc::clone(&board),
        Duration::from_millis(config.update_interval_ms),
    );

    let limiter = Arc::new(RateLimiter::default());
    rate_limit::spawn_cleanup(Arc::clone(&limiter), rate_limit::CLEANUP_INTERVAL);

    let state = Arc::new(AppState {
        board: Arc::clone(&board),
        simulator: simulator.clone(),
        config: config.clone(),
    });

    let app = server::router(state, limiter);
    server::serve(app, config.port, server::shutdown_signal()).await?;

    // Past this point the listener is closed; flush state to disk.
    info!("shutting down");
    simulator.stop();
    match snapshot.save(&board) {
        Ok(count) => info!(count, path = %snapshot.path().display(), "snapshot saved"),
        Err(err) => warn!(error = %err, "failed to save snapshot"),
    }

    return Ok(());
}
