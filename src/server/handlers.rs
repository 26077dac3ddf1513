//! HTTP handlers for the leaderboard API.
//!
//! Query-parameter handling follows a forgiving convention: anything
//! missing, malformed, or out of range falls back to its default
//! instead of erroring, so dashboards never break on a sloppy URL.
//! Body and path parameters are strict and return 4xx with a tagged
//! error body.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::seed;
use crate::server::AppState;
use crate::user::UserWithRank;

/// Default page size for the leaderboard.
const DEFAULT_LIMIT: usize = 50;

/// Largest accepted page size.
const MAX_LIMIT: usize = 100;

/// Largest accepted seed count.
const MAX_SEED_COUNT: usize = 100_000;

#[derive(Serialize)]
pub struct LeaderboardResponse {
    users: Vec<UserWithRank>,
    total_users: usize,
    page: usize,
    page_size: usize,
    has_more: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    users: Vec<UserWithRank>,
    query: String,
    count: usize,
}

#[derive(Deserialize)]
pub struct UpdateRatingRequest {
    rating: i32,
}

#[derive(Serialize)]
pub struct SeedResponse {
    message: &'static str,
    users_added: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn error_response(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error,
        message: message.into(),
    };
    return (status, Json(body)).into_response();
}

/// Parse a query parameter, keeping it only if it passes `valid`.
fn param_or<T: std::str::FromStr + Copy>(
    params: &HashMap<String, String>,
    name: &str,
    default: T,
    valid: impl Fn(T) -> bool,
) -> T {
    return params
        .get(name)
        .and_then(|raw| raw.parse().ok())
        .filter(|&value| valid(value))
        .unwrap_or(default);
}

/// GET /api/leaderboard?limit=..&offset=..
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<LeaderboardResponse> {
    let limit = param_or(&params, "limit", DEFAULT_LIMIT, |v: usize| {
        v > 0 && v <= MAX_LIMIT
    });
    let offset = param_or(&params, "offset", 0, |_: usize| true);

    let users = state.board.top_n(limit, offset);
    let total_users = state.board.total_users();

    return Json(LeaderboardResponse {
        users,
        total_users,
        page: offset / limit + 1,
        page_size: limit,
        has_more: offset + limit < total_users,
    });
}

/// GET /api/search?q=..
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<SearchResponse> {
    let query = params.get("q").cloned().unwrap_or_default();
    if query.is_empty() {
        return Json(SearchResponse {
            users: Vec::new(),
            query,
            count: 0,
        });
    }

    let users = state.board.search(&query);
    let count = users.len();
    return Json(SearchResponse { users, query, count });
}

/// GET /api/users/{id}
pub async fn get_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    return match state.board.user_with_rank(&id) {
        Ok(user) => Json(user).into_response(),
        Err(err) => error_response(StatusCode::NOT_FOUND, "not_found", err.to_string()),
    };
}

/// PATCH /api/users/{id}/rating
pub async fn update_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRatingRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Invalid JSON body",
        );
    };

    // Unknown id and out-of-range rating are both client mistakes here.
    if let Err(err) = state.board.update_rating(&id, request.rating) {
        return error_response(StatusCode::BAD_REQUEST, "update_failed", err.to_string());
    }

    return match state.board.user_with_rank(&id) {
        Ok(user) => Json(user).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "fetch_failed",
            err.to_string(),
        ),
    };
}

/// POST /api/seed?count=..
///
/// Seeding is destructive: the board is cleared first, then populated,
/// then the simulator is started.
pub async fn seed_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<SeedResponse> {
    let count = param_or(&params, "count", state.config.initial_users, |v: usize| {
        v > 0 && v <= MAX_SEED_COUNT
    });

    state.board.clear();
    let added = seed::seed_users(&state.board, count);
    info!(count = added, "seeded leaderboard");

    state.simulator.start();

    return Json(SeedResponse {
        message: "Successfully seeded users",
        users_added: added,
    });
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.board.stats();
    return Json(json!({
        "status": "healthy",
        "users": {
            "total": state.board.total_users(),
        },
        "rating_index": stats.rating_index,
        "store": stats.store,
        "simulator": state.simulator.stats(),
    }));
}

/// POST /api/simulator/start
pub async fn simulator_start(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.simulator.start();
    return Json(json!({
        "message": "Simulator started",
        "running": state.simulator.is_running(),
    }));
}

/// POST /api/simulator/stop
pub async fn simulator_stop(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.simulator.stop();
    return Json(json!({
        "message": "Simulator stopped",
        "running": state.simulator.is_running(),
    }));
}

/// GET /api/simulator/status
pub async fn simulator_status(State(state): State<Arc<AppState>>) -> Response {
    return Json(state.simulator.stats()).into_response();
}
