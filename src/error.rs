//! Engine error surface.

use thiserror::Error;

/// Errors returned by the leaderboard engine.
///
/// Every recoverable condition is reported to the caller; the engine
/// never logs or panics on its own behalf.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    /// No user with the given id exists.
    #[error("user with ID {0} not found")]
    NotFound(String),

    /// A user with the given id already exists.
    #[error("user with ID {0} already exists")]
    Duplicate(String),

    /// A rating update targeted a value outside the configured bounds.
    /// Ratings are clamped on ingress instead when a user is created.
    #[error("rating must be between {min} and {max}, got {rating}")]
    OutOfRange { rating: i32, min: i32, max: i32 },
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, LeaderboardError>;
