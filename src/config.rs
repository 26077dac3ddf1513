//! Environment configuration.
//!
//! Everything tunable comes from environment variables with sensible
//! defaults, so the binary runs with no setup at all.

use std::env;

/// The closed rating interval users live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatingBounds {
    pub min: i32,
    pub max: i32,
}

impl RatingBounds {
    /// Construct bounds. `min` must not exceed `max`.
    pub fn new(min: i32, max: i32) -> RatingBounds {
        assert!(min <= max, "rating bounds inverted: {} > {}", min, max);
        return RatingBounds { min, max };
    }

    /// Number of distinct ratings in the interval.
    pub fn span(&self) -> usize {
        return (self.max - self.min + 1) as usize;
    }

    /// Clamp a rating into the interval.
    pub fn clamp(&self, rating: i32) -> i32 {
        return rating.clamp(self.min, self.max);
    }

    /// Whether a rating lies inside the interval.
    pub fn contains(&self, rating: i32) -> bool {
        return rating >= self.min && rating <= self.max;
    }
}

impl Default for RatingBounds {
    fn default() -> RatingBounds {
        return RatingBounds { min: 100, max: 5000 };
    }
}

/// Server configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// TCP port for the HTTP server. `PORT`, default 8080.
    pub port: u16,
    /// Users seeded when the board starts empty. `INITIAL_USERS`, default 10000.
    pub initial_users: usize,
    /// Milliseconds between simulator ticks. `UPDATE_INTERVAL`, default 100.
    pub update_interval_ms: u64,
    /// Rating interval for all users.
    pub bounds: RatingBounds,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Config {
        return Config {
            port: env_parsed("PORT", 8080),
            initial_users: env_parsed("INITIAL_USERS", 10000),
            update_interval_ms: env_parsed("UPDATE_INTERVAL", 100),
            bounds: RatingBounds::default(),
        };
    }
}

impl Default for Config {
    fn default() -> Config {
        return Config {
            port: 8080,
            initial_users: 10000,
            update_interval_ms: 100,
            bounds: RatingBounds::default(),
        };
    }
}

/// Read an environment variable, falling back to `default` when it is
/// unset or fails to parse.
fn env_parsed<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    return env::var(name)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default);
}
