//! Podium - a live leaderboard engine with O(1) competition ranks.
//!
//! The engine keeps three structures consistent under one lock: a
//! dense rating histogram for constant-time ranks, a skip list for
//! ordered pagination, and a prefix-indexed directory for username
//! search. A thin axum service exposes them over HTTP, and a
//! background simulator churns ratings to keep the board alive.
//!
//! # Quick Start
//!
//! ```
//! use podium::config::RatingBounds;
//! use podium::engine::Leaderboard;
//! use podium::user::User;
//!
//! let board = Leaderboard::new(RatingBounds::default());
//! board.add_user(User::new("u1", "rahul_kumar", 4500)).unwrap();
//! board.add_user(User::new("u2", "priya_singh", 4200)).unwrap();
//!
//! assert_eq!(board.user_with_rank("u1").unwrap().rank, 1);
//! assert_eq!(board.user_with_rank("u2").unwrap().rank, 2);
//! assert_eq!(board.search("priya").len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod seed;
pub mod server;
pub mod simulator;
pub mod snapshot;
pub mod user;
