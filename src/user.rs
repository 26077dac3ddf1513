//! User records and the board ordering.
//!
//! A `User` has an immutable identity (`id`) and a mutable rating. The
//! board ordering sorts higher ratings first, then usernames ascending,
//! then ids ascending. The id tiebreak makes the order strict and total:
//! two distinct users never compare equal, even with identical usernames
//! and ratings, so removal from the ranked list is always exact.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

/// A rated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier. Never changes after creation.
    pub id: String,
    /// Display name. Not unique; repeated usernames are legal.
    pub username: String,
    /// Current rating, kept within the configured bounds.
    pub rating: i32,
}

impl User {
    /// Create a new user record.
    pub fn new(id: impl Into<String>, username: impl Into<String>, rating: i32) -> User {
        return User {
            id: id.into(),
            username: username.into(),
            rating,
        };
    }
}

/// A user snapshot with its competition rank attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithRank {
    pub id: String,
    pub username: String,
    pub rating: i32,
    pub rank: usize,
}

impl UserWithRank {
    /// Attach a rank to a user snapshot.
    pub fn new(user: User, rank: usize) -> UserWithRank {
        return UserWithRank {
            id: user.id,
            username: user.username,
            rating: user.rating,
            rank,
        };
    }
}

/// The board ordering: rating descending, then username ascending, then
/// id ascending. `Less` means "appears earlier on the board".
pub fn board_order(a: &User, b: &User) -> Ordering {
    match b.rating.cmp(&a.rating) {
        Ordering::Equal => match a.username.cmp(&b.username) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        },
        other => other,
    }
}
