//! The coordinator: one lock over the three coupled structures.
//!
//! The rank index, ranked list, and user directory answer different
//! questions about the same population, so every mutation must land in
//! all three or none. A single reader/writer lock owns the triple:
//! writers take it exclusively for the whole compound operation,
//! readers take it shared, and no read path can ever observe the index
//! disagreeing with the list about membership.
//!
//! Per-structure locks would shrink contention but reopen exactly that
//! window (a list node with an old rating while the index already
//! counts the new one), and would have to re-prove the coupling on
//! every read path. One lock keeps the proof trivial: the invariants
//! hold at every release.
//!
//! Rating updates follow a strict remove → mutate → reinsert protocol.
//! The ranked list orders by rating, so mutating a user's rating while
//! its node is still linked would corrupt the order silently.

use std::sync::RwLock;

use serde::Serialize;

use crate::config::RatingBounds;
use crate::engine::directory::UserDirectory;
use crate::engine::rank_index::RankIndex;
use crate::engine::rank_index::RankIndexStats;
use crate::engine::ranked_list::RankedList;
use crate::error::LeaderboardError;
use crate::error::Result;
use crate::user::User;
use crate::user::UserWithRank;

/// The three coupled structures, only ever touched together.
struct Inner {
    index: RankIndex,
    ranked: RankedList,
    directory: UserDirectory,
}

/// A live leaderboard over a rated population.
///
/// Cheap to share: wrap it in an `Arc` and hand clones to every
/// handler and background task.
pub struct Leaderboard {
    bounds: RatingBounds,
    inner: RwLock<Inner>,
}

/// Storage statistics for the health endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct StoreStats {
    pub total_users: usize,
    pub ranked_list_len: usize,
    pub prefix_index_entries: usize,
}

/// Combined engine statistics.
#[derive(Clone, Debug, Serialize)]
pub struct BoardStats {
    pub rating_index: RankIndexStats,
    pub store: StoreStats,
}

impl Leaderboard {
    /// Create an empty leaderboard over the given rating interval.
    pub fn new(bounds: RatingBounds) -> Leaderboard {
        return Leaderboard {
            bounds,
            inner: RwLock::new(Inner {
                index: RankIndex::new(bounds),
                ranked: RankedList::new(),
                directory: UserDirectory::new(),
            }),
        };
    }

    /// The rating interval users are held to.
    pub fn bounds(&self) -> RatingBounds {
        return self.bounds;
    }

    // --- Compound mutations (exclusive lock) ---

    /// Add a user. The rating is clamped into bounds on the way in;
    /// an already-known id is rejected before any index is touched.
    pub fn add_user(&self, mut user: User) -> Result<()> {
        user.rating = self.bounds.clamp(user.rating);

        let mut inner = self.inner.write().unwrap();
        let rating = user.rating;
        inner.directory.put(user.clone())?;
        inner.index.increment(rating);
        inner.ranked.insert(user);
        return Ok(());
    }

    /// Change a user's rating.
    ///
    /// Unlike creation, an out-of-range rating here is an error rather
    /// than a clamp: the caller asked for a specific value. Updating to
    /// the current rating is a no-op on all observable state.
    pub fn update_rating(&self, id: &str, new_rating: i32) -> Result<()> {
        if !self.bounds.contains(new_rating) {
            return Err(LeaderboardError::OutOfRange {
                rating: new_rating,
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }

        let mut inner = self.inner.write().unwrap();
        let old_rating = match inner.directory.get(id) {
            Some(user) => user.rating,
            None => return Err(LeaderboardError::NotFound(id.to_string())),
        };
        if old_rating == new_rating {
            return Ok(());
        }

        // Remove first: the node must be unlinked before its sort key
        // changes.
        inner.ranked.remove(id);
        let updated = {
            let user = inner
                .directory
                .get_mut(id)
                .expect("user vanished under the write lock");
            user.rating = new_rating;
            user.clone()
        };
        inner.index.move_rating(old_rating, new_rating);
        inner.ranked.insert(updated);
        return Ok(());
    }

    /// Remove every user.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.index.clear();
        inner.ranked.clear();
        inner.directory.clear();
    }

    // --- Reads (shared lock) ---

    /// Number of live users.
    pub fn total_users(&self) -> usize {
        return self.inner.read().unwrap().index.total_users();
    }

    /// Competition rank a user at `rating` would hold. O(1).
    pub fn rank_for_rating(&self, rating: i32) -> usize {
        return self.inner.read().unwrap().index.rank(rating);
    }

    /// Number of users at exactly `rating` (clamped).
    pub fn bucket_count(&self, rating: i32) -> usize {
        return self.inner.read().unwrap().index.bucket_count(rating);
    }

    /// Fetch a user snapshot by id.
    pub fn get_user(&self, id: &str) -> Result<User> {
        let inner = self.inner.read().unwrap();
        return match inner.directory.get(id) {
            Some(user) => Ok(user.clone()),
            None => Err(LeaderboardError::NotFound(id.to_string())),
        };
    }

    /// Fetch a user with its current rank attached.
    pub fn user_with_rank(&self, id: &str) -> Result<UserWithRank> {
        let inner = self.inner.read().unwrap();
        let user = match inner.directory.get(id) {
            Some(user) => user.clone(),
            None => return Err(LeaderboardError::NotFound(id.to_string())),
        };
        let rank = inner.index.rank(user.rating);
        return Ok(UserWithRank::new(user, rank));
    }

    /// A leaderboard page: up to `limit` users starting at `offset` in
    /// board order, each with its rank. Rank and order come from the
    /// same lock acquisition, so a page is internally consistent even
    /// under concurrent updates.
    pub fn top_n(&self, limit: usize, offset: usize) -> Vec<UserWithRank> {
        let inner = self.inner.read().unwrap();
        return inner
            .ranked
            .slice(limit, offset)
            .into_iter()
            .map(|user| {
                let rank = inner.index.rank(user.rating);
                return UserWithRank::new(user, rank);
            })
            .collect();
    }

    /// Username search with ranks attached. See
    /// [`UserDirectory::search`] for matching rules.
    pub fn search(&self, query: &str) -> Vec<UserWithRank> {
        let inner = self.inner.read().unwrap();
        return inner
            .directory
            .search(query)
            .into_iter()
            .map(|user| {
                let rank = inner.index.rank(user.rating);
                return UserWithRank::new(user, rank);
            })
            .collect();
    }

    /// Every live id, in no particular order. Used by the simulator's
    /// id cache; staleness is acceptable there.
    pub fn all_ids(&self) -> Vec<String> {
        return self.inner.read().unwrap().directory.all_ids();
    }

    /// Copy of every user, for the persistence snapshot.
    pub fn snapshot_users(&self) -> Vec<User> {
        return self.inner.read().unwrap().directory.all_users();
    }

    /// Statistics for the health endpoint.
    pub fn stats(&self) -> BoardStats {
        let inner = self.inner.read().unwrap();
        return BoardStats {
            rating_index: inner.index.stats(),
            store: StoreStats {
                total_users: inner.directory.len(),
                ranked_list_len: inner.ranked.len(),
                prefix_index_entries: inner.directory.stats().prefix_index_entries,
            },
        };
    }
}
