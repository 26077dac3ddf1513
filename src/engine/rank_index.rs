//! Dense rating histogram with O(1) competition rank.
//!
//! Keeps one bucket per rating over the closed interval configured at
//! construction, plus a precomputed "strictly above" cumulative array:
//!
//! - `buckets[i]` = number of users rated `min + i`
//! - `above[i]` = number of users rated strictly higher than `min + i`
//!
//! Competition rank of rating `r` is then `above[r - min] + 1`, a
//! single array read. Ties share a rank and leave gaps (1, 2, 2, 4).
//!
//! # Costs
//!
//! - `rank`, `bucket_count`, `total_users`: O(1)
//! - `increment` / `decrement`: O(D) cumulative rebuild, where D is the
//!   interval width. Population changes are rare relative to rating
//!   churn, so the rebuild is acceptable there.
//! - `move_rating`: O(|new - old|). Only the cumulative entries between
//!   the two ratings change, and each changes by exactly one, because a
//!   single user crossed those boundaries.
//!
//! Ratings outside the interval clamp to its edge on every entry point.

use serde::Serialize;

use crate::config::RatingBounds;

/// Histogram over the rating domain plus the strictly-greater
/// cumulative array.
#[derive(Clone, Debug)]
pub struct RankIndex {
    bounds: RatingBounds,
    /// Count of users at each rating.
    buckets: Vec<u32>,
    /// Count of users with rating strictly greater than each rating.
    above: Vec<u32>,
    total: usize,
}

/// Snapshot of index statistics for the health endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RankIndexStats {
    pub total_users: usize,
    pub total_buckets: usize,
    pub non_empty_buckets: usize,
    pub max_bucket_size: u32,
    pub min_rating: i32,
    pub max_rating: i32,
}

impl RankIndex {
    /// Create an empty index over the given rating interval.
    pub fn new(bounds: RatingBounds) -> RankIndex {
        let span = bounds.span();
        return RankIndex {
            bounds,
            buckets: vec![0; span],
            above: vec![0; span],
            total: 0,
        };
    }

    /// Map a rating to its bucket position, clamping out-of-range values.
    fn index_of(&self, rating: i32) -> usize {
        return (self.bounds.clamp(rating) - self.bounds.min) as usize;
    }

    /// Rebuild the cumulative array from the buckets. O(D).
    fn rebuild_above(&mut self) {
        let mut sum = 0u32;
        for i in (0..self.buckets.len()).rev() {
            self.above[i] = sum;
            sum += self.buckets[i];
        }
    }

    /// Competition rank for a rating: one plus the number of users
    /// rated strictly higher. O(1).
    pub fn rank(&self, rating: i32) -> usize {
        return self.above[self.index_of(rating)] as usize + 1;
    }

    /// Number of users rated strictly higher than `rating`. O(1).
    pub fn users_above(&self, rating: i32) -> usize {
        return self.above[self.index_of(rating)] as usize;
    }

    /// Record a user arriving at `rating`. O(D).
    pub fn increment(&mut self, rating: i32) {
        let idx = self.index_of(rating);
        self.buckets[idx] += 1;
        self.total += 1;
        self.rebuild_above();
    }

    /// Record a user leaving `rating`. Decrementing an empty bucket is
    /// a no-op and never underflows the total. O(D).
    pub fn decrement(&mut self, rating: i32) {
        let idx = self.index_of(rating);
        if self.buckets[idx] > 0 {
            self.buckets[idx] -= 1;
            self.total -= 1;
        }
        self.rebuild_above();
    }

    /// Move one user from `old_rating` to `new_rating`, patching the
    /// cumulative array incrementally. O(|new - old|).
    pub fn move_rating(&mut self, old_rating: i32, new_rating: i32) {
        let old_idx = self.index_of(old_rating);
        let new_idx = self.index_of(new_rating);
        if old_idx == new_idx {
            return;
        }

        if self.buckets[old_idx] > 0 {
            self.buckets[old_idx] -= 1;
        }
        self.buckets[new_idx] += 1;

        // Exactly one user crossed each rating between the two points,
        // so each affected cumulative entry moves by exactly one.
        if old_idx < new_idx {
            // Moved up: ratings in [old, new) gained one user above them.
            for i in old_idx..new_idx {
                self.above[i] += 1;
            }
        } else {
            // Moved down: ratings in [new, old) lost one user above them.
            for i in new_idx..old_idx {
                self.above[i] -= 1;
            }
        }
    }

    /// Total users currently recorded.
    pub fn total_users(&self) -> usize {
        return self.total;
    }

    /// Users at exactly `rating` (clamped).
    pub fn bucket_count(&self, rating: i32) -> usize {
        return self.buckets[self.index_of(rating)] as usize;
    }

    /// Reset the index to empty.
    pub fn clear(&mut self) {
        self.buckets.fill(0);
        self.above.fill(0);
        self.total = 0;
    }

    /// The rating interval this index covers.
    pub fn bounds(&self) -> RatingBounds {
        return self.bounds;
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> RankIndexStats {
        let mut non_empty = 0;
        let mut max_bucket = 0u32;
        for &count in &self.buckets {
            if count > 0 {
                non_empty += 1;
                max_bucket = max_bucket.max(count);
            }
        }
        return RankIndexStats {
            total_users: self.total,
            total_buckets: self.buckets.len(),
            non_empty_buckets: non_empty,
            max_bucket_size: max_bucket,
            min_rating: self.bounds.min,
            max_rating: self.bounds.max,
        };
    }
}
