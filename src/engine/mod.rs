//! The concurrent ranking engine.
//!
//! Three structures answer three questions about one population:
//!
//! - [`RankIndex`]: what is the competition rank of a rating? O(1).
//! - [`RankedList`]: who occupies positions `offset..offset+limit` of
//!   the board? O(log n + offset + limit).
//! - [`UserDirectory`]: which users match a username query? O(candidates).
//!
//! [`Leaderboard`] owns all three behind a single reader/writer lock
//! and is the only public way to mutate them, so the structures can
//! never disagree about membership, counts, or order.

pub mod directory;
pub mod leaderboard;
pub mod rank_index;
pub mod ranked_list;

pub use directory::UserDirectory;
pub use directory::MAX_PREFIX_LEN;
pub use directory::MAX_SEARCH_RESULTS;
pub use leaderboard::BoardStats;
pub use leaderboard::Leaderboard;
pub use rank_index::RankIndex;
pub use ranked_list::RankedList;
