//! User storage with prefix-indexed username search.
//!
//! Holds the id→user map and a bounded prefix table: every prefix of
//! length 1..=K of the lowercased username maps to the ids carrying it,
//! and names longer than K additionally index their full lowercased
//! form so exact lookups on long names still hit.
//!
//! Full suffix or n-gram indexing over a million names would dwarf the
//! data itself; a length-K prefix table keeps the index small and turns
//! any query into a filter over one candidate list. A query uses its
//! first K characters as the lookup key (or the whole query when
//! shorter) and a second pass keeps only names containing the entire
//! query as a substring.
//!
//! Removal scrubs exactly the keys insertion wrote. The two paths
//! share one key generator, so an update can never leave a stale id
//! behind in a prefix list.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::LeaderboardError;
use crate::error::Result;
use crate::user::board_order;
use crate::user::User;

/// Longest username prefix recorded in the index.
pub const MAX_PREFIX_LEN: usize = 4;

/// Search hits are capped after sorting, keeping the top-rated names.
pub const MAX_SEARCH_RESULTS: usize = 100;

/// id→user storage plus the prefix multimap.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: FxHashMap<String, User>,
    by_prefix: FxHashMap<String, Vec<String>>,
}

/// Snapshot of directory statistics for the health endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct DirectoryStats {
    pub total_users: usize,
    pub prefix_index_entries: usize,
}

/// The keys a username is indexed under: each 1..=K character prefix
/// of the lowercased name, plus the full lowercased name when it is
/// longer than K.
fn index_keys(username: &str) -> Vec<String> {
    let lower = username.to_lowercase();
    let mut keys = Vec::new();
    let mut prefix = String::new();
    for (taken, ch) in lower.chars().enumerate() {
        if taken == MAX_PREFIX_LEN {
            break;
        }
        prefix.push(ch);
        keys.push(prefix.clone());
    }
    if lower.chars().count() > MAX_PREFIX_LEN {
        keys.push(lower);
    }
    return keys;
}

impl UserDirectory {
    pub fn new() -> UserDirectory {
        return UserDirectory::default();
    }

    pub fn len(&self) -> usize {
        return self.users.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.users.is_empty();
    }

    pub fn contains(&self, id: &str) -> bool {
        return self.users.contains_key(id);
    }

    /// Insert a user, indexing its username. Reports a collision if the
    /// id is already present, leaving the directory untouched.
    pub fn put(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.id) {
            return Err(LeaderboardError::Duplicate(user.id));
        }
        for key in index_keys(&user.username) {
            self.by_prefix.entry(key).or_default().push(user.id.clone());
        }
        self.users.insert(user.id.clone(), user);
        return Ok(());
    }

    /// Fetch a user by id.
    pub fn get(&self, id: &str) -> Option<&User> {
        return self.users.get(id);
    }

    /// Mutable access for in-place rating updates. The coordinator only
    /// calls this while the user's ranked-list node is unlinked.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut User> {
        return self.users.get_mut(id);
    }

    /// Remove a user and scrub its id from every prefix list it was
    /// recorded under.
    pub fn remove(&mut self, id: &str) -> Option<User> {
        let user = self.users.remove(id)?;
        for key in index_keys(&user.username) {
            if let Some(ids) = self.by_prefix.get_mut(&key) {
                if let Some(pos) = ids.iter().position(|entry| entry == id) {
                    ids.swap_remove(pos);
                }
                if ids.is_empty() {
                    self.by_prefix.remove(&key);
                }
            }
        }
        return Some(user);
    }

    /// Substring search over usernames, case-insensitive.
    ///
    /// The query is trimmed and lowercased; its first K characters pick
    /// the candidate list, and candidates survive only if their
    /// lowercased name contains the whole query. Hits are sorted by
    /// rating descending (username ascending within a rating) and
    /// capped at [`MAX_SEARCH_RESULTS`].
    pub fn search(&self, query: &str) -> Vec<User> {
        let lower_query = query.trim().to_lowercase();
        if lower_query.is_empty() {
            return Vec::new();
        }

        let lookup_key: String = lower_query.chars().take(MAX_PREFIX_LEN).collect();

        let Some(candidates) = self.by_prefix.get(&lookup_key) else {
            return Vec::new();
        };

        let mut hits: Vec<User> = candidates
            .iter()
            .filter_map(|id| self.users.get(id))
            .filter(|user| user.username.to_lowercase().contains(&lower_query))
            .cloned()
            .collect();

        hits.sort_by(board_order);
        hits.truncate(MAX_SEARCH_RESULTS);
        return hits;
    }

    /// Copy out every user, in no particular order.
    pub fn all_users(&self) -> Vec<User> {
        return self.users.values().cloned().collect();
    }

    /// Every live id, in no particular order.
    pub fn all_ids(&self) -> Vec<String> {
        return self.users.keys().cloned().collect();
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.users.clear();
        self.by_prefix.clear();
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> DirectoryStats {
        return DirectoryStats {
            total_users: self.users.len(),
            prefix_index_entries: self.by_prefix.len(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_with(users: &[(&str, &str, i32)]) -> UserDirectory {
        let mut dir = UserDirectory::new();
        for (id, name, rating) in users {
            dir.put(User::new(*id, *name, *rating)).unwrap();
        }
        return dir;
    }

    #[test]
    fn put_and_get() {
        let dir = dir_with(&[("1", "rahul_kumar", 4500)]);
        assert_eq!(dir.get("1").unwrap().username, "rahul_kumar");
        assert!(dir.get("2").is_none());
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn put_reports_collision() {
        let mut dir = dir_with(&[("1", "rahul", 4500)]);
        let err = dir.put(User::new("1", "other", 3000)).unwrap_err();
        assert_eq!(err, LeaderboardError::Duplicate("1".to_string()));
        // The losing record did not overwrite anything.
        assert_eq!(dir.get("1").unwrap().username, "rahul");
    }

    #[test]
    fn index_keys_short_name() {
        assert_eq!(index_keys("Bo"), vec!["b", "bo"]);
    }

    #[test]
    fn index_keys_long_name_adds_full_form() {
        assert_eq!(
            index_keys("Rahul"),
            vec!["r", "ra", "rah", "rahu", "rahul"]
        );
    }

    #[test]
    fn index_keys_exactly_k() {
        assert_eq!(index_keys("mira"), vec!["m", "mi", "mir", "mira"]);
    }

    #[test]
    fn search_matches_substring_not_just_prefix() {
        let dir = dir_with(&[
            ("1", "rahul_kumar", 4500),
            ("2", "rahul_sharma", 4200),
            ("3", "priya_singh", 4000),
            ("4", "rahul_gupta", 3800),
        ]);

        let hits = dir.search("rahul");
        let names: Vec<&str> = hits.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["rahul_kumar", "rahul_sharma", "rahul_gupta"]);
    }

    #[test]
    fn search_is_case_insensitive_and_trims() {
        let dir = dir_with(&[("1", "Rahul_Kumar", 4500)]);
        assert_eq!(dir.search("RAHUL").len(), 1);
        assert_eq!(dir.search("  rahul  ").len(), 1);
        assert_eq!(dir.search("rAhUl_kUmAr").len(), 1);
    }

    #[test]
    fn search_whitespace_only_is_empty() {
        let dir = dir_with(&[("1", "rahul", 4500)]);
        assert!(dir.search("").is_empty());
        assert!(dir.search("   ").is_empty());
        assert!(dir.search("\t\n").is_empty());
    }

    #[test]
    fn search_short_query_uses_own_key() {
        let dir = dir_with(&[("1", "rahul", 4500), ("2", "ravi", 4000)]);
        let hits = dir.search("ra");
        assert_eq!(hits.len(), 2);
        // Shorter-than-K queries hit the wider bucket, the filter
        // narrows nothing extra away here.
        assert_eq!(hits[0].username, "rahul");
        assert_eq!(hits[1].username, "ravi");
    }

    #[test]
    fn search_query_longer_than_name_prefix_filters() {
        let dir = dir_with(&[("1", "rahu", 4500)]);
        // "rahul" keys to "rahu" in the table, but "rahu" does not
        // contain "rahul", so the filter drops it.
        assert!(dir.search("rahul").is_empty());
    }

    #[test]
    fn search_sorts_rating_desc_then_username() {
        let dir = dir_with(&[
            ("1", "samb", 3000),
            ("2", "sama", 3000),
            ("3", "samc", 4000),
        ]);
        let hits = dir.search("sam");
        let names: Vec<&str> = hits.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["samc", "sama", "samb"]);
    }

    #[test]
    fn search_caps_results_after_sorting() {
        let mut dir = UserDirectory::new();
        for i in 0..150 {
            dir.put(User::new(
                format!("u{}", i),
                format!("player{:03}", i),
                100 + i,
            ))
            .unwrap();
        }

        let hits = dir.search("play");
        assert_eq!(hits.len(), MAX_SEARCH_RESULTS);
        // The cap keeps the top-rated names.
        assert_eq!(hits[0].rating, 249);
        assert_eq!(hits.last().unwrap().rating, 150);
    }

    #[test]
    fn remove_scrubs_prefix_lists() {
        let mut dir = dir_with(&[("1", "rahul_kumar", 4500), ("2", "rahul_verma", 4000)]);

        let removed = dir.remove("1").unwrap();
        assert_eq!(removed.username, "rahul_kumar");
        assert!(dir.get("1").is_none());

        let hits = dir.search("rahul");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");

        // Long-name full key scrubbed too: exact lookup finds nothing.
        assert!(dir.search("rahul_kumar").is_empty());
    }

    #[test]
    fn remove_missing_is_none() {
        let mut dir = UserDirectory::new();
        assert!(dir.remove("ghost").is_none());
    }

    #[test]
    fn clear_resets() {
        let mut dir = dir_with(&[("1", "rahul", 4500)]);
        dir.clear();
        assert!(dir.is_empty());
        assert!(dir.search("rahul").is_empty());
        assert_eq!(dir.stats().prefix_index_entries, 0);
    }

    #[test]
    fn stats_count_entries() {
        let dir = dir_with(&[("1", "rahul", 4500)]);
        let stats = dir.stats();
        assert_eq!(stats.total_users, 1);
        // "r", "ra", "rah", "rahu", "rahul"
        assert_eq!(stats.prefix_index_entries, 5);
    }
}
