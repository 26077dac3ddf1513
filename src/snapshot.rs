//! JSON persistence for the user population.
//!
//! The snapshot is a single document, `{version: 1, users: [...]}`.
//! Saves go through a temp file renamed into place, so a crash mid-write
//! leaves the previous snapshot intact. Loads are best effort: records
//! that fail to insert are logged and skipped rather than aborting the
//! restore.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::engine::Leaderboard;
use crate::user::User;

/// Current snapshot document version.
const SNAPSHOT_VERSION: u32 = 1;

/// Errors surfaced by snapshot I/O.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The on-disk document.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    users: Vec<User>,
}

/// Handle on a snapshot path.
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Snapshot {
        return Snapshot { path: path.into() };
    }

    /// Whether a snapshot file exists at the configured path.
    pub fn exists(&self) -> bool {
        return self.path.exists();
    }

    /// The configured path.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// Write the board's population to disk atomically.
    /// Returns the number of users saved.
    pub fn save(&self, board: &Leaderboard) -> Result<usize, SnapshotError> {
        let users = board.snapshot_users();
        let count = users.len();
        let doc = SnapshotFile {
            version: SNAPSHOT_VERSION,
            users,
        };
        let json = serde_json::to_vec_pretty(&doc)?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        // Write-then-rename keeps the old snapshot until the new one is
        // fully on disk.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        return Ok(count);
    }

    /// Replace the board's population with the snapshot's contents.
    /// Returns the number of users restored. Records that fail to
    /// insert (duplicate ids in a hand-edited file, say) are logged
    /// and skipped.
    pub fn load(&self, board: &Leaderboard) -> Result<usize, SnapshotError> {
        let json = fs::read(&self.path)?;
        let doc: SnapshotFile = serde_json::from_slice(&json)?;

        board.clear();
        let mut loaded = 0;
        for user in doc.users {
            let id = user.id.clone();
            match board.add_user(user) {
                Ok(()) => loaded += 1,
                Err(err) => warn!(id = %id, error = %err, "skipping snapshot record"),
            }
        }
        return Ok(loaded);
    }

    /// Delete the snapshot file.
    pub fn delete(&self) -> Result<(), SnapshotError> {
        fs::remove_file(&self.path)?;
        return Ok(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingBounds;

    fn scratch_path(tag: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("podium-snapshot-{}-{}.json", tag, std::process::id()));
        return path;
    }

    fn board_with(users: &[(&str, &str, i32)]) -> Leaderboard {
        let board = Leaderboard::new(RatingBounds::default());
        for (id, name, rating) in users {
            board.add_user(User::new(*id, *name, *rating)).unwrap();
        }
        return board;
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = scratch_path("roundtrip");
        let snapshot = Snapshot::new(&path);
        let board = board_with(&[
            ("1", "erin", 4800),
            ("2", "ali", 3600),
            ("3", "bea", 2400),
        ]);

        assert_eq!(snapshot.save(&board).unwrap(), 3);
        assert!(snapshot.exists());

        let restored = Leaderboard::new(RatingBounds::default());
        assert_eq!(snapshot.load(&restored).unwrap(), 3);

        assert_eq!(restored.total_users(), 3);
        for id in ["1", "2", "3"] {
            assert_eq!(
                restored.get_user(id).unwrap().rating,
                board.get_user(id).unwrap().rating
            );
        }
        // Ranks come back too, not just the raw records.
        assert_eq!(restored.user_with_rank("1").unwrap().rank, 1);

        snapshot.delete().unwrap();
    }

    #[test]
    fn load_replaces_existing_population() {
        let path = scratch_path("replace");
        let snapshot = Snapshot::new(&path);
        let saved = board_with(&[("1", "erin", 4800)]);
        snapshot.save(&saved).unwrap();

        let target = board_with(&[("old", "stale", 2000)]);
        snapshot.load(&target).unwrap();

        assert_eq!(target.total_users(), 1);
        assert!(target.get_user("old").is_err());
        assert!(target.get_user("1").is_ok());

        snapshot.delete().unwrap();
    }

    #[test]
    fn load_skips_duplicate_records() {
        let path = scratch_path("dupes");
        fs::write(
            &path,
            r#"{"version":1,"users":[
                {"id":"1","username":"erin","rating":4000},
                {"id":"1","username":"erin-again","rating":3000},
                {"id":"2","username":"ali","rating":2000}
            ]}"#,
        )
        .unwrap();

        let snapshot = Snapshot::new(&path);
        let board = Leaderboard::new(RatingBounds::default());
        assert_eq!(snapshot.load(&board).unwrap(), 2);
        assert_eq!(board.total_users(), 2);
        assert_eq!(board.get_user("1").unwrap().rating, 4000);

        snapshot.delete().unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let snapshot = Snapshot::new("/nonexistent/podium/board.json");
        let board = Leaderboard::new(RatingBounds::default());
        assert!(matches!(
            snapshot.load(&board),
            Err(SnapshotError::Io(_))
        ));
    }

    #[test]
    fn load_garbage_is_a_json_error() {
        let path = scratch_path("garbage");
        fs::write(&path, b"not json at all").unwrap();

        let snapshot = Snapshot::new(&path);
        let board = Leaderboard::new(RatingBounds::default());
        assert!(matches!(
            snapshot.load(&board),
            Err(SnapshotError::Json(_))
        ));

        snapshot.delete().unwrap();
    }
}
