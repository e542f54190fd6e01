#![deny(warnings)]

//! Persistence layer: keyed JSON snapshots of the whole game state.
//!
//! Each key maps to one file `<dir>/<key>.json`. Saves always write the full
//! aggregate to a temporary file and rename it into place, so readers never
//! see a partial write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use wellness_core::{validate_state, GameState, LevelTable, ValidationError};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage key used when none is configured.
pub const DEFAULT_KEY: &str = "wellness-game-state";

/// Returns the default directory used for local saves.
pub fn default_storage_dir() -> &'static str {
    "./saves"
}

/// On-disk envelope around the game state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot<S = GameState> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: S,
}

/// Errors raised while reading or writing snapshots.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem failure.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Snapshot could not be encoded or decoded.
    #[error("malformed snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Snapshot written by an incompatible format version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    /// Snapshot decoded but breaks a state invariant.
    #[error("invalid snapshot state: {0}")]
    Invalid(#[from] ValidationError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Keyed snapshot storage in a directory.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    key: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// File holding this key's snapshot.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    /// Serialize the full state under this key.
    pub fn save(&self, state: &GameState) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            state,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", self.key));
        fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
        let path = self.path();
        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        debug!(path = %path.display(), total_xp = state.total_xp, "snapshot saved");
        Ok(())
    }

    /// Read the raw snapshot, `None` when the key was never written.
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>, PersistError> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(Some(snapshot))
    }

    /// Read the stored state, `None` when the key was never written.
    pub fn load(&self) -> Result<Option<GameState>, PersistError> {
        Ok(self.load_snapshot()?.map(|s| s.state))
    }

    /// Stored state if present and valid, otherwise a fresh one.
    ///
    /// Unreadable or inconsistent snapshots are logged and replaced.
    pub fn load_or_initial(&self, levels: &LevelTable) -> GameState {
        let loaded = self.load().and_then(|state| match state {
            Some(s) => validate_state(&s, levels).map(|()| Some(s)).map_err(Into::into),
            None => Ok(None),
        });
        match loaded {
            Ok(Some(state)) => {
                info!(key = %self.key, total_xp = state.total_xp, level = state.level, "state loaded");
                state
            }
            Ok(None) => {
                info!(key = %self.key, "no saved state, starting fresh");
                GameState::new(levels)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding unreadable state");
                GameState::new(levels)
            }
        }
    }

    /// Remove this key's snapshot; absent keys are fine.
    pub fn clear(&self) -> Result<(), PersistError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use wellness_core::XpKind;
    use wellness_engine::{apply, Command, Context, DayBoundary};

    fn store(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("saves"), DEFAULT_KEY)
    }

    fn played_state() -> GameState {
        let levels = LevelTable::standard();
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 7, 45, 12).unwrap();
        let mut s = GameState::initial();
        for d in 0..6 {
            let ctx = Context {
                now: start + Duration::days(d) + Duration::milliseconds(d * 137),
                boundary: DayBoundary::Utc,
                levels,
            };
            s = apply(s, &Command::CheckStreak, &ctx).state;
            let cmd = Command::AddXp {
                amount: 20,
                kind: XpKind::Meditation,
                description: "Meditation session".to_string(),
            };
            s = apply(s, &cmd, &ctx).state;
        }
        let ctx = Context {
            now: start,
            boundary: DayBoundary::Utc,
            levels,
        };
        let cmd = Command::CompleteQuest {
            quest_id: "first-mood".to_string(),
        };
        apply(s, &cmd, &ctx).state
    }

    #[test]
    fn default_dir_is_relative() {
        assert!(default_storage_dir().starts_with("./"));
    }

    #[test]
    fn missing_key_loads_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        assert!(st.load().unwrap().is_none());
        assert_eq!(
            st.load_or_initial(LevelTable::standard()),
            GameState::initial()
        );
    }

    #[test]
    fn roundtrip_preserves_dates_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        let state = played_state();
        st.save(&state).unwrap();
        let back = st.load().unwrap().unwrap();
        assert_eq!(back, state);
        assert_eq!(
            back.streak.last_check_in,
            state.streak.last_check_in
        );
        assert!(!dir.path().join("saves/.wellness-game-state.json.tmp").exists());
    }

    #[test]
    fn dates_are_written_as_iso_8601() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        st.save(&played_state()).unwrap();
        let text = fs::read_to_string(st.path()).unwrap();
        assert!(text.contains("\"last_check_in\": \"2024-04-06T07:45:12.685Z\"")
            || text.contains("\"last_check_in\": \"2024-04-06T07:45:12.685+00:00\""));
    }

    #[test]
    fn corrupt_snapshot_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        fs::create_dir_all(dir.path().join("saves")).unwrap();
        fs::write(st.path(), b"{ not json").unwrap();
        assert!(matches!(st.load(), Err(PersistError::Serialize(_))));
        assert_eq!(
            st.load_or_initial(LevelTable::standard()),
            GameState::initial()
        );
    }

    #[test]
    fn foreign_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        st.save(&played_state()).unwrap();
        let text = fs::read_to_string(st.path())
            .unwrap()
            .replacen("\"version\": 1", "\"version\": 99", 1);
        fs::write(st.path(), text).unwrap();
        assert!(matches!(
            st.load(),
            Err(PersistError::Version { found: 99, .. })
        ));
    }

    #[test]
    fn inconsistent_state_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        let mut state = played_state();
        state.level = 9;
        st.save(&state).unwrap();
        assert!(st.load().unwrap().is_some());
        assert_eq!(
            st.load_or_initial(LevelTable::standard()),
            GameState::initial()
        );
    }

    #[test]
    fn clear_removes_key() {
        let dir = tempfile::tempdir().unwrap();
        let st = store(&dir);
        st.clear().unwrap();
        st.save(&GameState::initial()).unwrap();
        assert!(st.path().exists());
        st.clear().unwrap();
        assert!(st.load().unwrap().is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn reachable_states_roundtrip(steps in proptest::collection::vec((0u8..3, 1u32..300, 0i64..3), 1..25)) {
            let levels = LevelTable::standard();
            let quests = wellness_core::catalog::quests();
            let mut now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
            let mut s = GameState::initial();
            for (op, amount, days) in steps {
                now += Duration::days(days) + Duration::microseconds(i64::from(amount));
                let cmd = match op {
                    0 => Command::AddXp { amount, kind: XpKind::JournalEntry, description: "j".to_string() },
                    1 => Command::CompleteQuest { quest_id: quests[amount as usize % quests.len()].id.0.clone() },
                    _ => Command::CheckStreak,
                };
                let ctx = Context { now, boundary: DayBoundary::Utc, levels };
                s = apply(s, &cmd, &ctx).state;
            }
            let dir = tempfile::tempdir().unwrap();
            let st = store(&dir);
            st.save(&s).unwrap();
            prop_assert_eq!(st.load_or_initial(levels), s);
        }
    }
}
