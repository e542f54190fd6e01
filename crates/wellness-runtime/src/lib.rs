#![deny(warnings)]

//! Runtime wiring: engine, snapshot store and notification sink.
//!
//! [`WellnessService`] is the one writer of the game state. Every operation
//! computes the next state, persists it, commits it and only then hands the
//! notifications to the sink.

pub mod config;

pub use config::AppConfig;

use persistence::{PersistError, SnapshotStore};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use wellness_core::{Activity, GameState, LevelTable, XpKind};
use wellness_engine::{
    dispatch, Clock, Command, GameEngine, Notification, NotificationSink, Transition,
};

/// Errors surfaced by the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Configuration file is not valid YAML for `AppConfig`.
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// Snapshot could not be written.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Sink that reports notifications through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, n: &Notification) {
        if n.destructive {
            warn!(kind = ?n.kind, title = %n.title, "{}", n.description);
        } else {
            info!(kind = ?n.kind, title = %n.title, "{}", n.description);
        }
    }
}

/// Single owner of the game state for one player.
pub struct WellnessService<C: Clock, N: NotificationSink> {
    engine: GameEngine<C>,
    store: SnapshotStore,
    sink: N,
}

impl<C: Clock, N: NotificationSink> WellnessService<C, N> {
    /// Load the configured snapshot (or start fresh) and wire the service.
    pub fn open(config: &AppConfig, clock: C, sink: N) -> Self {
        let store = config.store();
        let state = store.load_or_initial(LevelTable::standard());
        let engine = GameEngine::new(state, clock).with_day_boundary(config.time.day_boundary);
        Self::with_engine(engine, store, sink)
    }

    pub fn with_engine(engine: GameEngine<C>, store: SnapshotStore, sink: N) -> Self {
        Self {
            engine,
            store,
            sink,
        }
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn engine(&self) -> &GameEngine<C> {
        &self.engine
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Apply, persist, commit, notify. Nothing is committed if the save fails.
    fn run(&mut self, command: &Command) -> Result<Vec<Notification>, RuntimeError> {
        let Transition {
            state,
            notifications,
        } = self.engine.preview(command);
        self.store.save(&state)?;
        self.engine.commit(state);
        info!(
            key = self.store.key(),
            total_xp = self.state().total_xp,
            level = self.state().level,
            "state saved"
        );
        dispatch(&mut self.sink, &notifications);
        Ok(notifications)
    }

    pub fn add_xp(
        &mut self,
        amount: u32,
        kind: XpKind,
        description: &str,
    ) -> Result<Vec<Notification>, RuntimeError> {
        self.run(&Command::AddXp {
            amount,
            kind,
            description: description.to_string(),
        })
    }

    pub fn complete_quest(&mut self, quest_id: &str) -> Result<Vec<Notification>, RuntimeError> {
        self.run(&Command::CompleteQuest {
            quest_id: quest_id.to_string(),
        })
    }

    pub fn check_streak(&mut self) -> Result<Vec<Notification>, RuntimeError> {
        self.run(&Command::CheckStreak)
    }

    /// Award the standard XP for a user gesture.
    pub fn record_activity(&mut self, activity: Activity) -> Result<Vec<Notification>, RuntimeError> {
        let (amount, kind, description) = activity.reward();
        self.add_xp(amount, kind, description)
    }

    /// Overwrite progress with a fresh state.
    pub fn reset(&mut self) -> Result<(), RuntimeError> {
        let fresh = GameState::new(self.engine.levels());
        self.store.save(&fresh)?;
        self.engine.commit(fresh);
        warn!(key = self.store.key(), "progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::fs;
    use wellness_engine::{DayBoundary, ManualClock, NotificationKind};

    fn config(dir: &tempfile::TempDir) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.storage.dir = dir.path().join("saves");
        cfg.time.day_boundary = DayBoundary::Utc;
        cfg
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 10, 7, 18, 0, 0).unwrap())
    }

    #[test]
    fn every_operation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        let clock = clock();
        let mut svc = WellnessService::open(&cfg, &clock, Vec::<Notification>::new());
        svc.record_activity(Activity::Mood).unwrap();
        svc.check_streak().unwrap();
        svc.complete_quest("first-mood").unwrap();

        let saved = cfg.store().load().unwrap().unwrap();
        assert_eq!(&saved, svc.state());
        assert_eq!(saved.total_xp, 60);
        assert_eq!(saved.streak.current_streak, 1);

        let kinds: Vec<_> = svc.sink().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationKind::XpGained,
                NotificationKind::XpGained,
                NotificationKind::BadgeUnlocked
            ]
        );
    }

    #[test]
    fn reopening_resumes_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        let clock = clock();
        {
            let mut svc = WellnessService::open(&cfg, &clock, TracingSink);
            svc.check_streak().unwrap();
        }
        clock.advance(Duration::days(1));
        let mut svc = WellnessService::open(&cfg, &clock, Vec::<Notification>::new());
        assert_eq!(svc.state().streak.current_streak, 1);
        svc.check_streak().unwrap();
        assert_eq!(svc.state().streak.current_streak, 2);
        assert_eq!(svc.state().total_xp, 5);
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        // A plain file where the storage directory should be.
        fs::write(&cfg.storage.dir, b"").unwrap();
        let clock = clock();
        let mut svc = WellnessService::open(&cfg, &clock, Vec::<Notification>::new());
        let err = svc.record_activity(Activity::Meditation).unwrap_err();
        assert!(matches!(err, RuntimeError::Persist(_)));
        assert_eq!(svc.state(), &GameState::initial());
        assert!(svc.sink().is_empty());
    }

    #[test]
    fn reset_overwrites_progress() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        let clock = clock();
        let mut svc = WellnessService::open(&cfg, &clock, Vec::<Notification>::new());
        svc.add_xp(300, XpKind::Survey, "Survey").unwrap();
        assert_eq!(svc.state().level, 3);
        svc.reset().unwrap();
        assert_eq!(svc.state(), &GameState::initial());
        assert_eq!(cfg.store().load().unwrap().unwrap(), GameState::initial());
    }
}
