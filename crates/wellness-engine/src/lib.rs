#![deny(warnings)]

//! Gamification engine: XP, levels, quests, badges and daily streaks.
//!
//! All mutation goes through [`apply`], a pure function from the current
//! [`GameState`] and a [`Command`] to the next state plus the notifications
//! to show. [`GameEngine`] owns one state and a clock and commits each
//! transition as a single unit.

pub mod clock;
pub mod notification;
pub mod transition;

pub use clock::{Clock, DayBoundary, ManualClock, SystemClock};
pub use notification::{dispatch, Notification, NotificationKind, NotificationSink};
pub use transition::{apply, streak_bonus, Command, Context, Transition};

use tracing::info;
use wellness_core::{GameState, LevelDef, LevelTable, XpKind};

/// Owner of the single mutable `GameState`.
#[derive(Debug)]
pub struct GameEngine<C = SystemClock> {
    state: GameState,
    levels: LevelTable,
    clock: C,
    boundary: DayBoundary,
}

impl<C: Clock> GameEngine<C> {
    /// Engine over `state` with the standard level table and local days.
    pub fn new(state: GameState, clock: C) -> Self {
        Self {
            state,
            levels: LevelTable::standard().clone(),
            clock,
            boundary: DayBoundary::default(),
        }
    }

    #[must_use]
    pub fn with_levels(mut self, levels: LevelTable) -> Self {
        self.levels = levels;
        self
    }

    #[must_use]
    pub fn with_day_boundary(mut self, boundary: DayBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn day_boundary(&self) -> DayBoundary {
        self.boundary
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Definition of the current level.
    pub fn current_level(&self) -> Option<&LevelDef> {
        self.levels.get(self.state.level)
    }

    /// Percentage of the way to the next level, in `[0, 100]`.
    pub fn progress_to_next_level(&self) -> f64 {
        self.levels
            .progress_to_next_level(self.state.total_xp, self.state.level)
    }

    /// Compute the transition for `command` without committing it.
    pub fn preview(&self, command: &Command) -> Transition {
        let ctx = Context {
            now: self.clock.now(),
            boundary: self.boundary,
            levels: &self.levels,
        };
        apply(self.state.clone(), command, &ctx)
    }

    /// Replace the current state wholesale.
    pub fn commit(&mut self, state: GameState) {
        self.state = state;
    }

    /// Apply and commit `command`, returning the notifications to show.
    pub fn execute(&mut self, command: &Command) -> Vec<Notification> {
        let Transition {
            state,
            notifications,
        } = self.preview(command);
        self.commit(state);
        info!(
            total_xp = self.state.total_xp,
            level = self.state.level,
            streak = self.state.streak.current_streak,
            notifications = notifications.len(),
            "transition committed"
        );
        notifications
    }

    pub fn add_xp(&mut self, amount: u32, kind: XpKind, description: &str) -> Vec<Notification> {
        self.execute(&Command::AddXp {
            amount,
            kind,
            description: description.to_string(),
        })
    }

    pub fn complete_quest(&mut self, quest_id: &str) -> Vec<Notification> {
        self.execute(&Command::CompleteQuest {
            quest_id: quest_id.to_string(),
        })
    }

    pub fn check_streak(&mut self) -> Vec<Notification> {
        self.execute(&Command::CheckStreak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn engine(clock: &ManualClock) -> GameEngine<&ManualClock> {
        GameEngine::new(GameState::initial(), clock).with_day_boundary(DayBoundary::Utc)
    }

    #[test]
    fn preview_does_not_commit() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap());
        let eng = engine(&clock);
        let t = eng.preview(&Command::AddXp {
            amount: 40,
            kind: XpKind::JournalEntry,
            description: "Journal entry".to_string(),
        });
        assert_eq!(t.state.total_xp, 40);
        assert_eq!(eng.state().total_xp, 0);
    }

    #[test]
    fn operations_commit_and_report_progress() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap());
        let mut eng = engine(&clock);
        let n = eng.add_xp(50, XpKind::MoodCheck, "Mood check-in");
        assert_eq!(n.len(), 1);
        assert_eq!(eng.progress_to_next_level(), 50.0);
        assert_eq!(eng.current_level().unwrap().title, "Seedling");

        let n = eng.complete_quest("first-mood");
        assert_eq!(n[0].kind, NotificationKind::LevelUp);
        assert_eq!(eng.state().level, 2);
        assert!(eng.complete_quest("first-mood").is_empty());
    }

    #[test]
    fn streak_follows_the_clock() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 23, 30, 0).unwrap());
        let mut eng = engine(&clock);
        eng.check_streak();
        clock.advance(Duration::minutes(45));
        let n = eng.check_streak();
        assert_eq!(eng.state().streak.current_streak, 2);
        assert_eq!(n[0].title, "+5 XP");
        assert!(eng.check_streak().is_empty());
        assert_eq!(eng.state().streak.current_streak, 2);
    }

    #[test]
    fn custom_level_table_is_honoured() {
        let levels = LevelTable::new(vec![
            LevelDef {
                level: 1,
                title: "One".into(),
                required_xp: 0,
                benefit: String::new(),
            },
            LevelDef {
                level: 2,
                title: "Two".into(),
                required_xp: 10,
                benefit: String::new(),
            },
        ])
        .unwrap();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap());
        let mut eng = GameEngine::new(GameState::new(&levels), &clock).with_levels(levels);
        eng.add_xp(12, XpKind::Survey, "Survey");
        assert_eq!(eng.state().level, 2);
        assert_eq!(eng.state().current_xp, 2);
        assert_eq!(eng.progress_to_next_level(), 100.0);
    }
}
