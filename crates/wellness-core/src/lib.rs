#![deny(warnings)]

//! Core domain models and invariants for the wellness game.
//!
//! This crate defines the serializable `GameState` aggregate together with
//! the static level table, the fixed badge/quest/milestone catalog and
//! validation helpers that check the aggregate's invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub mod activity;
pub mod catalog;
pub mod levels;

pub use activity::Activity;
pub use levels::{LevelDef, LevelTable};

/// Maximum number of XP events kept in `GameState::recent_events`.
pub const RECENT_EVENTS_LIMIT: usize = 10;

/// The kind of action an XP award was granted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpKind {
    /// A mood entry was submitted.
    MoodCheck,
    /// A tracked habit was completed.
    HabitComplete,
    /// A wellness resource was opened.
    ResourceView,
    /// A meditation session was finished.
    Meditation,
    /// A journal entry was written.
    JournalEntry,
    /// A survey was answered.
    Survey,
    /// A quest was completed.
    QuestComplete,
    /// Bonus granted by the daily streak.
    StreakMilestone,
}

impl XpKind {
    /// Every kind, in declaration order.
    pub const ALL: [XpKind; 8] = [
        XpKind::MoodCheck,
        XpKind::HabitComplete,
        XpKind::ResourceView,
        XpKind::Meditation,
        XpKind::JournalEntry,
        XpKind::Survey,
        XpKind::QuestComplete,
        XpKind::StreakMilestone,
    ];

    /// Stable snake_case name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            XpKind::MoodCheck => "mood_check",
            XpKind::HabitComplete => "habit_complete",
            XpKind::ResourceView => "resource_view",
            XpKind::Meditation => "meditation",
            XpKind::JournalEntry => "journal_entry",
            XpKind::Survey => "survey",
            XpKind::QuestComplete => "quest_complete",
            XpKind::StreakMilestone => "streak_milestone",
        }
    }
}

impl fmt::Display for XpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for XpKind {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XpKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseNameError::new("xp kind", s))
    }
}

/// Returned when a user-supplied name does not match any known variant.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {what}: {name}")]
pub struct ParseNameError {
    what: &'static str,
    name: String,
}

impl ParseNameError {
    pub(crate) fn new(what: &'static str, name: &str) -> Self {
        Self {
            what,
            name: name.to_string(),
        }
    }
}

/// One XP award as shown in the activity feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XpEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// What the XP was awarded for.
    #[serde(rename = "type")]
    pub kind: XpKind,
    /// XP amount (> 0).
    pub amount: u32,
    /// Free-text label for feeds and notifications.
    pub description: String,
    /// When the award happened.
    pub timestamp: DateTime<Utc>,
}

/// Per-category wellness counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessPoints {
    pub mindfulness: u32,
    pub physical: u32,
    pub social: u32,
    pub academic: u32,
    pub sleep: u32,
}

impl WellnessPoints {
    /// Points earned by an XP award of `amount` for `kind`.
    ///
    /// Kinds with no category contribute nothing; every kind must be listed.
    pub fn for_award(kind: XpKind, amount: u32) -> Self {
        let none = Self::default();
        match kind {
            XpKind::MoodCheck => Self {
                mindfulness: amount / 10,
                ..none
            },
            XpKind::HabitComplete => Self {
                physical: amount / 10,
                sleep: amount / 10,
                ..none
            },
            XpKind::ResourceView => Self {
                academic: amount / 5,
                ..none
            },
            XpKind::Meditation => Self {
                mindfulness: amount / 5,
                ..none
            },
            XpKind::JournalEntry => Self {
                mindfulness: amount / 10,
                social: amount / 10,
                ..none
            },
            XpKind::QuestComplete => {
                let share = amount / 20;
                Self {
                    mindfulness: share,
                    physical: share,
                    social: share,
                    academic: share,
                    sleep: share,
                }
            }
            XpKind::Survey | XpKind::StreakMilestone => none,
        }
    }

    /// Add `other` category-wise, saturating.
    pub fn absorb(&mut self, other: WellnessPoints) {
        self.mindfulness = self.mindfulness.saturating_add(other.mindfulness);
        self.physical = self.physical.saturating_add(other.physical);
        self.social = self.social.saturating_add(other.social);
        self.academic = self.academic.saturating_add(other.academic);
        self.sleep = self.sleep.saturating_add(other.sleep);
    }

    /// Sum over all categories.
    pub fn total(&self) -> u64 {
        [
            self.mindfulness,
            self.physical,
            self.social,
            self.academic,
            self.sleep,
        ]
        .iter()
        .map(|&p| u64::from(p))
        .sum()
    }
}

/// Daily check-in streak.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive calendar days with a check-in, ending at `last_check_in`.
    pub current_streak: u32,
    /// Highest `current_streak` ever observed.
    pub longest_streak: u32,
    /// Moment of the latest check-in, if any.
    pub last_check_in: Option<DateTime<Utc>>,
}

/// Identifier of a badge in the fixed catalog, e.g. "first-steps".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BadgeId(pub String);

/// Identifier of a quest in the fixed catalog, e.g. "first-mood".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestId(pub String);

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A persistent unlockable achievement with bounded progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    /// Progress needed to unlock (> 0).
    pub total: u32,
    /// Current progress in `[0, total]`.
    pub progress: u32,
    /// Flips to true once and stays there.
    pub unlocked: bool,
    /// Set on first unlock.
    pub earned_on: Option<DateTime<Utc>>,
}

impl Badge {
    /// Raise progress by `by`, capped at `total`.
    ///
    /// Returns true only when this call unlocks the badge.
    pub fn advance(&mut self, by: u32, now: DateTime<Utc>) -> bool {
        self.progress = self.progress.saturating_add(by).min(self.total);
        self.try_unlock(now)
    }

    /// Set progress to `value`, capped at `total`.
    ///
    /// An unlocked badge stays at full progress. Returns true only when this
    /// call unlocks the badge.
    pub fn track(&mut self, value: u32, now: DateTime<Utc>) -> bool {
        if !self.unlocked {
            self.progress = value.min(self.total);
        }
        self.try_unlock(now)
    }

    fn try_unlock(&mut self, now: DateTime<Utc>) -> bool {
        if self.unlocked || self.progress < self.total {
            return false;
        }
        self.unlocked = true;
        self.earned_on = Some(now);
        true
    }

    /// Progress as a percentage in `[0, 100]`.
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            return if self.unlocked { 100.0 } else { 0.0 };
        }
        f64::from(self.progress) / f64::from(self.total) * 100.0
    }
}

/// A one-shot task that grants XP and optionally advances a badge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    /// XP granted on completion.
    pub xp_reward: u32,
    /// Steps in the quest (> 0).
    pub total: u32,
    pub progress: u32,
    /// Flips to true once and stays there.
    pub completed: bool,
    /// Badge advanced by one step on completion.
    pub badge_reward: Option<BadgeId>,
}

/// A reward unlocked automatically when the player reaches `level`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub level: u32,
    pub title: String,
    pub reward: String,
    pub unlocked: bool,
}

/// The whole gamification aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// XP accrued since the start of the current level.
    pub current_xp: u64,
    /// Lifetime XP, never decreases.
    pub total_xp: u64,
    /// Level derived from `total_xp` (>= 1).
    pub level: u32,
    /// XP threshold of the next level.
    pub next_level_xp: u64,
    pub streak: StreakState,
    pub wellness_points: WellnessPoints,
    /// Newest first, at most `RECENT_EVENTS_LIMIT` entries.
    pub recent_events: Vec<XpEvent>,
    pub badges: Vec<Badge>,
    pub quests: Vec<Quest>,
    pub milestones: Vec<Milestone>,
}

impl GameState {
    /// Fresh state against the standard level table.
    pub fn initial() -> Self {
        Self::new(LevelTable::standard())
    }

    /// Fresh state against `levels`, with the full catalog locked.
    pub fn new(levels: &LevelTable) -> Self {
        let level = levels.level_for_xp(0);
        Self {
            current_xp: 0,
            total_xp: 0,
            level,
            next_level_xp: levels.next_level_xp(level),
            streak: StreakState::default(),
            wellness_points: WellnessPoints::default(),
            recent_events: Vec::new(),
            badges: catalog::badges(),
            quests: catalog::quests(),
            milestones: catalog::milestones(),
        }
    }

    pub fn badge(&self, id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id.0 == id)
    }

    pub fn badge_mut(&mut self, id: &str) -> Option<&mut Badge> {
        self.badges.iter_mut().find(|b| b.id.0 == id)
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id.0 == id)
    }

    pub fn quest_mut(&mut self, id: &str) -> Option<&mut Quest> {
        self.quests.iter_mut().find(|q| q.id.0 == id)
    }

    /// Badges unlocked so far.
    pub fn unlocked_badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter().filter(|b| b.unlocked)
    }

    /// Quests that can still be completed.
    pub fn open_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|q| !q.completed)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Render XP with thousands separators, e.g. `1,250 XP`.
pub fn format_xp(xp: u64) -> String {
    let digits = xp.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(" XP");
    out
}

/// Validation errors for the level table and state invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The level table has no entries.
    #[error("level table is empty")]
    EmptyLevelTable,
    /// Levels must be numbered 1, 2, 3, ... without gaps.
    #[error("expected level {expected}, found {found}")]
    LevelSequence { expected: u32, found: u32 },
    /// The first level must start at 0 XP.
    #[error("first level must require 0 XP, found {0}")]
    FirstLevelThreshold(u64),
    /// Thresholds must be strictly increasing.
    #[error("required XP of level {0} does not exceed the previous level")]
    ThresholdNotIncreasing(u32),
    /// `level` disagrees with `total_xp`.
    #[error("level {found} does not match total XP (expected {expected})")]
    LevelMismatch { expected: u32, found: u32 },
    /// `next_level_xp` disagrees with the table.
    #[error("next level XP {found} does not match table (expected {expected})")]
    NextLevelMismatch { expected: u64, found: u64 },
    /// `current_xp` is not `total_xp - required_xp(level)`.
    #[error("current XP {found} is inconsistent (expected {expected})")]
    CurrentXpMismatch { expected: u64, found: u64 },
    /// `current_streak` exceeds `longest_streak`.
    #[error("current streak {current} exceeds longest streak {longest}")]
    StreakOrder { current: u32, longest: u32 },
    /// Badge progress out of bounds or unlocked without full progress.
    #[error("badge {0} has inconsistent progress")]
    BadgeProgress(String),
    /// Quest progress out of bounds or completed without full progress.
    #[error("quest {0} has inconsistent progress")]
    QuestProgress(String),
    /// More than `RECENT_EVENTS_LIMIT` recent events.
    #[error("{0} recent events exceed the limit")]
    TooManyEvents(usize),
    /// Milestone unlocked above the current level.
    #[error("milestone {0} is unlocked above the current level")]
    MilestoneAhead(String),
}

/// Validate every invariant of a game state against `levels`.
pub fn validate_state(state: &GameState, levels: &LevelTable) -> Result<(), ValidationError> {
    let expected = levels.level_for_xp(state.total_xp);
    if state.level != expected {
        return Err(ValidationError::LevelMismatch {
            expected,
            found: state.level,
        });
    }
    let next = levels.next_level_xp(state.level);
    if state.next_level_xp != next {
        return Err(ValidationError::NextLevelMismatch {
            expected: next,
            found: state.next_level_xp,
        });
    }
    let current = state.total_xp - levels.required_xp(state.level);
    if state.current_xp != current {
        return Err(ValidationError::CurrentXpMismatch {
            expected: current,
            found: state.current_xp,
        });
    }
    if state.streak.current_streak > state.streak.longest_streak {
        return Err(ValidationError::StreakOrder {
            current: state.streak.current_streak,
            longest: state.streak.longest_streak,
        });
    }
    if state.recent_events.len() > RECENT_EVENTS_LIMIT {
        return Err(ValidationError::TooManyEvents(state.recent_events.len()));
    }
    for b in &state.badges {
        if b.progress > b.total || (b.unlocked && b.progress < b.total) {
            return Err(ValidationError::BadgeProgress(b.id.0.clone()));
        }
    }
    for q in &state.quests {
        if q.progress > q.total || (q.completed && q.progress != q.total) {
            return Err(ValidationError::QuestProgress(q.id.0.clone()));
        }
    }
    for m in &state.milestones {
        if m.unlocked && m.level > state.level {
            return Err(ValidationError::MilestoneAhead(m.id.clone()));
        }
    }
    Ok(())
}
