//! Standard XP rewards for everyday user actions.

use crate::{ParseNameError, XpKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A user gesture that earns XP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Mood,
    Habit,
    Resource,
    Meditation,
    Journal,
    Survey,
}

impl Activity {
    pub const ALL: [Activity; 6] = [
        Activity::Mood,
        Activity::Habit,
        Activity::Resource,
        Activity::Meditation,
        Activity::Journal,
        Activity::Survey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Mood => "mood",
            Activity::Habit => "habit",
            Activity::Resource => "resource",
            Activity::Meditation => "meditation",
            Activity::Journal => "journal",
            Activity::Survey => "survey",
        }
    }

    /// XP amount, kind and feed label awarded for this activity.
    pub fn reward(self) -> (u32, XpKind, &'static str) {
        match self {
            Activity::Mood => (10, XpKind::MoodCheck, "Mood check-in"),
            Activity::Habit => (15, XpKind::HabitComplete, "Habit completed"),
            Activity::Resource => (5, XpKind::ResourceView, "Resource viewed"),
            Activity::Meditation => (20, XpKind::Meditation, "Meditation session"),
            Activity::Journal => (15, XpKind::JournalEntry, "Journal entry"),
            Activity::Survey => (25, XpKind::Survey, "Wellness survey"),
        }
    }
}

impl FromStr for Activity {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseNameError::new("activity", s))
    }
}
