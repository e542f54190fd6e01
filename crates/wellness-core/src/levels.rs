//! Static level table: the sole source of truth for level derivation.

use crate::ValidationError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One row of the level table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    /// Level number, starting at 1.
    pub level: u32,
    /// Display title, e.g. "Sprout".
    pub title: String,
    /// Lifetime XP needed to reach this level.
    pub required_xp: u64,
    /// What the level grants.
    pub benefit: String,
}

const STANDARD_LEVELS: [(u32, &str, u64, &str); 10] = [
    (1, "Seedling", 0, "Daily mood check-ins and the activity feed"),
    (2, "Sprout", 100, "Custom check-in reminders"),
    (3, "Sapling", 250, "Weekly mood insights"),
    (4, "Blossom", 500, "Guided journaling prompts"),
    (5, "Grove", 1000, "Extended meditation library"),
    (6, "Trailblazer", 1750, "Habit templates"),
    (7, "Pathfinder", 2750, "Monthly wellness report"),
    (8, "Mentor", 4000, "Peer encouragement board"),
    (9, "Sage", 6000, "Advanced goal planning"),
    (10, "Luminary", 9000, "Full profile customization"),
];

static STANDARD: Lazy<LevelTable> = Lazy::new(|| LevelTable {
    entries: STANDARD_LEVELS
        .iter()
        .map(|&(level, title, required_xp, benefit)| LevelDef {
            level,
            title: title.to_string(),
            required_xp,
            benefit: benefit.to_string(),
        })
        .collect(),
});

/// Ordered level thresholds, strictly increasing in `required_xp`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelTable {
    entries: Vec<LevelDef>,
}

impl LevelTable {
    /// The process-wide ten-level table.
    pub fn standard() -> &'static LevelTable {
        &STANDARD
    }

    /// Build a table after checking numbering and thresholds.
    pub fn new(entries: Vec<LevelDef>) -> Result<Self, ValidationError> {
        let first = entries.first().ok_or(ValidationError::EmptyLevelTable)?;
        if first.required_xp != 0 {
            return Err(ValidationError::FirstLevelThreshold(first.required_xp));
        }
        for (i, entry) in entries.iter().enumerate() {
            let expected = i as u32 + 1;
            if entry.level != expected {
                return Err(ValidationError::LevelSequence {
                    expected,
                    found: entry.level,
                });
            }
        }
        for pair in entries.windows(2) {
            if pair[1].required_xp <= pair[0].required_xp {
                return Err(ValidationError::ThresholdNotIncreasing(pair[1].level));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LevelDef] {
        &self.entries
    }

    pub fn get(&self, level: u32) -> Option<&LevelDef> {
        self.entries.iter().find(|e| e.level == level)
    }

    pub fn max_level(&self) -> u32 {
        self.entries.last().map_or(1, |e| e.level)
    }

    /// Largest level whose threshold is reached by `total_xp`; 1 if none.
    pub fn level_for_xp(&self, total_xp: u64) -> u32 {
        self.entries
            .iter()
            .rev()
            .find(|e| e.required_xp <= total_xp)
            .map_or(1, |e| e.level)
    }

    /// Threshold of `level`, or of the highest level below it when `level`
    /// is past the end of the table.
    pub fn required_xp(&self, level: u32) -> u64 {
        self.entries
            .iter()
            .take_while(|e| e.level <= level)
            .last()
            .map_or(0, |e| e.required_xp)
    }

    /// Threshold of `level + 1`; at the top level its own threshold.
    pub fn next_level_xp(&self, level: u32) -> u64 {
        self.get(level.saturating_add(1))
            .map_or_else(|| self.required_xp(level), |e| e.required_xp)
    }

    /// Percentage of the way from `level` to the next one, in `[0, 100]`.
    ///
    /// Returns 100 when there is no next level.
    pub fn progress_to_next_level(&self, total_xp: u64, level: u32) -> f64 {
        let floor = self.required_xp(level) as f64;
        let span = self.next_level_xp(level) as f64 - floor;
        if span <= 0.0 {
            return 100.0;
        }
        ((total_xp as f64 - floor) / span * 100.0).clamp(0.0, 100.0)
    }
}
