//! Fixed badge, quest and milestone definitions.

use crate::{Badge, BadgeId, Milestone, Quest, QuestId};

/// Badge whose progress mirrors the daily streak.
pub const STREAK_BADGE_ID: &str = "streak-keeper";

// (id, name, description, total)
const BADGES: [(&str, &str, &str, u32); 5] = [
    ("first-steps", "First Steps", "Log your very first mood", 1),
    (
        "mindful-explorer",
        "Mindful Explorer",
        "Finish three mindfulness quests",
        3,
    ),
    ("habit-hero", "Habit Hero", "Finish two habit quests", 2),
    (
        "knowledge-seeker",
        "Knowledge Seeker",
        "Finish two learning quests",
        2,
    ),
    (
        STREAK_BADGE_ID,
        "Streak Keeper",
        "Check in seven days in a row",
        7,
    ),
];

// (id, title, description, xp_reward, total, badge_reward)
const QUESTS: [(&str, &str, &str, u32, u32, Option<&str>); 9] = [
    (
        "first-mood",
        "How are you feeling?",
        "Log your first mood check-in",
        50,
        1,
        Some("first-steps"),
    ),
    (
        "meditate-three",
        "Find your calm",
        "Complete three meditation sessions",
        75,
        3,
        Some("mindful-explorer"),
    ),
    (
        "first-journal",
        "Dear diary",
        "Write your first journal entry",
        40,
        1,
        Some("mindful-explorer"),
    ),
    (
        "mindful-week",
        "Mindful week",
        "Check in with your mood every day for a week",
        120,
        7,
        Some("mindful-explorer"),
    ),
    (
        "habit-builder",
        "Habit builder",
        "Complete a habit seven times",
        100,
        7,
        Some("habit-hero"),
    ),
    (
        "habit-streak",
        "On a roll",
        "Complete all habits five days running",
        80,
        5,
        Some("habit-hero"),
    ),
    (
        "resource-reader",
        "Curious mind",
        "Read five wellness resources",
        60,
        5,
        Some("knowledge-seeker"),
    ),
    (
        "study-skills",
        "Study smarter",
        "Finish three study-skills articles",
        60,
        3,
        Some("knowledge-seeker"),
    ),
    (
        "wellness-survey",
        "Check your pulse",
        "Answer the wellness survey",
        30,
        1,
        None,
    ),
];

// (id, level, title, reward)
const MILESTONES: [(&str, u32, &str, &str); 5] = [
    ("calm-theme", 2, "Calm theme", "Unlocks the calm colour theme"),
    (
        "insights",
        3,
        "Mood insights",
        "Unlocks weekly mood insights",
    ),
    (
        "meditation-pack",
        5,
        "Meditation pack",
        "Unlocks the extended meditation library",
    ),
    (
        "wellness-report",
        7,
        "Wellness report",
        "Unlocks the monthly wellness report",
    ),
    (
        "luminary-frame",
        10,
        "Luminary frame",
        "Unlocks the golden profile frame",
    ),
];

/// All badges, locked and without progress.
pub fn badges() -> Vec<Badge> {
    BADGES
        .iter()
        .map(|&(id, name, description, total)| Badge {
            id: BadgeId(id.to_string()),
            name: name.to_string(),
            description: description.to_string(),
            total,
            progress: 0,
            unlocked: false,
            earned_on: None,
        })
        .collect()
}

/// All quests, not started.
pub fn quests() -> Vec<Quest> {
    QUESTS
        .iter()
        .map(
            |&(id, title, description, xp_reward, total, badge_reward)| Quest {
                id: QuestId(id.to_string()),
                title: title.to_string(),
                description: description.to_string(),
                xp_reward,
                total,
                progress: 0,
                completed: false,
                badge_reward: badge_reward.map(|b| BadgeId(b.to_string())),
            },
        )
        .collect()
}

/// All milestones, locked.
pub fn milestones() -> Vec<Milestone> {
    MILESTONES
        .iter()
        .map(|&(id, level, title, reward)| Milestone {
            id: id.to_string(),
            level,
            title: title.to_string(),
            reward: reward.to_string(),
            unlocked: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelTable;
    use std::collections::BTreeSet;

    #[test]
    fn ids_are_unique() {
        let b: BTreeSet<_> = badges().into_iter().map(|b| b.id).collect();
        assert_eq!(b.len(), BADGES.len());
        let q: BTreeSet<_> = quests().into_iter().map(|q| q.id).collect();
        assert_eq!(q.len(), QUESTS.len());
    }

    #[test]
    fn quest_rewards_reference_known_badges() {
        let known: BTreeSet<_> = badges().into_iter().map(|b| b.id).collect();
        for q in quests() {
            if let Some(b) = &q.badge_reward {
                assert!(known.contains(b), "unknown badge {b} on quest {}", q.id);
            }
            assert!(q.total > 0 && q.xp_reward > 0);
        }
        assert!(known.contains(&BadgeId(STREAK_BADGE_ID.to_string())));
    }

    #[test]
    fn milestones_fit_level_table() {
        let max = LevelTable::standard().max_level();
        for m in milestones() {
            assert!((2..=max).contains(&m.level), "milestone {} out of range", m.id);
        }
    }
}
