//! User-facing notifications produced by state transitions.

use serde::{Deserialize, Serialize};
use wellness_core::{format_xp, Badge, LevelDef, Milestone};

/// What triggered a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    XpGained,
    LevelUp,
    MilestoneUnlocked,
    BadgeUnlocked,
    StreakReset,
}

/// A toast-style message: title plus description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    /// Rendered as a warning by sinks that care.
    pub destructive: bool,
}

impl Notification {
    fn new(kind: NotificationKind, title: String, description: String) -> Self {
        Self {
            kind,
            title,
            description,
            destructive: false,
        }
    }

    pub(crate) fn xp_gained(amount: u32, description: &str) -> Self {
        Self::new(
            NotificationKind::XpGained,
            format!("+{}", format_xp(u64::from(amount))),
            description.to_string(),
        )
    }

    pub(crate) fn level_up(level: u32, def: Option<&LevelDef>) -> Self {
        let description = match def {
            Some(d) => format!("You are now a {}. {}", d.title, d.benefit),
            None => format!("You reached level {level}."),
        };
        Self::new(
            NotificationKind::LevelUp,
            format!("Level Up! Level {level}"),
            description,
        )
    }

    pub(crate) fn milestone(m: &Milestone) -> Self {
        Self::new(
            NotificationKind::MilestoneUnlocked,
            format!("Milestone Unlocked: {}", m.title),
            m.reward.clone(),
        )
    }

    pub(crate) fn badge_unlocked(b: &Badge) -> Self {
        Self::new(
            NotificationKind::BadgeUnlocked,
            format!("Badge Unlocked: {}", b.name),
            b.description.clone(),
        )
    }

    pub(crate) fn streak_reset(lost: u32) -> Self {
        Self {
            destructive: true,
            ..Self::new(
                NotificationKind::StreakReset,
                "Streak Reset".to_string(),
                format!("Your {lost}-day streak ended. A new one starts today."),
            )
        }
    }
}

/// Fire-and-forget receiver of notifications.
pub trait NotificationSink {
    fn notify(&mut self, notification: &Notification);
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

/// Hand every notification to `sink`, in order.
pub fn dispatch<S: NotificationSink + ?Sized>(sink: &mut S, notifications: &[Notification]) {
    for n in notifications {
        sink.notify(n);
    }
}
