//! The pure state-transition function `GameState x Command -> GameState x [Notification]`.

use crate::clock::DayBoundary;
use crate::notification::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use wellness_core::catalog::STREAK_BADGE_ID;
use wellness_core::{
    GameState, LevelTable, WellnessPoints, XpEvent, XpKind, RECENT_EVENTS_LIMIT,
};

/// One of the three engine operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Award `amount` XP (> 0) for `kind`.
    AddXp {
        amount: u32,
        kind: XpKind,
        description: String,
    },
    /// Complete a quest; unknown or finished quests are ignored.
    CompleteQuest { quest_id: String },
    /// Record today's check-in.
    CheckStreak,
}

/// Everything a transition needs besides the state itself.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    pub now: DateTime<Utc>,
    pub boundary: DayBoundary,
    pub levels: &'a LevelTable,
}

/// Result of applying a command: the next state and what to tell the user.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub notifications: Vec<Notification>,
}

/// Apply `command` to `state`.
///
/// Never fails: no-op branches return the state unchanged and no
/// notifications.
pub fn apply(state: GameState, command: &Command, ctx: &Context<'_>) -> Transition {
    let mut step = Step {
        state,
        ctx,
        notifications: Vec::new(),
    };
    match command {
        Command::AddXp {
            amount,
            kind,
            description,
        } => step.add_xp(*amount, *kind, description),
        Command::CompleteQuest { quest_id } => step.complete_quest(quest_id),
        Command::CheckStreak => step.check_streak(),
    }
    Transition {
        state: step.state,
        notifications: step.notifications,
    }
}

/// XP and label for the streak bonus at `streak` days.
///
/// Multiples of 5 take precedence over multiples of 3.
pub fn streak_bonus(streak: u32) -> (u32, String) {
    if streak % 5 == 0 {
        (
            25u32.saturating_mul(streak / 5),
            format!("{streak}-day streak milestone"),
        )
    } else if streak % 3 == 0 {
        (15, format!("{streak}-day streak bonus"))
    } else {
        (5, "Daily check-in streak".to_string())
    }
}

struct Step<'c, 'l> {
    state: GameState,
    ctx: &'c Context<'l>,
    notifications: Vec<Notification>,
}

impl Step<'_, '_> {
    fn add_xp(&mut self, amount: u32, kind: XpKind, description: &str) {
        let levels = self.ctx.levels;
        let s = &mut self.state;

        s.recent_events.insert(
            0,
            XpEvent {
                id: Uuid::new_v4(),
                kind,
                amount,
                description: description.to_string(),
                timestamp: self.ctx.now,
            },
        );
        s.recent_events.truncate(RECENT_EVENTS_LIMIT);
        s.wellness_points
            .absorb(WellnessPoints::for_award(kind, amount));
        s.total_xp = s.total_xp.saturating_add(u64::from(amount));

        let previous = s.level;
        let level = levels.level_for_xp(s.total_xp).max(previous);
        let mut milestones = Vec::new();
        if level > previous {
            s.level = level;
            s.next_level_xp = levels.next_level_xp(level);
            for m in s
                .milestones
                .iter_mut()
                .filter(|m| !m.unlocked && m.level <= level)
            {
                m.unlocked = true;
                milestones.push(Notification::milestone(m));
            }
        }
        s.current_xp = s.total_xp.saturating_sub(levels.required_xp(s.level));

        // One XP notification per call: a level-up replaces the "+XP" toast.
        if level > previous {
            self.notifications
                .push(Notification::level_up(level, levels.get(level)));
        } else {
            self.notifications
                .push(Notification::xp_gained(amount, description));
        }
        self.notifications.extend(milestones);
        debug!(amount, %kind, total_xp = s.total_xp, level, "xp awarded");
    }

    fn complete_quest(&mut self, quest_id: &str) {
        let Some(quest) = self
            .state
            .quest(quest_id)
            .filter(|q| !q.completed)
            .cloned()
        else {
            debug!(quest_id, "quest unknown or already completed");
            return;
        };

        self.add_xp(
            quest.xp_reward,
            XpKind::QuestComplete,
            &format!("Quest completed: {}", quest.title),
        );
        if let Some(badge_id) = &quest.badge_reward {
            if let Some(badge) = self.state.badge_mut(&badge_id.0) {
                if badge.advance(1, self.ctx.now) {
                    self.notifications.push(Notification::badge_unlocked(badge));
                }
            }
        }
        if let Some(q) = self.state.quest_mut(quest_id) {
            q.completed = true;
            q.progress = q.total;
        }
        debug!(quest_id, "quest completed");
    }

    fn check_streak(&mut self) {
        let now = self.ctx.now;
        let boundary = self.ctx.boundary;
        let today = boundary.calendar_day(now);
        let streak = &mut self.state.streak;
        let mut bonus = None;

        match streak.last_check_in {
            None => streak.current_streak = 1,
            Some(last) => {
                let gap = (today - boundary.calendar_day(last)).num_days();
                if gap == 1 {
                    streak.current_streak = streak.current_streak.saturating_add(1);
                    bonus = Some(streak_bonus(streak.current_streak));
                } else if gap > 1 {
                    let lost = streak.current_streak;
                    streak.current_streak = 1;
                    self.notifications.push(Notification::streak_reset(lost));
                }
                // gap <= 0: already checked in today, or the clock moved back.
            }
        }
        streak.longest_streak = streak.longest_streak.max(streak.current_streak);
        streak.last_check_in = Some(streak.last_check_in.map_or(now, |last| last.max(now)));
        let current = streak.current_streak;

        if let Some((amount, description)) = bonus {
            self.add_xp(amount, XpKind::StreakMilestone, &description);
        }
        if let Some(badge) = self.state.badge_mut(STREAK_BADGE_ID) {
            if badge.track(current, now) {
                self.notifications.push(Notification::badge_unlocked(badge));
            }
        }
        debug!(current, longest = self.state.streak.longest_streak, "streak checked");
    }
}
