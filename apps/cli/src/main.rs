#![deny(warnings)]

//! Headless CLI for the wellness game: check in, log activities and inspect progress.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wellness_core::{format_xp, Activity, GameState, XpKind};
use wellness_engine::{Notification, NotificationSink, SystemClock};
use wellness_runtime::{AppConfig, WellnessService};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", built ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "wellquest", version, long_version = LONG_VERSION, about = "Student wellness quests, streaks and levels")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print machine-readable JSON where supported.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Level, XP, streak and recent activity.
    Status,
    /// Log an activity (mood, habit, resource, meditation, journal, survey).
    Log { activity: Activity },
    /// Award XP directly.
    Xp {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        amount: u32,
        #[arg(long, default_value = "survey")]
        kind: XpKind,
        #[arg(long, default_value = "Manual award")]
        description: String,
    },
    /// Complete a quest by id.
    Quest { id: String },
    /// List quests.
    Quests,
    /// List badges.
    Badges,
    /// Record today's check-in.
    Checkin,
    /// Show the level table.
    Levels,
    /// Wipe all progress.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
}

/// Prints notifications as toast lines.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, n: &Notification) {
        let marker = if n.destructive { "!" } else { "*" };
        println!("{marker} {}: {}", n.title, n.description);
    }
}

type Service = WellnessService<SystemClock, ConsoleSink>;

#[derive(Serialize)]
struct StatusView<'a> {
    title: &'a str,
    progress_to_next_level: f64,
    state: &'a GameState,
}

fn print_status(svc: &Service, json: bool) -> Result<()> {
    let engine = svc.engine();
    let s = svc.state();
    let title = engine.current_level().map_or("", |l| l.title.as_str());
    if json {
        let view = StatusView {
            title,
            progress_to_next_level: engine.progress_to_next_level(),
            state: s,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    println!(
        "Level {} {} | {} total | {} / {} to next ({:.0}%)",
        s.level,
        title,
        format_xp(s.total_xp),
        s.current_xp,
        s.next_level_xp.saturating_sub(s.total_xp - s.current_xp),
        engine.progress_to_next_level()
    );
    println!(
        "Streak: {} day(s), best {}",
        s.streak.current_streak, s.streak.longest_streak
    );
    let p = &s.wellness_points;
    println!(
        "Wellness | mindfulness {} | physical {} | social {} | academic {} | sleep {}",
        p.mindfulness, p.physical, p.social, p.academic, p.sleep
    );
    for ev in &s.recent_events {
        println!(
            "  {} +{} {} ({})",
            ev.timestamp.format("%Y-%m-%d %H:%M"),
            ev.amount,
            ev.description,
            ev.kind
        );
    }
    Ok(())
}

fn print_quests(s: &GameState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&s.quests)?);
        return Ok(());
    }
    for q in &s.quests {
        let mark = if q.completed { "x" } else { " " };
        let badge = q
            .badge_reward
            .as_ref()
            .map(|b| format!(" -> {b}"))
            .unwrap_or_default();
        println!(
            "[{mark}] {:<16} {:<22} {:>4} XP  {}/{}{badge}",
            q.id, q.title, q.xp_reward, q.progress, q.total
        );
    }
    Ok(())
}

fn print_badges(s: &GameState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&s.badges)?);
        return Ok(());
    }
    for b in &s.badges {
        let earned = b
            .earned_on
            .map(|t| format!(" earned {}", t.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "{:<18} {:>3.0}% ({}/{}){earned}",
            b.name,
            b.progress_percent(),
            b.progress,
            b.total
        );
    }
    Ok(())
}

fn print_levels(svc: &Service, json: bool) -> Result<()> {
    let levels = svc.engine().levels();
    if json {
        println!("{}", serde_json::to_string_pretty(levels.entries())?);
        return Ok(());
    }
    for l in levels.entries() {
        let here = if l.level == svc.state().level { ">" } else { " " };
        println!(
            "{here} {:>2} {:<12} {:>6}  {}",
            l.level, l.title, l.required_xp, l.benefit
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Logging setup
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(config = ?cli.config, store = %config.store().path().display(), "starting CLI");

    let mut svc: Service = WellnessService::open(&config, SystemClock, ConsoleSink);

    match cli.command.unwrap_or(Cmd::Status) {
        Cmd::Status => print_status(&svc, cli.json)?,
        Cmd::Log { activity } => {
            svc.record_activity(activity)
                .with_context(|| format!("logging {}", activity.as_str()))?;
        }
        Cmd::Xp {
            amount,
            kind,
            description,
        } => {
            svc.add_xp(amount, kind, &description)
                .context("awarding XP")?;
        }
        Cmd::Quest { id } => {
            match svc.state().quest(&id) {
                None => bail!("unknown quest: {id}"),
                Some(q) if q.completed => {
                    println!("Quest {id} is already completed.");
                    return Ok(());
                }
                Some(_) => {}
            }
            svc.complete_quest(&id)
                .with_context(|| format!("completing quest {id}"))?;
        }
        Cmd::Quests => print_quests(svc.state(), cli.json)?,
        Cmd::Badges => print_badges(svc.state(), cli.json)?,
        Cmd::Checkin => {
            let before = svc.state().streak.current_streak;
            let shown = svc.check_streak().context("checking in")?;
            if shown.is_empty() && before == svc.state().streak.current_streak {
                println!(
                    "Checked in. Streak: {} day(s).",
                    svc.state().streak.current_streak
                );
            }
        }
        Cmd::Levels => print_levels(&svc, cli.json)?,
        Cmd::Reset { yes } => {
            if !yes {
                bail!("refusing to reset without --yes");
            }
            svc.reset().context("resetting progress")?;
            println!("Progress reset.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_activity_and_xp_kind() {
        let cli = Cli::try_parse_from(["wellquest", "log", "meditation"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Cmd::Log {
                activity: Activity::Meditation
            })
        ));
        let cli =
            Cli::try_parse_from(["wellquest", "xp", "40", "--kind", "journal_entry"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Cmd::Xp {
                amount: 40,
                kind: XpKind::JournalEntry,
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_xp_and_unknown_activity() {
        assert!(Cli::try_parse_from(["wellquest", "xp", "0"]).is_err());
        assert!(Cli::try_parse_from(["wellquest", "log", "nap"]).is_err());
    }
}
