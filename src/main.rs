use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

use planrs::config::AppConfig;
use planrs::ledger::CompletionLedger;
use planrs::logging::{init_logging, LogLevel};
use planrs::models::{CompletionKey, CompletionRecord, ProgressState, TrainingPlan};
use planrs::parser::strip_formatting;
use planrs::progression;
use planrs::resolver::PlanResolver;
use planrs::badges;

/// planrs - Training Plan Scheduling CLI
///
/// Resolves generated training plans to calendar dates and derives
/// completion-based progress, streaks, and badge eligibility.
#[derive(Parser)]
#[command(name = "planrs")]
#[command(version = "0.1.0")]
#[command(about = "Training plan scheduling and progression", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the workout scheduled for one date
    Resolve {
        /// Plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        /// Date to resolve (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Completion rows JSON file
        #[arg(long)]
        completions: Option<PathBuf>,

        /// Anchor date override (defaults to the plan's start_date)
        #[arg(long)]
        anchor: Option<NaiveDate>,
    },

    /// Show a calendar strip for a date range
    Calendar {
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(long)]
        completions: Option<PathBuf>,

        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Range end, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,

        #[arg(long)]
        anchor: Option<NaiveDate>,
    },

    /// Show progress through the plan
    Progress {
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(long)]
        completions: Option<PathBuf>,

        /// Race or end date enabling time-based progress
        #[arg(long)]
        race_date: Option<NaiveDate>,

        /// Override "today" (defaults to now in the plan's timezone)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show streaks and badge eligibility
    Streaks {
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(long)]
        completions: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Toggle a workout completion and report newly eligible badges
    Toggle {
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(long)]
        completions: Option<PathBuf>,

        /// Completion key, e.g. 3-Wed
        #[arg(short, long)]
        key: CompletionKey,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// List the badge catalog
    Badges,
}

#[derive(Tabled)]
struct CalendarRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Week")]
    week: u32,
    #[tabled(rename = "Workout")]
    workout: String,
    #[tabled(rename = "Done")]
    done: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    match cli.verbose {
        0 => {}
        1 => config.logging.level = LogLevel::Debug,
        _ => config.logging.level = LogLevel::Trace,
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Resolve {
            plan,
            date,
            completions,
            anchor,
        } => {
            let plan = load_plan(&plan)?;
            let ledger = load_ledger(completions.as_deref())?;
            let resolver = PlanResolver::new(&plan)?;
            let anchor = resolve_anchor(&plan, anchor)?;

            match resolver.resolve_for_date(anchor, date, &ledger) {
                Some(workout) => {
                    let marker = if workout.is_completed {
                        "✓".green()
                    } else {
                        "○".normal()
                    };
                    println!(
                        "{} {} [week {}, {}] {}",
                        marker,
                        workout.date,
                        workout.week_number,
                        workout.day_name,
                        strip_formatting(&workout.activity)
                    );
                    for tip in &workout.tips {
                        println!("  - {}", tip.dimmed());
                    }
                }
                None => println!("No workout scheduled for {}", date),
            }
        }

        Commands::Calendar {
            plan,
            completions,
            from,
            to,
            anchor,
        } => {
            if to < from {
                bail!("Range end {} is before range start {}", to, from);
            }
            let plan = load_plan(&plan)?;
            let ledger = load_ledger(completions.as_deref())?;
            let resolver = PlanResolver::new(&plan)?;
            let anchor = resolve_anchor(&plan, anchor)?;

            let mut rows = Vec::new();
            let mut date = from;
            while date <= to {
                if let Some(workout) = resolver.resolve_for_date(anchor, date, &ledger) {
                    rows.push(CalendarRow {
                        date: workout.date.to_string(),
                        day: workout.day_name.to_string(),
                        week: workout.week_number,
                        workout: truncate(&strip_formatting(&workout.activity), 48),
                        done: if workout.is_completed { "✓" } else { "" }.to_string(),
                    });
                }
                date = date + Duration::days(1);
            }

            if rows.is_empty() {
                println!("Nothing scheduled between {} and {}", from, to);
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::Progress {
            plan,
            completions,
            race_date,
            today,
        } => {
            let plan = load_plan(&plan)?;
            let ledger = load_ledger(completions.as_deref())?;
            let today = today.unwrap_or_else(|| default_today(&plan, &config));

            match progression::compute_progress(&plan, race_date, today, &ledger) {
                ProgressState::TimeBased(p) => {
                    println!(
                        "{} day {} of {} ({} remaining)",
                        format!("{}%", p.progress_percent).bold(),
                        p.elapsed_days,
                        p.total_days,
                        p.remaining_days
                    );
                }
                ProgressState::CountBased(p) => {
                    println!(
                        "{} {} of {} workouts completed",
                        format!("{}%", p.percentage).bold(),
                        p.completed,
                        p.total
                    );
                }
            }
        }

        Commands::Streaks {
            plan,
            completions,
            today,
        } => {
            let plan = load_plan(&plan)?;
            let ledger = load_ledger(completions.as_deref())?;
            let today = today.unwrap_or_else(|| default_today(&plan, &config));

            let state = progression::compute_streaks(&ledger, effective_tz(&plan, &config), today);
            println!("Current streak:  {} days", state.current_streak.to_string().bold());
            println!("Longest streak:  {} days", state.longest_streak);
            println!("Total workouts:  {}", state.total_workouts);
            if !state.badges.is_empty() {
                println!("Eligible badges:");
                for id in &state.badges {
                    if let Some(badge) = badges::badge_by_id(id) {
                        println!("  {} {} - {}", "★".yellow(), badge.name, badge.description);
                    }
                }
            }
        }

        Commands::Toggle {
            plan,
            completions,
            key,
            today,
        } => {
            let plan = load_plan(&plan)?;
            let mut ledger = load_ledger(completions.as_deref())?;
            let today = today.unwrap_or_else(|| default_today(&plan, &config));

            let outcome = progression::toggle_completion(
                &mut ledger,
                key,
                effective_tz(&plan, &config),
                today,
            );
            if outcome.is_completed {
                println!("{} {} marked complete", "✓".green(), key);
            } else {
                println!("{} {} marked incomplete", "○".normal(), key);
            }
            for badge in outcome.newly_eligible {
                println!("{} Newly eligible: {} - {}", "★".yellow(), badge.name, badge.description);
            }
        }

        Commands::Badges => {
            for badge in badges::BADGES {
                println!(
                    "{:<14} {:<16} needs {:>3} ({:?})",
                    badge.id, badge.name, badge.requirement, badge.metric
                );
            }
        }
    }

    Ok(())
}

fn load_plan(path: &Path) -> Result<TrainingPlan> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;
    let plan: TrainingPlan = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan file: {}", path.display()))?;
    Ok(plan)
}

fn load_ledger(path: Option<&Path>) -> Result<CompletionLedger> {
    let Some(path) = path else {
        return Ok(CompletionLedger::new());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read completions file: {}", path.display()))?;
    let records: Vec<CompletionRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse completions file: {}", path.display()))?;
    Ok(CompletionLedger::from_records(records))
}

fn resolve_anchor(plan: &TrainingPlan, anchor: Option<NaiveDate>) -> Result<NaiveDate> {
    anchor
        .or(plan.start_date)
        .context("Plan has no start_date; pass --anchor")
}

fn effective_tz(plan: &TrainingPlan, config: &AppConfig) -> Tz {
    if plan.timezone.is_some() {
        plan.tz()
    } else {
        config
            .default_timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC)
    }
}

fn default_today(plan: &TrainingPlan, config: &AppConfig) -> NaiveDate {
    progression::local_today(Utc::now(), effective_tz(plan, config))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
