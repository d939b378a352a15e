//! Completion-derived progression state
//!
//! Streaks, badge eligibility, and progress percentages are pure derivations
//! recomputed on every read; nothing here is a source of truth. "Today" is
//! always an explicit parameter resolved in a declared IANA timezone, never
//! ambient system-local time, so results reproduce across clients.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::badges::{self, BadgeDefinition};
use crate::ledger::CompletionLedger;
use crate::models::{
    CompletionKey, CountProgress, ProgressState, StreakState, TimeProgress, TrainingPlan,
};
use crate::parser;

/// Calendar date of `now` in `tz`. The engine's documented default timezone
/// is UTC; pass the plan's declared timezone when it has one.
pub fn local_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Calendar date of `now` in the plan's declared timezone (UTC fallback)
pub fn plan_today(plan: &TrainingPlan, now: DateTime<Utc>) -> NaiveDate {
    local_today(now, plan.tz())
}

/// Time-based progress through `[start, end]`, both inclusive.
///
/// `elapsed` is clamped into the window, so `today` before the start reads
/// 0% and after the end reads 100%. A degenerate window (end before start)
/// reads as an empty plan at 0%.
pub fn time_progress(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> TimeProgress {
    let total_days = (end - start).num_days() + 1;
    if total_days <= 0 {
        return TimeProgress {
            total_days: 0,
            elapsed_days: 0,
            remaining_days: 0,
            progress_percent: 0,
        };
    }

    let elapsed_days = (today - start).num_days().clamp(0, total_days);
    TimeProgress {
        total_days,
        elapsed_days,
        remaining_days: total_days - elapsed_days,
        progress_percent: round_percent(elapsed_days, total_days),
    }
}

/// Count-based fallback: completed vs. total non-rest slots across all
/// weeks. Rest slots are excluded from both sides, and an all-rest plan
/// reads 0% rather than dividing by zero.
pub fn count_progress(plan: &TrainingPlan, ledger: &CompletionLedger) -> CountProgress {
    let mut total = 0usize;
    let mut completed = 0usize;

    for week in &plan.weeks {
        for (day, entry) in &week.days {
            if parser::is_rest_day(entry.workout()) {
                continue;
            }
            total += 1;
            if ledger.is_completed(CompletionKey::new(week.week, *day)) {
                completed += 1;
            }
        }
    }

    let percentage = if total == 0 {
        0
    } else {
        round_percent(completed as i64, total as i64)
    };
    CountProgress {
        completed,
        total,
        percentage,
    }
}

/// Progress by whichever basis is computable: time-based when both an anchor
/// and a race date are known, otherwise the count-based fallback
pub fn compute_progress(
    plan: &TrainingPlan,
    race_date: Option<NaiveDate>,
    today: NaiveDate,
    ledger: &CompletionLedger,
) -> ProgressState {
    match (plan.start_date, race_date) {
        (Some(start), Some(end)) => ProgressState::TimeBased(time_progress(start, end, today)),
        _ => ProgressState::CountBased(count_progress(plan, ledger)),
    }
}

/// Derive streak and badge-eligibility state from the ledger.
///
/// A streak is a run of consecutive calendar dates each holding at least one
/// completion. The current streak counts backward from `today`, or from
/// yesterday when today has no completion yet; the longest streak is
/// recomputed from the full history on every call rather than cached.
pub fn compute_streaks(ledger: &CompletionLedger, tz: Tz, today: NaiveDate) -> StreakState {
    let dates = ledger.completion_dates(tz);

    let mut current_streak = 0u32;
    let start = if dates.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };
    if let Some(mut cursor) = start {
        while dates.contains(&cursor) {
            current_streak += 1;
            match cursor.pred_opt() {
                Some(previous) => cursor = previous,
                None => break,
            }
        }
    }

    let mut longest_streak = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for date in &dates {
        run = match previous {
            Some(p) if *date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        previous = Some(*date);
    }

    let total_workouts = ledger.total() as u32;
    StreakState {
        current_streak,
        longest_streak,
        total_workouts,
        badges: badges::eligible_ids(longest_streak, total_workouts),
    }
}

/// Result of one optimistic completion toggle
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    /// Whether the key is completed after the toggle
    pub is_completed: bool,
    /// Derived state after the toggle
    pub streaks: StreakState,
    /// Badges crossing their threshold on this toggle, for the celebration
    /// collaborator. Fires once per crossing; the one-way earn transition is
    /// persisted externally.
    pub newly_eligible: Vec<&'static BadgeDefinition>,
}

/// Toggle a completion and report the eligibility diff the toggle caused
pub fn toggle_completion(
    ledger: &mut CompletionLedger,
    key: CompletionKey,
    tz: Tz,
    today: NaiveDate,
) -> ToggleOutcome {
    let before = compute_streaks(ledger, tz, today);
    let is_completed = ledger.toggle(key);
    let after = compute_streaks(ledger, tz, today);
    let newly_eligible = badges::newly_eligible(&before, &after);

    if !newly_eligible.is_empty() {
        debug!(
            %key,
            count = newly_eligible.len(),
            "toggle crossed badge thresholds"
        );
    }

    ToggleOutcome {
        is_completed,
        streaks: after,
        newly_eligible,
    }
}

fn round_percent(part: i64, whole: i64) -> u8 {
    let percent = ((part as f64 / whole as f64) * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
