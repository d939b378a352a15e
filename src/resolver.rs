//! Plan calendar resolution
//!
//! Maps plan structure plus an anchor date to a bidirectional date ↔
//! (week, day) resolution. Two plan schemas coexist permanently and are
//! dispatched once per resolver: plans carrying an explicit `days` array use
//! date equality, legacy plans use Monday-normalized week offsets from the
//! anchor. Both paths derive the identical `CompletionKey` for the same
//! logical workout.
//!
//! Out-of-range or missing data is never an error here: a `None` result
//! means "no workout scheduled for this date" and renders as an empty
//! calendar cell. A date before the plan's effective start is unscheduled at
//! this level; showing it as "Rest" is a UI decision.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::ledger::CompletionLedger;
use crate::models::{CompletionKey, DayDetail, DayEntry, DayName, ResolvedWorkout, TrainingPlan};
use crate::parser;

/// Resolution strategy, selected once from plan shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSchema {
    /// Legacy weekly-offset plans anchored to a start date
    Weekly,
    /// Plans with an authoritative `days` array
    Dated,
}

/// Validated view over one plan snapshot
#[derive(Debug)]
pub struct PlanResolver<'a> {
    plan: &'a TrainingPlan,
    schema: PlanSchema,
}

impl<'a> PlanResolver<'a> {
    /// Validate the plan structurally and select the resolution schema.
    ///
    /// The only inputs rejected here are plans the engine cannot schedule at
    /// all: an empty week list, a weekly-schema week with no day slots
    /// whatsoever, or non-increasing week ordinals. Partial weeks are valid.
    pub fn new(plan: &'a TrainingPlan) -> Result<Self> {
        let schema = if plan.days.is_some() {
            PlanSchema::Dated
        } else {
            PlanSchema::Weekly
        };

        // a dated plan can resolve without a weekly array (positional
        // fallback); a weekly plan cannot
        if schema == PlanSchema::Weekly && plan.weeks.is_empty() {
            return Err(PlanError::MalformedPlan {
                reason: "plan has no weeks".to_string(),
            });
        }

        for pair in plan.weeks.windows(2) {
            if pair[1].week <= pair[0].week {
                return Err(PlanError::MalformedPlan {
                    reason: format!(
                        "week ordinals must increase: week {} follows week {}",
                        pair[1].week, pair[0].week
                    ),
                });
            }
        }

        if schema == PlanSchema::Weekly {
            for week in &plan.weeks {
                if week.days.is_empty() {
                    return Err(PlanError::MalformedPlan {
                        reason: format!("week {} has no day slots", week.week),
                    });
                }
            }
        }

        Ok(Self { plan, schema })
    }

    pub fn schema(&self) -> PlanSchema {
        self.schema
    }

    /// Resolve the workout scheduled for one concrete date, or `None` when
    /// nothing is scheduled there
    pub fn resolve_for_date(
        &self,
        anchor: NaiveDate,
        date: NaiveDate,
        ledger: &CompletionLedger,
    ) -> Option<ResolvedWorkout> {
        match self.schema {
            PlanSchema::Dated => self.resolve_dated(date, ledger),
            PlanSchema::Weekly => self.resolve_weekly(anchor, date, ledger),
        }
    }

    /// Look up the day slot for a (week, day) pair via the weekly array,
    /// canonicalized so callers never see the string-vs-object split
    pub fn resolve_for_week_day(&self, week_number: u32, day: DayName) -> Option<DayDetail> {
        self.plan
            .weeks
            .iter()
            .find(|week| week.week == week_number)
            .and_then(|week| week.days.get(&day))
            .map(DayEntry::canonicalize)
    }

    /// Resolve every scheduled slot of one week with concrete dates, for
    /// calendar-strip rendering. Absent slots are skipped.
    pub fn resolve_week(
        &self,
        anchor: NaiveDate,
        week_number: u32,
        ledger: &CompletionLedger,
    ) -> Vec<ResolvedWorkout> {
        let Some(position) = self
            .plan
            .weeks
            .iter()
            .position(|week| week.week == week_number)
        else {
            return Vec::new();
        };

        let week_monday = monday_of(anchor) + Duration::weeks(position as i64);
        DayName::ALL
            .iter()
            .filter_map(|day| {
                let entry = self.plan.weeks[position].days.get(day)?;
                let date = entry
                    .date()
                    .unwrap_or(week_monday + Duration::days(day.index() as i64));
                Some(self.materialize(week_number, *day, entry.workout(), entry.tips(), date, ledger))
            })
            .collect()
    }

    fn resolve_weekly(
        &self,
        anchor: NaiveDate,
        date: NaiveDate,
        ledger: &CompletionLedger,
    ) -> Option<ResolvedWorkout> {
        // Weeks are Monday-start regardless of locale: the offset is counted
        // between the Mondays of the two weeks, not between the raw dates.
        let offset_days = (monday_of(date) - monday_of(anchor)).num_days();
        if offset_days < 0 {
            return None;
        }
        let index = (offset_days / 7) as usize;
        let week = self.plan.weeks.get(index)?;

        let day = DayName::from_date(date);
        let entry = week.days.get(&day)?;
        Some(self.materialize(week.week, day, entry.workout(), entry.tips(), date, ledger))
    }

    fn resolve_dated(&self, date: NaiveDate, ledger: &CompletionLedger) -> Option<ResolvedWorkout> {
        let days = self.plan.days.as_ref()?;
        let (position, dated) = days
            .iter()
            .enumerate()
            .find(|(_, day)| day.date == date)?;

        let day = DayName::from_date(date);
        let week_number = self
            .week_number_for_dated(date, day)
            .unwrap_or_else(|| {
                debug!(%date, position, "no weekly slot carries this date, using positional week");
                position as u32 / 7 + 1
            });

        Some(self.materialize(week_number, day, &dated.workout, &dated.tips, date, ledger))
    }

    /// Locate the week whose slot for `day` carries this exact date
    fn week_number_for_dated(&self, date: NaiveDate, day: DayName) -> Option<u32> {
        self.plan
            .weeks
            .iter()
            .find(|week| {
                week.days
                    .get(&day)
                    .and_then(|entry| entry.date())
                    .map(|slot_date| slot_date == date)
                    .unwrap_or(false)
            })
            .map(|week| week.week)
    }

    fn materialize(
        &self,
        week_number: u32,
        day: DayName,
        workout: &str,
        tips: &[String],
        date: NaiveDate,
        ledger: &CompletionLedger,
    ) -> ResolvedWorkout {
        let key = CompletionKey::new(week_number, day);
        ResolvedWorkout {
            week_number,
            day_name: day,
            activity: workout.to_string(),
            tips: parser::coaching_tips(workout, tips),
            is_completed: ledger.is_completed(key),
            date,
        }
    }
}

/// Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
