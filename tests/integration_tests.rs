use chrono::NaiveDate;
use chrono_tz::Tz;

use planrs::ledger::CompletionLedger;
use planrs::models::{CompletionKey, CompletionRecord, DayName, ProgressState, TrainingPlan};
use planrs::progression;
use planrs::resolver::{PlanResolver, PlanSchema};

/// Integration tests that exercise the complete plan → calendar →
/// completion → progression flow over plan JSON as the backend produces it

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_plan_json() -> TrainingPlan {
    serde_json::from_str(
        r#"{
            "plan": [
                {
                    "week": 1,
                    "days": {
                        "Mon": "Rest",
                        "Tue": "Easy 5km run",
                        "Wed": {
                            "workout": "**Warm up:** 10 min jog **Work:** 5x(800m @ 3:50/km) **Cool down:** 10 min jog",
                            "tips": ["Hold form on the last repeat"],
                            "workoutType": "interval"
                        },
                        "Thu": "Rest",
                        "Fri": "Easy 6km run",
                        "Sat": "Long run 14km",
                        "Sun": "Rest"
                    }
                },
                {
                    "week": 2,
                    "days": {
                        "Mon": "Rest",
                        "Tue": "Tempo 6km",
                        "Wed": "Easy 5km run",
                        "Thu": "Rest",
                        "Fri": "40 min easy",
                        "Sat": "Long run 16km",
                        "Sun": "Rest"
                    }
                }
            ],
            "start_date": "2024-01-01",
            "timezone": "Europe/Berlin"
        }"#,
    )
    .unwrap()
}

#[test]
fn test_full_weekly_flow() {
    let plan = weekly_plan_json();
    let resolver = PlanResolver::new(&plan).unwrap();
    assert_eq!(resolver.schema(), PlanSchema::Weekly);

    let anchor = plan.start_date.unwrap();
    let mut ledger = CompletionLedger::new();

    // Wednesday of week 1 is the interval session
    let workout = resolver
        .resolve_for_date(anchor, date(2024, 1, 3), &ledger)
        .unwrap();
    assert_eq!(workout.week_number, 1);
    assert_eq!(workout.day_name, DayName::Wed);
    assert!(workout.activity.contains("800m"));
    assert_eq!(workout.tips, vec!["Hold form on the last repeat".to_string()]);
    assert!(!workout.is_completed);

    // the parsed descriptor exposes the structured fields
    let descriptor = planrs::parse(&workout.activity);
    assert_eq!(descriptor.pace.as_deref(), Some("3:50/km"));
    assert_eq!(descriptor.sections.warm_up.as_deref(), Some("10 min jog"));

    // toggling flips the resolved view
    let today = date(2024, 1, 3);
    progression::toggle_completion(&mut ledger, workout.key(), Tz::UTC, today);
    let workout = resolver
        .resolve_for_date(anchor, date(2024, 1, 3), &ledger)
        .unwrap();
    assert!(workout.is_completed);
}

#[test]
fn test_dates_outside_plan_resolve_to_nothing() {
    let plan = weekly_plan_json();
    let resolver = PlanResolver::new(&plan).unwrap();
    let anchor = plan.start_date.unwrap();
    let ledger = CompletionLedger::new();

    assert!(resolver
        .resolve_for_date(anchor, date(2023, 12, 25), &ledger)
        .is_none());
    // the plan covers [2024-01-01, 2024-01-15)
    assert!(resolver
        .resolve_for_date(anchor, date(2024, 1, 14), &ledger)
        .is_some());
    assert!(resolver
        .resolve_for_date(anchor, date(2024, 1, 15), &ledger)
        .is_none());
}

#[test]
fn test_both_schemas_derive_the_same_completion_key() {
    let weekly = weekly_plan_json();
    let weekly_resolver = PlanResolver::new(&weekly).unwrap();
    let ledger = CompletionLedger::new();
    let anchor = weekly.start_date.unwrap();

    let dated: TrainingPlan = serde_json::from_str(
        r#"{
            "plan": [
                {
                    "week": 1,
                    "days": {
                        "Tue": {"workout": "Easy 5km run", "date": "2024-01-02"}
                    }
                }
            ],
            "days": [
                {"date": "2024-01-02", "workout": "Easy 5km run"}
            ]
        }"#,
    )
    .unwrap();
    let dated_resolver = PlanResolver::new(&dated).unwrap();
    assert_eq!(dated_resolver.schema(), PlanSchema::Dated);

    let via_weekly = weekly_resolver
        .resolve_for_date(anchor, date(2024, 1, 2), &ledger)
        .unwrap();
    let via_dated = dated_resolver
        .resolve_for_date(anchor, date(2024, 1, 2), &ledger)
        .unwrap();
    assert_eq!(via_weekly.key(), via_dated.key());
    assert_eq!(via_dated.key(), CompletionKey::new(1, DayName::Tue));
}

#[test]
fn test_progress_over_external_completion_rows() {
    let plan = weekly_plan_json();

    let rows: Vec<CompletionRecord> = serde_json::from_str(
        r#"[
            {"week_number": 1, "day_name": "Tue", "scheduled_date": "2024-01-02",
             "distance_km": "5.1", "duration_minutes": 31, "rating": 7},
            {"week_number": 1, "day_name": "Wed", "scheduled_date": "2024-01-03"},
            {"week_number": 1, "day_name": "Sat", "completed_at": "2024-01-06T18:00:00Z"}
        ]"#,
    )
    .unwrap();
    let ledger = CompletionLedger::from_records(rows);

    // no race date: count-based fallback over the 8 non-rest slots
    let state = progression::compute_progress(&plan, None, date(2024, 1, 7), &ledger);
    match state {
        ProgressState::CountBased(p) => {
            assert_eq!(p.total, 8);
            assert_eq!(p.completed, 3);
            assert_eq!(p.percentage, 38);
        }
        ProgressState::TimeBased(_) => panic!("expected count-based fallback"),
    }

    // race date present: time-based, clamped within [0, 100]
    let state = progression::compute_progress(
        &plan,
        Some(date(2024, 1, 14)),
        date(2024, 1, 7),
        &ledger,
    );
    match state {
        ProgressState::TimeBased(p) => {
            assert_eq!(p.total_days, 14);
            assert_eq!(p.elapsed_days, 6);
            assert_eq!(p.progress_percent, 43);
        }
        ProgressState::CountBased(_) => panic!("expected time-based progress"),
    }
}

#[test]
fn test_streaks_and_badges_from_rows() {
    let today = date(2024, 1, 7);
    let rows: Vec<CompletionRecord> = (0..3usize)
        .map(|i| CompletionRecord {
            plan_id: None,
            week_number: 1,
            day_name: DayName::from_index(4 + i).unwrap(),
            distance_km: None,
            duration_minutes: None,
            rating: None,
            completed_at: None,
            scheduled_date: Some(date(2024, 1, 5 + i as u32)),
        })
        .collect();
    let ledger = CompletionLedger::from_records(rows);

    let state = progression::compute_streaks(&ledger, Tz::Europe__Berlin, today);
    assert_eq!(state.current_streak, 3);
    assert_eq!(state.longest_streak, 3);
    assert_eq!(state.total_workouts, 3);
    assert!(state.badges.contains("first-workout"));
    assert!(state.badges.contains("streak-3"));
    assert!(!state.badges.contains("streak-7"));
}

#[test]
fn test_malformed_plan_surfaces_distinct_error() {
    let plan: TrainingPlan =
        serde_json::from_str(r#"{"plan": [{"week": 1, "days": {}}]}"#).unwrap();
    let err = PlanResolver::new(&plan).unwrap_err();
    assert!(err.is_malformed_plan());
    assert!(err.user_message().contains("could not be read"));
}
