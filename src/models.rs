//! Core data model for training plans, completions, and derived state
//!
//! A `TrainingPlan` is an immutable input snapshot per computation: the
//! engine never mutates it. Two schema variants coexist permanently (weekly
//! offset vs. explicit `days` array) and both day-entry shapes (plain string
//! vs. rich object) must keep deserializing for backward compatibility with
//! previously generated plans.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Weekday abbreviation used as the day key in weekly plans.
///
/// Weeks start on Monday regardless of locale; the derived `Ord` follows
/// declaration order, so iterating a `BTreeMap<DayName, _>` yields Mon..Sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayName {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayName {
    /// All seven days in plan order (Monday-start)
    pub const ALL: [DayName; 7] = [
        DayName::Mon,
        DayName::Tue,
        DayName::Wed,
        DayName::Thu,
        DayName::Fri,
        DayName::Sat,
        DayName::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayName::Mon => "Mon",
            DayName::Tue => "Tue",
            DayName::Wed => "Wed",
            DayName::Thu => "Thu",
            DayName::Fri => "Fri",
            DayName::Sat => "Sat",
            DayName::Sun => "Sun",
        }
    }

    /// Offset from Monday (Mon=0 .. Sun=6)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<DayName> {
        DayName::ALL.get(index).copied()
    }

    pub fn from_weekday(weekday: Weekday) -> DayName {
        // num_days_from_monday is 0..=6, always within ALL
        DayName::ALL[weekday.num_days_from_monday() as usize]
    }

    pub fn from_date(date: NaiveDate) -> DayName {
        Self::from_weekday(date.weekday())
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mon" => Ok(DayName::Mon),
            "Tue" => Ok(DayName::Tue),
            "Wed" => Ok(DayName::Wed),
            "Thu" => Ok(DayName::Thu),
            "Fri" => Ok(DayName::Fri),
            "Sat" => Ok(DayName::Sat),
            "Sun" => Ok(DayName::Sun),
            _ => Err(format!("Invalid day name: {}", s)),
        }
    }
}

/// Canonical `"{week}-{day}"` identity for one scheduled workout instance.
///
/// Both resolution paths (date-based and weekly-offset) must derive the same
/// key for the same logical workout; this is the sole identity used to test
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionKey {
    pub week: u32,
    pub day: DayName,
}

impl CompletionKey {
    pub fn new(week: u32, day: DayName) -> Self {
        Self { week, day }
    }
}

impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.week, self.day)
    }
}

impl FromStr for CompletionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (week, day) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid completion key: {}", s))?;
        let week = week
            .parse::<u32>()
            .map_err(|_| format!("Invalid week number in completion key: {}", s))?;
        let day = day.parse::<DayName>()?;
        Ok(CompletionKey { week, day })
    }
}

impl Serialize for CompletionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompletionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One day slot in a weekly plan
///
/// Older plans carry a bare workout string; newer ones a rich object.
/// A plain string canonicalizes to `{ workout: string, tips: [] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayEntry {
    Text(String),
    Detailed(DayDetail),
}

/// Rich day-slot shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetail {
    /// Free-text workout description
    pub workout: String,

    /// Coaching tips attached by the plan generator
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,

    /// Generator-assigned workout type label
    #[serde(default, rename = "workoutType", skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<String>,

    /// Calibration marker used by the plan-adjustment flow
    #[serde(default, rename = "calibrationTag", skip_serializing_if = "Option::is_none")]
    pub calibration_tag: Option<String>,

    /// Explicit calendar date (date-based plans cross-reference this)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl DayEntry {
    pub fn workout(&self) -> &str {
        match self {
            DayEntry::Text(text) => text,
            DayEntry::Detailed(detail) => &detail.workout,
        }
    }

    pub fn tips(&self) -> &[String] {
        match self {
            DayEntry::Text(_) => &[],
            DayEntry::Detailed(detail) => &detail.tips,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DayEntry::Text(_) => None,
            DayEntry::Detailed(detail) => detail.date,
        }
    }

    /// Canonical rich form; plain text becomes `{ workout, tips: [] }`
    pub fn canonicalize(&self) -> DayDetail {
        match self {
            DayEntry::Text(text) => DayDetail {
                workout: text.clone(),
                tips: Vec::new(),
                workout_type: None,
                calibration_tag: None,
                date: None,
            },
            DayEntry::Detailed(detail) => detail.clone(),
        }
    }
}

/// One week of a weekly plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWeek {
    /// 1-based week ordinal, unique and increasing across the plan
    pub week: u32,

    /// Day slots keyed by weekday abbreviation; partial weeks are allowed
    #[serde(default)]
    pub days: BTreeMap<DayName, DayEntry>,
}

/// One entry of a date-based plan's `days` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedDay {
    pub date: NaiveDate,
    pub workout: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,

    #[serde(default, rename = "workoutType", skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<String>,
}

/// A generated multi-week training plan
///
/// When `days` is present it is authoritative for date mapping; the weekly
/// `plan` array is still consulted for week-number continuity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Weekly structure, insertion order = week order
    #[serde(default, rename = "plan")]
    pub weeks: Vec<PlanWeek>,

    /// Explicit date-based variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<DatedDay>>,

    /// Anchor date week 1 is pegged to (weekly-offset plans)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// IANA timezone the plan's "today" is resolved in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl TrainingPlan {
    /// Plan timezone, falling back to UTC when absent or unparseable
    pub fn tz(&self) -> Tz {
        self.timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC)
    }
}

/// One concrete calendar cell: the unit the calendar view consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWorkout {
    pub week_number: u32,
    pub day_name: DayName,
    pub activity: String,
    pub tips: Vec<String>,
    pub is_completed: bool,
    pub date: NaiveDate,
}

impl ResolvedWorkout {
    pub fn key(&self) -> CompletionKey {
        CompletionKey::new(self.week_number, self.day_name)
    }
}

/// Externally sourced completion row
///
/// The engine consumes the key plus whichever date field is available,
/// preferring `scheduled_date` over `completed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,

    pub week_number: u32,
    pub day_name: DayName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    /// Perceived-effort rating, 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
}

impl CompletionRecord {
    pub fn bare(key: CompletionKey) -> Self {
        Self {
            plan_id: None,
            week_number: key.week,
            day_name: key.day,
            distance_km: None,
            duration_minutes: None,
            rating: None,
            completed_at: None,
            scheduled_date: None,
        }
    }

    pub fn key(&self) -> CompletionKey {
        CompletionKey::new(self.week_number, self.day_name)
    }

    /// Calendar date this completion counts toward, in `tz`
    pub fn effective_date(&self, tz: Tz) -> Option<NaiveDate> {
        self.scheduled_date
            .or_else(|| self.completed_at.map(|ts| ts.with_timezone(&tz).date_naive()))
    }
}

/// Derived streak and badge-eligibility state, recomputed on every read
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_workouts: u32,

    /// Ids of badges whose threshold the current metrics meet
    pub badges: BTreeSet<String>,
}

/// Time-based progress through a plan window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeProgress {
    pub total_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    pub progress_percent: u8,
}

/// Count-based fallback progress over non-rest slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// Progress toward plan completion, by whichever basis was computable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressState {
    TimeBased(TimeProgress),
    CountBased(CountProgress),
}

impl ProgressState {
    /// Percent complete regardless of basis, always within 0..=100
    pub fn percent(&self) -> u8 {
        match self {
            ProgressState::TimeBased(p) => p.progress_percent,
            ProgressState::CountBased(p) => p.percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_name_ordering() {
        assert_eq!(DayName::Mon.index(), 0);
        assert_eq!(DayName::Sun.index(), 6);
        assert_eq!(DayName::from_index(2), Some(DayName::Wed));
        assert_eq!(DayName::from_index(7), None);
    }

    #[test]
    fn test_day_name_from_date() {
        // 2024-01-01 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(DayName::from_date(monday), DayName::Mon);
        assert_eq!(
            DayName::from_date(monday + chrono::Duration::days(6)),
            DayName::Sun
        );
    }

    #[test]
    fn test_completion_key_round_trip() {
        let key = CompletionKey::new(3, DayName::Wed);
        assert_eq!(key.to_string(), "3-Wed");
        assert_eq!("3-Wed".parse::<CompletionKey>().unwrap(), key);

        assert!("Wed".parse::<CompletionKey>().is_err());
        assert!("x-Wed".parse::<CompletionKey>().is_err());
        assert!("3-Wednesday".parse::<CompletionKey>().is_err());
    }

    #[test]
    fn test_day_entry_both_shapes_deserialize() {
        let plain: DayEntry = serde_json::from_str("\"Easy 5km run\"").unwrap();
        assert_eq!(plain.workout(), "Easy 5km run");
        assert!(plain.tips().is_empty());

        let rich: DayEntry = serde_json::from_str(
            r#"{"workout": "Tempo 8km", "tips": ["Stay relaxed"], "workoutType": "tempo"}"#,
        )
        .unwrap();
        assert_eq!(rich.workout(), "Tempo 8km");
        assert_eq!(rich.tips(), ["Stay relaxed".to_string()]);

        let canonical = plain.canonicalize();
        assert_eq!(canonical.workout, "Easy 5km run");
        assert!(canonical.tips.is_empty());
    }

    #[test]
    fn test_plan_deserializes_both_schemas() {
        let weekly: TrainingPlan = serde_json::from_str(
            r#"{
                "plan": [{"week": 1, "days": {"Mon": "Rest", "Wed": "Easy 5km run"}}],
                "start_date": "2024-01-01",
                "timezone": "Europe/Berlin"
            }"#,
        )
        .unwrap();
        assert_eq!(weekly.weeks.len(), 1);
        assert!(weekly.days.is_none());
        assert_eq!(weekly.tz(), Tz::Europe__Berlin);

        let dated: TrainingPlan = serde_json::from_str(
            r#"{
                "plan": [{"week": 1, "days": {}}],
                "days": [{"date": "2024-01-03", "workout": "Easy 5km run"}]
            }"#,
        )
        .unwrap();
        assert_eq!(dated.days.as_ref().unwrap().len(), 1);
        // unparseable or missing timezone falls back to UTC
        assert_eq!(dated.tz(), Tz::UTC);
    }

    #[test]
    fn test_completion_record_effective_date_prefers_scheduled() {
        let mut record = CompletionRecord::bare(CompletionKey::new(1, DayName::Mon));
        assert_eq!(record.effective_date(Tz::UTC), None);

        record.completed_at = Some("2024-01-02T01:30:00Z".parse().unwrap());
        assert_eq!(
            record.effective_date(Tz::UTC),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        // 01:30 UTC is still the previous evening in New York
        assert_eq!(
            record.effective_date(Tz::America__New_York),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );

        record.scheduled_date = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(
            record.effective_date(Tz::UTC),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }
}
