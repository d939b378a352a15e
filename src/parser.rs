//! Free-text workout description parsing
//!
//! Plans arrive with workouts as prose ("Easy 5km run", "**Warm up:** 10 min
//! jog **Work:** 5x(800m @ 3:50/km) ..."). This module turns that prose into
//! structured, queryable fields. Parsing is pure, deterministic, and total:
//! any input yields a descriptor, and a field that is not present in the text
//! is simply absent rather than zeroed.
//!
//! Units are reported as written; no conversion is performed here.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured fields extracted from one workout description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkoutDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,

    #[serde(default)]
    pub sections: WorkoutSections,
}

/// Labelled segments of a workout description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_up: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cool_down: Option<String>,
}

/// Workout category detected from free text, used for fallback coaching tips
/// and rest-day classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutCategory {
    Rest,
    Easy,
    Long,
    Tempo,
    Interval,
    General,
}

static DISTANCE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // longest unit spellings first so "miles" is not cut to "mi"; no leading
    // boundary so repeat notation like "8x400m" still matches
    Regex::new(r"(?i)\d+(?:\.\d+)?\s*(?:km|miles|mi|m)\b").ok()
});

static HOURS_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*h(?:(?:ou)?rs?)?\b").ok());

static MINUTES_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d+\s*min(?:ute)?s?\b").ok());

static CLOCK_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}:\d{2}\b").ok());

static PACE_PER_UNIT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2}:\d{2})\s*/\s*(km|mi(?:le)?)\b").ok());

static AT_PACE_VALUE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"@\s*(\d{1,2}:\d{2})\b").ok());

static AT_PACE_NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)@\s*([a-z][a-z ]*?pace)\b").ok());

static SECTION_LABEL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\*\*\s*)?\b(warm[\s-]*up|cool[\s-]*down|main\s*set|work)\s*:\s*(?:\*\*)?")
        .ok()
});

static REST_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)\brest\b").ok());

static EASY_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(easy|recovery)\b").ok());

static LONG_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)\blong\b").ok());

static TEMPO_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(tempo|threshold)\b").ok());

static INTERVAL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(intervals?|repeats?)\b").ok());

/// Parse one workout description into structured fields.
///
/// Total over any input: unrecognized text yields a descriptor whose only
/// populated field is `sections.work` (the whole text).
pub fn parse(text: &str) -> WorkoutDescriptor {
    WorkoutDescriptor {
        distance: extract_distance(text),
        duration: extract_duration(text),
        pace: extract_pace(text),
        sections: parse_workout_sections(text),
    }
}

/// Remove markdown emphasis markers, for truncated previews and accessible
/// labels. Stripping is a fixed point and preserves every extracted field.
pub fn strip_formatting(text: &str) -> String {
    text.replace("**", "")
}

fn extract_distance(text: &str) -> Option<String> {
    let re = DISTANCE_PATTERN.as_ref()?;
    re.find(text).map(|m| m.as_str().to_string())
}

fn extract_duration(text: &str) -> Option<String> {
    let mut candidates: Vec<(usize, String)> = Vec::new();

    if let Some(re) = HOURS_PATTERN.as_ref() {
        if let Some(m) = re.find(text) {
            candidates.push((m.start(), m.as_str().to_string()));
        }
    }
    if let Some(re) = MINUTES_PATTERN.as_ref() {
        if let Some(m) = re.find(text) {
            candidates.push((m.start(), m.as_str().to_string()));
        }
    }
    if let Some(re) = CLOCK_PATTERN.as_ref() {
        // H:MM is a duration only when it is not a pace token: paces carry a
        // trailing "/unit" or a leading "@"
        for m in re.find_iter(text) {
            if followed_by_slash(text, m.end()) || preceded_by_at(text, m.start()) {
                continue;
            }
            candidates.push((m.start(), m.as_str().to_string()));
            break;
        }
    }

    candidates.into_iter().min_by_key(|(start, _)| *start).map(|(_, s)| s)
}

fn extract_pace(text: &str) -> Option<String> {
    if let Some(re) = PACE_PER_UNIT_PATTERN.as_ref() {
        if let Some(caps) = re.captures(text) {
            return Some(format!("{}/{}", &caps[1], caps[2].to_lowercase()));
        }
    }
    if let Some(re) = AT_PACE_VALUE_PATTERN.as_ref() {
        if let Some(caps) = re.captures(text) {
            return Some(caps[1].to_string());
        }
    }
    if let Some(re) = AT_PACE_NAME_PATTERN.as_ref() {
        if let Some(caps) = re.captures(text) {
            return Some(caps[1].trim().to_lowercase());
        }
    }
    None
}

fn followed_by_slash(text: &str, end: usize) -> bool {
    text[end..].trim_start().starts_with('/')
}

fn preceded_by_at(text: &str, start: usize) -> bool {
    text[..start].trim_end().ends_with('@')
}

/// Split a description on its labelled segments.
///
/// Labels are matched case-insensitively and tolerate markdown bold markers
/// ("**Warm up:**", "warm-up:", "Main set:"). With no labels present the
/// whole text is the work segment.
pub fn parse_workout_sections(text: &str) -> WorkoutSections {
    let mut sections = WorkoutSections::default();

    let Some(re) = SECTION_LABEL_PATTERN.as_ref() else {
        return sections;
    };

    let markers: Vec<(usize, usize, SectionKind)> = re
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = SectionKind::classify(caps.get(1)?.as_str());
            Some((whole.start(), whole.end(), kind))
        })
        .collect();

    if markers.is_empty() {
        let work = text.trim();
        if !work.is_empty() {
            sections.work = Some(work.to_string());
        }
        return sections;
    }

    for (i, (_, content_start, kind)) in markers.iter().enumerate() {
        let content_end = markers
            .get(i + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(text.len());
        let content = text[*content_start..content_end].trim();
        if content.is_empty() {
            continue;
        }
        let slot = match kind {
            SectionKind::WarmUp => &mut sections.warm_up,
            SectionKind::Work => &mut sections.work,
            SectionKind::CoolDown => &mut sections.cool_down,
        };
        // first occurrence of a label wins
        if slot.is_none() {
            *slot = Some(content.to_string());
        }
    }

    sections
}

#[derive(Debug, Clone, Copy)]
enum SectionKind {
    WarmUp,
    Work,
    CoolDown,
}

impl SectionKind {
    fn classify(label: &str) -> SectionKind {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "warmup" => SectionKind::WarmUp,
            "cooldown" => SectionKind::CoolDown,
            _ => SectionKind::Work,
        }
    }
}

/// Detect the workout category via word-boundary matches, first hit in
/// priority order wins. A best-effort heuristic over free text, not a
/// guaranteed classifier.
pub fn workout_category(text: &str) -> WorkoutCategory {
    let checks: [(&LazyLock<Option<Regex>>, WorkoutCategory); 5] = [
        (&REST_PATTERN, WorkoutCategory::Rest),
        (&EASY_PATTERN, WorkoutCategory::Easy),
        (&LONG_PATTERN, WorkoutCategory::Long),
        (&TEMPO_PATTERN, WorkoutCategory::Tempo),
        (&INTERVAL_PATTERN, WorkoutCategory::Interval),
    ];
    for (pattern, category) in checks {
        if let Some(re) = pattern.as_ref() {
            if re.is_match(text) {
                return category;
            }
        }
    }
    WorkoutCategory::General
}

/// Whether a day slot counts as a rest day for progress math. Word-boundary
/// aware so "restart" does not false-positive.
pub fn is_rest_day(text: &str) -> bool {
    workout_category(text) == WorkoutCategory::Rest
}

/// Fixed fallback tip set per category, used when a plan attaches no tips
pub fn default_tips(category: WorkoutCategory) -> &'static [&'static str] {
    match category {
        WorkoutCategory::Rest => &[
            "Rest days are where adaptation happens - take it seriously",
            "Light stretching or a short walk is fine today",
        ],
        WorkoutCategory::Easy => &[
            "Keep the effort conversational - you should be able to talk in full sentences",
            "Easy days easy: resist the urge to push the pace",
        ],
        WorkoutCategory::Long => &[
            "Start slower than feels necessary and settle in",
            "Practice your race-day fueling on long runs",
            "Hydrate before you feel thirsty",
        ],
        WorkoutCategory::Tempo => &[
            "Tempo effort is comfortably hard - controlled, not a race",
            "Ease into the tempo portion over the first few minutes",
        ],
        WorkoutCategory::Interval => &[
            "Run the first repeat at the same effort as the last",
            "Use the full recovery between repeats - it is part of the workout",
        ],
        WorkoutCategory::General => &[
            "Listen to your body and adjust effort as needed",
            "Consistency beats intensity over a training block",
        ],
    }
}

/// Tips for a day slot: attached tips when present, otherwise the category
/// fallback set
pub fn coaching_tips(workout_text: &str, attached: &[String]) -> Vec<String> {
    if !attached.is_empty() {
        return attached.to_vec();
    }
    default_tips(workout_category(workout_text))
        .iter()
        .map(|tip| (*tip).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_extraction() {
        assert_eq!(parse("Easy 5km run").distance.as_deref(), Some("5km"));
        assert_eq!(parse("Long run 12 miles").distance.as_deref(), Some("12 miles"));
        assert_eq!(parse("6 mi steady").distance.as_deref(), Some("6 mi"));
        assert_eq!(parse("8x400m on the track").distance.as_deref(), Some("400m"));
        assert_eq!(parse("10x1km hill repeats").distance.as_deref(), Some("1km"));
        // first match wins
        assert_eq!(parse("3km warm up then 10km tempo").distance.as_deref(), Some("3km"));
        // "min" is not a distance
        assert_eq!(parse("40 min easy").distance, None);
    }

    #[test]
    fn test_duration_extraction() {
        assert_eq!(parse("40 min easy").duration.as_deref(), Some("40 min"));
        assert_eq!(parse("Run for 2 hours").duration.as_deref(), Some("2 hours"));
        assert_eq!(parse("1:30 steady effort").duration.as_deref(), Some("1:30"));
        assert_eq!(parse("45 minutes progressive").duration.as_deref(), Some("45 minutes"));
        assert_eq!(parse("Easy 5km run").duration, None);
    }

    #[test]
    fn test_pace_tokens_are_not_durations() {
        let parsed = parse("5x(800m @ 3:50/km)");
        assert_eq!(parsed.duration, None);
        assert_eq!(parsed.pace.as_deref(), Some("3:50/km"));

        let parsed = parse("Tempo @ 4:30");
        assert_eq!(parsed.duration, None);
        assert_eq!(parsed.pace.as_deref(), Some("4:30"));
    }

    #[test]
    fn test_pace_extraction() {
        assert_eq!(parse("Steady at 7:15/mi today").pace.as_deref(), Some("7:15/mi"));
        assert_eq!(parse("20 min @ marathon pace").pace.as_deref(), Some("marathon pace"));
        assert_eq!(parse("Easy 5km run").pace, None);
    }

    #[test]
    fn test_section_splitting() {
        let parsed = parse("**Warm up:** 10 min jog **Work:** 5x(800m @ 3:50/km) **Cool down:** 10 min jog");
        assert_eq!(parsed.sections.warm_up.as_deref(), Some("10 min jog"));
        assert!(parsed.sections.work.as_deref().unwrap().contains("5x(800m"));
        assert_eq!(parsed.sections.cool_down.as_deref(), Some("10 min jog"));
        assert_eq!(parsed.pace.as_deref(), Some("3:50/km"));
    }

    #[test]
    fn test_section_label_variants() {
        let sections = parse_workout_sections("warm-up: strides Main set: 3x2km cool down: walk");
        assert_eq!(sections.warm_up.as_deref(), Some("strides"));
        assert_eq!(sections.work.as_deref(), Some("3x2km"));
        assert_eq!(sections.cool_down.as_deref(), Some("walk"));
    }

    #[test]
    fn test_unlabelled_text_is_work() {
        let sections = parse_workout_sections("Easy 5km run");
        assert_eq!(sections.warm_up, None);
        assert_eq!(sections.work.as_deref(), Some("Easy 5km run"));
        assert_eq!(sections.cool_down, None);

        let sections = parse_workout_sections("   ");
        assert_eq!(sections.work, None);
    }

    #[test]
    fn test_strip_formatting_round_trip() {
        let text = "**Warm up:** 10 min jog **Work:** 5x(800m @ 3:50/km) **Cool down:** 10 min jog";
        let stripped = strip_formatting(text);
        assert!(!stripped.contains("**"));
        // stripping twice is a no-op
        assert_eq!(strip_formatting(&stripped), stripped);

        // semantic fields survive the strip
        let before = parse(text);
        let after = parse(&stripped);
        assert_eq!(before.distance, after.distance);
        assert_eq!(before.duration, after.duration);
        assert_eq!(before.pace, after.pace);
        assert_eq!(before.sections.warm_up, after.sections.warm_up);
        assert_eq!(before.sections.cool_down, after.sections.cool_down);
    }

    #[test]
    fn test_category_priority_order() {
        assert_eq!(workout_category("Rest day"), WorkoutCategory::Rest);
        // rest outranks easy even when both appear
        assert_eq!(workout_category("Easy jog or rest"), WorkoutCategory::Rest);
        assert_eq!(workout_category("Easy 5km"), WorkoutCategory::Easy);
        assert_eq!(workout_category("Long run 18km"), WorkoutCategory::Long);
        assert_eq!(workout_category("Threshold 3x10 min"), WorkoutCategory::Tempo);
        assert_eq!(workout_category("400m repeats"), WorkoutCategory::Interval);
        assert_eq!(workout_category("Parkrun!"), WorkoutCategory::General);
    }

    #[test]
    fn test_rest_detection_is_word_boundary_aware() {
        assert!(is_rest_day("Rest"));
        assert!(is_rest_day("Full rest day"));
        assert!(!is_rest_day("Restart the block with strides"));
        assert!(!is_rest_day("Easy 5km run"));
    }

    #[test]
    fn test_coaching_tips_fallback() {
        let attached = vec!["Drink water".to_string()];
        assert_eq!(coaching_tips("Easy 5km", &attached), attached);

        let fallback = coaching_tips("Easy 5km", &[]);
        assert_eq!(fallback.len(), default_tips(WorkoutCategory::Easy).len());
        assert!(fallback[0].contains("conversational"));
    }

    #[test]
    fn test_parse_is_total() {
        assert_eq!(parse(""), WorkoutDescriptor::default());
        let weird = parse("@@@ ::: ** 99:99:99");
        assert!(weird.distance.is_none());
    }
}
