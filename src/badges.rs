//! Badge catalog and eligibility
//!
//! The engine only ever proposes eligibility against the static catalog
//! below. Recording an earn (with its `earnedAt` timestamp) is a one-way
//! transition owned by an external collaborator; a badge never un-earns even
//! if the underlying metric later regresses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::StreakState;

/// Which derived metric a badge threshold applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeMetric {
    /// Longest run of consecutive completion days
    Streak,
    /// Total completed workouts
    Count,
}

/// One badge threshold in the static catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: u32,
    pub metric: BadgeMetric,
}

/// Fixed, ordered badge catalog
pub const BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "first-workout",
        name: "First Steps",
        description: "Complete your first workout",
        requirement: 1,
        metric: BadgeMetric::Count,
    },
    BadgeDefinition {
        id: "streak-3",
        name: "On a Roll",
        description: "Train on 3 consecutive days",
        requirement: 3,
        metric: BadgeMetric::Streak,
    },
    BadgeDefinition {
        id: "streak-7",
        name: "Week Warrior",
        description: "Train on 7 consecutive days",
        requirement: 7,
        metric: BadgeMetric::Streak,
    },
    BadgeDefinition {
        id: "streak-14",
        name: "Habit Builder",
        description: "Train on 14 consecutive days",
        requirement: 14,
        metric: BadgeMetric::Streak,
    },
    BadgeDefinition {
        id: "streak-30",
        name: "Iron Will",
        description: "Train on 30 consecutive days",
        requirement: 30,
        metric: BadgeMetric::Streak,
    },
    BadgeDefinition {
        id: "count-10",
        name: "Regular Runner",
        description: "Complete 10 workouts",
        requirement: 10,
        metric: BadgeMetric::Count,
    },
    BadgeDefinition {
        id: "count-30",
        name: "Committed",
        description: "Complete 30 workouts",
        requirement: 30,
        metric: BadgeMetric::Count,
    },
    BadgeDefinition {
        id: "count-50",
        name: "Half Century",
        description: "Complete 50 workouts",
        requirement: 50,
        metric: BadgeMetric::Count,
    },
    BadgeDefinition {
        id: "count-100",
        name: "Century Club",
        description: "Complete 100 workouts",
        requirement: 100,
        metric: BadgeMetric::Count,
    },
];

impl BadgeDefinition {
    /// Whether the given metrics meet this badge's threshold
    pub fn is_eligible(&self, longest_streak: u32, total_workouts: u32) -> bool {
        let value = match self.metric {
            BadgeMetric::Streak => longest_streak,
            BadgeMetric::Count => total_workouts,
        };
        value >= self.requirement
    }
}

/// All catalog badges whose threshold the metrics meet, in catalog order
pub fn eligible_badges(longest_streak: u32, total_workouts: u32) -> Vec<&'static BadgeDefinition> {
    BADGES
        .iter()
        .filter(|badge| badge.is_eligible(longest_streak, total_workouts))
        .collect()
}

/// Eligible badge ids as carried on `StreakState`
pub fn eligible_ids(longest_streak: u32, total_workouts: u32) -> BTreeSet<String> {
    eligible_badges(longest_streak, total_workouts)
        .into_iter()
        .map(|badge| badge.id.to_string())
        .collect()
}

/// Badges eligible after a state change but not before: the "newly eligible"
/// signal a celebration collaborator listens for
pub fn newly_eligible(
    before: &StreakState,
    after: &StreakState,
) -> Vec<&'static BadgeDefinition> {
    BADGES
        .iter()
        .filter(|badge| after.badges.contains(badge.id) && !before.badges.contains(badge.id))
        .collect()
}

pub fn badge_by_id(id: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|badge| badge.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_ordered_and_unique() {
        let ids: BTreeSet<_> = BADGES.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BADGES.len());
        assert!(BADGES.iter().all(|b| b.requirement >= 1));
    }

    #[test]
    fn test_eligibility_thresholds() {
        let badge = badge_by_id("count-30").unwrap();
        assert!(!badge.is_eligible(100, 29));
        assert!(badge.is_eligible(0, 30));
        assert!(badge.is_eligible(0, 31));

        let badge = badge_by_id("streak-7").unwrap();
        assert!(!badge.is_eligible(6, 100));
        assert!(badge.is_eligible(7, 0));
    }

    #[test]
    fn test_eligible_ids() {
        let ids = eligible_ids(3, 12);
        assert!(ids.contains("first-workout"));
        assert!(ids.contains("streak-3"));
        assert!(ids.contains("count-10"));
        assert!(!ids.contains("streak-7"));
        assert!(!ids.contains("count-30"));
    }

    #[test]
    fn test_newly_eligible_diff() {
        let before = StreakState {
            current_streak: 2,
            longest_streak: 2,
            total_workouts: 29,
            badges: eligible_ids(2, 29),
        };
        let after = StreakState {
            current_streak: 3,
            longest_streak: 3,
            total_workouts: 30,
            badges: eligible_ids(3, 30),
        };

        let fresh = newly_eligible(&before, &after);
        let ids: Vec<_> = fresh.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["streak-3", "count-30"]);

        // the signal fires exactly once: diffing the new state against
        // itself yields nothing
        assert!(newly_eligible(&after, &after).is_empty());
    }
}
