//! Completion ledger
//!
//! An in-memory snapshot of which scheduled workouts the athlete has marked
//! complete, keyed by `CompletionKey`, plus optional per-completion metrics.
//! Membership and metrics are held separately so a toggle flips membership
//! only; toggling the same key twice restores the ledger exactly.
//!
//! The authoritative copy lives in an external store; callers seed the
//! ledger from fetched rows, apply optimistic toggles locally, and reconcile
//! later. The engine never blocks on that reconciliation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use crate::models::{CompletionKey, CompletionRecord};

/// Set of completed workout instances plus optional per-completion metrics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionLedger {
    completed: BTreeSet<CompletionKey>,
    metrics: BTreeMap<CompletionKey, CompletionRecord>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from externally fetched rows. A later row for the same
    /// key replaces the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = CompletionRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.record(record);
        }
        ledger
    }

    /// Toggle completion for a key. Returns whether the key is completed
    /// after the toggle. Only membership flips; any recorded metrics stay
    /// put, so toggling twice restores the original ledger.
    pub fn toggle(&mut self, key: CompletionKey) -> bool {
        if self.completed.remove(&key) {
            false
        } else {
            self.completed.insert(key);
            true
        }
    }

    /// Record a completion with metrics, marking the key complete
    pub fn record(&mut self, record: CompletionRecord) {
        let key = record.key();
        self.completed.insert(key);
        self.metrics.insert(key, record);
    }

    pub fn is_completed(&self, key: CompletionKey) -> bool {
        self.completed.contains(&key)
    }

    /// Ledger cardinality: one per completed workout instance
    pub fn total(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = CompletionKey> + '_ {
        self.completed.iter().copied()
    }

    /// Metrics for a completed key, when a row carried any
    pub fn get(&self, key: CompletionKey) -> Option<&CompletionRecord> {
        if !self.completed.contains(&key) {
            return None;
        }
        self.metrics.get(&key)
    }

    /// Metric rows for currently completed keys
    pub fn records(&self) -> impl Iterator<Item = &CompletionRecord> + '_ {
        self.completed.iter().filter_map(|key| self.metrics.get(key))
    }

    /// Distinct calendar dates with at least one completion, resolved in
    /// `tz`. Rows carrying neither a scheduled date nor a completion
    /// timestamp cannot contribute to streaks and are skipped.
    pub fn completion_dates(&self, tz: Tz) -> BTreeSet<NaiveDate> {
        self.records()
            .filter_map(|record| record.effective_date(tz))
            .collect()
    }

    /// Completions falling inside the Monday-start week beginning at
    /// `monday`, preferring each row's scheduled date over its timestamp
    pub fn completed_in_week(&self, monday: NaiveDate, tz: Tz) -> usize {
        let end = monday + Duration::days(7);
        self.records()
            .filter_map(|record| record.effective_date(tz))
            .filter(|date| *date >= monday && *date < end)
            .count()
    }
}
