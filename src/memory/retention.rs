//! Retention sweeping: age-based eviction and fact dedup for long-term memory.
//!
//! Runs after every action. Active reminders are never evicted regardless of
//! age; preferences are never touched.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;
use tracing::debug;

use super::types::{normalized, LongTermMemory, LONG_TERM_WINDOW_DAYS};

/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub evicted: usize,
    pub deduped_facts: usize,
}

impl SweepStats {
    pub fn is_noop(&self) -> bool {
        self.evicted == 0 && self.deduped_facts == 0
    }
}

/// Evict entries past the retention window and deduplicate facts.
pub fn sweep(long_term: &mut LongTermMemory, now: NaiveDateTime) -> SweepStats {
    let window = Duration::days(LONG_TERM_WINDOW_DAYS);
    let mut stats = SweepStats::default();

    let before = long_term.reminders.len();
    long_term.reminders.retain(|r| {
        r.is_active()
            || r.completed_at
                .map(|done| now.signed_duration_since(done) < window)
                .unwrap_or(false)
    });
    stats.evicted += before - long_term.reminders.len();

    let before = long_term.events.len();
    long_term
        .events
        .retain(|e| now.signed_duration_since(e.occurs_at) < window);
    stats.evicted += before - long_term.events.len();

    let before = long_term.facts.len();
    long_term
        .facts
        .retain(|f| now.signed_duration_since(f.created_at) < window);
    stats.evicted += before - long_term.facts.len();

    let before = long_term.conversations.len();
    long_term
        .conversations
        .retain(|c| now.signed_duration_since(c.timestamp) < window);
    stats.evicted += before - long_term.conversations.len();

    // Dedup facts by normalized content, keeping the first occurrence.
    let mut seen = HashSet::new();
    let before = long_term.facts.len();
    long_term.facts.retain(|f| seen.insert(normalized(&f.content)));
    stats.deduped_facts = before - long_term.facts.len();

    if !stats.is_noop() {
        debug!(
            evicted = stats.evicted,
            deduped_facts = stats.deduped_facts,
            "retention sweep removed entries"
        );
    }
    stats
}
