//! Proactive turn initiation: decide when the assistant speaks unprompted
//! and what it opens with.

use chrono::{Duration, NaiveDateTime};

use crate::memory::store::MemoryStore;
use crate::session::Engine;
use crate::timefmt;

/// Idle seconds after which a general check-in is warranted.
pub const TURN_TIMEOUT_SECS: i64 = 300;
/// Idle seconds after which pending updates count as important.
pub const IMPORTANT_UPDATE_THRESHOLD_SECS: i64 = 1800;

const LOOKAHEAD_HOURS: i64 = 1;

/// Whether enough idle time has passed to speak unprompted. A session with
/// no recorded interaction always initiates.
pub fn should_initiate(last_interaction: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    let Some(last) = last_interaction else {
        return true;
    };
    let idle = (now - last).num_seconds();
    idle >= IMPORTANT_UPDATE_THRESHOLD_SECS || idle >= TURN_TIMEOUT_SECS
}

/// Pick the opening line by priority: reminders due within the hour, then
/// events within the hour, then a memory summary, then a generic check-in.
pub fn opening_line(store: &MemoryStore, now: NaiveDateTime) -> String {
    let upcoming = store.list_upcoming(Duration::hours(LOOKAHEAD_HOURS), now);

    if !upcoming.reminders.is_empty() {
        let listing = upcoming
            .reminders
            .iter()
            .map(|r| format!("{} at {}", r.message, timefmt::spoken(r.due_at)))
            .collect::<Vec<_>>()
            .join(" and ");
        return format!("Sir, I wanted to remind you about {listing}");
    }

    if !upcoming.events.is_empty() {
        let listing = upcoming
            .events
            .iter()
            .map(|e| format!("{} at {}", e.description, timefmt::spoken(e.occurs_at)))
            .collect::<Vec<_>>()
            .join(" and ");
        return format!("Sir, you have upcoming events: {listing}");
    }

    let summary = store.memory_summary(now);
    if summary != "No active memories" {
        return format!("Sir, {summary}. Is there anything you need help with?");
    }

    "Sir, I'm here if you need anything. How can I assist you?".to_string()
}

/// Combined check used by the runtime loop: returns the line to speak when
/// the idle thresholds say it is time, `None` otherwise.
pub fn maybe_initiate(engine: &Engine, now: NaiveDateTime) -> Option<String> {
    if !should_initiate(engine.last_interaction(), now) {
        return None;
    }
    Some(engine.with_store(|store| opening_line(store, now)))
}
