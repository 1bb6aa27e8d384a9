//! Entity schema for the two memory tiers, plus the window constants.
//!
//! Serde field names follow the persisted document so that memory files
//! written by earlier versions of the assistant load unchanged: reminders and
//! events store their wall-clock time under `datetime`, facts under
//! `timestamp`, conversations under `text`/`action`/`timestamp`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timefmt;

/// How long conversations stay in the contextual window (days).
pub const CONTEXT_WINDOW_DAYS: i64 = 7;
/// How long long-term entries are retained before eviction (days).
pub const LONG_TERM_WINDOW_DAYS: i64 = 365;
/// Maximum recent conversations kept in the contextual view.
pub const MAX_CONTEXT_CONVERSATIONS: usize = 50;
/// Maximum relevant facts surfaced in the contextual view.
pub const MAX_ACTIVE_CONTEXT: usize = 10;
/// Events occurring within this many hours count as upcoming.
pub const UPCOMING_EVENT_WINDOW_HOURS: i64 = 24;

/// Case/whitespace-normalize content for dedup comparisons.
pub fn normalized(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A general fact about the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub content: String,
    pub category: String,
    #[serde(rename = "timestamp", with = "timefmt::wire")]
    pub created_at: NaiveDateTime,
}

/// A scheduled event (past or future).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub description: String,
    #[serde(rename = "datetime", with = "timefmt::wire")]
    pub occurs_at: NaiveDateTime,
    #[serde(with = "timefmt::wire")]
    pub created_at: NaiveDateTime,
}

/// Reminder lifecycle state. Transitions only `Active -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    #[default]
    Active,
    Completed,
}

/// A reminder with its due time and completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub message: String,
    #[serde(rename = "datetime", with = "timefmt::wire")]
    pub due_at: NaiveDateTime,
    #[serde(with = "timefmt::wire")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub status: ReminderStatus,
    #[serde(
        default,
        with = "timefmt::wire_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<NaiveDateTime>,
}

impl Reminder {
    pub fn is_active(&self) -> bool {
        self.status == ReminderStatus::Active
    }

    /// Transition `Active -> Completed`, stamping `completed_at`.
    /// Returns false (and leaves the reminder untouched) if already completed.
    pub fn complete(&mut self, now: NaiveDateTime) -> bool {
        if self.status == ReminderStatus::Completed {
            return false;
        }
        self.status = ReminderStatus::Completed;
        self.completed_at = Some(now);
        true
    }
}

/// One recorded user turn: the raw utterance and the action it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(rename = "text")]
    pub utterance: String,
    #[serde(rename = "action")]
    pub resolved_action: String,
    #[serde(with = "timefmt::wire")]
    pub timestamp: NaiveDateTime,
}

/// Canonical long-term collections. Preferences are never swept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermMemory {
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
}

/// Derived recency-windowed projection of long-term memory.
///
/// Never independently mutated; always recomputed from [`LongTermMemory`].
/// Persisted for convenience but recomputed on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextualView {
    #[serde(default)]
    pub recent_conversations: Vec<ConversationRecord>,
    #[serde(default)]
    pub upcoming_events: Vec<ScheduledEvent>,
    #[serde(default)]
    pub active_reminders: Vec<Reminder>,
    #[serde(default)]
    pub relevant_facts: Vec<Fact>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .expect("date")
            .and_hms_opt(h, m, 0)
            .expect("time")
    }

    #[test]
    fn normalized_collapses_case_and_whitespace() {
        assert_eq!(normalized("  I like   Tea "), "i like tea");
        assert_eq!(normalized("i like tea"), "i like tea");
    }

    #[test]
    fn reminder_completion_is_monotonic() {
        let mut reminder = Reminder {
            message: "call mom".into(),
            due_at: ts(10, 0),
            created_at: ts(9, 0),
            status: ReminderStatus::Active,
            completed_at: None,
        };
        assert!(reminder.complete(ts(10, 5)));
        assert_eq!(reminder.status, ReminderStatus::Completed);
        assert_eq!(reminder.completed_at, Some(ts(10, 5)));

        // Second completion attempt must not move the stamp.
        assert!(!reminder.complete(ts(11, 0)));
        assert_eq!(reminder.completed_at, Some(ts(10, 5)));
    }

    #[test]
    fn reminder_serde_uses_legacy_field_names() {
        let reminder = Reminder {
            message: "call mom".into(),
            due_at: ts(10, 0),
            created_at: ts(9, 0),
            status: ReminderStatus::Active,
            completed_at: None,
        };
        let json = serde_json::to_value(&reminder).expect("encode");
        assert_eq!(json["datetime"], "2026-04-02 10:00:00");
        assert_eq!(json["status"], "active");
        assert!(json.get("completed_at").is_none());
    }

    #[test]
    fn reminder_decodes_without_status_as_active() {
        let raw = r#"{"message":"m","datetime":"2026-04-02 10:00:00","created_at":"2026-04-02 09:00:00"}"#;
        let reminder: Reminder = serde_json::from_str(raw).expect("decode");
        assert!(reminder.is_active());
    }
}
