//! MemoryStore: the single owned aggregate for both memory tiers.
//!
//! Every mutator performs its dedup check *before* insertion and reports
//! "already known" back to the caller instead of silently merging. Callers
//! (dispatcher, scheduler) follow each write with a contextual refresh and a
//! durability flush; the store itself stays free of I/O.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::types::{
    normalized, ContextualView, ConversationRecord, Fact, LongTermMemory, Reminder,
    ReminderStatus, ScheduledEvent,
};

/// Result of a dedup-checked insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// A normalized-equal entry already exists; nothing was mutated.
    Duplicate,
}

impl UpsertOutcome {
    pub fn is_duplicate(self) -> bool {
        self == UpsertOutcome::Duplicate
    }
}

/// Reminders and events due within a look-ahead window, each sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct Upcoming {
    pub reminders: Vec<Reminder>,
    pub events: Vec<ScheduledEvent>,
}

/// The canonical memory aggregate: long-term collections plus the derived
/// contextual projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub long_term: LongTermMemory,
    #[serde(default)]
    pub contextual: ContextualView,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact unless a normalized-equal one already exists.
    pub fn upsert_fact(
        &mut self,
        content: &str,
        category: &str,
        now: NaiveDateTime,
    ) -> UpsertOutcome {
        let key = normalized(content);
        if self
            .long_term
            .facts
            .iter()
            .any(|f| normalized(&f.content) == key)
        {
            return UpsertOutcome::Duplicate;
        }
        self.long_term.facts.push(Fact {
            content: content.to_string(),
            category: category.to_string(),
            created_at: now,
        });
        UpsertOutcome::Inserted
    }

    /// Insert an event unless one with the same normalized description and
    /// occurrence time already exists.
    pub fn upsert_event(
        &mut self,
        description: &str,
        occurs_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> UpsertOutcome {
        let key = normalized(description);
        if self
            .long_term
            .events
            .iter()
            .any(|e| normalized(&e.description) == key && e.occurs_at == occurs_at)
        {
            return UpsertOutcome::Duplicate;
        }
        self.long_term.events.push(ScheduledEvent {
            description: description.to_string(),
            occurs_at,
            created_at: now,
        });
        UpsertOutcome::Inserted
    }

    /// Insert an active reminder unless one with the same normalized message
    /// and due time already exists.
    pub fn upsert_reminder(
        &mut self,
        message: &str,
        due_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> UpsertOutcome {
        let key = normalized(message);
        if self
            .long_term
            .reminders
            .iter()
            .any(|r| normalized(&r.message) == key && r.due_at == due_at)
        {
            return UpsertOutcome::Duplicate;
        }
        self.long_term.reminders.push(Reminder {
            message: message.to_string(),
            due_at,
            created_at: now,
            status: ReminderStatus::Active,
            completed_at: None,
        });
        UpsertOutcome::Inserted
    }

    /// Append one turn to the conversation history. Append-only.
    pub fn append_conversation(&mut self, utterance: &str, resolved_action: &str, now: NaiveDateTime) {
        self.long_term.conversations.push(ConversationRecord {
            utterance: utterance.to_string(),
            resolved_action: resolved_action.to_string(),
            timestamp: now,
        });
    }

    /// Active reminders sorted by due time ascending.
    pub fn list_active_reminders(&self) -> Vec<Reminder> {
        let mut active: Vec<Reminder> = self
            .long_term
            .reminders
            .iter()
            .filter(|r| r.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|r| r.due_at);
        active
    }

    /// Active reminders and events whose time falls in `(now, now + window]`.
    pub fn list_upcoming(&self, window: Duration, now: NaiveDateTime) -> Upcoming {
        let horizon = now + window;
        let mut reminders: Vec<Reminder> = self
            .long_term
            .reminders
            .iter()
            .filter(|r| r.is_active() && r.due_at > now && r.due_at <= horizon)
            .cloned()
            .collect();
        reminders.sort_by_key(|r| r.due_at);
        let mut events: Vec<ScheduledEvent> = self
            .long_term
            .events
            .iter()
            .filter(|e| e.occurs_at > now && e.occurs_at <= horizon)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.occurs_at);
        Upcoming { reminders, events }
    }

    /// Mark every active reminder completed, stamping `completed_at = now`.
    /// Returns how many transitioned.
    pub fn clear_reminders(&mut self, now: NaiveDateTime) -> usize {
        self.long_term
            .reminders
            .iter_mut()
            .filter(|r| r.is_active())
            .map(|r| r.complete(now))
            .filter(|transitioned| *transitioned)
            .count()
    }

    /// Empty all long-term collections except preferences, and reset the
    /// contextual view.
    pub fn clear_all(&mut self) {
        self.long_term.facts.clear();
        self.long_term.events.clear();
        self.long_term.reminders.clear();
        self.long_term.conversations.clear();
        self.contextual = ContextualView::default();
    }

    /// Brief spoken summary of what the store currently holds.
    pub fn memory_summary(&self, now: NaiveDateTime) -> String {
        let mut parts = Vec::new();

        let active = self.long_term.reminders.iter().filter(|r| r.is_active()).count();
        if active > 0 {
            parts.push(format!(
                "You have {active} active reminder{}",
                plural(active)
            ));
        }

        let recent_facts = self.long_term.facts.len().min(3);
        if recent_facts > 0 {
            parts.push(format!(
                "You've shared {recent_facts} recent fact{}",
                plural(recent_facts)
            ));
        }

        let upcoming = self
            .long_term
            .events
            .iter()
            .filter(|e| e.occurs_at > now)
            .count();
        if upcoming > 0 {
            parts.push(format!(
                "You have {upcoming} upcoming event{}",
                plural(upcoming)
            ));
        }

        if parts.is_empty() {
            "No active memories".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ts(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, day)
            .expect("date")
            .and_hms_opt(h, m, 0)
            .expect("time")
    }

    #[test]
    fn fact_dedup_is_case_and_whitespace_insensitive() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.upsert_fact("I like tea", "preference", ts(2, 9, 0)),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            store.upsert_fact("  i LIKE   tea ", "preference", ts(2, 9, 5)),
            UpsertOutcome::Duplicate
        );
        assert_eq!(store.long_term.facts.len(), 1);
    }

    #[test]
    fn reminder_dedup_requires_matching_due_time() {
        let mut store = MemoryStore::new();
        store.upsert_reminder("call mom", ts(2, 10, 0), ts(2, 9, 0));
        assert!(store
            .upsert_reminder("Call Mom", ts(2, 10, 0), ts(2, 9, 1))
            .is_duplicate());
        // Same message at a different time is a distinct reminder.
        assert_eq!(
            store.upsert_reminder("call mom", ts(2, 18, 0), ts(2, 9, 2)),
            UpsertOutcome::Inserted
        );
        assert_eq!(store.long_term.reminders.len(), 2);
    }

    #[test]
    fn event_dedup_matches_description_and_time() {
        let mut store = MemoryStore::new();
        store.upsert_event("dentist", ts(3, 14, 0), ts(2, 9, 0));
        assert!(store
            .upsert_event("Dentist", ts(3, 14, 0), ts(2, 9, 1))
            .is_duplicate());
        assert_eq!(store.long_term.events.len(), 1);
    }

    #[test]
    fn active_reminders_sorted_by_due_time() {
        let mut store = MemoryStore::new();
        store.upsert_reminder("later", ts(2, 18, 0), ts(2, 9, 0));
        store.upsert_reminder("sooner", ts(2, 10, 0), ts(2, 9, 0));
        store.upsert_reminder("done", ts(2, 8, 0), ts(2, 7, 0));
        store
            .long_term
            .reminders
            .iter_mut()
            .find(|r| r.message == "done")
            .expect("reminder")
            .complete(ts(2, 8, 0));

        let active = store.list_active_reminders();
        let messages: Vec<&str> = active.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["sooner", "later"]);
    }

    #[test]
    fn list_upcoming_excludes_past_and_beyond_horizon() {
        let mut store = MemoryStore::new();
        let now = ts(2, 12, 0);
        store.upsert_reminder("past", ts(2, 11, 0), now);
        store.upsert_reminder("inside", ts(2, 12, 30), now);
        store.upsert_reminder("outside", ts(2, 14, 0), now);
        store.upsert_event("soon", ts(2, 12, 45), now);

        let upcoming = store.list_upcoming(Duration::hours(1), now);
        assert_eq!(upcoming.reminders.len(), 1);
        assert_eq!(upcoming.reminders[0].message, "inside");
        assert_eq!(upcoming.events.len(), 1);
    }

    #[test]
    fn clear_reminders_completes_only_active() {
        let mut store = MemoryStore::new();
        let now = ts(2, 12, 0);
        store.upsert_reminder("one", ts(2, 13, 0), now);
        store.upsert_reminder("two", ts(2, 14, 0), now);
        store.long_term.reminders[0].complete(ts(2, 11, 0));

        assert_eq!(store.clear_reminders(now), 1);
        assert!(store.long_term.reminders.iter().all(|r| !r.is_active()));
        // First reminder keeps its original completion stamp.
        assert_eq!(store.long_term.reminders[0].completed_at, Some(ts(2, 11, 0)));
    }

    #[test]
    fn clear_all_keeps_preferences() {
        let mut store = MemoryStore::new();
        let now = ts(2, 12, 0);
        store.upsert_fact("I like tea", "preference", now);
        store.upsert_reminder("call mom", ts(2, 13, 0), now);
        store
            .long_term
            .preferences
            .insert("voice".into(), "alex".into());

        store.clear_all();
        assert!(store.long_term.facts.is_empty());
        assert!(store.long_term.reminders.is_empty());
        assert_eq!(store.long_term.preferences.len(), 1);
    }

    #[test]
    fn memory_summary_joins_parts() {
        let mut store = MemoryStore::new();
        let now = ts(2, 12, 0);
        assert_eq!(store.memory_summary(now), "No active memories");

        store.upsert_reminder("call mom", ts(2, 13, 0), now);
        store.upsert_event("dentist", ts(3, 9, 0), now);
        assert_eq!(
            store.memory_summary(now),
            "You have 1 active reminder and You have 1 upcoming event"
        );
    }

    proptest! {
        // For any content, inserting the same fact twice never yields two entries.
        #[test]
        fn fact_insert_is_idempotent(content in "[ a-zA-Z]{1,40}") {
            prop_assume!(!content.trim().is_empty());
            let mut store = MemoryStore::new();
            let now = ts(2, 9, 0);
            store.upsert_fact(&content, "misc", now);
            store.upsert_fact(&content, "misc", now);
            prop_assert_eq!(store.long_term.facts.len(), 1);
        }
    }
}
