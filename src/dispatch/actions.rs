//! Action execution: the effect table behind the dispatcher.
//!
//! These run only once the confirmation gate permits execution. Each returns
//! the response text to speak and an optional desktop notification; the
//! caller owns flush/sweep ordering.

use chrono::NaiveDateTime;

use crate::intent::{FactPayload, ReminderPayload, ScheduleKind};
use crate::memory::store::{plural, MemoryStore};
use crate::speech::Notification;
use crate::timefmt;

/// What one executed action produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionEffect {
    pub response: Option<String>,
    pub notification: Option<Notification>,
}

impl ActionEffect {
    pub(crate) fn spoken(response: impl Into<String>) -> Self {
        ActionEffect {
            response: Some(response.into()),
            notification: None,
        }
    }

    pub(crate) fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }
}

/// Sorted natural-language listing of active reminders.
pub(crate) fn read_back_reminders(store: &MemoryStore) -> ActionEffect {
    let active = store.list_active_reminders();
    if active.is_empty() {
        return ActionEffect::spoken("You don't have any active reminders at the moment.");
    }
    let listing: Vec<String> = active
        .iter()
        .map(|r| format!("{} at {}", r.message, timefmt::spoken(r.due_at)))
        .collect();
    let response = format!("Here are your active reminders: {}", listing.join("; "));
    ActionEffect::spoken(response.clone())
        .with_notification(Notification::new("Active Reminders", response, 10))
}

/// Mark all active reminders completed.
pub(crate) fn clear_reminders(store: &mut MemoryStore, now: NaiveDateTime) -> ActionEffect {
    let cleared = store.clear_reminders(now);
    if cleared == 0 {
        return ActionEffect::spoken("You don't have any active reminders to clear.");
    }
    let response = format!("I've cleared {cleared} active reminder{}.", plural(cleared));
    ActionEffect::spoken(response.clone())
        .with_notification(Notification::new("Reminders Cleared", response, 5))
}

/// Empty every long-term collection except preferences.
pub(crate) fn clear_all_memory(store: &mut MemoryStore) -> ActionEffect {
    store.clear_all();
    let response = "I've cleared all your memories. We're starting fresh.";
    ActionEffect::spoken(response).with_notification(Notification::new(
        "Memory Cleared",
        response,
        5,
    ))
}

/// Insert a reminder or event from a `set_reminder` payload.
pub(crate) fn set_schedule(
    store: &mut MemoryStore,
    payload: &ReminderPayload,
    now: NaiveDateTime,
) -> ActionEffect {
    match payload.kind {
        ScheduleKind::Event => {
            if store
                .upsert_event(&payload.message, payload.suggested_time, now)
                .is_duplicate()
            {
                return ActionEffect::spoken(
                    "I notice you already have this event scheduled. Would you like me to update it instead?",
                );
            }
            let response = format!(
                "I've added the event: {} for {}",
                payload.message,
                timefmt::spoken(payload.suggested_time)
            );
            ActionEffect::spoken(response).with_notification(schedule_notification(payload))
        }
        ScheduleKind::Reminder => {
            if store
                .upsert_reminder(&payload.message, payload.suggested_time, now)
                .is_duplicate()
            {
                return ActionEffect::spoken(
                    "I notice you already have this reminder set. Would you like me to update it instead?",
                );
            }
            let response = format!(
                "I've set a reminder for {} at {}",
                payload.message,
                timefmt::spoken(payload.suggested_time)
            );
            ActionEffect::spoken(response).with_notification(schedule_notification(payload))
        }
    }
}

/// Store a fact unless a normalized-equal one is already known.
pub(crate) fn remember_fact(
    store: &mut MemoryStore,
    payload: &FactPayload,
    now: NaiveDateTime,
) -> ActionEffect {
    if store
        .upsert_fact(&payload.content, &payload.category, now)
        .is_duplicate()
    {
        return ActionEffect::spoken(format!(
            "I already know that {}. Would you like me to update it with any new information?",
            payload.content
        ));
    }
    ActionEffect::spoken(format!("I've noted that {}", payload.content)).with_notification(
        Notification::new(
            "Memory Updated",
            format!("Remembered: {}...", truncate(&payload.content, 50)),
            5,
        ),
    )
}

/// Pass a memory-query answer through unchanged, framed for speech.
pub(crate) fn query_memory(response: &str) -> ActionEffect {
    ActionEffect::spoken(format!("Based on my records, {response}")).with_notification(
        Notification::new("Memory Query", response, 10),
    )
}

/// Pass a general response through unchanged.
pub(crate) fn general_query(response: &str) -> ActionEffect {
    ActionEffect::spoken(response).with_notification(Notification::new(
        "Assistant Response",
        response,
        10,
    ))
}

fn schedule_notification(payload: &ReminderPayload) -> Notification {
    let kind = match payload.kind {
        ScheduleKind::Reminder => "reminder",
        ScheduleKind::Event => "event",
    };
    Notification::new(
        "Memory Updated",
        format!("Added {kind}: {}...", truncate(&payload.message, 50)),
        5,
    )
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
