//! Read-only terminal projections of the store: the weekly calendar, the
//! intent display, and the relevant-memories dump. All three render to a
//! `String` so the caller decides where the text goes.

use chrono::{Datelike, Duration, NaiveDateTime};
use std::fmt::Write as _;

use crate::memory::store::MemoryStore;
use crate::timefmt;

const DAY_FORMAT: &str = "%a %B %d at %I:%M %p";
const DISPLAY_ITEM_CAP: usize = 3;
const DISPLAY_CLIP_CHARS: usize = 30;

/// Render the Monday-to-Sunday calendar for the week containing `now`:
/// events and active reminders sorted by time, then reminders completed
/// during the week.
pub fn weekly_calendar(store: &MemoryStore, now: NaiveDateTime) -> String {
    let week_start = (now.date() - Duration::days(i64::from(now.weekday().num_days_from_monday())))
        .and_hms_opt(0, 0, 0)
        .unwrap_or(now);
    let week_end = week_start + Duration::days(7) - Duration::seconds(1);

    let mut items: Vec<(NaiveDateTime, String)> = Vec::new();
    for event in &store.long_term.events {
        if (week_start..=week_end).contains(&event.occurs_at) {
            items.push((event.occurs_at, format!("Event: {}", event.description)));
        }
    }
    for reminder in &store.long_term.reminders {
        if reminder.is_active() && (week_start..=week_end).contains(&reminder.due_at) {
            items.push((reminder.due_at, format!("Reminder: {}", reminder.message)));
        }
    }
    items.sort_by_key(|(time, _)| *time);

    let mut out = String::new();
    let _ = writeln!(out, "\n=== Weekly Calendar ===");
    let _ = writeln!(out, "Current time: {}", timefmt::to_wire(now));
    let _ = writeln!(out, "Week of: {}", week_start.format("%B %d, %Y"));
    let _ = writeln!(out, "\nUpcoming events and reminders:");

    if items.is_empty() {
        let _ = writeln!(out, "No events or reminders scheduled for this week.");
    } else {
        for (time, text) in &items {
            let _ = writeln!(out, "\u{2022} {}: {}", time.format(DAY_FORMAT), text);
        }
    }

    let mut completed: Vec<_> = store
        .long_term
        .reminders
        .iter()
        .filter_map(|r| {
            r.completed_at
                .filter(|done| (week_start..=week_end).contains(done))
                .map(|done| (done, r.message.as_str()))
        })
        .collect();
    completed.sort_by_key(|(done, _)| *done);
    if !completed.is_empty() {
        let _ = writeln!(out, "\nCompleted reminders from this week:");
        for (done, message) in completed {
            let _ = writeln!(out, "\u{2022} {}: {}", done.format(DAY_FORMAT), message);
        }
    }

    let _ = writeln!(out, "\n=== End Calendar ===");
    out
}

/// Render the intent display: upcoming reminders (soonest first, capped at
/// three), plus the three most recent facts and events.
pub fn intent_display(store: &MemoryStore, now: NaiveDateTime) -> String {
    let mut upcoming: Vec<_> = store
        .long_term
        .reminders
        .iter()
        .filter(|r| r.is_active() && r.due_at > now)
        .collect();
    upcoming.sort_by_key(|r| r.due_at);

    let mut out = String::new();
    let _ = writeln!(out, "\n=== Intent Display ===");
    let _ = writeln!(out, "Current time: {}\n", timefmt::to_wire(now));

    if !upcoming.is_empty() {
        let _ = writeln!(out, "Upcoming Reminders:");
        for reminder in upcoming.iter().take(DISPLAY_ITEM_CAP) {
            let _ = writeln!(
                out,
                "- {} ({})",
                clip(&reminder.message),
                timefmt::to_wire(reminder.due_at)
            );
        }
        if upcoming.len() > DISPLAY_ITEM_CAP {
            let _ = writeln!(out, "... and {} more", upcoming.len() - DISPLAY_ITEM_CAP);
        }
    }

    let recent_facts = &store.long_term.facts
        [store.long_term.facts.len().saturating_sub(DISPLAY_ITEM_CAP)..];
    if !recent_facts.is_empty() {
        let _ = writeln!(out, "\nRecent Facts:");
        for fact in recent_facts {
            let _ = writeln!(out, "- {}", clip(&fact.content));
        }
    }

    let recent_events = &store.long_term.events
        [store.long_term.events.len().saturating_sub(DISPLAY_ITEM_CAP)..];
    if !recent_events.is_empty() {
        let _ = writeln!(out, "\nRecent Events:");
        for event in recent_events {
            let _ = writeln!(
                out,
                "- {} ({})",
                clip(&event.description),
                timefmt::to_wire(event.occurs_at)
            );
        }
    }

    let _ = writeln!(out, "\n=== End Display ===");
    out
}

/// Render the contextual view: relevant facts, the 24-hour event window, and
/// active reminders.
pub fn relevant_memories(store: &MemoryStore) -> String {
    let ctx = &store.contextual;
    let mut out = String::new();
    let _ = writeln!(out, "\n=== Relevant Memories ===");

    if !ctx.relevant_facts.is_empty() {
        let _ = writeln!(out, "\nRelated Facts:");
        for fact in &ctx.relevant_facts {
            let _ = writeln!(out, "\u{2022} {}", fact.content);
        }
    }

    if !ctx.upcoming_events.is_empty() {
        let _ = writeln!(out, "\nUpcoming Events (Next 24 Hours):");
        for event in &ctx.upcoming_events {
            let _ = writeln!(
                out,
                "\u{2022} {}: {}",
                timefmt::spoken(event.occurs_at),
                event.description
            );
        }
    }

    if !ctx.active_reminders.is_empty() {
        let _ = writeln!(out, "\nActive Reminders:");
        for reminder in &ctx.active_reminders {
            let _ = writeln!(
                out,
                "\u{2022} {}: {}",
                timefmt::spoken(reminder.due_at),
                reminder.message
            );
        }
    }

    let _ = writeln!(out, "\n=== End Memories ===");
    out
}

fn clip(text: &str) -> String {
    let clipped: String = text.chars().take(DISPLAY_CLIP_CHARS).collect();
    format!("{clipped}...")
}
