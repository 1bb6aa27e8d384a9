//! Contextual-projection maintenance: recompute the derived view after writes.
//!
//! The recompute is pure and idempotent: running it twice on unchanged
//! long-term state yields the same projection. Relevance is a deliberately
//! naive whole-word token intersection between recent conversation text and
//! fact content; it is a crude heuristic, not a search index.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;

use super::store::MemoryStore;
use super::types::{
    normalized, ContextualView, LongTermMemory, CONTEXT_WINDOW_DAYS, MAX_ACTIVE_CONTEXT,
    MAX_CONTEXT_CONVERSATIONS, UPCOMING_EVENT_WINDOW_HOURS,
};

/// Number of most-recent conversations mined for relevance topics.
const RELEVANCE_CONVERSATION_TAIL: usize = 5;

/// Recompute the contextual view from long-term memory.
pub fn recompute(long_term: &LongTermMemory, now: NaiveDateTime) -> ContextualView {
    let context_window = Duration::days(CONTEXT_WINDOW_DAYS);
    let mut recent_conversations: Vec<_> = long_term
        .conversations
        .iter()
        .filter(|c| now.signed_duration_since(c.timestamp) <= context_window)
        .cloned()
        .collect();
    if recent_conversations.len() > MAX_CONTEXT_CONVERSATIONS {
        let start = recent_conversations.len() - MAX_CONTEXT_CONVERSATIONS;
        recent_conversations.drain(..start);
    }

    let event_horizon = now + Duration::hours(UPCOMING_EVENT_WINDOW_HOURS);
    let upcoming_events = long_term
        .events
        .iter()
        .filter(|e| e.occurs_at > now && e.occurs_at <= event_horizon)
        .cloned()
        .collect();

    let active_reminders = long_term
        .reminders
        .iter()
        .filter(|r| r.is_active())
        .cloned()
        .collect();

    let topics = recent_topics(&recent_conversations);
    let mut relevant_facts: Vec<_> = long_term
        .facts
        .iter()
        .filter(|f| {
            normalized(&f.content)
                .split_whitespace()
                .any(|word| topics.contains(word))
        })
        .cloned()
        .collect();
    relevant_facts.truncate(MAX_ACTIVE_CONTEXT);

    ContextualView {
        recent_conversations,
        upcoming_events,
        active_reminders,
        relevant_facts,
    }
}

/// Recompute the store's contextual view in place.
pub fn refresh(store: &mut MemoryStore, now: NaiveDateTime) {
    store.contextual = recompute(&store.long_term, now);
}

fn recent_topics(
    recent_conversations: &[super::types::ConversationRecord],
) -> HashSet<String> {
    let tail_start = recent_conversations
        .len()
        .saturating_sub(RELEVANCE_CONVERSATION_TAIL);
    recent_conversations[tail_start..]
        .iter()
        .flat_map(|c| {
            normalized(&c.utterance)
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}
