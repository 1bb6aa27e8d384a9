//! Confirmation-gated action dispatch: one structured intent in, one
//! response/side-effect decision out.
//!
//! Module tree:
//!   dispatch/gate.rs    - Explicit Idle/AwaitingConfirmation state machine
//!   dispatch/actions.rs - Per-action execution and response phrasing
//!
//! The dispatcher records the turn, consults the gate, and either executes
//! the action, arms the gate with a confirmation prompt, or executes a
//! previously pending action on an affirmative follow-up. A non-affirmative
//! follow-up discards the pending action and is handled as a new intent.

pub mod actions;
pub mod gate;

use chrono::NaiveDateTime;
use tracing::debug;

pub use actions::ActionEffect;
pub use gate::{ConfirmationGate, GateState, PendingAction};

use crate::error::EngineResult;
use crate::intent::{ActionKind, Intent};
use crate::memory::context;
use crate::memory::store::{plural, MemoryStore};

/// Receives structured intents and drives the confirmation state machine.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
    gate: ConfirmationGate,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pending action is currently awaiting confirmation.
    pub fn is_awaiting_confirmation(&self) -> bool {
        self.gate.is_awaiting()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.gate.pending()
    }

    /// Handle one resolved intent together with the raw utterance it came
    /// from. Mutates the store and refreshes the contextual view; the caller
    /// owns the durability flush and retention sweep that follow.
    pub fn dispatch(
        &mut self,
        store: &mut MemoryStore,
        intent: Intent,
        utterance: &str,
        now: NaiveDateTime,
    ) -> EngineResult<ActionEffect> {
        store.append_conversation(utterance, intent.action.as_str(), now);
        context::refresh(store, now);

        if self.gate.is_awaiting() {
            if gate::contains_affirmative(utterance) {
                if let Some(pending) = self.gate.take() {
                    debug!(action = %pending.intent.action, "confirmed pending action");
                    let effect = self.execute_confirmed(store, pending, now)?;
                    context::refresh(store, now);
                    return Ok(effect);
                }
            } else {
                // Anything without an affirmative token supersedes the
                // pending action and is handled as a fresh intent.
                debug!("pending action discarded by new intent");
                self.gate.disarm();
            }
        }

        let effect = self.handle_new(store, intent, now)?;
        context::refresh(store, now);
        Ok(effect)
    }

    fn handle_new(
        &mut self,
        store: &mut MemoryStore,
        intent: Intent,
        now: NaiveDateTime,
    ) -> EngineResult<ActionEffect> {
        match intent.action {
            ActionKind::ReadBackReminders => Ok(actions::read_back_reminders(store)),
            ActionKind::ClearReminders => {
                let active = store.list_active_reminders().len();
                if active == 0 {
                    return Ok(ActionEffect::spoken(
                        "You don't have any active reminders to clear.",
                    ));
                }
                let prompt = format!(
                    "I found {active} active reminder{}. Would you like me to clear {}?",
                    plural(active),
                    if active == 1 { "it" } else { "them" }
                );
                self.gate.arm(intent, prompt.clone());
                Ok(ActionEffect::spoken(prompt))
            }
            ActionKind::ClearAllMemory => {
                let prompt = "I found several items in your memory. Would you like me to \
                              clear everything? This will remove all reminders, events, \
                              facts, and conversation history.";
                self.gate.arm(intent, prompt);
                Ok(ActionEffect::spoken(prompt))
            }
            ActionKind::SetReminder => {
                let payload = intent.reminder_payload()?;
                if payload.suggested_time < now {
                    let prompt = "I notice this time has already passed. Would you like me \
                                  to set this for tomorrow instead?";
                    self.gate.arm(intent, prompt);
                    return Ok(ActionEffect::spoken(prompt));
                }
                if payload.needs_confirmation || intent.needs_confirmation {
                    let prompt = payload
                        .confirmation_message
                        .clone()
                        .unwrap_or_else(|| "Would you like me to set this reminder?".to_string());
                    self.gate.arm(intent, prompt.clone());
                    return Ok(ActionEffect::spoken(prompt));
                }
                Ok(actions::set_schedule(store, &payload, now))
            }
            ActionKind::RememberFact => {
                let payload = intent.fact_payload()?;
                Ok(actions::remember_fact(store, &payload, now))
            }
            ActionKind::QueryMemory => {
                let payload = intent.response_payload()?;
                Ok(actions::query_memory(&payload.response))
            }
            ActionKind::GeneralQuery => {
                let payload = intent.response_payload()?;
                Ok(actions::general_query(&payload.response))
            }
        }
    }

    fn execute_confirmed(
        &mut self,
        store: &mut MemoryStore,
        pending: PendingAction,
        now: NaiveDateTime,
    ) -> EngineResult<ActionEffect> {
        match pending.intent.action {
            ActionKind::ClearReminders => Ok(actions::clear_reminders(store, now)),
            ActionKind::ClearAllMemory => Ok(actions::clear_all_memory(store)),
            ActionKind::SetReminder => {
                // Executed verbatim: the stored payload keeps its original
                // suggested time even when the prompt offered "tomorrow".
                let payload = pending.intent.reminder_payload()?;
                Ok(actions::set_schedule(store, &payload, now))
            }
            // Only the three kinds above ever arm the gate.
            _ => Ok(ActionEffect::default()),
        }
    }
}
