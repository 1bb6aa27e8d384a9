//! Foreground turn handling and the exclusive-access boundary around memory.
//!
//! Three lines of activity touch the store: the foreground utterance path,
//! the reminder scheduler, and read-only display triggers. All of them go
//! through [`Engine`], which holds the store, the dispatcher state machine,
//! and the last-interaction stamp behind one mutex. External collaborators
//! (speech, notifications, transcription) are always invoked after the lock
//! is released.

use chrono::NaiveDateTime;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::dispatch::{ActionDispatcher, ActionEffect, PendingAction};
use crate::error::EngineResult;
use crate::intent::Intent;
use crate::memory::store::MemoryStore;
use crate::memory::{context, persist, retention};
use crate::scheduler::{self, TickOutcome};
use crate::speech::{NluClient, Notifier, Speaker, Transcriber, TranscribeOutcome};
use std::time::Duration;

struct EngineState {
    store: MemoryStore,
    dispatcher: ActionDispatcher,
    last_interaction: Option<NaiveDateTime>,
}

/// The shared engine: store + dispatcher behind one exclusive lock, plus the
/// single in-flight capture flag.
pub struct Engine {
    memory_path: PathBuf,
    state: Mutex<EngineState>,
    listening: AtomicBool,
}

impl Engine {
    pub fn new(memory_path: PathBuf, store: MemoryStore) -> Self {
        Self {
            memory_path,
            state: Mutex::new(EngineState {
                store,
                dispatcher: ActionDispatcher::new(),
                last_interaction: None,
            }),
            listening: AtomicBool::new(false),
        }
    }

    /// Claim the single capture slot. Returns `None` while another capture
    /// session is in flight; a second trigger is a no-op.
    pub fn try_begin_listen(&self) -> Option<ListenGuard<'_>> {
        if self
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(ListenGuard { engine: self })
        } else {
            None
        }
    }

    /// Handle one resolved intent end to end: dispatch, flush, sweep,
    /// refresh. Returns the effect for the caller to deliver outside the lock.
    pub fn handle_intent(
        &self,
        intent: Intent,
        utterance: &str,
        now: NaiveDateTime,
    ) -> EngineResult<ActionEffect> {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        state.last_interaction = Some(now);
        let effect = state
            .dispatcher
            .dispatch(&mut state.store, intent, utterance, now)?;

        // Flush immediately after the mutation, then sweep; a sweep that
        // removed anything gets flushed too.
        persist::save_best_effort(&self.memory_path, &state.store);
        let stats = retention::sweep(&mut state.store.long_term, now);
        context::refresh(&mut state.store, now);
        if !stats.is_noop() {
            persist::save_best_effort(&self.memory_path, &state.store);
        }
        Ok(effect)
    }

    /// Parse a raw NLU response strictly, then handle it.
    pub fn handle_raw_intent(
        &self,
        raw: &str,
        utterance: &str,
        now: NaiveDateTime,
    ) -> EngineResult<ActionEffect> {
        let intent = Intent::parse(raw)?;
        self.handle_intent(intent, utterance, now)
    }

    /// One scheduler tick: complete overdue reminders, collect due-soon ones,
    /// flush if anything transitioned. Collaborator calls happen at the
    /// caller after this returns.
    pub fn scheduler_tick(&self, now: NaiveDateTime) -> TickOutcome {
        let mut state = self.lock_state();
        let outcome = scheduler::scan(&mut state.store, now);
        if outcome.mutated {
            persist::save_best_effort(&self.memory_path, &state.store);
        }
        outcome
    }

    /// Stamp the last user interaction (welcome turn, manual triggers).
    pub fn touch(&self, now: NaiveDateTime) {
        self.lock_state().last_interaction = Some(now);
    }

    pub fn last_interaction(&self) -> Option<NaiveDateTime> {
        self.lock_state().last_interaction
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.lock_state().dispatcher.is_awaiting_confirmation()
    }

    pub fn pending_prompt(&self) -> Option<String> {
        self.lock_state()
            .dispatcher
            .pending()
            .map(|p: &PendingAction| p.prompt.clone())
    }

    /// Run a read-only projection under the shared boundary.
    pub fn with_store<R>(&self, f: impl FnOnce(&MemoryStore) -> R) -> R {
        f(&self.lock_state().store)
    }

    /// The JSON context bundle handed to the NLU collaborator: current time,
    /// long-term tails, and the contextual view.
    pub fn context_bundle(&self, now: NaiveDateTime) -> String {
        let state = self.lock_state();
        let lt = &state.store.long_term;
        let bundle = json!({
            "current_time": crate::timefmt::to_wire(now),
            "long_term": {
                "reminders": lt.reminders,
                "facts": tail(&lt.facts, 5),
                "events": tail(&lt.events, 5),
                "conversations": tail(&lt.conversations, 5),
            },
            "contextual": state.store.contextual,
        });
        bundle.to_string()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn tail<T: Clone>(items: &[T], count: usize) -> Vec<T> {
    items[items.len().saturating_sub(count)..].to_vec()
}

/// RAII guard for the single capture slot; released on every exit path.
pub struct ListenGuard<'a> {
    engine: &'a Engine,
}

impl Drop for ListenGuard<'_> {
    fn drop(&mut self) {
        self.engine.listening.store(false, Ordering::Release);
    }
}

/// Deliver an action effect to the speech/notification collaborators.
/// Must be called without holding the engine lock.
pub fn deliver(effect: &ActionEffect, speaker: &dyn Speaker, notifier: &dyn Notifier) {
    if let Some(response) = &effect.response {
        speaker.speak(response);
    }
    if let Some(notification) = &effect.notification {
        notifier.notify(notification);
    }
}

/// The full "activate voice turn" path: claim the capture slot, transcribe
/// with the configured timeout, resolve the intent with the NLU collaborator,
/// dispatch, deliver.
///
/// Every failure degrades to a logged no-op; the capture slot is released on
/// all exit paths by the guard.
pub fn run_voice_turn(
    engine: &Engine,
    transcriber: &dyn Transcriber,
    nlu: &dyn NluClient,
    speaker: &dyn Speaker,
    notifier: &dyn Notifier,
    listen_timeout: Duration,
    now: NaiveDateTime,
) {
    let Some(_guard) = engine.try_begin_listen() else {
        debug!("capture already in flight, ignoring trigger");
        return;
    };

    let text = match transcriber.transcribe(listen_timeout) {
        TranscribeOutcome::Text(text) => text,
        TranscribeOutcome::Timeout => {
            debug!("no speech detected");
            return;
        }
        TranscribeOutcome::Unintelligible => {
            debug!("could not understand audio");
            return;
        }
        TranscribeOutcome::TransportError(err) => {
            warn!(error = %err, "transcription transport failed");
            return;
        }
    };

    let context = engine.context_bundle(now);
    let raw = match nlu.resolve_intent(&text, &context) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "NLU collaborator failed");
            return;
        }
    };

    match engine.handle_raw_intent(&raw, &text, now) {
        Ok(effect) => deliver(&effect, speaker, notifier),
        Err(err) => warn!(error = %err, "intent rejected"),
    }
}
