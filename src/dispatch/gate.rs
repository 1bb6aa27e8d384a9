//! Confirmation gate: at most one pending action awaiting an explicit yes.
//!
//! The gate is an explicit two-state machine, not a nullable field checked ad
//! hoc. A non-affirmative follow-up discards the pending action and is handled
//! as a fresh intent; there is no retry and no timeout.

use crate::intent::Intent;

/// Whole-word tokens that count as user confirmation. Matching is word-exact,
/// so "yesterday" or "no thanks" never confirm.
const AFFIRMATIVE_TOKENS: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "sure",
    "confirm",
    "affirmative",
    "ok",
    "okay",
];

/// True if the utterance contains an affirmative token.
pub fn contains_affirmative(utterance: &str) -> bool {
    utterance
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| {
            let word = word.to_lowercase();
            AFFIRMATIVE_TOKENS.contains(&word.as_str())
        })
}

/// The intent held while waiting for confirmation, stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    pub intent: Intent,
    /// The confirmation prompt that was spoken when the gate armed.
    pub prompt: String,
}

/// Gate state: idle, or holding exactly one pending action.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GateState {
    #[default]
    Idle,
    AwaitingConfirmation(PendingAction),
}

/// Holds at most one pending action system-wide.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationGate {
    state: GateState,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, GateState::AwaitingConfirmation(_))
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match &self.state {
            GateState::AwaitingConfirmation(pending) => Some(pending),
            GateState::Idle => None,
        }
    }

    /// Arm the gate with a new pending action, superseding any previous one.
    pub fn arm(&mut self, intent: Intent, prompt: impl Into<String>) {
        self.state = GateState::AwaitingConfirmation(PendingAction {
            intent,
            prompt: prompt.into(),
        });
    }

    /// Take the pending action, returning the gate to idle.
    pub fn take(&mut self) -> Option<PendingAction> {
        match std::mem::take(&mut self.state) {
            GateState::AwaitingConfirmation(pending) => Some(pending),
            GateState::Idle => None,
        }
    }

    /// Discard any pending action.
    pub fn disarm(&mut self) {
        self.state = GateState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ActionKind;
    use rstest::rstest;

    fn clear_intent() -> Intent {
        Intent {
            action: ActionKind::ClearReminders,
            message: String::new(),
            needs_confirmation: true,
            data: serde_json::Value::Null,
        }
    }

    #[rstest]
    #[case::plain_yes("yes", true)]
    #[case::yes_please("Yes, please do", true)]
    #[case::sure("sure thing", true)]
    #[case::okay("okay fine", true)]
    #[case::no("no thanks", false)]
    #[case::yesterday("what happened yesterday", false)]
    #[case::new_intent("remind me to call mom", false)]
    #[case::empty("", false)]
    fn affirmative_detection(#[case] utterance: &str, #[case] expected: bool) {
        assert_eq!(contains_affirmative(utterance), expected);
    }

    #[test]
    fn gate_holds_at_most_one_pending_action() {
        let mut gate = ConfirmationGate::new();
        assert!(!gate.is_awaiting());

        gate.arm(clear_intent(), "clear 3 reminders?");
        assert!(gate.is_awaiting());

        let mut second = clear_intent();
        second.action = ActionKind::ClearAllMemory;
        gate.arm(second, "clear everything?");

        let pending = gate.take().expect("pending");
        assert_eq!(pending.intent.action, ActionKind::ClearAllMemory);
        assert!(!gate.is_awaiting());
    }

    #[test]
    fn take_on_idle_gate_is_none() {
        let mut gate = ConfirmationGate::new();
        assert!(gate.take().is_none());
    }

    #[test]
    fn disarm_discards_pending() {
        let mut gate = ConfirmationGate::new();
        gate.arm(clear_intent(), "?");
        gate.disarm();
        assert!(gate.take().is_none());
    }
}
