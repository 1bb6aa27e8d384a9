//! Typed NLU wire contract so the engine consumes stable intent structures.
//!
//! The external language-model collaborator resolves a raw utterance into a
//! JSON action object. Parsing here is strict: anything that is not a JSON
//! object with a recognized `action` is rejected as [`EngineError::MalformedIntent`]
//! without mutation. There is no brace-scanning recovery for malformed output.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, EngineResult};
use crate::timefmt;

/// Action kinds the NLU collaborator may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SetReminder,
    ReadBackReminders,
    ClearReminders,
    ClearAllMemory,
    RememberFact,
    QueryMemory,
    GeneralQuery,
}

impl ActionKind {
    /// Wire name, also used when recording conversations.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::SetReminder => "set_reminder",
            ActionKind::ReadBackReminders => "read_back_reminders",
            ActionKind::ClearReminders => "clear_reminders",
            ActionKind::ClearAllMemory => "clear_all_memory",
            ActionKind::RememberFact => "remember_fact",
            ActionKind::QueryMemory => "query_memory",
            ActionKind::GeneralQuery => "general_query",
        }
    }

    /// Destructive actions always require explicit confirmation handling.
    pub fn is_destructive(self) -> bool {
        matches!(self, ActionKind::ClearReminders | ActionKind::ClearAllMemory)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured intent as produced by the NLU collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub action: ActionKind,
    /// Natural-language response suggested by the collaborator.
    #[serde(default)]
    pub message: String,
    /// Top-level confirmation flag (destructive actions).
    #[serde(default)]
    pub needs_confirmation: bool,
    /// Action-specific payload; schema depends on `action`.
    #[serde(default)]
    pub data: Value,
}

/// Whether a `set_reminder` payload targets the reminder or event collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    #[default]
    Reminder,
    Event,
}

/// Payload for `set_reminder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub message: String,
    #[serde(with = "timefmt::wire")]
    pub suggested_time: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    /// Payload-level confirmation flag set by the collaborator for ambiguous times.
    #[serde(default)]
    pub needs_confirmation: bool,
    #[serde(default)]
    pub confirmation_message: Option<String>,
}

/// Payload for `remember_fact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactPayload {
    pub content: String,
    pub category: String,
}

/// Payload for `query_memory` and `general_query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub response: String,
}

impl Intent {
    /// Parse a raw NLU response. Strict: no recovery of almost-JSON.
    pub fn parse(raw: &str) -> EngineResult<Intent> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| EngineError::malformed(format!("not valid JSON: {e}")))?;
        if !value.is_object() {
            return Err(EngineError::malformed("intent is not a JSON object"));
        }
        if value.get("action").is_none() {
            return Err(EngineError::malformed("missing `action` field"));
        }
        serde_json::from_value(value).map_err(|e| EngineError::malformed(e.to_string()))
    }

    /// Extract the `set_reminder` payload.
    pub fn reminder_payload(&self) -> EngineResult<ReminderPayload> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| EngineError::malformed(format!("set_reminder payload: {e}")))
    }

    /// Extract the `remember_fact` payload.
    pub fn fact_payload(&self) -> EngineResult<FactPayload> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| EngineError::malformed(format!("remember_fact payload: {e}")))
    }

    /// Extract the response text carried by query actions.
    pub fn response_payload(&self) -> EngineResult<ResponsePayload> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| EngineError::malformed(format!("query payload: {e}")))
    }
}
