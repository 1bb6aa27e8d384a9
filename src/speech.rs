//! Collaborator interfaces for speech, notifications, capture, and NLU.
//!
//! The engine core never implements audio, desktop notifications, or
//! language-model calls; it talks to them through these narrow traits.
//! Everything is best-effort: implementations log failures and return, and
//! the engine never holds its exclusive lock across a collaborator call.

use std::time::Duration;
use tracing::info;

/// Default bound on one foreground capture attempt; overridable via config.
pub const LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// A desktop notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub timeout_secs: u64,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            timeout_secs,
        }
    }
}

/// Fire-and-forget text-to-speech rendering.
pub trait Speaker {
    fn speak(&self, text: &str);
}

/// Best-effort desktop notification delivery.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Result of one bounded capture/transcription attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscribeOutcome {
    Text(String),
    /// No speech detected before the timeout elapsed.
    Timeout,
    /// Audio was captured but could not be understood.
    Unintelligible,
    /// The transcription transport failed (service unreachable, etc).
    TransportError(String),
}

/// Blocking speech capture bounded by a fixed timeout.
pub trait Transcriber {
    fn transcribe(&self, timeout: Duration) -> TranscribeOutcome;
}

/// The external language-model collaborator: resolves a raw utterance plus a
/// JSON context bundle into a raw intent-JSON response.
pub trait NluClient {
    fn resolve_intent(&self, utterance: &str, context_json: &str) -> anyhow::Result<String>;
}

/// Speaker that records requests in the trace log. Used where no audio
/// backend is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpeaker;

impl Speaker for TracingSpeaker {
    fn speak(&self, text: &str) {
        info!(target: "jeeves::speech", text, "speak");
    }
}

/// Notifier that records requests in the trace log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            target: "jeeves::speech",
            title = %notification.title,
            message = %notification.message,
            "notify"
        );
    }
}
