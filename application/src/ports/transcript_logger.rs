//! Port for structured transcript logging.
//!
//! Defines the [`TranscriptLogger`] trait for recording chat events (user
//! turns, assistant turns, stream failures) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the chat
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured chat event for logging.
pub struct TranscriptEvent {
    /// Event type identifier (e.g., "user_turn", "assistant_turn").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TranscriptEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging chat events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). The `log` method is intentionally synchronous and non-fallible:
/// logging failures never disrupt the chat flow.
pub trait TranscriptLogger: Send + Sync {
    /// Record a chat event.
    fn log(&self, event: TranscriptEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTranscriptLogger;

impl TranscriptLogger for NoTranscriptLogger {
    fn log(&self, _event: TranscriptEvent) {}
}
