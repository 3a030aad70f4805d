//! Chat progress port
//!
//! Streaming callbacks for the rendering surface. The controller notifies
//! this port as chunks arrive so a UI can display the response
//! incrementally; the port never mutates transcript state.

/// Observer for streaming chat responses.
pub trait ChatProgress: Send + Sync {
    /// The model has started responding to a submission.
    fn on_stream_start(&self) {}

    /// A text chunk arrived and was appended to the transcript.
    fn on_chunk(&self, _chunk: &str) {}

    /// The stream ended (successfully or not).
    fn on_stream_end(&self) {}
}

/// No-op implementation for tests and headless use.
pub struct NoChatProgress;

impl ChatProgress for NoChatProgress {}
