//! Model Gateway port
//!
//! Defines the interface for the host-provided on-device model capability.

use async_trait::async_trait;
use aura_domain::{Availability, SessionConfig, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during model gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to the on-device model capability
///
/// This port defines how the application layer probes and connects to the
/// host model runtime. Implementations (adapters) live in the
/// infrastructure layer.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Probe whether the on-device model is usable.
    ///
    /// Adapters fail closed: an entirely absent capability is reported as
    /// `Ok(Availability::Unsupported)`, not as an error.
    async fn availability(&self) -> Result<Availability, GatewayError>;

    /// Create a session with the on-device model.
    ///
    /// Called only after [`availability`](Self::availability) reported
    /// `Available`.
    async fn start_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Box<dyn ModelSession>, GatewayError>;
}

/// Handle for receiving streaming events from a model session.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The stream is finite and not
/// restartable; a fresh [`ModelSession::prompt_streaming`] call must be
/// made per prompt.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    ///
    /// Useful when streaming display is not needed (e.g. one-shot tooling).
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without a terminal event — the host died mid-stream
        Err(GatewayError::TransportClosed)
    }
}

/// An active model session
///
/// Opaque capability representing a live connection to the language model.
/// At most one instance is alive at a time; created once at startup and
/// never recreated automatically.
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// Send a prompt and receive the response as a stream of text chunks.
    async fn prompt_streaming(&self, text: &str) -> Result<StreamHandle, GatewayError>;
}
