//! Host model session.
//!
//! Provides [`HostSession`] which implements
//! [`ModelSession`](aura_application::ModelSession): one
//! `session.prompt` request per prompt, with the response delivered as a
//! stream of [`StreamEvent`]s translated from `session.event`
//! notifications.

use crate::host::protocol::{JsonRpcRequest, PromptParams, PromptResult};
use crate::host::transport::{SessionChannel, StdioTransport};
use async_trait::async_trait;
use aura_application::ports::model_gateway::{GatewayError, ModelSession, StreamHandle};
use aura_domain::StreamEvent;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, trace};

/// An active session with the host model runtime.
pub struct HostSession {
    transport: Arc<StdioTransport>,
    session_id: String,
    /// Event channel for this session. One prompt is in flight at a time,
    /// so the forwarder task takes the lock for the duration of a stream.
    channel: Arc<Mutex<SessionChannel>>,
}

impl HostSession {
    pub fn new(
        transport: Arc<StdioTransport>,
        session_id: String,
        channel: SessionChannel,
    ) -> Self {
        Self {
            transport,
            session_id,
            channel: Arc::new(Mutex::new(channel)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[async_trait]
impl ModelSession for HostSession {
    async fn prompt_streaming(&self, text: &str) -> Result<StreamHandle, GatewayError> {
        debug!("Sending prompt to session {}", self.session_id);

        let params = PromptParams {
            session_id: self.session_id.clone(),
            prompt: text.to_string(),
        };
        let request = JsonRpcRequest::new(
            "session.prompt",
            Some(
                serde_json::to_value(&params)
                    .map_err(|e| GatewayError::RequestFailed(e.to_string()))?,
            ),
        );

        let response = self
            .transport
            .request(&request)
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
        if let Some(error) = response.error {
            return Err(GatewayError::RequestFailed(error.message));
        }
        if let Some(result) = response.result
            && let Ok(accepted) = serde_json::from_value::<PromptResult>(result)
        {
            trace!("Prompt accepted: {}", accepted.message_id);
        }

        let (tx, rx) = mpsc::channel(32);
        let channel = Arc::clone(&self.channel);
        tokio::spawn(async move {
            forward_stream(channel, tx).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

/// Read session events until a terminal one, translating them into
/// [`StreamEvent`]s on the handle's channel.
///
/// If the transport stops before a terminal event arrives, the sender is
/// dropped without sending one; the consumer observes the closed channel.
async fn forward_stream(channel: Arc<Mutex<SessionChannel>>, tx: mpsc::Sender<StreamEvent>) {
    let mut channel = channel.lock().await;
    let mut full_content = String::new();

    loop {
        let msg = match channel.recv().await {
            Ok(msg) => msg,
            Err(_) => return,
        };

        match msg.event_type.as_str() {
            "assistant.message.delta" => {
                if let Some(content) = delta_content(&msg.event)
                    && !content.is_empty()
                {
                    full_content.push_str(content);
                    if tx.send(StreamEvent::Delta(content.to_string())).await.is_err() {
                        return;
                    }
                }
            }
            "session.idle" => {
                debug!("Stream complete ({} bytes)", full_content.len());
                let _ = tx.send(StreamEvent::Completed(full_content)).await;
                return;
            }
            "session.error" => {
                let message = error_message(&msg.event);
                let _ = tx.send(StreamEvent::Error(message.to_string())).await;
                return;
            }
            other => {
                trace!("Stream: unhandled event '{}'", other);
            }
        }
    }
}

/// Extract the chunk text from an `assistant.message.delta` event.
fn delta_content(event: &serde_json::Value) -> Option<&str> {
    event.get("data")?.get("content")?.as_str()
}

/// Extract the error message from a `session.error` event.
fn error_message(event: &serde_json::Value) -> &str {
    event
        .get("data")
        .and_then(|d| d.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown session error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_content_reads_data_content() {
        let event = serde_json::json!({
            "type": "assistant.message.delta",
            "data": { "content": "Hel" }
        });
        assert_eq!(delta_content(&event), Some("Hel"));
    }

    #[test]
    fn delta_content_none_without_data() {
        let event = serde_json::json!({ "type": "assistant.message.delta" });
        assert_eq!(delta_content(&event), None);
    }

    #[test]
    fn error_message_reads_data_message() {
        let event = serde_json::json!({
            "type": "session.error",
            "data": { "message": "model crashed" }
        });
        assert_eq!(error_message(&event), "model crashed");
    }

    #[test]
    fn error_message_has_fallback() {
        let event = serde_json::json!({ "type": "session.error" });
        assert_eq!(error_message(&event), "Unknown session error");
    }
}
