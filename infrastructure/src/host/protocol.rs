//! JSON-RPC protocol types for host runtime communication.
//!
//! This module defines the message structures used in the JSON-RPC 2.0
//! protocol for communicating with the host model runtime process.
//!
//! # Protocol Overview
//!
//! - **Requests**: Client → host (`model.availability`, `session.create`,
//!   `session.prompt`)
//! - **Responses**: Host → client (result or error)
//! - **Notifications**: Host → client (`session.event` carrying streaming
//!   deltas, `session.idle`, `session.error`)
//! - **Incoming requests**: Host → client, answered by the background
//!   bridge (see [`crate::bridge`])

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global request ID counter for JSON-RPC requests.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a unique request ID.
fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with an auto-generated ID.
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Notification from the host (session.event, etc.)
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC response sent from client → host (background bridge acks).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponseOut {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub result: serde_json::Value,
}

impl JsonRpcResponseOut {
    pub fn new(id: u64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// Classification of an incoming JSON-RPC message.
///
/// Used by the transport's background reader task to determine how to
/// dispatch each frame:
///
/// - `Response` → oneshot correlation for pending requests
/// - `IncomingRequest` → offered to the background bridge
/// - `Notification` → session event routing
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response,
    /// An incoming request from the host (has `id` + `method`).
    IncomingRequest { id: u64 },
    /// A notification (has `method`, no `id`).
    Notification,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
///
/// This is a pure function with no side effects, called once per frame in
/// the transport's background reader loop.
pub fn classify_message(json: &serde_json::Value) -> MessageKind {
    let has_id = json.get("id").and_then(|v| v.as_u64());
    let has_method = json.get("method").and_then(|v| v.as_str());

    match (has_id, has_method) {
        (Some(id), Some(_)) => MessageKind::IncomingRequest { id },
        (Some(_), None) => MessageKind::Response,
        _ => MessageKind::Notification,
    }
}

/// Result of the `model.availability` request
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityResult {
    pub availability: String,
}

/// Result of the `session.create` request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResult {
    pub session_id: String,
}

/// Parameters for `session.prompt`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptParams {
    pub session_id: String,
    pub prompt: String,
}

/// Result of the `session.prompt` request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub message_id: String,
}

/// Session event params (from a `session.event` notification)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEventParams {
    pub session_id: String,
    pub event: serde_json::Value,
}
