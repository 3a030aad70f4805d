//! Error types for the host runtime adapter

use thiserror::Error;

/// Result type alias for host runtime operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can occur when communicating with the host model runtime
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to spawn host runtime: {0}")]
    SpawnError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport closed")]
    TransportClosed,
}
