//! Infrastructure layer for aura-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod bridge;
pub mod config;
pub mod host;
pub mod logging;

// Re-export commonly used types
pub use bridge::BackgroundBridge;
pub use config::{ConfigLoader, FileConfig, FileLogConfig, FileModelConfig, FileOutputConfig, FileReplConfig};
pub use host::{
    error::{HostError, Result},
    gateway::HostModelGateway,
    session::HostSession,
    transport::StdioTransport,
};
pub use logging::JsonlTranscriptLogger;
