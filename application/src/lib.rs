//! Application layer for aura-chat
//!
//! This crate contains the chat controller use case and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_progress::{ChatProgress, NoChatProgress},
    model_gateway::{GatewayError, ModelGateway, ModelSession, StreamHandle},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use use_cases::chat::ChatController;
