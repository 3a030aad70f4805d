//! Port definitions for the application layer.
//!
//! Ports define how the chat controller talks to the outside world.
//! Implementations (adapters) live in the infrastructure and presentation
//! layers.

pub mod chat_progress;
pub mod model_gateway;
pub mod transcript_logger;
