//! Presentation layer for aura-chat
//!
//! This crate contains the CLI definition, the interactive chat REPL,
//! console output formatting, and streaming progress display.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use progress::console::{ConsoleProgress, StartupSpinner};
