//! Configuration file schema

use serde::{Deserialize, Serialize};

/// Model-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Host runtime executable to spawn
    pub command: String,
    /// Sampling breadth for generation
    pub top_k: Option<u32>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            command: "aura-host".to_string(),
            top_k: Some(3),
        }
    }
}

/// REPL-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show the startup spinner and streaming output
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Logging-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Path for the diagnostic (tracing) log file
    pub file: Option<String>,
    /// Path for the JSONL transcript log
    pub transcript_file: Option<String>,
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model settings
    pub model: FileModelConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Logging settings
    pub log: FileLogConfig,
}
