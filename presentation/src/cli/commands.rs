//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for aura-chat
#[derive(Parser, Debug)]
#[command(name = "aura-chat")]
#[command(author, version, about = "Aura - chat with an on-device language model")]
#[command(long_about = r#"
Aura streams responses from an on-device language model exposed by a local
host runtime. On startup it probes model availability and creates a single
session; if the runtime is missing or the model is unavailable, the chat
stays visible but submissions are disabled.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./aura.toml         Project-level config
3. ~/.config/aura/config.toml   Global config

Example:
  aura-chat                          # interactive chat
  aura-chat "Summarize this repo"    # one-shot prompt
  aura-chat --top-k 8 --chat
"#)]
pub struct Cli {
    /// Prompt to submit once (omit for interactive chat mode)
    pub prompt: Option<String>,

    /// Start interactive chat mode even when a prompt is given
    #[arg(short, long)]
    pub chat: bool,

    /// Sampling breadth for generation
    #[arg(long, value_name = "N")]
    pub top_k: Option<u32>,

    /// Host runtime executable to spawn
    #[arg(long, value_name = "CMD")]
    pub host: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the startup spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
