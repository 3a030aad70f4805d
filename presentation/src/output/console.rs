//! Console formatter for the chat transcript

use aura_domain::{Role, Transcript, Turn};
use colored::Colorize;

/// Formats the chat transcript and model status for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete transcript, one turn per block.
    pub fn format_transcript(transcript: &Transcript) -> String {
        transcript
            .turns()
            .iter()
            .map(Self::format_turn)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a single turn with its speaker label.
    ///
    /// A turn without content yet (a streaming placeholder) renders as
    /// `"..."`.
    pub fn format_turn(turn: &Turn) -> String {
        let label = match turn.role {
            Role::User => "You:".cyan().bold(),
            Role::Assistant => "Aura:".yellow().bold(),
        };
        let content = if turn.content.is_empty() {
            "..."
        } else {
            &turn.content
        };
        format!("{} {}", label, content)
    }

    /// Format the model status line derived from session presence.
    pub fn format_status(online: bool) -> String {
        if online {
            format!("Model Status: {}", "Online".green().bold())
        } else {
            format!("Model Status: {}", "Offline".red().bold())
        }
    }
}
