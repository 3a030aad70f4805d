//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleFormatter;
use crate::progress::console::ConsoleProgress;
use aura_application::{ChatController, NoChatProgress};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

/// Interactive chat REPL
pub struct ChatRepl {
    controller: ChatController,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new ChatRepl around an initialized controller
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            show_progress: true,
            history_file: None,
        }
    }

    /// Set whether to render chunks as they stream in
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override the history file location
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self
            .history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("aura").join("history.txt")));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    // Submissions are disabled while no session exists
                    if !self.controller.is_online() {
                        println!("{}", ConsoleFormatter::format_status(false));
                        println!("Submissions are disabled. Restart once the model is set up.");
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(line);

                    self.process_line(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               Aura AI Chat                  │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{}", ConsoleFormatter::format_status(self.controller.is_online()));
        println!();
        // The transcript already holds the greeting and any setup notices
        println!(
            "{}",
            ConsoleFormatter::format_transcript(self.controller.transcript())
        );
        println!();
        println!("Commands:");
        println!("  /help       - Show this help");
        println!("  /status     - Show model status");
        println!("  /transcript - Show the full transcript");
        println!("  /quit       - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /status          - Show model status");
                println!("  /transcript      - Show the full transcript");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                false
            }
            "/status" => {
                println!(
                    "{}",
                    ConsoleFormatter::format_status(self.controller.is_online())
                );
                false
            }
            "/transcript" => {
                println!();
                println!(
                    "{}",
                    ConsoleFormatter::format_transcript(self.controller.transcript())
                );
                println!();
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_line(&mut self, line: &str) {
        self.controller.set_input(line);
        let turns_before = self.controller.transcript().len();

        if self.show_progress {
            self.controller.submit(&ConsoleProgress::new()).await;

            // The streamed response was printed as it arrived; if a failure
            // notice was appended after the placeholder, surface it too.
            let turns = self.controller.transcript().turns();
            if turns.len() >= turns_before + 3
                && let Some(last) = turns.last()
            {
                println!("{}", ConsoleFormatter::format_turn(last));
            }
        } else {
            self.controller.submit(&NoChatProgress).await;

            // Print everything after the echoed user turn
            let turns = self.controller.transcript().turns();
            for turn in turns.iter().skip(turns_before + 1) {
                println!("{}", ConsoleFormatter::format_turn(turn));
            }
        }
        println!();
    }
}
