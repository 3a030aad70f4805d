//! Chat transcript entities

use serde::{Deserialize, Serialize};

/// Role of a turn in the chat transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the chat transcript (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// True if this turn has no content yet (a streaming placeholder).
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// The ordered sequence of chat turns (Entity)
///
/// Append-only: turns are never reordered or deleted. The single exception
/// to immutability is the trailing turn, whose content may be extended in
/// place via [`append_to_last`](Self::append_to_last) while its owning
/// stream is active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn at the end of the transcript.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Extend the trailing turn's content with an arriving chunk.
    ///
    /// Each call produces exactly one transcript mutation. Calling this on
    /// an empty transcript does nothing.
    pub fn append_to_last(&mut self, chunk: &str) {
        if let Some(last) = self.turns.last_mut() {
            last.content.push_str(chunk);
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_constructors_set_roles() {
        let user = Turn::user("Hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "Hi");

        let assistant = Turn::assistant("");
        assert_eq!(assistant.role, Role::Assistant);
        assert!(assistant.is_empty());
    }

    #[test]
    fn push_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::assistant("Hello"));
        transcript.push(Turn::user("Hi"));

        let turns = transcript.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[1].role, Role::User);
    }

    #[test]
    fn append_to_last_extends_only_the_trailing_turn() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("Hi"));
        transcript.push(Turn::assistant(""));

        transcript.append_to_last("Hel");
        transcript.append_to_last("lo");

        assert_eq!(transcript.turns()[0].content, "Hi");
        assert_eq!(transcript.last().unwrap().content, "Hello");
    }

    #[test]
    fn append_to_last_on_empty_transcript_is_noop() {
        let mut transcript = Transcript::new();
        transcript.append_to_last("lost");
        assert!(transcript.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Turn::user("x")).unwrap();
        assert_eq!(json["role"], "user");
        let json = serde_json::to_value(Turn::assistant("y")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
