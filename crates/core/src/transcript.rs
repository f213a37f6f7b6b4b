//! Conversation Transcript
//!
//! A transcript is the ordered list of role-tagged turns exchanged within one
//! interview session. Its first turn is always the interviewer's system
//! instruction; everything after it is appended in arrival order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed instruction that opens every transcript.
pub const SYSTEM_INSTRUCTION: &str = "You are a friendly but rigorous interviewer running a mock job interview. \
Ask one question at a time, follow up on the candidate's previous answer, and give short, \
constructive feedback before moving on. Keep every reply under 80 words. \
Always answer with a single JSON object and nothing else, shaped exactly like: \
{\"text\": \"<what you say>\", \"facialExpression\": \"smile\" | \"default\" | \"funnyFace\" | \"sad\", \
\"animation\": \"Talking_0\" | \"Talking_1\" | \"Talking_2\" | \"Idle\"}. \
Do not wrap the JSON in markdown.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered turns for one session, seeded with [`SYSTEM_INSTRUCTION`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates a transcript holding only the system instruction.
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::new(Role::System, SYSTEM_INSTRUCTION)],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always `false`: the system turn survives every truncation.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Appends a turn after everything already recorded.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn::new(role, content));
    }

    /// Keeps the system turn plus the most recent `keep` turns.
    ///
    /// Returns `true` when older turns were dropped.
    pub fn truncate_to(&mut self, keep: usize) -> bool {
        let ceiling = keep + 1;
        if self.turns.len() <= ceiling {
            return false;
        }
        let excess = self.turns.len() - ceiling;
        self.turns.drain(1..1 + excess);
        true
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
