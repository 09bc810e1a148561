//! Append-only interaction log.

use crate::error::Result;
use crate::language::Language;
use crate::store::{read_json, write_json_atomic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Every exchange about one translated document, oldest first.
///
/// Turns can only be appended; none are edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionLog {
    pub media_id: String,
    pub title: String,
    pub language: Language,
    turns: Vec<ConversationTurn>,
}

impl InteractionLog {
    pub fn new(media_id: &str, title: &str, language: Language) -> Self {
        Self {
            media_id: media_id.to_string(),
            title: title.to_string(),
            language,
            turns: Vec::new(),
        }
    }

    /// Load the log at `path`, or start an empty one if it does not exist.
    pub fn load_or_new(path: &Path, media_id: &str, title: &str, language: Language) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(media_id, title, language));
        }
        read_json(path)
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let skip = self.turns.len().saturating_sub(n);
        &self.turns[skip..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append `turn` to the log on disk, then refresh the in-memory turns
    /// from what was written.
    ///
    /// The file is re-read first, so turns saved by another session on the
    /// same path are kept. If reading or writing fails the in-memory log is
    /// left as it was.
    pub fn append(&mut self, path: &Path, turn: ConversationTurn) -> Result<()> {
        let mut turns = if path.exists() {
            read_json::<InteractionLog>(path)?.turns
        } else {
            self.turns.clone()
        };
        turns.push(turn);

        let updated = InteractionLog {
            media_id: self.media_id.clone(),
            title: self.title.clone(),
            language: self.language,
            turns,
        };
        write_json_atomic(path, &updated)?;

        self.turns = updated.turns;
        Ok(())
    }
}
