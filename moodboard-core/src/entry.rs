//! Logged mood entries, as handed to the matcher by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mood log entry. The engine only reads `mood`; the rest is passed through
/// to effect handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// Raw label, optionally emoji-prefixed ("😫 Tired").
    pub mood: String,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
}

impl MoodEntry {
    pub fn new(mood: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            mood: mood.into(),
            note: None,
            timestamp,
            user_id: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }
}
