//! Compiled automation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::{ActionPayload, ActionType};
use crate::mood::MoodCategory;

/// A compiled "if I feel X, do Y" rule.
///
/// Only `is_active` changes after creation; an edited rule is a new rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Input sentence, verbatim.
    pub original_text: String,
    pub mood: MoodCategory,
    /// Trigger clause as written (normalized, intensifier dropped). Used for
    /// family matching alongside `mood`.
    pub mood_phrase: String,
    pub action: ActionPayload,
    pub action_summary: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Rule {
    pub fn new(
        original_text: impl Into<String>,
        mood: MoodCategory,
        mood_phrase: impl Into<String>,
        action: ActionPayload,
        created_at: DateTime<Utc>,
    ) -> Self {
        let action_summary = action.summary();
        Self {
            id: new_rule_id(),
            original_text: original_text.into(),
            mood,
            mood_phrase: mood_phrase.into(),
            action,
            action_summary,
            created_at,
            is_active: true,
        }
    }

    /// Override the payload-derived summary.
    pub fn with_action_summary(mut self, summary: impl Into<String>) -> Self {
        self.action_summary = summary.into();
        self
    }

    pub fn action_type(&self) -> ActionType {
        self.action.action_type()
    }

    /// Soft delete.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

fn new_rule_id() -> String {
    format!("rule_{}", uuid::Uuid::new_v4().simple())
}
