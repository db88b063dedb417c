//! Error taxonomy for compilation, validation, dispatch and storage.

use thiserror::Error;

use crate::action::ActionType;

/// Fixed, example-bearing message shown whenever a rule cannot be understood.
pub const RULE_GUIDANCE: &str = "Could not understand the rule. Try examples like:\n\
• \"If I feel stressed, remind me to take a break\"\n\
• \"When I'm sad, send me motivational quotes\"\n\
• \"If I get tired, block 30 mins for rest\"\n\
• \"Whenever I'm frustrated, suggest some music\"";

/// Why the compiler produced no rule. Internal detail; never shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no trigger template matched")]
    NoTrigger,
    #[error("unrecognized mood '{phrase}'")]
    UnrecognizedMood { phrase: String },
    #[error("empty action clause")]
    EmptyAction,
}

/// User-facing rejection of rule text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a rule")]
    Empty,
    #[error("Rule is too long (max {max} characters)")]
    TooLong { max: usize },
    #[error("{guidance}", guidance = RULE_GUIDANCE)]
    Unparseable(#[source] ParseFailure),
}

/// Per-rule dispatch failure, recorded in that rule's result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Unknown action type")]
    UnknownActionType(ActionType),
    #[error("{0}")]
    Handler(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no rule with id {0}")]
    NotFound(String),
    #[error("rule store: {0}")]
    Backend(String),
}
