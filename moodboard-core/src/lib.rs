//! moodboard-core: mood-triggered automation rules.
//!
//! Free-text rules like "If I feel stressed, remind me to take a break" are
//! compiled into typed [`Rule`]s. Logged moods are matched against the active
//! rules and each firing rule is routed to one [`ActionHandlers`] method.

pub mod action;
pub mod calendar;
pub mod compiler;
pub mod dispatch;
pub mod effects;
pub mod entry;
pub mod error;
pub mod mood;
pub mod rule;
pub mod store;
pub mod text;
pub mod time;
pub mod validate;

pub use action::{
    ActionPayload, ActionType, CalendarBlock, GenericAction, ParsedAction, PlayMusic, Reminder,
    SendMessage, parse_action, parse_action_clause,
};
pub use calendar::{
    CALENDAR_PRESETS, CalendarEvent, CalendarPreset, CalendarStyle, calendar_preset,
    events_to_ics, plan_block, plan_preset,
};
pub use compiler::{compile_rule, compile_rule_at};
pub use dispatch::{
    ActionHandlers, ExecutionResult, HandlerOutcome, LoggedMood, firing_rules, match_and_execute,
};
pub use effects::PlannedEffects;
pub use entry::MoodEntry;
pub use error::{DispatchError, ParseFailure, RULE_GUIDANCE, StoreError, ValidationError};
pub use mood::{MoodCategory, canonicalize_mood, mood_label};
pub use rule::Rule;
pub use store::{MemoryRuleStore, RuleStore};
pub use time::{TimePhrase, resolve_phrase};
pub use validate::{MAX_RULE_CHARS, validate};
