//! Matcher & dispatcher: decide which active rules a logged mood fires, then
//! invoke exactly one handler per firing rule.
//!
//! Handlers are an injected capability. Every firing rule is awaited
//! concurrently and failures stay isolated to that rule's result.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{ActionPayload, ActionType, CalendarBlock, PlayMusic, Reminder, SendMessage};
use crate::entry::MoodEntry;
use crate::error::DispatchError;
use crate::mood::{MoodCategory, canonicalize_mood, mood_label, mood_word, same_family};
use crate::rule::Rule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub rule_id: String,
    pub success: bool,
    pub action_type: ActionType,
    pub message: String,
    pub payload: Option<Value>,
    pub error: Option<String>,
}

impl ExecutionResult {
    fn failed(rule: &Rule, error: DispatchError) -> Self {
        Self {
            rule_id: rule.id.clone(),
            success: false,
            action_type: rule.action_type(),
            message: format!("Automation failed: {}", rule.action_summary),
            payload: None,
            error: Some(error.to_string()),
        }
    }
}

/// What a handler reports back for a requested effect.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub message: String,
    pub payload: Option<Value>,
}

/// The four effect handlers the dispatcher can route to.
#[async_trait]
pub trait ActionHandlers: Send + Sync {
    async fn handle_calendar_block(
        &self,
        rule: &Rule,
        block: &CalendarBlock,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome>;

    async fn handle_reminder(
        &self,
        rule: &Rule,
        reminder: &Reminder,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome>;

    async fn handle_send_message(
        &self,
        rule: &Rule,
        message: &SendMessage,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome>;

    async fn handle_play_music(
        &self,
        rule: &Rule,
        music: &PlayMusic,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome>;
}

/// A logged mood, reduced to what matching needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMood {
    pub word: String,
    pub category: Option<MoodCategory>,
}

impl LoggedMood {
    pub fn from_label(raw: &str) -> Self {
        let label = mood_label(raw);
        Self {
            word: mood_word(label),
            category: canonicalize_mood(label),
        }
    }

    /// Canonical category match, or both words in the same family list.
    ///
    /// The family check can fire a rule whose canonical category differs;
    /// the two checks are intentionally not merged.
    pub fn fires(&self, rule: &Rule) -> bool {
        self.category == Some(rule.mood) || same_family(&self.word, &rule.mood_phrase)
    }
}

/// Active rules fired by `entry`, in input order.
pub fn firing_rules<'a>(entry: &MoodEntry, rules: &'a [Rule]) -> Vec<&'a Rule> {
    let logged = LoggedMood::from_label(&entry.mood);
    rules
        .iter()
        .filter(|rule| rule.is_active && logged.fires(rule))
        .collect()
}

/// Run the single handler selected by the rule's action type.
pub async fn dispatch<H>(handlers: &H, rule: &Rule, entry: &MoodEntry) -> ExecutionResult
where
    H: ActionHandlers + ?Sized,
{
    let outcome = match &rule.action {
        ActionPayload::CalendarBlock(block) => handlers.handle_calendar_block(rule, block, entry),
        ActionPayload::Reminder(reminder) => handlers.handle_reminder(rule, reminder, entry),
        ActionPayload::SendMessage(message) => handlers.handle_send_message(rule, message, entry),
        ActionPayload::PlayMusic(music) => handlers.handle_play_music(rule, music, entry),
        ActionPayload::Generic(_) => {
            tracing::warn!(rule_id = %rule.id, "no handler for generic action");
            let error = DispatchError::UnknownActionType(rule.action_type());
            return ExecutionResult::failed(rule, error);
        }
    };

    match AssertUnwindSafe(outcome).catch_unwind().await {
        Ok(Ok(outcome)) => ExecutionResult {
            rule_id: rule.id.clone(),
            success: true,
            action_type: rule.action_type(),
            message: outcome.message,
            payload: outcome.payload,
            error: None,
        },
        Ok(Err(err)) => {
            tracing::warn!(rule_id = %rule.id, error = %err, "action handler failed");
            ExecutionResult::failed(rule, DispatchError::Handler(format!("{err:#}")))
        }
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            tracing::warn!(rule_id = %rule.id, %reason, "action handler panicked");
            ExecutionResult::failed(rule, DispatchError::Handler(reason))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "action handler panicked".to_string()
    }
}

/// Match `entry` against `rules` and run every firing rule's handler.
///
/// Inactive rules are skipped. Results come back in rule order, one per
/// firing rule, whether or not its handler succeeded.
pub async fn match_and_execute<H>(
    entry: &MoodEntry,
    rules: &[Rule],
    handlers: &H,
) -> Vec<ExecutionResult>
where
    H: ActionHandlers + ?Sized,
{
    let firing = firing_rules(entry, rules);
    for rule in &firing {
        tracing::info!(
            rule_id = %rule.id,
            mood = %entry.mood,
            action = %rule.action_summary,
            "rule fired"
        );
    }
    join_all(firing.into_iter().map(|rule| dispatch(handlers, rule, entry))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;
    use anyhow::bail;
    use chrono::Utc;

    struct Echo;

    fn outcome(message: String) -> HandlerOutcome {
        HandlerOutcome {
            message,
            payload: None,
        }
    }

    #[async_trait]
    impl ActionHandlers for Echo {
        async fn handle_calendar_block(
            &self,
            _: &Rule,
            b: &CalendarBlock,
            _: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            Ok(outcome(format!("block {}", b.duration_minutes)))
        }

        async fn handle_reminder(
            &self,
            _: &Rule,
            r: &Reminder,
            _: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            Ok(outcome(format!("remind {}", r.activity)))
        }

        async fn handle_send_message(
            &self,
            _: &Rule,
            _: &SendMessage,
            _: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            bail!("messaging offline")
        }

        async fn handle_play_music(
            &self,
            _: &Rule,
            m: &PlayMusic,
            _: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            Ok(outcome(format!("play {}", m.music)))
        }
    }

    fn entry(mood: &str) -> MoodEntry {
        MoodEntry::new(mood, Utc::now())
    }

    #[test]
    fn test_canonical_match() {
        let rule = compile_rule("When I'm exhausted, play calming music").unwrap();
        assert!(LoggedMood::from_label("😫 Tired").fires(&rule));
        assert!(!LoggedMood::from_label("😊 Happy").fires(&rule));
    }

    #[test]
    fn test_family_match_without_canonical_agreement() {
        let mut rule = compile_rule("If I feel tired, play something soft").unwrap();
        rule.mood = MoodCategory::Neutral;
        assert!(LoggedMood::from_label("😩 exhausted").fires(&rule));
        assert!(!LoggedMood::from_label("😴 sleepy").fires(&rule));
    }

    #[test]
    fn test_inactive_rules_never_fire() {
        let mut rule = compile_rule("If I feel tired, block 30 mins for rest").unwrap();
        rule.deactivate();
        let rules = vec![rule];
        assert!(firing_rules(&entry("😫 Tired"), &rules).is_empty());
    }

    #[tokio::test]
    async fn test_generic_rule_reports_unknown_action() {
        let rule = compile_rule("if happy dance around").unwrap();
        let results = match_and_execute(&entry("😊 Happy"), &[rule], &Echo).await;
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].action_type, ActionType::Generic);
        assert_eq!(results[0].error.as_deref(), Some("Unknown action type"));
    }

    #[tokio::test]
    async fn test_handler_error_is_isolated() {
        let rules = vec![
            compile_rule("If I feel sad, send me a funny video").unwrap(),
            compile_rule("If I feel sad, remind me to call a friend").unwrap(),
        ];
        let results = match_and_execute(&entry("😔 Sad"), &rules, &Echo).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rule_id, rules[0].id);
        assert!(!results[0].success);
        assert_eq!(results[0].error.as_deref(), Some("messaging offline"));
        assert!(results[1].success);
        assert_eq!(results[1].message, "remind call a friend");
    }

    struct Panicky;

    #[async_trait]
    impl ActionHandlers for Panicky {
        async fn handle_calendar_block(
            &self,
            _: &Rule,
            _: &CalendarBlock,
            _: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            panic!("calendar backend exploded")
        }

        async fn handle_reminder(
            &self,
            r: &Rule,
            rem: &Reminder,
            e: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            Echo.handle_reminder(r, rem, e).await
        }

        async fn handle_send_message(
            &self,
            r: &Rule,
            m: &SendMessage,
            e: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            Echo.handle_send_message(r, m, e).await
        }

        async fn handle_play_music(
            &self,
            r: &Rule,
            m: &PlayMusic,
            e: &MoodEntry,
        ) -> anyhow::Result<HandlerOutcome> {
            Echo.handle_play_music(r, m, e).await
        }
    }

    #[tokio::test]
    async fn test_handler_panic_is_isolated() {
        let rules = vec![
            compile_rule("If I feel tired, block 30 mins for rest").unwrap(),
            compile_rule("When I'm exhausted, play calming music").unwrap(),
        ];
        let results = match_and_execute(&entry("😫 Tired"), &rules, &Panicky).await;
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].error.as_deref(), Some("calendar backend exploded"));
        assert!(results[1].success);
        assert_eq!(results[1].action_type, ActionType::PlayMusic);
    }
}
