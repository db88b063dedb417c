//! Default handlers: resolve each effect to a concrete plan without calling
//! any external service. The payload is what a delivery layer would need.

use async_trait::async_trait;
use chrono_tz::Tz;
use serde_json::json;

use crate::action::{CalendarBlock, PlayMusic, Reminder, SendMessage};
use crate::calendar::{CalendarStyle, plan_block};
use crate::dispatch::{ActionHandlers, HandlerOutcome};
use crate::entry::MoodEntry;
use crate::rule::Rule;
use crate::time::resolve_phrase;

#[derive(Debug, Clone)]
pub struct PlannedEffects {
    pub tz: Tz,
    pub style: CalendarStyle,
}

impl PlannedEffects {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            style: CalendarStyle::default(),
        }
    }

    pub fn with_style(mut self, style: CalendarStyle) -> Self {
        self.style = style;
        self
    }
}

impl Default for PlannedEffects {
    fn default() -> Self {
        Self::new(chrono_tz::UTC)
    }
}

#[async_trait]
impl ActionHandlers for PlannedEffects {
    async fn handle_calendar_block(
        &self,
        rule: &Rule,
        block: &CalendarBlock,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome> {
        let event = plan_block(rule, block, entry, self.tz, &self.style);
        Ok(HandlerOutcome {
            message: format!(
                "Calendar block created: {} for {} minutes",
                block.activity, block.duration_minutes
            ),
            payload: Some(serde_json::to_value(&event)?),
        })
    }

    async fn handle_reminder(
        &self,
        _rule: &Rule,
        reminder: &Reminder,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome> {
        let send_at = resolve_phrase(&reminder.time, entry.timestamp, self.tz);
        Ok(HandlerOutcome {
            message: format!("Reminder set: {} {}", reminder.activity, reminder.time),
            payload: Some(json!({
                "activity": reminder.activity,
                "time": reminder.time,
                "send_at": send_at,
                "mood": entry.mood,
            })),
        })
    }

    async fn handle_send_message(
        &self,
        _rule: &Rule,
        message: &SendMessage,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome> {
        let send_at = resolve_phrase(&message.time, entry.timestamp, self.tz);
        Ok(HandlerOutcome {
            message: format!("Message scheduled: {} {}", message.content, message.time),
            payload: Some(json!({
                "content": message.content,
                "time": message.time,
                "send_at": send_at,
                "mood": entry.mood,
            })),
        })
    }

    async fn handle_play_music(
        &self,
        _rule: &Rule,
        music: &PlayMusic,
        entry: &MoodEntry,
    ) -> anyhow::Result<HandlerOutcome> {
        let start_at = resolve_phrase(&music.time, entry.timestamp, self.tz);
        Ok(HandlerOutcome {
            message: format!("Music scheduled: {} {}", music.music, music.time),
            payload: Some(json!({
                "music": music.music,
                "time": music.time,
                "start_at": start_at,
                "mood": entry.mood,
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;
    use crate::dispatch::match_and_execute;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_planned_reminder_payload() {
        let rule = compile_rule("If I'm sad, remind me to call mom at 6pm").unwrap();
        let entry = MoodEntry::new("😔 Sad", Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap());
        let results = match_and_execute(&entry, &[rule], &PlannedEffects::default()).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(results[0].message, "Reminder set: call mom at 6pm");
        let payload = results[0].payload.as_ref().unwrap();
        assert_eq!(payload["send_at"], "2026-03-02T18:00:00Z");
        assert_eq!(payload["mood"], "😔 Sad");
    }

    #[tokio::test]
    async fn test_planned_calendar_block_uses_style() {
        let rule = compile_rule("If I feel tired, block 20 mins for a nap").unwrap();
        let entry = MoodEntry::new("Tired", Utc::now());
        let effects = PlannedEffects::new(chrono_tz::UTC).with_style(CalendarStyle {
            title_suffix: "Auto".to_string(),
            color: "#000000".to_string(),
        });
        let results = match_and_execute(&entry, &[rule], &effects).await;

        assert_eq!(results[0].message, "Calendar block created: a nap for 20 minutes");
        let payload = results[0].payload.as_ref().unwrap();
        assert_eq!(payload["title"], "a nap - Auto");
        assert_eq!(payload["duration_minutes"], 20);
    }
}
