//! Action clause parsing: classify the "then" half of a rule sentence and pull
//! out its parameters (duration, activity, time phrase).
//!
//! Templates are tried top to bottom and the first match wins. A calendar
//! template whose duration is not a positive integer counts as a non-match and
//! parsing falls through to the next template.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Minutes used when a calendar block is inferred from keywords alone.
pub const DEFAULT_BLOCK_MINUTES: u32 = 30;

/// Time phrases recognized at the end of an action clause.
///
/// Clock times must be valid: 1-12 with am/pm, 0-23 without, minutes 00-59.
/// "at 25pm" is not a time phrase and stays part of the clause body.
pub(crate) const TIME_PHRASE: &str = concat!(
    r"tomorrow|today|tonight|this\s+evening|later|in\s+the\s+morning|now",
    r"|at\s+(?:1[0-2]|0?[1-9])(?::[0-5]\d)?\s*(?:am|pm)",
    r"|at\s+(?:2[0-3]|[01]?\d)(?::[0-5]\d)?",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CalendarBlock,
    Reminder,
    SendMessage,
    PlayMusic,
    Generic,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CalendarBlock => "calendar_block",
            ActionType::Reminder => "reminder",
            ActionType::SendMessage => "send_message",
            ActionType::PlayMusic => "play_music",
            ActionType::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarBlock {
    pub duration_minutes: u32,
    pub activity: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub activity: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub content: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMusic {
    pub music: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericAction {
    pub free_text: String,
    pub time: String,
}

/// Typed action payload; the variant *is* the action type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum ActionPayload {
    CalendarBlock(CalendarBlock),
    Reminder(Reminder),
    SendMessage(SendMessage),
    PlayMusic(PlayMusic),
    Generic(GenericAction),
}

impl ActionPayload {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionPayload::CalendarBlock(_) => ActionType::CalendarBlock,
            ActionPayload::Reminder(_) => ActionType::Reminder,
            ActionPayload::SendMessage(_) => ActionType::SendMessage,
            ActionPayload::PlayMusic(_) => ActionType::PlayMusic,
            ActionPayload::Generic(_) => ActionType::Generic,
        }
    }

    /// Raw time phrase, `"now"` when the clause carried none.
    pub fn time(&self) -> &str {
        match self {
            ActionPayload::CalendarBlock(a) => &a.time,
            ActionPayload::Reminder(a) => &a.time,
            ActionPayload::SendMessage(a) => &a.time,
            ActionPayload::PlayMusic(a) => &a.time,
            ActionPayload::Generic(a) => &a.time,
        }
    }

    /// One-line description, e.g. "Block 30 mins for meditation".
    pub fn summary(&self) -> String {
        let base = match self {
            ActionPayload::CalendarBlock(a) => {
                format!("Block {} mins for {}", a.duration_minutes, a.activity)
            }
            ActionPayload::Reminder(a) => format!("Remind me to {}", a.activity),
            ActionPayload::SendMessage(a) => format!("Send me {}", a.content),
            ActionPayload::PlayMusic(a) => format!("Play {}", a.music),
            ActionPayload::Generic(a) => a.free_text.clone(),
        };
        match self.time() {
            "now" => base,
            time => format!("{base} {time}"),
        }
    }
}

type Extractor = fn(&Captures, String) -> Option<ActionPayload>;

struct ActionTemplate {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

impl ActionTemplate {
    /// `head` must capture `body`; the optional trailing time phrase is appended here.
    fn new(name: &'static str, head: &str, extract: Extractor) -> Self {
        let pattern = format!(r"{head}(?:\s+(?P<time>{TIME_PHRASE}))?\s*$");
        Self {
            name,
            pattern: Regex::new(&pattern).expect("action template pattern"),
            extract,
        }
    }
}

static ACTION_TEMPLATES: Lazy<Vec<ActionTemplate>> = Lazy::new(|| {
    vec![
        ActionTemplate::new(
            "calendar_block",
            r"\b(?:block|schedule|reserve|book)\s+(?:me\s+)?(?:for\s+)?(?P<amount>\d+)\s*(?P<unit>mins?|minutes?|hours?)\s+(?:for|to\s+do|to)\s+(?P<body>.+?)",
            extract_block,
        ),
        ActionTemplate::new(
            "calendar_slot",
            r"\b(?:give\s+me|make|create)\s+(?:a\s+)?(?P<amount>\d+)\s*(?P<unit>mins?|minutes?|hours?)\s+(?:break|time|slot)\s+(?:for|to)\s+(?P<body>.+?)",
            extract_block,
        ),
        ActionTemplate::new(
            "remind_me",
            r"\b(?:remind|tell|alert)\s+me\s+(?:to\s+)?(?P<body>.+?)",
            extract_reminder,
        ),
        ActionTemplate::new(
            "set_reminder",
            r"\b(?:set|create)\s+(?:a\s+)?reminder\s+(?:to\s+)?(?P<body>.+?)",
            extract_reminder,
        ),
        ActionTemplate::new(
            "send_me",
            r"\b(?:send|give|show)\s+me\s+(?:some\s+)?(?P<body>.+?)",
            extract_message,
        ),
        ActionTemplate::new(
            "suggest",
            r"\b(?:suggest|recommend|find)\s+(?:me\s+)?(?:some\s+)?(?P<body>.+?)",
            extract_message,
        ),
        ActionTemplate::new(
            "play_music",
            r"\b(?:play|put\s+on|start)\s+(?:some\s+)?(?P<body>.+?)(?:\s+music)?",
            extract_music,
        ),
        ActionTemplate::new(
            "notify_me",
            r"\b(?:notify|ping|message)\s+me\s+(?:about|with|to)\s+(?P<body>.+?)",
            extract_message,
        ),
    ]
});

static GENERIC_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?P<body>.+?)(?:\s+(?P<time>{TIME_PHRASE}))?\s*$"))
        .expect("generic action pattern")
});

/// Keyword hints for the generic fallback, highest priority first.
const KEYWORD_HINTS: &[(ActionType, &[&str])] = &[
    (ActionType::CalendarBlock, &["block", "schedule", "calendar"]),
    (ActionType::Reminder, &["remind", "alert"]),
    (ActionType::SendMessage, &["send", "message", "quote"]),
    (ActionType::PlayMusic, &["play", "music"]),
];

fn body(caps: &Captures) -> String {
    caps["body"].trim().to_string()
}

fn extract_block(caps: &Captures, time: String) -> Option<ActionPayload> {
    let amount: u32 = caps["amount"].parse().ok().filter(|n| *n > 0)?;
    let duration_minutes = if caps["unit"].starts_with("hour") {
        amount.checked_mul(60)?
    } else {
        amount
    };
    Some(ActionPayload::CalendarBlock(CalendarBlock {
        duration_minutes,
        activity: body(caps),
        time,
    }))
}

fn extract_reminder(caps: &Captures, time: String) -> Option<ActionPayload> {
    Some(ActionPayload::Reminder(Reminder {
        activity: body(caps),
        time,
    }))
}

fn extract_message(caps: &Captures, time: String) -> Option<ActionPayload> {
    Some(ActionPayload::SendMessage(SendMessage {
        content: body(caps),
        time,
    }))
}

fn extract_music(caps: &Captures, time: String) -> Option<ActionPayload> {
    Some(ActionPayload::PlayMusic(PlayMusic {
        music: body(caps),
        time,
    }))
}

fn time_of(caps: &Captures) -> String {
    caps.name("time")
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "now".to_string())
}

/// Best-guess action type for free text by keyword scan.
pub fn guess_action_type(text: &str) -> ActionType {
    KEYWORD_HINTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(action_type, _)| *action_type)
        .unwrap_or(ActionType::Generic)
}

/// A parsed action clause and its one-line description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub payload: ActionPayload,
    pub summary: String,
}

impl ParsedAction {
    fn from_template(payload: ActionPayload) -> Self {
        let summary = payload.summary();
        Self { payload, summary }
    }
}

/// Keyword-guessed payloads keep the user's own words as their summary, since
/// defaults like [`DEFAULT_BLOCK_MINUTES`] were never written by the user.
fn generic_fallback(clause: &str) -> Option<ParsedAction> {
    let caps = GENERIC_TEMPLATE.captures(clause)?;
    let free_text = body(&caps);
    if free_text.is_empty() {
        return None;
    }
    let time = time_of(&caps);
    let summary = ActionPayload::Generic(GenericAction {
        free_text: free_text.clone(),
        time: time.clone(),
    })
    .summary();

    let payload = match guess_action_type(&free_text) {
        ActionType::CalendarBlock => ActionPayload::CalendarBlock(CalendarBlock {
            duration_minutes: DEFAULT_BLOCK_MINUTES,
            activity: free_text,
            time,
        }),
        ActionType::Reminder => ActionPayload::Reminder(Reminder {
            activity: free_text,
            time,
        }),
        ActionType::SendMessage => ActionPayload::SendMessage(SendMessage {
            content: free_text,
            time,
        }),
        ActionType::PlayMusic => ActionPayload::PlayMusic(PlayMusic {
            music: free_text,
            time,
        }),
        ActionType::Generic => ActionPayload::Generic(GenericAction { free_text, time }),
    };
    Some(ParsedAction { payload, summary })
}

/// Parse an action clause into a typed payload.
///
/// Returns `None` only for an empty clause; anything else lands in the generic
/// fallback at worst.
pub fn parse_action(text: &str) -> Option<ActionPayload> {
    parse_action_clause(text).map(|parsed| parsed.payload)
}

/// [`parse_action`], keeping the summary that belongs with the payload.
pub fn parse_action_clause(text: &str) -> Option<ParsedAction> {
    let clause = normalize(text);
    if clause.is_empty() {
        return None;
    }

    for template in ACTION_TEMPLATES.iter() {
        let Some(caps) = template.pattern.captures(&clause) else {
            continue;
        };
        if let Some(payload) = (template.extract)(&caps, time_of(&caps)) {
            tracing::debug!(template = template.name, clause = %clause, "action template matched");
            return Some(ParsedAction::from_template(payload));
        }
    }

    let parsed = generic_fallback(&clause)?;
    tracing::debug!(
        action_type = parsed.payload.action_type().as_str(),
        clause = %clause,
        "action fell back to keyword scan"
    );
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> CalendarBlock {
        match parse_action(text) {
            Some(ActionPayload::CalendarBlock(b)) => b,
            other => panic!("expected calendar block for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(block("block 1 hour for focus work").duration_minutes, 60);
        assert_eq!(block("block 30 mins for focus work").duration_minutes, 30);
        assert_eq!(block("schedule me for 2 hours to do deep work").duration_minutes, 120);
        assert_eq!(block("block 45 minutes for reading").activity, "reading");
    }

    #[test]
    fn test_block_with_time_phrase() {
        let b = block("block 30 mins for deep breathing tomorrow");
        assert_eq!(b.activity, "deep breathing");
        assert_eq!(b.time, "tomorrow");
    }

    #[test]
    fn test_calendar_slot_phrasing() {
        let b = block("give me a 1 hour slot for rest");
        assert_eq!(b.duration_minutes, 60);
        assert_eq!(b.activity, "rest");

        // No break/time/slot noun: "give me ..." reads as a message request.
        assert_eq!(
            parse_action("give me 30 mins for rest").map(|p| p.action_type()),
            Some(ActionType::SendMessage)
        );

        let b = block("create a 20 min break to stretch");
        assert_eq!(b.duration_minutes, 20);
        assert_eq!(b.activity, "stretch");
    }

    #[test]
    fn test_zero_duration_falls_through() {
        // Not a calendar template match; the keyword scan still sees "block".
        let b = block("block 0 mins for rest");
        assert_eq!(b.duration_minutes, DEFAULT_BLOCK_MINUTES);
        assert_eq!(b.activity, "block 0 mins for rest");
    }

    #[test]
    fn test_reminders() {
        assert_eq!(
            parse_action("remind me to take a break"),
            Some(ActionPayload::Reminder(Reminder {
                activity: "take a break".to_string(),
                time: "now".to_string(),
            }))
        );
        assert_eq!(
            parse_action("remind me to sleep early tonight."),
            Some(ActionPayload::Reminder(Reminder {
                activity: "sleep early".to_string(),
                time: "tonight".to_string(),
            }))
        );
        assert_eq!(
            parse_action("set a reminder to drink water"),
            Some(ActionPayload::Reminder(Reminder {
                activity: "drink water".to_string(),
                time: "now".to_string(),
            }))
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            parse_action("send me motivational quotes at 10am"),
            Some(ActionPayload::SendMessage(SendMessage {
                content: "motivational quotes".to_string(),
                time: "at 10am".to_string(),
            }))
        );
        assert_eq!(
            parse_action("suggest some relaxing music"),
            Some(ActionPayload::SendMessage(SendMessage {
                content: "relaxing music".to_string(),
                time: "now".to_string(),
            }))
        );
        assert_eq!(
            parse_action("notify me about taking a walk"),
            Some(ActionPayload::SendMessage(SendMessage {
                content: "taking a walk".to_string(),
                time: "now".to_string(),
            }))
        );
    }

    #[test]
    fn test_music() {
        assert_eq!(
            parse_action("play calming music"),
            Some(ActionPayload::PlayMusic(PlayMusic {
                music: "calming".to_string(),
                time: "now".to_string(),
            }))
        );
        assert_eq!(
            parse_action("put on some jazz later"),
            Some(ActionPayload::PlayMusic(PlayMusic {
                music: "jazz".to_string(),
                time: "later".to_string(),
            }))
        );
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(
            parse_action("call my mom this evening"),
            Some(ActionPayload::Generic(GenericAction {
                free_text: "call my mom".to_string(),
                time: "this evening".to_string(),
            }))
        );
        assert_eq!(guess_action_type("open my calendar"), ActionType::CalendarBlock);
        assert_eq!(guess_action_type("a quote please"), ActionType::SendMessage);
        assert_eq!(guess_action_type("dance"), ActionType::Generic);
    }

    #[test]
    fn test_empty_clause() {
        assert_eq!(parse_action("  "), None);
        assert_eq!(parse_action("!!"), None);
    }

    #[test]
    fn test_summary() {
        let payload = parse_action("block 30 mins for meditation").unwrap();
        assert_eq!(payload.summary(), "Block 30 mins for meditation");
        let payload = parse_action("remind me to stretch tomorrow").unwrap();
        assert_eq!(payload.summary(), "Remind me to stretch tomorrow");
        assert_eq!(payload.action_type(), ActionType::Reminder);
    }

    #[test]
    fn test_out_of_range_clock_time_is_not_a_time_phrase() {
        assert_eq!(
            parse_action("remind me to call mom at 25pm"),
            Some(ActionPayload::Reminder(Reminder {
                activity: "call mom at 25pm".to_string(),
                time: "now".to_string(),
            }))
        );
        assert_eq!(
            parse_action("remind me to stretch at 99").map(|p| p.time().to_string()),
            Some("now".to_string())
        );
        assert_eq!(
            parse_action("remind me to stretch at 9:30 pm").map(|p| p.time().to_string()),
            Some("at 9:30 pm".to_string())
        );
        assert_eq!(
            parse_action("remind me to stretch at 23:15").map(|p| p.time().to_string()),
            Some("at 23:15".to_string())
        );
    }

    #[test]
    fn test_fallback_summary_keeps_user_words() {
        let parsed = parse_action_clause("schedule me a 1 hour break tomorrow").unwrap();
        assert_eq!(parsed.payload.action_type(), ActionType::CalendarBlock);
        assert_eq!(parsed.summary, "schedule me a 1 hour break tomorrow");

        let parsed = parse_action_clause("block 45 minutes for reading").unwrap();
        assert_eq!(parsed.summary, "Block 45 mins for reading");
    }

    #[test]
    fn test_payload_serializes_with_tag() {
        let payload = parse_action("play lofi").unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action_type"], "play_music");
        assert_eq!(json["music"], "lofi");
        assert_eq!(json["time"], "now");
    }
}
