//! Calendar block planning.
//!
//! Nothing here talks to a calendar service. We describe the event that should
//! be created and leave delivery to the caller (ICS export, a calendar API, ...).

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::action::CalendarBlock;
use crate::entry::MoodEntry;
use crate::mood::mood_label;
use crate::rule::Rule;
use crate::time::resolve_phrase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub description: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub duration_minutes: u32,
    pub color: String,
    /// Popup reminder lead time, if any.
    pub popup_minutes: Option<u32>,
}

/// Presentation settings for rule-driven blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarStyle {
    pub title_suffix: String,
    pub color: String,
}

impl Default for CalendarStyle {
    fn default() -> Self {
        Self {
            title_suffix: "MoodBoard AI Automation".to_string(),
            color: "#4CAF50".to_string(),
        }
    }
}

/// Block planned automatically for a logged mood, independent of any rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarPreset {
    pub mood: &'static str,
    pub event_type: &'static str,
    pub duration_minutes: u32,
    pub description: &'static str,
    pub color: &'static str,
}

const DEEP_WORK: &str = "Focused work session - high energy mood detected";
const REST: &str = "Rest break - low energy mood detected";
const MINDFUL: &str = "Mindful moment - neutral mood detected";

const fn preset(
    mood: &'static str,
    event_type: &'static str,
    duration_minutes: u32,
    description: &'static str,
    color: &'static str,
) -> CalendarPreset {
    CalendarPreset {
        mood,
        event_type,
        duration_minutes,
        description,
        color,
    }
}

pub const CALENDAR_PRESETS: &[CalendarPreset] = &[
    // High energy -> deep work
    preset("Happy", "Deep Work", 60, DEEP_WORK, "#4CAF50"),
    preset("Excited", "Deep Work", 60, DEEP_WORK, "#FF9800"),
    preset("Motivated", "Deep Work", 60, DEEP_WORK, "#2196F3"),
    preset("Energetic", "Deep Work", 60, DEEP_WORK, "#4CAF50"),
    // Low energy -> rest
    preset("Tired", "Rest", 15, REST, "#9C27B0"),
    preset("Stressed", "Rest", 15, REST, "#F44336"),
    preset("Overwhelmed", "Rest", 15, REST, "#FF5722"),
    preset("Exhausted", "Rest", 15, REST, "#795548"),
    preset("Frustrated", "Rest", 15, REST, "#FF5722"),
    preset("Sad", "Rest", 15, REST, "#607D8B"),
    // Neutral -> short mindful pause
    preset("Neutral", "Mindful Break", 10, MINDFUL, "#FFC107"),
];

/// Preset for a logged label. Case-sensitive on the emoji-stripped label.
pub fn calendar_preset(label: &str) -> Option<&'static CalendarPreset> {
    let name = mood_label(label);
    CALENDAR_PRESETS.iter().find(|p| p.mood == name)
}

/// Event for a rule's calendar-block action, starting at the rule's time
/// phrase resolved against the entry timestamp.
pub fn plan_block(
    rule: &Rule,
    block: &CalendarBlock,
    entry: &MoodEntry,
    tz: Tz,
    style: &CalendarStyle,
) -> CalendarEvent {
    let start_utc = resolve_phrase(&block.time, entry.timestamp, tz);
    CalendarEvent {
        title: format!("{} - {}", block.activity, style.title_suffix),
        description: format!(
            "Automated calendar block: {}\nTriggered by mood: {}\nRule: {}",
            rule.action_summary, entry.mood, rule.original_text
        ),
        start_utc,
        end_utc: start_utc + Duration::minutes(block.duration_minutes.into()),
        duration_minutes: block.duration_minutes,
        color: style.color.clone(),
        popup_minutes: None,
    }
}

/// Preset event for a logged mood, starting at the entry timestamp.
pub fn plan_preset(entry: &MoodEntry) -> Option<CalendarEvent> {
    let preset = calendar_preset(&entry.mood)?;
    let note = entry.note.as_deref().unwrap_or("No note");
    Some(CalendarEvent {
        title: format!("{} - MoodBoard AI", preset.event_type),
        description: format!(
            "{}\n\nMood: {}\nNote: {}\nCreated automatically by MoodBoard AI",
            preset.description, entry.mood, note
        ),
        start_utc: entry.timestamp,
        end_utc: entry.timestamp + Duration::minutes(preset.duration_minutes.into()),
        duration_minutes: preset.duration_minutes,
        color: preset.color.to_string(),
        popup_minutes: (preset.event_type == "Deep Work").then_some(5),
    })
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC. Popup reminders become a DISPLAY VALARM.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//MoodBoard AI//EN\n");

    for (i, e) in events.iter().enumerate() {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:moodboard-{}-{}@moodboard\n", dtstart, i));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.title)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        if let Some(minutes) = e.popup_minutes {
            s.push_str("BEGIN:VALARM\nACTION:DISPLAY\n");
            s.push_str(&format!("TRIGGER:-PT{}M\n", minutes));
            s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.title)));
            s.push_str("END:VALARM\n");
        }
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
