//! Time phrases: the typed form of an action's `time` string, and resolution
//! to a concrete, timezone-aware instant.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const MORNING_HOUR: u32 = 9;
const EVENING_HOUR: u32 = 18;
const NIGHT_HOUR: u32 = 20;
const LATER_HOURS: i64 = 2;

static CLOCK_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^at\s+(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?\s*(?P<meridiem>am|pm)?$")
        .expect("clock time pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePhrase {
    Now,
    Today,
    Tonight,
    ThisEvening,
    Later,
    Tomorrow,
    InTheMorning,
    At {
        hour: u32,
        minute: u32,
        meridiem: Option<Meridiem>,
    },
}

impl TimePhrase {
    /// Parse a phrase as captured by the action parser. Clock times outside
    /// 1-12 (with am/pm) or 0-23 (without) are rejected.
    pub fn parse(text: &str) -> Option<TimePhrase> {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let phrase = match text.as_str() {
            "now" => TimePhrase::Now,
            "today" => TimePhrase::Today,
            "tonight" => TimePhrase::Tonight,
            "this evening" => TimePhrase::ThisEvening,
            "later" => TimePhrase::Later,
            "tomorrow" => TimePhrase::Tomorrow,
            "in the morning" => TimePhrase::InTheMorning,
            _ => {
                let caps = CLOCK_TIME.captures(&text)?;
                let hour: u32 = caps["hour"].parse().ok()?;
                let minute: u32 = match caps.name("minute") {
                    Some(m) => m.as_str().parse().ok()?,
                    None => 0,
                };
                let meridiem = caps.name("meridiem").map(|m| match m.as_str() {
                    "am" => Meridiem::Am,
                    _ => Meridiem::Pm,
                });
                let hour_ok = match meridiem {
                    Some(_) => (1..=12).contains(&hour),
                    None => hour <= 23,
                };
                if !hour_ok || minute > 59 {
                    return None;
                }
                TimePhrase::At {
                    hour,
                    minute,
                    meridiem,
                }
            }
        };
        Some(phrase)
    }

    /// Wall-clock instant this phrase refers to, relative to `reference`.
    ///
    /// Evening/tonight stay on the reference day and collapse to `reference`
    /// once that hour has passed; morning/clock times roll to the next day.
    pub fn resolve(&self, reference: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        match *self {
            TimePhrase::Now | TimePhrase::Today => reference,
            TimePhrase::Later => reference + Duration::hours(LATER_HOURS),
            TimePhrase::ThisEvening => later_today(reference, tz, EVENING_HOUR, 0),
            TimePhrase::Tonight => later_today(reference, tz, NIGHT_HOUR, 0),
            TimePhrase::InTheMorning => next_occurrence(reference, tz, MORNING_HOUR, 0),
            TimePhrase::Tomorrow => {
                let date = reference.with_timezone(&tz).date_naive();
                date.succ_opt()
                    .and_then(|d| local_instant(tz, d, MORNING_HOUR, 0))
                    .unwrap_or(reference)
            }
            TimePhrase::At {
                hour,
                minute,
                meridiem,
            } => next_occurrence(reference, tz, to_24h(hour, meridiem), minute),
        }
    }
}

/// Resolve a raw `time` string; unknown phrases mean "now".
pub fn resolve_phrase(text: &str, reference: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    TimePhrase::parse(text)
        .unwrap_or(TimePhrase::Now)
        .resolve(reference, tz)
}

fn to_24h(hour: u32, meridiem: Option<Meridiem>) -> u32 {
    match meridiem {
        None => hour,
        Some(Meridiem::Am) => hour % 12,
        Some(Meridiem::Pm) => hour % 12 + 12,
    }
}

fn local_instant(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn later_today(reference: DateTime<Utc>, tz: Tz, hour: u32, minute: u32) -> DateTime<Utc> {
    let date = reference.with_timezone(&tz).date_naive();
    match local_instant(tz, date, hour, minute) {
        Some(at) if at > reference => at,
        _ => reference,
    }
}

fn next_occurrence(reference: DateTime<Utc>, tz: Tz, hour: u32, minute: u32) -> DateTime<Utc> {
    let date = reference.with_timezone(&tz).date_naive();
    match local_instant(tz, date, hour, minute) {
        Some(at) if at > reference => at,
        _ => date
            .succ_opt()
            .and_then(|d| local_instant(tz, d, hour, minute))
            .unwrap_or(reference),
    }
}
