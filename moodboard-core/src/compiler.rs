//! Rule compiler: split a sentence into trigger and action clauses with an
//! ordered list of whole-sentence templates, then hand each half to its parser.
//!
//! First matching template wins; there is no backtracking into later
//! templates if the mood or action half then fails to parse.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::action::parse_action_clause;
use crate::error::ParseFailure;
use crate::mood::{canonicalize_mood, mood_word};
use crate::rule::Rule;
use crate::text::normalize;

/// Comma or "then" between the trigger and the action.
const SEPARATOR: &str = r"(?:\s*,\s*|\s+then\s+)";

const LEADS: &str = r"^(?:if|when|whenever)\s+";

/// Single-token mood for the unpunctuated template, with an optional
/// intensifier and the two-word "out" phrases.
const LOOSE_MOOD: &str = concat!(
    r"(?:(?:a|really|very|super|extremely|quite|pretty|somewhat|bit|little)\s+)?",
    r"(?:(?:worn|burnt|burned)\s+out|\S+)",
);

struct TriggerTemplate {
    name: &'static str,
    pattern: Regex,
}

impl TriggerTemplate {
    fn new(name: &'static str, pattern: String) -> Self {
        Self {
            name,
            pattern: Regex::new(&pattern).expect("trigger template pattern"),
        }
    }
}

/// Most to least specific.
static TRIGGER_TEMPLATES: Lazy<Vec<TriggerTemplate>> = Lazy::new(|| {
    vec![
        TriggerTemplate::new(
            "i_feel",
            format!(
                r"{LEADS}i\s+(?:feel|am|'m|get|become|start\s+feeling)\s+(?P<mood>[^,]+?){SEPARATOR}(?P<action>.+)$"
            ),
        ),
        TriggerTemplate::new(
            "im",
            format!(r"{LEADS}i'm\s+(?P<mood>[^,]+?){SEPARATOR}(?P<action>.+)$"),
        ),
        TriggerTemplate::new(
            "i_feel_like",
            format!(r"{LEADS}i\s+feel\s+like\s+(?P<mood>[^,]+?){SEPARATOR}(?P<action>.+)$"),
        ),
        TriggerTemplate::new(
            "i_get",
            format!(r"{LEADS}i\s+get\s+(?P<mood>[^,]+?){SEPARATOR}(?P<action>.+)$"),
        ),
        TriggerTemplate::new(
            "unpunctuated",
            format!(
                r"{LEADS}(?:i\s+(?:feel|am|get|become)|i'm|feel|am|get|become)\s+(?P<mood>{LOOSE_MOOD})\s+(?:then\s+)?(?P<action>.+)$"
            ),
        ),
        TriggerTemplate::new(
            "bare_mood",
            format!(
                r"{LEADS}(?P<mood>[^,\s]+(?:\s+[^,\s]+)*?)(?:\s*,\s*|\s+then\s+|\s+)(?P<action>.+)$"
            ),
        ),
    ]
});

/// Trigger and action halves of a rule sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clauses {
    pub template: &'static str,
    pub mood: String,
    pub action: String,
}

/// Split a normalized sentence into its trigger and action clauses.
pub fn split_clauses(normalized: &str) -> Option<Clauses> {
    TRIGGER_TEMPLATES.iter().find_map(|template| {
        let caps = template.pattern.captures(normalized)?;
        Some(Clauses {
            template: template.name,
            mood: caps["mood"].trim().to_string(),
            action: caps["action"].trim().to_string(),
        })
    })
}

/// Compile a free-text rule. All-or-nothing: either a full rule or a failure.
pub fn compile_rule(sentence: &str) -> Result<Rule, ParseFailure> {
    compile_rule_at(sentence, Utc::now())
}

/// `compile_rule` with an explicit creation time.
pub fn compile_rule_at(sentence: &str, created_at: DateTime<Utc>) -> Result<Rule, ParseFailure> {
    let normalized = normalize(sentence);
    let clauses = split_clauses(&normalized).ok_or(ParseFailure::NoTrigger)?;
    tracing::debug!(
        template = clauses.template,
        mood = %clauses.mood,
        action = %clauses.action,
        "trigger template matched"
    );

    let mood = canonicalize_mood(&clauses.mood).ok_or_else(|| ParseFailure::UnrecognizedMood {
        phrase: clauses.mood.clone(),
    })?;
    let action = parse_action_clause(&clauses.action).ok_or(ParseFailure::EmptyAction)?;

    let rule = Rule::new(sentence, mood, mood_word(&clauses.mood), action.payload, created_at)
        .with_action_summary(action.summary);
    tracing::info!(
        rule_id = %rule.id,
        mood = %rule.mood,
        action_type = rule.action_type().as_str(),
        "compiled rule"
    );
    Ok(rule)
}
