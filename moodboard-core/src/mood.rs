//! Mood vocabulary: the six canonical categories, the synonym table used to
//! canonicalize free-form mood phrases, and the coarser family lists used when
//! matching a logged mood against stored rules.
//!
//! Everything here is static lookup data. No LLM, no tokenizer: exact lookups
//! first, then a single ordered substring pass.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::text::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Happy,
    Sad,
    Stressed,
    Tired,
    Frustrated,
    Neutral,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 6] = [
        MoodCategory::Happy,
        MoodCategory::Sad,
        MoodCategory::Stressed,
        MoodCategory::Tired,
        MoodCategory::Frustrated,
        MoodCategory::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodCategory::Happy => "happy",
            MoodCategory::Sad => "sad",
            MoodCategory::Stressed => "stressed",
            MoodCategory::Tired => "tired",
            MoodCategory::Frustrated => "frustrated",
            MoodCategory::Neutral => "neutral",
        }
    }

    /// Category of "not <self>".
    ///
    /// Deliberately narrow: only happy/sad flip and stressed relaxes to neutral.
    /// "not tired" or "not frustrated" have no canonical reading.
    pub fn negated(self) -> Option<MoodCategory> {
        match self {
            MoodCategory::Happy => Some(MoodCategory::Sad),
            MoodCategory::Sad => Some(MoodCategory::Happy),
            MoodCategory::Stressed => Some(MoodCategory::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leading intensifiers dropped before lookup. At most one is removed.
const INTENSIFIERS: &[&str] = &[
    "a", "really", "very", "super", "extremely", "quite", "pretty", "somewhat", "bit", "little",
];

/// Surface word -> category.
///
/// Declaration order is load-bearing: the substring pass returns the category
/// of the first entry that overlaps the input, so categories listed earlier win
/// ties. Do not sort this table.
pub const MOOD_SYNONYMS: &[(&str, MoodCategory)] = &[
    // Happy
    ("happy", MoodCategory::Happy),
    ("good", MoodCategory::Happy),
    ("great", MoodCategory::Happy),
    ("joyful", MoodCategory::Happy),
    ("cheerful", MoodCategory::Happy),
    ("excited", MoodCategory::Happy),
    ("positive", MoodCategory::Happy),
    ("upbeat", MoodCategory::Happy),
    ("elated", MoodCategory::Happy),
    ("wonderful", MoodCategory::Happy),
    ("fantastic", MoodCategory::Happy),
    ("amazing", MoodCategory::Happy),
    ("content", MoodCategory::Happy),
    ("pleased", MoodCategory::Happy),
    ("delighted", MoodCategory::Happy),
    ("thrilled", MoodCategory::Happy),
    // Sad
    ("sad", MoodCategory::Sad),
    ("down", MoodCategory::Sad),
    ("depressed", MoodCategory::Sad),
    ("low", MoodCategory::Sad),
    ("unhappy", MoodCategory::Sad),
    ("blue", MoodCategory::Sad),
    ("miserable", MoodCategory::Sad),
    ("dejected", MoodCategory::Sad),
    ("melancholy", MoodCategory::Sad),
    ("gloomy", MoodCategory::Sad),
    ("mournful", MoodCategory::Sad),
    ("sorrowful", MoodCategory::Sad),
    ("disappointed", MoodCategory::Sad),
    ("heartbroken", MoodCategory::Sad),
    ("devastated", MoodCategory::Sad),
    // Stressed
    ("stressed", MoodCategory::Stressed),
    ("anxious", MoodCategory::Stressed),
    ("worried", MoodCategory::Stressed),
    ("overwhelmed", MoodCategory::Stressed),
    ("tense", MoodCategory::Stressed),
    ("nervous", MoodCategory::Stressed),
    ("panicked", MoodCategory::Stressed),
    ("frantic", MoodCategory::Stressed),
    ("pressured", MoodCategory::Stressed),
    ("burdened", MoodCategory::Stressed),
    ("strained", MoodCategory::Stressed),
    ("agitated", MoodCategory::Stressed),
    ("restless", MoodCategory::Stressed),
    ("uneasy", MoodCategory::Stressed),
    ("concerned", MoodCategory::Stressed),
    // Tired
    ("tired", MoodCategory::Tired),
    ("exhausted", MoodCategory::Tired),
    ("drained", MoodCategory::Tired),
    ("weary", MoodCategory::Tired),
    ("fatigued", MoodCategory::Tired),
    ("sleepy", MoodCategory::Tired),
    ("worn out", MoodCategory::Tired),
    ("burnt out", MoodCategory::Tired),
    ("burned out", MoodCategory::Tired),
    ("depleted", MoodCategory::Tired),
    ("spent", MoodCategory::Tired),
    ("drowsy", MoodCategory::Tired),
    ("lethargic", MoodCategory::Tired),
    ("sluggish", MoodCategory::Tired),
    // Frustrated
    ("frustrated", MoodCategory::Frustrated),
    ("angry", MoodCategory::Frustrated),
    ("annoyed", MoodCategory::Frustrated),
    ("irritated", MoodCategory::Frustrated),
    ("mad", MoodCategory::Frustrated),
    ("furious", MoodCategory::Frustrated),
    ("livid", MoodCategory::Frustrated),
    ("irate", MoodCategory::Frustrated),
    ("enraged", MoodCategory::Frustrated),
    ("upset", MoodCategory::Frustrated),
    ("bothered", MoodCategory::Frustrated),
    ("aggravated", MoodCategory::Frustrated),
    ("exasperated", MoodCategory::Frustrated),
    ("incensed", MoodCategory::Frustrated),
    // Neutral
    ("neutral", MoodCategory::Neutral),
    ("okay", MoodCategory::Neutral),
    ("fine", MoodCategory::Neutral),
    ("meh", MoodCategory::Neutral),
    ("average", MoodCategory::Neutral),
    ("normal", MoodCategory::Neutral),
    ("alright", MoodCategory::Neutral),
    ("so-so", MoodCategory::Neutral),
    ("moderate", MoodCategory::Neutral),
    ("stable", MoodCategory::Neutral),
    ("balanced", MoodCategory::Neutral),
    ("calm", MoodCategory::Neutral),
    ("peaceful", MoodCategory::Neutral),
];

/// Match-time families. Kept separate from `MOOD_SYNONYMS` on purpose: two
/// words match if they sit in the same family even when the synonym table
/// would canonicalize them differently.
pub const MOOD_FAMILIES: &[(MoodCategory, &[&str])] = &[
    (MoodCategory::Happy, &["happy", "good", "great", "joyful", "cheerful", "excited"]),
    (MoodCategory::Sad, &["sad", "down", "depressed", "low", "unhappy", "blue"]),
    (MoodCategory::Stressed, &["stressed", "anxious", "worried", "overwhelmed", "tense"]),
    (MoodCategory::Tired, &["tired", "exhausted", "drained", "weary", "fatigued"]),
    (MoodCategory::Frustrated, &["frustrated", "angry", "annoyed", "irritated", "mad"]),
    (MoodCategory::Neutral, &["neutral", "okay", "fine", "meh", "average"]),
];

static SYNONYM_INDEX: Lazy<HashMap<&'static str, MoodCategory>> =
    Lazy::new(|| MOOD_SYNONYMS.iter().copied().collect());

fn lookup(word: &str) -> Option<MoodCategory> {
    SYNONYM_INDEX.get(word).copied()
}

fn strip_intensifier(text: &str) -> &str {
    for word in INTENSIFIERS {
        if let Some(rest) = text.strip_prefix(word) {
            if rest.starts_with(' ') {
                return rest.trim_start();
            }
        }
    }
    text
}

/// Normalized mood word: lowercased, whitespace collapsed, trailing
/// punctuation and one leading intensifier removed.
pub fn mood_word(text: &str) -> String {
    let cleaned = normalize(text);
    let cleaned = cleaned.trim_end_matches(',').trim_end();
    strip_intensifier(cleaned).to_string()
}

/// Map an arbitrary mood phrase onto one of the six categories.
///
/// Resolution order:
/// 1. exact synonym lookup
/// 2. negation (`not x` / `n't x`) of an exact synonym
/// 3. `feeling x` / `like x` prefixes with an exact synonym remainder
/// 4. substring overlap in either direction, first table entry wins
pub fn canonicalize_mood(text: &str) -> Option<MoodCategory> {
    let word = mood_word(text);
    if word.is_empty() {
        return None;
    }

    if let Some(category) = lookup(&word) {
        return Some(category);
    }

    if let Some(rest) = word.strip_prefix("not ").or_else(|| word.strip_prefix("n't ")) {
        // A negated synonym is decided here; an unmapped negation fails rather
        // than falling through to the overlap pass and reading "not tired" as tired.
        if let Some(base) = lookup(strip_intensifier(rest.trim())) {
            return base.negated();
        }
    }

    for prefix in ["feeling ", "like "] {
        if let Some(category) = word.strip_prefix(prefix).and_then(|rest| lookup(rest.trim())) {
            return Some(category);
        }
    }

    MOOD_SYNONYMS
        .iter()
        .find(|(surface, _)| word.contains(surface) || surface.contains(word.as_str()))
        .map(|(_, category)| *category)
}

/// Strip a leading emoji/symbol token from a logged mood label:
/// `"😫 Tired"` -> `"Tired"`. Labels without such a token are returned trimmed.
pub fn mood_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) if !head.chars().any(char::is_alphanumeric) => rest.trim(),
        _ => trimmed,
    }
}

/// Family that lists `word`, if any.
pub fn family_of(word: &str) -> Option<MoodCategory> {
    MOOD_FAMILIES
        .iter()
        .find(|(_, words)| words.contains(&word))
        .map(|(family, _)| *family)
}

/// True when both words are listed in the same family.
pub fn same_family(a: &str, b: &str) -> bool {
    MOOD_FAMILIES
        .iter()
        .any(|(_, words)| words.contains(&a) && words.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exact_synonyms() {
        assert_eq!(canonicalize_mood("exhausted"), Some(MoodCategory::Tired));
        assert_eq!(canonicalize_mood("burnt out"), Some(MoodCategory::Tired));
        assert_eq!(canonicalize_mood("livid"), Some(MoodCategory::Frustrated));
        assert_eq!(canonicalize_mood("thrilled"), Some(MoodCategory::Happy));
        assert_eq!(canonicalize_mood("meh"), Some(MoodCategory::Neutral));
    }

    #[test]
    fn test_cleanup_and_intensifiers() {
        assert_eq!(canonicalize_mood("  Really   SAD! "), Some(MoodCategory::Sad));
        assert_eq!(canonicalize_mood("super happy."), Some(MoodCategory::Happy));
        assert_eq!(canonicalize_mood("a bit anxious"), Some(MoodCategory::Stressed));
    }

    #[test]
    fn test_negation() {
        assert_eq!(canonicalize_mood("not happy"), Some(MoodCategory::Sad));
        assert_eq!(canonicalize_mood("not sad"), Some(MoodCategory::Happy));
        assert_eq!(canonicalize_mood("not stressed"), Some(MoodCategory::Neutral));
        assert_eq!(canonicalize_mood("not tired"), None);
    }

    #[test]
    fn test_prefixes_and_overlap() {
        assert_eq!(canonicalize_mood("feeling down"), Some(MoodCategory::Sad));
        assert_eq!(canonicalize_mood("like i'm exhausted"), Some(MoodCategory::Tired));
        assert_eq!(canonicalize_mood("very stressed out"), Some(MoodCategory::Stressed));
    }

    #[test]
    fn test_overlap_uses_table_order() {
        // "so" is contained in both "so-so" (neutral) and "sorrowful" (sad);
        // sad is declared first.
        assert_eq!(canonicalize_mood("so"), Some(MoodCategory::Sad));
    }

    #[test]
    fn test_unknown_mood_fails() {
        assert_eq!(canonicalize_mood("purple"), None);
        assert_eq!(canonicalize_mood("   "), None);
    }

    #[test]
    fn test_synonym_table_is_unambiguous() {
        let mut seen = HashSet::new();
        for (surface, _) in MOOD_SYNONYMS {
            assert!(seen.insert(*surface), "duplicate surface word: {surface}");
        }
    }

    #[test]
    fn test_mood_label_strips_emoji() {
        assert_eq!(mood_label("😫 Tired"), "Tired");
        assert_eq!(mood_label("Tired"), "Tired");
        assert_eq!(mood_label("  😊  Happy "), "Happy");
        assert_eq!(mood_label("Very tired"), "Very tired");
    }

    #[test]
    fn test_families() {
        assert!(same_family("tired", "exhausted"));
        assert!(!same_family("tired", "sleepy"));
        assert_eq!(family_of("mad"), Some(MoodCategory::Frustrated));
        assert_eq!(family_of("livid"), None);
    }
}
