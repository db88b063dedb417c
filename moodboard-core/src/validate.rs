//! Input gate in front of the compiler. Turns every failure into one of three
//! user-facing messages.

use crate::compiler::compile_rule;
use crate::error::ValidationError;
use crate::rule::Rule;

/// Longest accepted rule, in characters after trimming.
pub const MAX_RULE_CHARS: usize = 300;

/// Validate and compile rule text.
///
/// Parser detail is dropped on purpose: an unparseable rule always yields the
/// fixed guidance message, with the underlying failure kept as the error source.
pub fn validate(text: &str) -> Result<Rule, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if trimmed.chars().count() > MAX_RULE_CHARS {
        return Err(ValidationError::TooLong {
            max: MAX_RULE_CHARS,
        });
    }

    compile_rule(text).map_err(|failure| {
        tracing::debug!(%failure, "rule rejected");
        ValidationError::Unparseable(failure)
    })
}
