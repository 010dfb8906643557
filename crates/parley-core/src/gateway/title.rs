//! Chat title generation prompt and post-processing.

use parley_types::chat::truncate_title;

use super::reasoning::strip_reasoning;

/// System prompt for the title generation call.
pub(crate) const TITLE_SYSTEM_PROMPT: &str = "You generate short chat titles (up to 30 characters) \
from the user's first message. The title must be clear and capture the essence of the message. \
Reply with the title only, nothing else.";

/// User turn wrapping the first message for the title call.
pub(crate) fn title_user_prompt(input: &str) -> String {
    format!("Generate a title for a chat that starts with this message: {input}")
}

/// Trim whitespace, surrounding quotes and reasoning markup, then truncate.
///
/// Returns `None` when nothing usable remains.
pub fn clean_title(raw: &str) -> Option<String> {
    let stripped = strip_reasoning(raw);
    let title = stripped
        .trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim();
    if title.is_empty() {
        None
    } else {
        Some(truncate_title(title))
    }
}

/// Title used when the generation call fails or returns nothing.
pub fn fallback_title(input: &str) -> String {
    truncate_title(input.trim())
}
