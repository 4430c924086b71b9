//! Context window and echo detection helpers.

use crate::models::Turn;
use std::collections::HashSet;

/// Number of most recent turns the reply rules look at.
pub const CONTEXT_WINDOW: usize = 4;

/// Word-set similarity at or above which the input counts as an echo.
pub const ECHO_THRESHOLD: f64 = 0.85;

/// Topic words shorter or longer than this are skipped.
const TOPIC_MIN_CHARS: usize = 4;
const TOPIC_MAX_CHARS: usize = 14;

/// Filler words that never make a useful topic.
const TOPIC_STOPWORDS: &[&str] = &[
    "hello", "howdy", "good", "morning", "afternoon", "evening", "night", "there", "what", "whats",
    "that", "this", "with", "have", "about", "just", "thanks", "thank", "please", "could", "would", "should", "really", "maybe",
];

/// Lowercases, turns punctuation into whitespace and collects the distinct words.
fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity over the word sets of `a` and `b`.
///
/// Two texts without any words are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f64 {
    let left = word_set(a);
    let right = word_set(b);

    if left.is_empty() && right.is_empty() {
        return 1.0;
    }

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

/// Returns the last `CONTEXT_WINDOW` turns before the current input, oldest first.
///
/// Callers often pass history that already ends with the message being
/// answered; that trailing user turn is not part of the context.
pub fn window<'a>(history: &'a [Turn], user_text: &str) -> &'a [Turn] {
    let end = match history.last() {
        Some(last) if last.is_user && last.text.trim() == user_text.trim() => history.len() - 1,
        _ => history.len(),
    };
    let start = end.saturating_sub(CONTEXT_WINDOW);
    &history[start..end]
}

/// The most recent non-blank assistant line in the window.
pub fn last_engine_line(window: &[Turn]) -> Option<&str> {
    window
        .iter()
        .rev()
        .find(|turn| !turn.is_user && !turn.text.trim().is_empty())
        .map(|turn| turn.text.as_str())
}

/// The most recent user line in the window.
pub fn last_user_line(window: &[Turn]) -> Option<&str> {
    window
        .iter()
        .rev()
        .find(|turn| turn.is_user && !turn.text.trim().is_empty())
        .map(|turn| turn.text.as_str())
}

/// First word of 4-14 letters in `text` that is not filler.
pub fn extract_topic(text: &str) -> Option<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|word| word.trim_matches('\''))
        .find(|word| {
            let len = word.chars().count();
            (TOPIC_MIN_CHARS..=TOPIC_MAX_CHARS).contains(&len)
                && word.chars().all(char::is_alphabetic)
                && !TOPIC_STOPWORDS.contains(word)
        })
        .map(str::to_string)
}
