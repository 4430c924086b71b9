//! Intent detection using regex patterns and keyword checks.
//!
//! Pure pattern matching, no model required. Every predicate expects
//! lowercase input.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::context::{self, ECHO_THRESHOLD};
use super::math;
use super::nudges;
use crate::models::Turn;

/// Detected intent type, one per reply rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The user repeated the last engine line back
    EchoGuard,
    /// Greeting (hi, hello, good morning, etc.)
    Greeting,
    /// Thanks (thanks, thank you, thx)
    Thanks,
    /// Farewell (bye, gtg, good night, etc.)
    Goodbye,
    /// Arithmetic expression
    Math,
    /// Asking for the current time or date
    Clock,
    /// Matches a canned domain topic
    DomainNudge,
    /// Anything else
    Reflect,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns a human-readable label for the intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::EchoGuard => "echo_guard",
            Intent::Greeting => "greeting",
            Intent::Thanks => "thanks",
            Intent::Goodbye => "goodbye",
            Intent::Math => "math",
            Intent::Clock => "clock",
            Intent::DomainNudge => "domain_nudge",
            Intent::Reflect => "reflect",
        }
    }
}

// NOTE: expect() is fine here, the patterns are constants.
pub(crate) static GREETING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hi|hey|hello|yo|howdy|good (morning|afternoon|evening))\b")
        .expect("Invalid regex: greeting prefixes")
});

static GOODBYE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(bye|goodbye|gtg|good ?night|see ya|see you later|laters|signing off)\b")
        .expect("Invalid regex: goodbye phrases")
});

static CLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(what time is it|what's the time|what is the time|what('s| is) (the |today's )?(date|day))\b")
        .expect("Invalid regex: clock questions")
});

const THANKS_WORDS: &[&str] = &["thanks", "thank you", "thx"];

/// Lowercases input and folds typographic apostrophes.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase().replace('’', "'")
}

pub fn is_greeting(lower: &str) -> bool {
    GREETING_PATTERN.is_match(lower)
}

pub fn is_thanks(lower: &str) -> bool {
    THANKS_WORDS.iter().any(|w| lower.contains(w))
}

pub fn is_goodbye(lower: &str) -> bool {
    GOODBYE_PATTERN.is_match(lower)
}

pub fn is_math(lower: &str) -> bool {
    math::extract_expression(lower).is_some()
}

pub fn is_clock_question(lower: &str) -> bool {
    CLOCK_PATTERN.is_match(lower)
}

pub fn is_domain_topic(lower: &str) -> bool {
    nudges::find_nudge(lower).is_some()
}

/// True when `input` mostly repeats the last thing the engine said.
pub fn is_echo(input: &str, window: &[Turn]) -> bool {
    context::last_engine_line(window)
        .map(|line| context::similarity(input, line) >= ECHO_THRESHOLD)
        .unwrap_or(false)
}
