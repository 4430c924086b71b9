//! The ordered reply rule table.
//!
//! Rules are checked top to bottom and the first match answers, so the
//! order of [`RULES`] is the precedence of the engine.

use chrono::Local;
use std::fmt;

use super::context;
use super::intent::{self, Intent};
use super::math::{self, MathError};
use super::nudges;
use crate::models::Turn;

/// Reflected input longer than this is cut.
const REFLECT_MAX_CHARS: usize = 140;

/// Inputs shorter than this get a "go deeper" prompt.
const SHORT_INPUT_CHARS: usize = 12;

/// Everything a rule may look at for one reply.
pub struct ReplyContext<'a> {
    /// Trimmed user input.
    pub input: &'a str,
    /// Normalized lowercase input.
    pub lower: String,
    /// Recent turns before the input, oldest first.
    pub window: &'a [Turn],
}

impl<'a> ReplyContext<'a> {
    pub fn new(history: &'a [Turn], input: &'a str) -> Self {
        Self {
            input,
            lower: intent::normalize(input),
            window: context::window(history, input),
        }
    }
}

/// A reply: a main line plus an optional follow-up prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub main: String,
    pub follow_up: Option<String>,
}

impl Reply {
    fn new(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            follow_up: None,
        }
    }

    fn with_follow_up(mut self, follow_up: impl Into<String>) -> Self {
        self.follow_up = Some(follow_up.into());
        self
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.follow_up {
            Some(follow_up) => write!(f, "{}\n→ {}", self.main, follow_up),
            None => write!(f, "{}", self.main),
        }
    }
}

pub struct Rule {
    pub intent: Intent,
    pub matches: fn(&ReplyContext<'_>) -> bool,
    pub respond: fn(&ReplyContext<'_>) -> Reply,
}

pub static RULES: &[Rule] = &[
    Rule {
        intent: Intent::EchoGuard,
        matches: |ctx| intent::is_echo(ctx.input, ctx.window),
        respond: echo_guard,
    },
    Rule {
        intent: Intent::Greeting,
        matches: |ctx| intent::is_greeting(&ctx.lower),
        respond: greeting,
    },
    Rule {
        intent: Intent::Thanks,
        matches: |ctx| intent::is_thanks(&ctx.lower),
        respond: thanks,
    },
    Rule {
        intent: Intent::Goodbye,
        matches: |ctx| intent::is_goodbye(&ctx.lower),
        respond: goodbye,
    },
    Rule {
        intent: Intent::Math,
        matches: |ctx| intent::is_math(&ctx.lower),
        respond: solve,
    },
    Rule {
        intent: Intent::Clock,
        matches: |ctx| intent::is_clock_question(&ctx.lower),
        respond: clock,
    },
    Rule {
        intent: Intent::DomainNudge,
        matches: |ctx| intent::is_domain_topic(&ctx.lower),
        respond: nudge,
    },
    Rule {
        intent: Intent::Reflect,
        matches: |_| true,
        respond: reflect,
    },
];

/// First rule that matches. The last rule always matches.
pub fn select(ctx: &ReplyContext<'_>) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.matches)(ctx))
        .unwrap_or(&RULES[RULES.len() - 1])
}

fn echo_guard(_ctx: &ReplyContext<'_>) -> Reply {
    Reply::new("That's pretty much what I just said, so let's not go in circles.")
        .with_follow_up("Ask me something deeper about it: a why, a how, or a what-if.")
}

fn greeting(ctx: &ReplyContext<'_>) -> Reply {
    match context::last_user_line(ctx.window) {
        Some(previous) => match context::extract_topic(previous) {
            Some(topic) => Reply::new(format!("Welcome back! Last time you brought up “{}”.", topic))
                .with_follow_up("Want to keep going on it, or start something new?"),
            None => Reply::new("Welcome back! What's on your mind?")
                .with_follow_up("We can do some math, plan a project, or think out loud."),
        },
        None => Reply::new("Good to see you! What's on your mind?")
            .with_follow_up("We can do some math, plan a project, or think out loud."),
    }
}

fn thanks(_ctx: &ReplyContext<'_>) -> Reply {
    Reply::new("Anytime! Happy to help.").with_follow_up("Want to keep going, or try something new?")
}

fn goodbye(_ctx: &ReplyContext<'_>) -> Reply {
    Reply::new("See you soon! I'll be right here when you want to pick it back up.")
}

fn solve(ctx: &ReplyContext<'_>) -> Reply {
    let Some(expr) = math::extract_expression(&ctx.lower) else {
        return math_failure();
    };
    match math::evaluate(&expr) {
        Ok(value) => Reply::new(format!("Looks like {} = {}.", expr, math::format_result(value)))
            .with_follow_up("Want to try a harder one?"),
        Err(MathError::DivisionByZero) => {
            Reply::new("Dividing by zero isn't defined, so there's no number I can give you for that.")
                .with_follow_up("Want to try a different divisor?")
        }
        Err(_) => math_failure(),
    }
}

fn math_failure() -> Reply {
    Reply::new("That looks like math, but I couldn't quite solve it safely.")
        .with_follow_up("Try writing it like 12 * (3 + 4).")
}

fn clock(_ctx: &ReplyContext<'_>) -> Reply {
    let now = Local::now();
    Reply::new(format!("It's {} right now.", now.format("%A, %B %-d, %Y at %-I:%M %p")))
}

fn nudge(ctx: &ReplyContext<'_>) -> Reply {
    match nudges::find_nudge(&ctx.lower) {
        Some(nudge) => Reply::new(nudge.advice).with_follow_up(nudge.follow_up),
        None => reflect(ctx),
    }
}

fn reflect(ctx: &ReplyContext<'_>) -> Reply {
    let probe = nudges::probe_for(&ctx.lower);
    let length = ctx.input.chars().count();

    if length < SHORT_INPUT_CHARS {
        return Reply::new(format!("Tell me more about “{}”. Can we go one layer deeper?", ctx.input))
            .with_follow_up(probe);
    }

    let reflected = if length > REFLECT_MAX_CHARS {
        let cut: String = ctx.input.chars().take(REFLECT_MAX_CHARS).collect();
        format!("{}…", cut.trim_end())
    } else {
        ctx.input.to_string()
    };
    Reply::new(format!("You're thinking about “{}”.", reflected)).with_follow_up(probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_for(history: &[Turn], input: &str) -> Intent {
        select(&ReplyContext::new(history, input)).intent
    }

    #[test]
    fn test_rules_end_with_catch_all() {
        assert_eq!(RULES.last().map(|r| r.intent), Some(Intent::Reflect));
        assert_eq!(intent_for(&[], "zzz"), Intent::Reflect);
    }

    #[test]
    fn test_precedence_greeting_beats_thanks() {
        assert_eq!(intent_for(&[], "hi, thanks for yesterday"), Intent::Greeting);
        assert_eq!(intent_for(&[], "thanks, bye"), Intent::Thanks);
        assert_eq!(intent_for(&[], "bye, my aquarium waits"), Intent::Goodbye);
        assert_eq!(intent_for(&[], "12 * 4"), Intent::Math);
        assert_eq!(intent_for(&[], "what's the date"), Intent::Clock);
        assert_eq!(intent_for(&[], "my betta is sulking"), Intent::DomainNudge);
    }

    #[test]
    fn test_reply_display() {
        let reply = Reply::new("Main").with_follow_up("Next?");
        assert_eq!(reply.to_string(), "Main\n→ Next?");
        assert_eq!(Reply::new("Only").to_string(), "Only");
    }

    #[test]
    fn test_reflect_truncates_long_input() {
        let long = "a".repeat(300);
        let ctx = ReplyContext::new(&[], &long);
        let reply = reflect(&ctx);
        assert!(reply.main.contains(&format!("{}…", "a".repeat(REFLECT_MAX_CHARS))));
        assert!(!reply.main.contains(&"a".repeat(REFLECT_MAX_CHARS + 1)));
    }

    #[test]
    fn test_reflect_short_input_asks_for_more() {
        let ctx = ReplyContext::new(&[], "rockets");
        assert!(reflect(&ctx).main.contains("one layer deeper"));
    }
}
