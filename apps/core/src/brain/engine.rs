//! The rule-based offline reply engine.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::intent::Intent;
use super::rules::{self, ReplyContext, RULES};
use crate::engines::ChatEngine;
use crate::models::Turn;

/// Reply for blank input.
pub const BLANK_INPUT_REPLY: &str = "Try typing a little more. I'm listening.";

/// Offline reasoning engine: a fixed, ordered list of reply rules.
///
/// Stateless between calls; every reply is a function of the history and
/// the input. The optional thinking delay is an async sleep, so dropping the
/// future cancels the reply cleanly.
#[derive(Debug, Clone, Default)]
pub struct BrainsEngine {
    thinking_delay: Duration,
}

impl BrainsEngine {
    pub fn new(thinking_delay: Duration) -> Self {
        Self { thinking_delay }
    }

    /// The rule order, highest priority first.
    pub fn precedence() -> Vec<Intent> {
        RULES.iter().map(|rule| rule.intent).collect()
    }

    /// Which rule would answer `user_text`. `None` for blank input.
    pub fn classify(history: &[Turn], user_text: &str) -> Option<Intent> {
        let input = user_text.trim();
        if input.is_empty() {
            return None;
        }
        Some(rules::select(&ReplyContext::new(history, input)).intent)
    }

    /// Builds the reply text without the thinking delay.
    pub fn compose(history: &[Turn], user_text: &str) -> String {
        let input = user_text.trim();
        if input.is_empty() {
            return BLANK_INPUT_REPLY.to_string();
        }

        let ctx = ReplyContext::new(history, input);
        let rule = rules::select(&ctx);
        debug!(intent = %rule.intent, window = ctx.window.len(), "Reply rule selected");
        (rule.respond)(&ctx).to_string()
    }
}

#[async_trait]
impl ChatEngine for BrainsEngine {
    async fn reply(&self, history: &[Turn], user_text: &str) -> String {
        if !self.thinking_delay.is_zero() {
            tokio::time::sleep(self.thinking_delay).await;
        }
        Self::compose(history, user_text)
    }

    fn name(&self) -> &'static str {
        "brains"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            BrainsEngine::precedence(),
            vec![
                Intent::EchoGuard,
                Intent::Greeting,
                Intent::Thanks,
                Intent::Goodbye,
                Intent::Math,
                Intent::Clock,
                Intent::DomainNudge,
                Intent::Reflect,
            ]
        );
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(BrainsEngine::classify(&[], "   "), None);
        assert_eq!(BrainsEngine::compose(&[], "\t\n"), BLANK_INPUT_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_thinking_delay_is_awaited() {
        let engine = BrainsEngine::new(Duration::from_millis(500));
        let start = tokio::time::Instant::now();
        let reply = engine.reply(&[], "2+2").await;
        assert!(reply.contains('4'));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_can_be_cancelled() {
        let engine = BrainsEngine::new(Duration::from_secs(10));
        let result = tokio::time::timeout(Duration::from_millis(10), engine.reply(&[], "hello")).await;
        assert!(result.is_err());
    }
}
