use super::traits::ChatEngine;
use crate::models::Turn;
use async_trait::async_trait;

/// Baseline engine that repeats the user's text.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoEngine;

#[async_trait]
impl ChatEngine for EchoEngine {
    async fn reply(&self, _history: &[Turn], user_text: &str) -> String {
        format!("You said: {}", user_text)
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_repeats_input() {
        let reply = EchoEngine.reply(&[Turn::user("ignored")], "ping").await;
        assert_eq!(reply, "You said: ping");
    }
}
