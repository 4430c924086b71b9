use super::traits::ChatEngine;
use crate::models::Turn;
use async_trait::async_trait;

/// Canned persona engine with a dad-joke personality.
#[derive(Debug, Default, Clone, Copy)]
pub struct DadEngine;

#[async_trait]
impl ChatEngine for DadEngine {
    async fn reply(&self, _history: &[Turn], user_text: &str) -> String {
        let lower = user_text.to_lowercase();
        if lower.contains("hi") || lower.contains("hello") {
            "Hey kiddo! How's your day?".to_string()
        } else if lower.contains("joke") {
            "Why did the fish blush? Because it saw the ocean's bottom!".to_string()
        } else if lower.contains("bye") {
            "See ya later, alligator!".to_string()
        } else {
            format!("I'm just a simple dad bot. You said: \"{}\"", user_text)
        }
    }

    fn name(&self) -> &'static str {
        "dad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dad_persona_lines() {
        assert_eq!(DadEngine.reply(&[], "Hello!").await, "Hey kiddo! How's your day?");
        assert!(DadEngine.reply(&[], "tell me a joke").await.contains("fish blush"));
        assert_eq!(DadEngine.reply(&[], "bye").await, "See ya later, alligator!");
        assert_eq!(
            DadEngine.reply(&[], "weather?").await,
            "I'm just a simple dad bot. You said: \"weather?\""
        );
    }
}
