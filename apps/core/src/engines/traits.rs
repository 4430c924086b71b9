use crate::models::Turn;
use async_trait::async_trait;

/// Defines the public interface for a reply backend.
///
/// Implementations are interchangeable: the rule-based engine, the echo
/// baseline and the canned persona all answer through this one operation.
/// A reply is never an error; backends turn their own failures into text.
#[async_trait]
pub trait ChatEngine: Send + Sync + 'static {
    /// Produces a reply to `user_text` given the conversation so far (oldest first).
    ///
    /// `history` is only read, never modified.
    async fn reply(&self, history: &[Turn], user_text: &str) -> String;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
