//! Chat client: routes a conversation to the remote endpoint when an API
//! key is configured, otherwise to the offline reply engine.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::config::RemoteConfig;
use crate::engines::ChatEngine;
use crate::error::AppError;
use crate::models::{ChatMessage, Role, Turn};

/// Reply when the conversation has nothing to answer yet.
pub const EMPTY_CONVERSATION_REPLY: &str = "Hi, I'm LittleGenius. Tell me something and I'll help.";

/// Substituted when an engine comes back with blank text.
pub const BLANK_REPLY_FALLBACK: &str = "I'm thinking, but didn't find words yet. Try rephrasing?";

const NO_REPLY: &str = "No reply.";
const UNPARSABLE_REPLY: &str = "Couldn't parse reply.";

#[derive(Serialize)]
struct ChatPayload<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Clone)]
pub struct ChatClient {
    engine: Arc<dyn ChatEngine>,
    remote: Option<RemoteConfig>,
    http: Client,
}

impl ChatClient {
    /// A client that always answers with the offline engine.
    pub fn offline(engine: Arc<dyn ChatEngine>) -> Self {
        Self::new(engine, None)
    }

    pub fn new(engine: Arc<dyn ChatEngine>, remote: Option<RemoteConfig>) -> Self {
        Self {
            engine,
            remote,
            http: Client::new(),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Produces the assistant reply for `messages` (oldest first).
    ///
    /// Only transport failures on the remote path are errors; everything
    /// else comes back as display text.
    #[instrument(skip(self, messages), fields(messages = messages.len(), remote = self.remote.is_some()))]
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<String, AppError> {
        match &self.remote {
            Some(remote) => self.send_remote(remote, messages).await,
            None => Ok(self.send_offline(messages).await),
        }
    }

    async fn send_offline(&self, messages: &[ChatMessage]) -> String {
        let history: Vec<Turn> = messages.iter().map(ChatMessage::to_turn).collect();
        let user_text = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .or_else(|| messages.last())
            .map(|m| m.content.as_str())
            .unwrap_or("");

        if user_text.trim().is_empty() {
            return EMPTY_CONVERSATION_REPLY.to_string();
        }

        debug!(engine = self.engine.name(), "Answering offline");
        let reply = self.engine.reply(&history, user_text).await;
        if reply.trim().is_empty() {
            BLANK_REPLY_FALLBACK.to_string()
        } else {
            reply
        }
    }

    fn build_request(&self, remote: &RemoteConfig, messages: &[ChatMessage]) -> Result<reqwest::RequestBuilder, AppError> {
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", remote.api_key))
            .map_err(|e| AppError::Config(format!("Invalid API key: {}", e)))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(self
            .http
            .post(remote.endpoint.clone())
            .headers(headers)
            .timeout(remote.timeout)
            .json(&ChatPayload { messages }))
    }

    async fn send_remote(&self, remote: &RemoteConfig, messages: &[ChatMessage]) -> Result<String, AppError> {
        info!("Posting {} messages to {}", messages.len(), remote.endpoint);

        let res = self.build_request(remote, messages)?.send().await?;
        let status = res.status();
        if !status.is_success() {
            error!("Chat endpoint answered with status {}", status);
            return Ok(format!("Network error {}", status.as_u16()));
        }

        let body = res.text().await?;
        let reply = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => json["reply"].as_str().unwrap_or("").trim().to_string(),
            Err(e) => {
                error!("Chat endpoint sent an unparsable body: {}", e);
                return Ok(UNPARSABLE_REPLY.to_string());
            }
        };

        if reply.is_empty() {
            Ok(NO_REPLY.to_string())
        } else {
            Ok(reply)
        }
    }
}
