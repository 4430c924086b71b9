//! Chat Session Tests
//!
//! Drives `ChatSession` end to end against a temp-dir store: welcome seeding,
//! the send flow, the single in-flight guard, failure replies and undo.

use crate::client::ChatClient;
use crate::config::RemoteConfig;
use crate::engines::{ChatEngine, EchoEngine};
use crate::models::{SyncStatus, Turn};
use crate::session::{ChatSession, WELCOME_MESSAGE};
use crate::store::ChatStore;
use crate::BrainsEngine;
use async_trait::async_trait;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tokio::time::{sleep, Duration};
use url::Url;

// --- Mock Components ---

/// Answers after a fixed pause so a second send can race it.
struct SlowEngine;

#[async_trait]
impl ChatEngine for SlowEngine {
    async fn reply(&self, _history: &[Turn], user_text: &str) -> String {
        sleep(Duration::from_millis(200)).await;
        format!("slowly: {}", user_text)
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

fn store_in(dir: &TempDir) -> ChatStore {
    ChatStore::new(dir.path().join("chat_history.json"))
}

async fn open_session(dir: &TempDir, engine: Arc<dyn ChatEngine>) -> ChatSession {
    ChatSession::open(ChatClient::offline(engine), store_in(dir), "be kind")
        .await
        .expect("Failed to open session")
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_history_is_seeded_with_welcome() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(EchoEngine)).await;

        let records = session.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_user);
        assert_eq!(records[0].text, WELCOME_MESSAGE);

        // the welcome line is persisted, and not seeded twice
        let reopened = open_session(&dir, Arc::new(EchoEngine)).await;
        assert_eq!(reopened.records().len(), 1);
        assert_eq!(store_in(&dir).read().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(EchoEngine)).await;
        session.send("first").await.unwrap();
        session.send("second").await.unwrap();

        let reopened = open_session(&dir, Arc::new(EchoEngine)).await;
        let texts: Vec<String> = reopened.records().into_iter().map(|r| r.text).collect();
        assert_eq!(
            texts,
            vec![WELCOME_MESSAGE, "first", "You said: first", "second", "You said: second"]
        );
    }

    #[tokio::test]
    async fn test_clear_wipes_memory_and_disk() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(EchoEngine)).await;
        session.send("hello").await.unwrap();

        session.clear().await.unwrap();
        assert!(session.records().is_empty());
        assert!(store_in(&dir).read().await.unwrap().is_empty());

        // a later open starts over with the welcome line
        let reopened = open_session(&dir, Arc::new(EchoEngine)).await;
        assert_eq!(reopened.records().len(), 1);
    }
}

#[cfg(test)]
mod send_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_records_user_and_reply() {
        // 1. Arrange
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(BrainsEngine::new(Duration::ZERO))).await;

        // 2. Act
        let reply = session.send("  what's 7 * (3 + 2)  ").await.unwrap();

        // 3. Assert
        let reply = reply.expect("Expected a reply record");
        assert!(!reply.is_user);
        assert!(reply.text.contains("= 35."), "Got: {}", reply.text);

        let records = session.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].text, "what's 7 * (3 + 2)");
        assert_eq!(records[1].status, SyncStatus::Sent);
        assert_eq!(records[2], reply);
        assert!(!session.is_thinking());

        let stored = store_in(&dir).read().await.unwrap();
        assert_eq!(stored, records);
    }

    #[tokio::test]
    async fn test_blank_send_is_ignored() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(EchoEngine)).await;

        for text in ["", "   ", "\n\t"] {
            assert!(session.send(text).await.unwrap().is_none());
        }
        assert_eq!(session.records().len(), 1);
    }

    #[tokio::test]
    async fn test_second_send_while_thinking_is_rejected() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(SlowEngine)).await;

        let (first, second) = tokio::join!(session.send("first"), async {
            sleep(Duration::from_millis(50)).await;
            assert!(session.is_thinking());
            session.send("second").await
        });

        assert_eq!(first.unwrap().map(|r| r.text), Some("slowly: first".to_string()));
        assert!(second.unwrap().is_none());
        assert!(!session.is_thinking());

        // the flag is released, so the next send goes through
        let third = session.send("third").await.unwrap();
        assert!(third.is_some());
        assert_eq!(session.records().len(), 5);
    }

    #[tokio::test]
    async fn test_cancelled_send_releases_the_flag() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(SlowEngine)).await;

        let result = tokio::time::timeout(Duration::from_millis(20), session.send("hang on")).await;
        assert!(result.is_err());
        assert!(!session.is_thinking());
    }

    #[tokio::test]
    async fn test_unreachable_remote_becomes_failure_reply() {
        // 1. Arrange
        let dir = tempdir().unwrap();
        let remote = RemoteConfig {
            endpoint: Url::parse("http://127.0.0.1:9/chat").unwrap(),
            api_key: "k".to_string(),
            timeout: Duration::from_secs(2),
        };
        let client = ChatClient::new(Arc::new(EchoEngine), Some(remote));
        let session = ChatSession::open(client, store_in(&dir), "be kind").await.unwrap();

        // 2. Act
        let reply = session.send("hello").await.unwrap().expect("Expected a reply record");

        // 3. Assert
        assert!(reply.text.starts_with("I'm having trouble thinking right now ("), "Got: {}", reply.text);
        assert!(reply.text.ends_with("but I heard: “hello”"));

        let records = session.records();
        assert_eq!(records[1].status, SyncStatus::Failed);
        let stored = store_in(&dir).read().await.unwrap();
        assert_eq!(stored[1].status, SyncStatus::Failed);
        assert_eq!(stored.last(), Some(&reply));
    }
}

#[cfg(test)]
mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_and_undo() {
        let dir = tempdir().unwrap();
        let session = open_session(&dir, Arc::new(EchoEngine)).await;
        session.send("keep me").await.unwrap();
        let before = session.records();
        let target = before[2].clone();

        let removed = session.delete(target.id).await.unwrap();
        assert_eq!(removed.as_ref(), Some(&target));
        assert_eq!(session.records().len(), 2);
        assert!(session.delete(target.id).await.unwrap().is_none());

        session.undo_delete(target.clone()).await.unwrap();
        assert_eq!(session.records(), before);
        assert_eq!(store_in(&dir).read().await.unwrap(), before);

        // undoing twice does not duplicate
        session.undo_delete(target).await.unwrap();
        assert_eq!(session.records().len(), 3);
    }
}
