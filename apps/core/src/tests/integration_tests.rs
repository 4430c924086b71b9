//! Integration Tests
//!
//! End-to-end tests that wire configuration, engine selection, the client and
//! the session together the way the terminal host does.

use crate::client::ChatClient;
use crate::config::AppConfig;
use crate::engines::{self, EngineKind};
use crate::fs_manager::PortablePathManager;
use crate::prefs::Preferences;
use crate::session::ChatSession;
use crate::store::ChatStore;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Opens a session exactly the way `main` does.
async fn session_from(config: &AppConfig) -> ChatSession {
    let paths = PortablePathManager::new(&config.data_dir);
    paths.init().expect("Failed to create data dir");

    let engine = engines::build(config.engine, config.thinking_delay());
    let remote = config.remote().expect("Invalid remote config");
    let client = ChatClient::new(engine, remote);
    let store = ChatStore::new(paths.chat_history_file());

    ChatSession::open(client, store, config.system_prompt.clone())
        .await
        .expect("Failed to open session")
}

// ============================================================================
// Offline Workflow
// ============================================================================

#[cfg(test)]
mod offline_workflow {
    use super::*;

    #[tokio::test]
    async fn test_brains_conversation() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().join("data"),
            thinking_delay_ms: 0,
            ..AppConfig::default()
        };
        let session = session_from(&config).await;

        let greeting = session.send("hi").await.unwrap().unwrap();
        assert!(greeting.text.starts_with("Good to see you!"), "Got: {}", greeting.text);

        let math = session.send("what's 6 x 7?").await.unwrap().unwrap();
        assert!(math.text.contains("= 42."), "Got: {}", math.text);

        let topic = session.send("my aquarium water is green").await.unwrap().unwrap();
        assert!(topic.text.contains("cycle it"));

        let thanks = session.send("thanks!").await.unwrap().unwrap();
        assert!(thanks.text.contains("Anytime"));

        // welcome + 4 exchanges
        assert_eq!(session.records().len(), 9);
        assert!(dir.path().join("data").join("chat_history.json").exists());
    }

    #[tokio::test]
    async fn test_greeting_recalls_topic_across_turns() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            thinking_delay_ms: 0,
            ..AppConfig::default()
        };
        let session = session_from(&config).await;

        session.send("volcanoes are fascinating").await.unwrap();
        let reply = session.send("hello again").await.unwrap().unwrap();
        assert!(reply.text.contains("“volcanoes”"), "Got: {}", reply.text);
    }

    #[tokio::test]
    async fn test_engine_selection_from_config() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            engine: EngineKind::Dad,
            ..AppConfig::default()
        };
        let session = session_from(&config).await;

        let reply = session.send("tell me a joke").await.unwrap().unwrap();
        assert!(reply.text.contains("fish blush"));
    }

    #[tokio::test]
    async fn test_preferences_live_next_to_history() {
        let dir = tempdir().unwrap();
        let paths = PortablePathManager::new(dir.path());
        let prefs = Preferences::open(paths.prefs_file()).await;
        prefs.set_laser_focus(true).await.unwrap();

        assert!(paths.prefs_file().exists());
        assert!(Preferences::open(paths.prefs_file()).await.current().laser_focus);
    }
}

// ============================================================================
// Remote Workflow
// ============================================================================

#[cfg(test)]
mod remote_workflow {
    use super::*;

    #[tokio::test]
    async fn test_api_key_routes_to_remote() {
        // 1. Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "  Remote hello  "})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            api_key: Some("secret".to_string()),
            api_endpoint: format!("{}/chat", mock_server.uri()),
            ..AppConfig::default()
        };
        let session = session_from(&config).await;

        // 2. Act
        let reply = session.send("hi").await.unwrap().unwrap();

        // 3. Assert
        assert_eq!(reply.text, "Remote hello");
    }

    #[tokio::test]
    async fn test_remote_error_status_is_shown_as_reply() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            api_key: Some("secret".to_string()),
            api_endpoint: format!("{}/chat", mock_server.uri()),
            ..AppConfig::default()
        };
        let session = session_from(&config).await;

        let reply = session.send("hi").await.unwrap().unwrap();
        assert_eq!(reply.text, "Network error 500");
        assert_eq!(session.records()[1].status, crate::models::SyncStatus::Sent);
    }
}
