//! Application configuration, read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::engines::EngineKind;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;

pub const DEFAULT_ENDPOINT: &str = "https://example.invalid/chat";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are LittleGenius: warm, truthful, concise.";
const DEFAULT_THINKING_DELAY_MS: u64 = 350;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the chat core.
#[derive(Debug, Clone, Validate)]
pub struct AppConfig {
    /// Where chat history and preferences are stored.
    pub data_dir: PathBuf,
    /// Which reply backend answers offline.
    pub engine: EngineKind,
    /// Cosmetic delay before an offline reply, in milliseconds.
    #[validate(range(max = 5000))]
    pub thinking_delay_ms: u64,
    /// Bearer token for the remote endpoint. `None` keeps everything offline.
    pub api_key: Option<String>,
    /// Remote chat endpoint, only used with an API key.
    #[validate(url)]
    pub api_endpoint: String,
    /// Timeout for one remote request, in seconds.
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[validate(length(min = 1))]
    pub log_level: String,
    /// System message that opens every conversation.
    #[validate(length(min = 1))]
    pub system_prompt: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PortablePathManager::default_data_dir(),
            engine: EngineKind::Brains,
            thinking_delay_ms: DEFAULT_THINKING_DELAY_MS,
            api_key: None,
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "info".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Connection settings for the remote chat endpoint.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub timeout: Duration,
}

impl AppConfig {
    /// Reads `LEO_*` variables on top of the defaults and validates the result.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            data_dir: env_var("LEO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            engine: match env_var("LEO_ENGINE") {
                Some(value) => EngineKind::from_str(&value)?,
                None => defaults.engine,
            },
            thinking_delay_ms: parse_var("LEO_THINKING_DELAY_MS")?
                .unwrap_or(defaults.thinking_delay_ms),
            api_key: env_var("LEO_API_KEY"),
            api_endpoint: env_var("LEO_API_ENDPOINT").unwrap_or(defaults.api_endpoint),
            request_timeout_secs: parse_var("LEO_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            log_level: env_var("LEO_LOG_LEVEL").unwrap_or(defaults.log_level),
            system_prompt: env_var("LEO_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Remote settings, or `None` when no API key is configured.
    pub fn remote(&self) -> Result<Option<RemoteConfig>, AppError> {
        let Some(api_key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(RemoteConfig {
            endpoint: Url::parse(&self.api_endpoint)?,
            api_key: api_key.trim().to_string(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }))
    }
}

/// A non-blank environment variable.
fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var(key: &str) -> Result<Option<u64>, AppError> {
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("{} must be a whole number: {}", key, e)))
        })
        .transpose()
}
