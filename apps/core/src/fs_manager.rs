use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the chat history file inside the data directory.
const CHAT_HISTORY_FILENAME: &str = "chat_history.json";

/// Name of the preferences file inside the data directory.
const PREFS_FILENAME: &str = "prefs.json";

/// Resolves every on-disk location the app uses from one data directory.
#[derive(Debug, Clone)]
pub struct PortablePathManager {
    data_dir: PathBuf,
}

impl PortablePathManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Default data directory: `./data` next to the executable.
    ///
    /// Falls back to the current directory when the executable path is unknown.
    pub fn default_data_dir() -> PathBuf {
        let root = match std::env::current_exe() {
            Ok(mut path) => {
                path.pop();
                path
            }
            Err(e) => {
                warn!("Failed to get current exe path: {}. Falling back to current_dir.", e);
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            }
        };
        root.join("data")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Chat history file (./data/chat_history.json).
    pub fn chat_history_file(&self) -> PathBuf {
        self.data_dir.join(CHAT_HISTORY_FILENAME)
    }

    /// Preferences file (./data/prefs.json).
    pub fn prefs_file(&self) -> PathBuf {
        self.data_dir.join(PREFS_FILENAME)
    }

    /// Creates the data directory if it does not exist.
    pub fn init(&self) -> Result<(), io::Error> {
        if !self.data_dir.exists() {
            info!("Creating data directory: {:?}", self.data_dir);
            fs::create_dir_all(&self.data_dir)?;
        }
        Ok(())
    }
}
