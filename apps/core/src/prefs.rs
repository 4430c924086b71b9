//! User preferences with observable values.
//!
//! Values are persisted to a small JSON file. Each observable setting is
//! published through a `tokio::sync::watch` channel that is only updated
//! after the file write succeeded, so subscribers always see the latest
//! completed write.

use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::error::AppError;

/// Colour scheme of the chat screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
    Black,
}

/// Everything stored in the preferences file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefsData {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub laser_focus: bool,
    #[serde(default)]
    pub theme_mode: ThemeMode,
}

#[derive(Clone)]
pub struct Preferences {
    path: PathBuf,
    state: Arc<watch::Sender<PrefsData>>,
    write_lock: Arc<Mutex<()>>,
}

impl Preferences {
    /// Opens the preferences file. Missing or unreadable files give defaults.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load(&path).await;
        let (state, _) = watch::channel(data);
        Self {
            path,
            state: Arc::new(state),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current values.
    pub fn current(&self) -> PrefsData {
        self.state.borrow().clone()
    }

    pub fn dark_mode(&self) -> bool {
        self.state.borrow().dark_mode
    }

    /// Emits the current dark-mode flag, then every change after it.
    pub fn dark_mode_stream(&self) -> impl Stream<Item = bool> + Send + 'static {
        self.field_stream(|data| data.dark_mode)
    }

    pub fn laser_focus_stream(&self) -> impl Stream<Item = bool> + Send + 'static {
        self.field_stream(|data| data.laser_focus)
    }

    pub fn theme_mode_stream(&self) -> impl Stream<Item = ThemeMode> + Send + 'static {
        self.field_stream(|data| data.theme_mode)
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<(), AppError> {
        self.update(|data| data.dark_mode = enabled).await
    }

    pub async fn set_laser_focus(&self, enabled: bool) -> Result<(), AppError> {
        self.update(|data| data.laser_focus = enabled).await
    }

    pub async fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), AppError> {
        self.update(|data| data.theme_mode = mode).await
    }

    async fn update<F>(&self, change: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut PrefsData),
    {
        let _guard = self.write_lock.lock().await;
        let mut next = self.current();
        change(&mut next);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(&next)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Preferences saved to {:?}", self.path);
        self.state.send_replace(next);
        Ok(())
    }

    /// Distinct values of one field, starting with the current one.
    fn field_stream<T, F>(&self, select: F) -> impl Stream<Item = T> + Send + 'static
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&PrefsData) -> T + Send + Sync + 'static,
    {
        let receiver = self.state.subscribe();
        stream::unfold(
            (receiver, select, None::<T>),
            |(mut receiver, select, last)| async move {
                loop {
                    let value = select(&receiver.borrow_and_update());
                    if last.as_ref() != Some(&value) {
                        return Some((value.clone(), (receiver, select, Some(value))));
                    }
                    if receiver.changed().await.is_err() {
                        return None;
                    }
                }
            },
        )
    }
}

async fn load(path: &Path) -> PrefsData {
    match fs::read_to_string(path).await {
        Ok(payload) => serde_json::from_str(&payload).unwrap_or_else(|e| {
            warn!("Preferences at {:?} are unreadable, using defaults: {}", path, e);
            PrefsData::default()
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => PrefsData::default(),
        Err(e) => {
            warn!("Failed to read preferences at {:?}: {}", path, e);
            PrefsData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::open(dir.path().join("prefs.json")).await;
        assert_eq!(prefs.current(), PrefsData::default());
        assert_eq!(prefs.current().theme_mode, ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let prefs = Preferences::open(&path).await;
        prefs.set_dark_mode(true).await.unwrap();
        prefs.set_theme_mode(ThemeMode::Black).await.unwrap();

        let reopened = Preferences::open(&path).await;
        assert!(reopened.dark_mode());
        assert_eq!(reopened.current().theme_mode, ThemeMode::Black);
        assert!(!reopened.current().laser_focus);
    }

    #[tokio::test]
    async fn test_stream_sees_completed_writes() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::open(dir.path().join("prefs.json")).await;
        let mut stream = Box::pin(prefs.dark_mode_stream());

        assert_eq!(stream.next().await, Some(false));
        prefs.set_dark_mode(true).await.unwrap();
        assert_eq!(stream.next().await, Some(true));

        // unrelated changes do not re-emit the dark-mode flag
        prefs.set_laser_focus(true).await.unwrap();
        prefs.set_dark_mode(false).await.unwrap();
        assert_eq!(stream.next().await, Some(false));
    }

    #[tokio::test]
    async fn test_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "dark_mode=yes").unwrap();
        let prefs = Preferences::open(&path).await;
        assert!(!prefs.dark_mode());
    }
}
