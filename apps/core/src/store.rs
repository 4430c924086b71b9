//! JSON-file chat history.
//!
//! The whole history lives in one file. Every mutation reads the file,
//! changes the list and atomically replaces the file (temp file + rename).
//! Mutations are serialised through an async mutex so concurrent callers
//! never lose each other's writes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ChatRecord, SyncStatus};

#[derive(Debug, Clone)]
pub struct ChatStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ChatStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record, oldest first.
    ///
    /// A missing or blank file is an empty history. So is a corrupt one:
    /// it is logged and treated as a fresh start.
    pub async fn read(&self) -> Result<Vec<ChatRecord>, AppError> {
        let payload = match fs::read_to_string(&self.path).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if payload.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&payload) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Chat history at {:?} is unreadable, starting fresh: {}", self.path, e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn append(&self, record: ChatRecord) -> Result<(), AppError> {
        self.mutate(|records| records.push(record)).await
    }

    /// Sets the status of the record with `id`. Unknown ids are ignored.
    pub async fn update_status(&self, id: Uuid, status: SyncStatus) -> Result<(), AppError> {
        self.mutate(|records| {
            for record in records.iter_mut().filter(|r| r.id == id) {
                record.status = status;
            }
        })
        .await
    }

    /// Removes the record with `id`, returning it if it existed.
    pub async fn delete(&self, id: Uuid) -> Result<Option<ChatRecord>, AppError> {
        let mut removed = None;
        self.mutate(|records| {
            if let Some(index) = records.iter().position(|r| r.id == id) {
                removed = Some(records.remove(index));
            }
        })
        .await?;
        Ok(removed)
    }

    /// Puts a previously deleted record back at its place in timestamp order.
    pub async fn restore(&self, record: ChatRecord) -> Result<(), AppError> {
        self.mutate(|records| {
            if records.iter().any(|r| r.id == record.id) {
                return;
            }
            let index = records
                .iter()
                .position(|r| r.ts > record.ts)
                .unwrap_or(records.len());
            records.insert(index, record);
        })
        .await
    }

    /// Deletes the history file.
    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn mutate<F>(&self, change: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Vec<ChatRecord>),
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read().await?;
        change(&mut records);
        self.write_all(&records).await
    }

    async fn write_all(&self, records: &[ChatRecord]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let payload = serde_json::to_vec(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!("Wrote {} chat records to {:?}", records.len(), self.path);
        Ok(())
    }
}
