//! One conversation: in-memory history, the chat store and the client.
//!
//! At most one reply is in flight per session. A second `send` while a reply
//! is outstanding is rejected, the same way the chat screen disables its send
//! button while thinking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::client::ChatClient;
use crate::error::AppError;
use crate::models::{ChatMessage, ChatRecord, Role, SyncStatus};
use crate::store::ChatStore;

/// First assistant line of a brand new history.
pub const WELCOME_MESSAGE: &str = "Hello, I'm Leo!";

pub struct ChatSession {
    client: ChatClient,
    store: ChatStore,
    system_prompt: String,
    records: Mutex<Vec<ChatRecord>>,
    thinking: AtomicBool,
}

/// Clears the in-flight flag on every exit path, including cancellation.
struct ThinkingGuard<'a>(&'a AtomicBool);

impl Drop for ThinkingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatSession {
    /// Loads the stored history, seeding a welcome line when it is empty.
    pub async fn open(client: ChatClient, store: ChatStore, system_prompt: impl Into<String>) -> Result<Self, AppError> {
        let mut records = store.read().await?;
        if records.is_empty() {
            let hello = ChatRecord::new(false, WELCOME_MESSAGE, SyncStatus::Sent);
            store.append(hello.clone()).await?;
            records.push(hello);
        }
        info!("Chat session opened with {} stored messages", records.len());

        Ok(Self {
            client,
            store,
            system_prompt: system_prompt.into(),
            records: Mutex::new(records),
            thinking: AtomicBool::new(false),
        })
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.load(Ordering::Acquire)
    }

    /// Snapshot of the conversation, oldest first.
    pub fn records(&self) -> Vec<ChatRecord> {
        self.lock_records().clone()
    }

    /// Sends one user message and returns the assistant record.
    ///
    /// Returns `Ok(None)` when the text is blank or a reply is already in
    /// flight. Client failures do not propagate: they become the reply text
    /// and the user record is marked `Failed`.
    #[instrument(skip(self, text))]
    pub async fn send(&self, text: &str) -> Result<Option<ChatRecord>, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self
            .thinking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Reply already in flight, ignoring new message");
            return Ok(None);
        }
        let _thinking = ThinkingGuard(&self.thinking);

        let pending = ChatRecord::new(true, text, SyncStatus::Pending);
        let user_id = pending.id;
        self.store.append(pending.clone()).await?;
        self.lock_records().push(pending);

        let conversation = self.conversation();
        let (reply_text, user_status) = match self.client.send(&conversation).await {
            Ok(reply) => (reply, SyncStatus::Sent),
            Err(e) => {
                error!("Reply failed: {}", e);
                (
                    format!("I'm having trouble thinking right now ({}), but I heard: “{}”", e, text),
                    SyncStatus::Failed,
                )
            }
        };

        self.store.update_status(user_id, user_status).await?;
        self.set_status(user_id, user_status);

        let reply = ChatRecord::new(false, reply_text, SyncStatus::Sent);
        self.store.append(reply.clone()).await?;
        self.lock_records().push(reply.clone());

        Ok(Some(reply))
    }

    /// Deletes a message, returning it so the caller can offer an undo.
    pub async fn delete(&self, id: Uuid) -> Result<Option<ChatRecord>, AppError> {
        let removed = self.store.delete(id).await?;
        self.lock_records().retain(|r| r.id != id);
        Ok(removed)
    }

    /// Puts a deleted message back in timestamp order.
    pub async fn undo_delete(&self, record: ChatRecord) -> Result<(), AppError> {
        self.store.restore(record.clone()).await?;
        let mut records = self.lock_records();
        if !records.iter().any(|r| r.id == record.id) {
            let index = records
                .iter()
                .position(|r| r.ts > record.ts)
                .unwrap_or(records.len());
            records.insert(index, record);
        }
        Ok(())
    }

    /// Wipes the conversation, in memory and on disk.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.store.clear().await?;
        self.lock_records().clear();
        info!("Chat history cleared");
        Ok(())
    }

    /// The message list handed to the client: system prompt, then history.
    fn conversation(&self) -> Vec<ChatMessage> {
        let records = self.lock_records();
        std::iter::once(ChatMessage::new(Role::System, self.system_prompt.clone()))
            .chain(records.iter().map(ChatRecord::to_message))
            .collect()
    }

    fn set_status(&self, id: Uuid, status: SyncStatus) {
        if let Some(record) = self.lock_records().iter_mut().find(|r| r.id == id) {
            record.status = status;
        }
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, Vec<ChatRecord>> {
        // A poisoned lock still holds a valid record list.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
