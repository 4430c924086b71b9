//! Little Genius chat core.
//!
//! The offline reply engine (`brain`), the interchangeable reply backends
//! (`engines`), and the collaborators a chat front end drives: the client
//! router, the JSON chat store, preferences and the conversation session.

pub mod brain;
pub mod client;
pub mod config;
pub mod engines;
pub mod error;
pub mod fs_manager;
pub mod models;
pub mod prefs;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;

pub use brain::BrainsEngine;
pub use client::ChatClient;
pub use config::AppConfig;
pub use engines::{ChatEngine, EngineKind};
pub use error::AppError;
pub use models::{ChatMessage, ChatRecord, Role, SyncStatus, Turn};
pub use session::ChatSession;
