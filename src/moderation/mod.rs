/// Moderation Store
///
/// Durable ban list and chat transcripts. The store sits on the pairing
/// engine's hot path (one ban check per connection, one log append per
/// message), so its public operations never let a storage failure reach
/// the chat path. Backends are pluggable (SQLite, in-memory).

pub mod memory;
pub mod models;
pub mod sqlite;
pub mod store;

pub use memory::{BanList, MemoryBackend};
pub use models::{BanRecord, ChatLogEntry, ChatSender};
pub use sqlite::SqliteBackend;
pub use store::ModerationStore;

use crate::error::ModResult;
use async_trait::async_trait;

/// Moderation storage backend trait
///
/// Raw primitives; every error is returned to the caller. Failure policies
/// live in [`ModerationStore`], not here.
#[async_trait]
pub trait ModerationBackend: Send + Sync {
    /// Whether `ip` has an active ban
    async fn contains_ban(&self, ip: &str) -> ModResult<bool>;

    /// Insert a ban unless one exists; returns whether a row was added
    async fn insert_ban_if_absent(&self, ip: &str, reason: Option<&str>) -> ModResult<bool>;

    /// Delete a ban if present; returns whether a row was removed
    async fn delete_ban(&self, ip: &str) -> ModResult<bool>;

    /// All bans, newest first
    async fn list_bans(&self) -> ModResult<Vec<BanRecord>>;

    /// Append a chat message and return its id
    async fn insert_log(&self, room_id: &str, sender: ChatSender, message: &str) -> ModResult<i64>;

    /// Messages of one room, oldest first
    async fn room_log(&self, room_id: &str) -> ModResult<Vec<ChatLogEntry>>;
}
