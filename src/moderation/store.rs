/// Moderation store: failure policies on top of a backend
use crate::{
    error::ModResult,
    metrics,
    moderation::{
        BanRecord, ChatLogEntry, ChatSender, MemoryBackend, ModerationBackend, SqliteBackend,
    },
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Moderation store shared by the pairing engine and the admin gateway
#[derive(Clone)]
pub struct ModerationStore {
    backend: Arc<dyn ModerationBackend>,
}

impl ModerationStore {
    pub fn new(backend: Arc<dyn ModerationBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by SQLite
    pub fn sqlite(db: SqlitePool) -> Self {
        Self::new(Arc::new(SqliteBackend::new(db)))
    }

    /// Store backed by process memory
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Check whether an address is banned.
    ///
    /// Fail-open: any backend error is logged and answered with `false`.
    /// An unavailable store must not lock legitimate users out, nor fail
    /// the connection attempt that asked. While the store is down no ban
    /// is enforced.
    pub async fn is_ip_banned(&self, ip: &str) -> bool {
        match self.backend.contains_ban(ip).await {
            Ok(true) => {
                metrics::record_ban_check("banned");
                true
            }
            Ok(false) => {
                metrics::record_ban_check("allowed");
                false
            }
            Err(e) => {
                warn!("Ban check for {} failed, allowing connection: {}", ip, e);
                metrics::record_ban_check("fail_open");
                false
            }
        }
    }

    /// Ban an address. Banning an already-banned address is a silent no-op
    /// that keeps the existing reason and timestamp (first writer wins).
    pub async fn ban_ip(&self, ip: &str, reason: Option<&str>) -> ModResult<()> {
        let inserted = self.backend.insert_ban_if_absent(ip, reason).await?;

        if inserted {
            info!("Banned {} (reason: {})", ip, reason.unwrap_or("none"));
            metrics::record_moderation_action("ban");
        } else {
            debug!("{} already banned, keeping existing record", ip);
        }

        Ok(())
    }

    /// Lift a ban. Unbanning an address that is not banned is a silent no-op.
    pub async fn unban_ip(&self, ip: &str) -> ModResult<()> {
        let removed = self.backend.delete_ban(ip).await?;

        if removed {
            info!("Unbanned {}", ip);
            metrics::record_moderation_action("unban");
        } else {
            debug!("{} was not banned", ip);
        }

        Ok(())
    }

    /// All bans, most recent first
    pub async fn get_banned_ips(&self) -> ModResult<Vec<BanRecord>> {
        self.backend.list_bans().await
    }

    /// Append a chat message to the transcript.
    ///
    /// - `enabled == false`: no-op, whatever the other arguments are.
    /// - `sender` outside `user1`/`user2`: rejected with a validation error;
    ///   this is a caller bug, not a runtime condition.
    /// - Persistence failure: logged and swallowed, never retried.
    pub async fn append_log(
        &self,
        room_id: &str,
        sender: &str,
        message: &str,
        enabled: bool,
    ) -> ModResult<()> {
        if !enabled {
            metrics::record_chat_log("disabled");
            return Ok(());
        }

        let sender = match sender.parse::<ChatSender>() {
            Ok(sender) => sender,
            Err(e) => {
                metrics::record_chat_log("rejected");
                return Err(e);
            }
        };

        match self.backend.insert_log(room_id, sender, message).await {
            Ok(_) => metrics::record_chat_log("stored"),
            Err(e) => {
                warn!("Dropping chat log entry for room {}: {}", room_id, e);
                metrics::record_chat_log("dropped");
            }
        }

        Ok(())
    }

    /// Transcript of one room, oldest first
    pub async fn room_log(&self, room_id: &str) -> ModResult<Vec<ChatLogEntry>> {
        self.backend.room_log(room_id).await
    }
}
