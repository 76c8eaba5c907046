/// SQLite moderation backend
use crate::{
    error::ModResult,
    moderation::{
        models::{format_timestamp, parse_timestamp},
        BanRecord, ChatLogEntry, ChatSender, ModerationBackend,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Ban list and chat log persisted in SQLite
#[derive(Clone)]
pub struct SqliteBackend {
    db: SqlitePool,
}

impl SqliteBackend {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn parse_ban(row: &SqliteRow) -> ModResult<BanRecord> {
        let timestamp: String = row.try_get("timestamp")?;

        Ok(BanRecord {
            id: row.try_get("id")?,
            ip_address: row.try_get("ip_address")?,
            reason: row.try_get("reason")?,
            created_at: parse_timestamp(&timestamp)?,
        })
    }

    fn parse_log(row: &SqliteRow) -> ModResult<ChatLogEntry> {
        let sender: String = row.try_get("sender")?;
        let timestamp: String = row.try_get("timestamp")?;

        Ok(ChatLogEntry {
            id: row.try_get("id")?,
            room_id: row.try_get("room_id")?,
            sender: sender.parse()?,
            message: row.try_get("message")?,
            created_at: parse_timestamp(&timestamp)?,
        })
    }
}

#[async_trait]
impl ModerationBackend for SqliteBackend {
    async fn contains_ban(&self, ip: &str) -> ModResult<bool> {
        let row = sqlx::query("SELECT 1 FROM banned_ips WHERE ip_address = ? LIMIT 1")
            .bind(ip)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    async fn insert_ban_if_absent(&self, ip: &str, reason: Option<&str>) -> ModResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO banned_ips (ip_address, reason, timestamp)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(ip)
        .bind(reason)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_ban(&self, ip: &str) -> ModResult<bool> {
        let result = sqlx::query("DELETE FROM banned_ips WHERE ip_address = ?")
            .bind(ip)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_bans(&self) -> ModResult<Vec<BanRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ip_address, reason, timestamp
            FROM banned_ips
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::parse_ban).collect()
    }

    async fn insert_log(&self, room_id: &str, sender: ChatSender, message: &str) -> ModResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_logs (room_id, sender, message, timestamp)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(room_id)
        .bind(sender.as_str())
        .bind(message)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn room_log(&self, room_id: &str) -> ModResult<Vec<ChatLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, room_id, sender, message, timestamp
            FROM chat_logs
            WHERE room_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::parse_log).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn backend() -> SqliteBackend {
        SqliteBackend::new(db::create_memory_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_or_ignore_keeps_first_reason() {
        let backend = backend().await;

        assert!(backend.insert_ban_if_absent("198.51.100.1", Some("spam")).await.unwrap());
        assert!(!backend.insert_ban_if_absent("198.51.100.1", Some("abuse")).await.unwrap());

        let bans = backend.list_bans().await.unwrap();
        assert_eq!(bans.len(), 1);
        assert_eq!(bans[0].reason.as_deref(), Some("spam"));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let backend = backend().await;

        backend.insert_ban_if_absent("198.51.100.2", None).await.unwrap();
        assert!(backend.delete_ban("198.51.100.2").await.unwrap());
        assert!(!backend.delete_ban("198.51.100.2").await.unwrap());
        assert!(!backend.contains_ban("198.51.100.2").await.unwrap());
    }

    #[tokio::test]
    async fn test_room_log_is_scoped_and_ordered() {
        let backend = backend().await;

        backend.insert_log("room-a", ChatSender::First, "hi").await.unwrap();
        backend.insert_log("room-b", ChatSender::First, "elsewhere").await.unwrap();
        backend.insert_log("room-a", ChatSender::Second, "hello").await.unwrap();

        let log = backend.room_log("room-a").await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, ChatSender::First);
        assert_eq!(log[0].message, "hi");
        assert_eq!(log[1].sender, ChatSender::Second);
        assert_eq!(log[1].message, "hello");
    }
}
