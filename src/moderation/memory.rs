/// In-process moderation backend
///
/// Holds the ban list as a plain value whose transitions are total functions,
/// so idempotency does not depend on any storage-engine conflict clause.
use crate::{
    error::ModResult,
    moderation::{BanRecord, ChatLogEntry, ChatSender, ModerationBackend},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Ban list state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanList {
    records: Vec<BanRecord>,
    next_id: i64,
}

impl BanList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.records.iter().any(|r| r.ip_address == ip)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a ban; the state is returned unchanged when `ip` is already present
    pub fn ban(mut self, ip: &str, reason: Option<&str>, at: DateTime<Utc>) -> Self {
        if self.contains(ip) {
            return self;
        }

        self.next_id += 1;
        self.records.push(BanRecord {
            id: self.next_id,
            ip_address: ip.to_string(),
            reason: reason.map(str::to_string),
            created_at: at,
        });
        self
    }

    /// Remove a ban; the state is returned unchanged when `ip` is absent
    pub fn unban(mut self, ip: &str) -> Self {
        self.records.retain(|r| r.ip_address != ip);
        self
    }

    /// Records ordered newest first
    pub fn newest_first(&self) -> Vec<BanRecord> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records
    }
}

#[derive(Debug, Default)]
struct ChatLog {
    entries: Vec<ChatLogEntry>,
    next_id: i64,
}

/// Moderation backend that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    bans: RwLock<BanList>,
    logs: RwLock<ChatLog>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModerationBackend for MemoryBackend {
    async fn contains_ban(&self, ip: &str) -> ModResult<bool> {
        Ok(self.bans.read().await.contains(ip))
    }

    async fn insert_ban_if_absent(&self, ip: &str, reason: Option<&str>) -> ModResult<bool> {
        let mut bans = self.bans.write().await;
        let before = bans.len();
        let current = std::mem::take(&mut *bans);
        *bans = current.ban(ip, reason, Utc::now());
        Ok(bans.len() > before)
    }

    async fn delete_ban(&self, ip: &str) -> ModResult<bool> {
        let mut bans = self.bans.write().await;
        let before = bans.len();
        let current = std::mem::take(&mut *bans);
        *bans = current.unban(ip);
        Ok(bans.len() < before)
    }

    async fn list_bans(&self) -> ModResult<Vec<BanRecord>> {
        Ok(self.bans.read().await.newest_first())
    }

    async fn insert_log(&self, room_id: &str, sender: ChatSender, message: &str) -> ModResult<i64> {
        let mut log = self.logs.write().await;
        log.next_id += 1;
        let id = log.next_id;
        log.entries.push(ChatLogEntry {
            id,
            room_id: room_id.to_string(),
            sender,
            message: message.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn room_log(&self, room_id: &str) -> ModResult<Vec<ChatLogEntry>> {
        Ok(self
            .logs
            .read()
            .await
            .entries
            .iter()
            .filter(|e| e.room_id == room_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ban_is_noop_when_present() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();

        let once = BanList::new().ban("192.0.2.1", Some("first"), t0);
        let twice = once.clone().ban("192.0.2.1", Some("second"), t1);

        assert_eq!(once, twice);
        assert_eq!(twice.newest_first()[0].reason.as_deref(), Some("first"));
        assert_eq!(twice.newest_first()[0].created_at, t0);
    }

    #[test]
    fn test_unban_absent_is_noop() {
        let list = BanList::new().ban("192.0.2.1", None, Utc::now());
        let after = list.clone().unban("192.0.2.99");
        assert_eq!(list, after);
    }

    #[test]
    fn test_same_instant_orders_by_id() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let list = BanList::new()
            .ban("a", None, t)
            .ban("b", None, t)
            .ban("c", None, t);

        let order: Vec<_> = list
            .newest_first()
            .into_iter()
            .map(|r| r.ip_address)
            .collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_backend_reports_insert_and_delete() {
        let backend = MemoryBackend::new();

        assert!(backend.insert_ban_if_absent("192.0.2.7", None).await.unwrap());
        assert!(!backend.insert_ban_if_absent("192.0.2.7", None).await.unwrap());
        assert!(backend.contains_ban("192.0.2.7").await.unwrap());
        assert!(backend.delete_ban("192.0.2.7").await.unwrap());
        assert!(!backend.delete_ban("192.0.2.7").await.unwrap());
    }
}
