/// Live pairing state
///
/// The pairing engine itself lives elsewhere; it records the rooms it opens
/// and the size of its waiting queue here so the admin gateway can report
/// them. It also consults the moderation store through [`admit`] before
/// accepting a connection.
use crate::moderation::ModerationStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// One active room as reported to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub ips: Vec<String>,
}

/// Point-in-time view of the pairing engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingSnapshot {
    pub rooms: Vec<RoomSnapshot>,
    pub waiting_count: usize,
}

/// Registry of rooms and queue length written by the pairing engine
#[derive(Debug, Default)]
pub struct PairingState {
    rooms: RwLock<BTreeMap<String, Vec<String>>>,
    waiting: AtomicUsize,
}

impl PairingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a room with the addresses of its participants
    pub async fn open_room(&self, room_id: &str, ips: Vec<String>) {
        self.rooms.write().await.insert(room_id.to_string(), ips);
    }

    /// Forget a room; returns whether it was known
    pub async fn close_room(&self, room_id: &str) -> bool {
        self.rooms.write().await.remove(room_id).is_some()
    }

    pub fn set_waiting(&self, count: usize) {
        self.waiting.store(count, Ordering::Relaxed);
    }

    /// Rooms sorted by id plus the waiting count
    pub async fn snapshot(&self) -> PairingSnapshot {
        let rooms = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(room_id, ips)| RoomSnapshot {
                room_id: room_id.clone(),
                ips: ips.clone(),
            })
            .collect();

        PairingSnapshot {
            rooms,
            waiting_count: self.waiting.load(Ordering::Relaxed),
        }
    }
}

/// Per-connection ban gate. Inherits the store's fail-open policy.
pub async fn admit(store: &ModerationStore, ip: &str) -> bool {
    if store.is_ip_banned(ip).await {
        info!("Refusing connection from banned address {}", ip);
        return false;
    }
    true
}
