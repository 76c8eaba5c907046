/// Admin gateway wire format, shared by the gateway and the monitoring client
use crate::{moderation::BanRecord, pairing::PairingSnapshot};
use serde::{Deserialize, Serialize};

/// Consolidated status returned by `GET /admin`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub active_rooms: Vec<ActiveRoom>,
    #[serde(default)]
    pub waiting_count: u64,
    /// Newest ban first
    #[serde(default)]
    pub banned_ips: Vec<BanEntry>,
}

impl StatusSnapshot {
    pub fn new(pairing: PairingSnapshot, bans: Vec<BanRecord>) -> Self {
        Self {
            active_rooms: pairing
                .rooms
                .into_iter()
                .map(|r| ActiveRoom {
                    room_id: r.room_id,
                    ips: r.ips,
                })
                .collect(),
            waiting_count: pairing.waiting_count as u64,
            banned_ips: bans.into_iter().map(BanEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRoom {
    pub room_id: String,
    #[serde(default)]
    pub ips: Vec<String>,
}

/// Ban record as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub id: i64,
    pub ip_address: String,
    pub reason: Option<String>,
    pub timestamp: String,
}

impl From<BanRecord> for BanEntry {
    fn from(record: BanRecord) -> Self {
        Self {
            timestamp: record.display_timestamp(),
            id: record.id,
            ip_address: record.ip_address,
            reason: record.reason,
        }
    }
}

/// Body of `POST /admin/ban`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRequest {
    pub ip: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `POST /admin/unban`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbanRequest {
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
}
