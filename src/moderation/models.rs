/// Moderation store data models
use crate::error::{ModError, ModResult};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A banned address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub id: i64,
    pub ip_address: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BanRecord {
    /// Timestamp as shown on the dashboard (`YYYY-MM-DD HH:MM:SS`, UTC)
    pub fn display_timestamp(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// The two peer roles inside a pairing room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatSender {
    #[serde(rename = "user1")]
    First,
    #[serde(rename = "user2")]
    Second,
}

impl ChatSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatSender::First => "user1",
            ChatSender::Second => "user2",
        }
    }
}

impl FromStr for ChatSender {
    type Err = ModError;

    fn from_str(s: &str) -> ModResult<Self> {
        match s {
            "user1" => Ok(ChatSender::First),
            "user2" => Ok(ChatSender::Second),
            _ => Err(ModError::Validation(format!("Invalid chat sender: {}", s))),
        }
    }
}

/// One persisted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub id: i64,
    pub room_id: String,
    pub sender: ChatSender,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Fixed-width storage format; lexical order equals chronological order
pub(crate) fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp, also accepting SQLite's `CURRENT_TIMESTAMP` layout
pub(crate) fn parse_timestamp(s: &str) -> ModResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| ModError::Internal(format!("Invalid timestamp {}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sender_from_str() {
        assert_eq!("user1".parse::<ChatSender>().unwrap(), ChatSender::First);
        assert_eq!("user2".parse::<ChatSender>().unwrap(), ChatSender::Second);
        assert!(matches!("user3".parse::<ChatSender>(), Err(ModError::Validation(_))));
        assert!("USER1".parse::<ChatSender>().is_err());
        assert!("".parse::<ChatSender>().is_err());
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let a = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 5).unwrap();
        let b = a + chrono::Duration::microseconds(120_000);

        let fa = format_timestamp(a);
        let fb = format_timestamp(b);

        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
        assert_eq!(parse_timestamp(&fb).unwrap(), b);
    }

    #[test]
    fn test_parse_sqlite_current_timestamp() {
        let parsed = parse_timestamp("2025-03-04 05:06:07").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap());
    }

    #[test]
    fn test_display_timestamp() {
        let record = BanRecord {
            id: 1,
            ip_address: "203.0.113.5".to_string(),
            reason: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap(),
        };
        assert_eq!(record.display_timestamp(), "2025-03-04 05:06:07");
    }
}
