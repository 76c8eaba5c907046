/// Configuration management for the AnonyChat admin subsystem
use crate::error::{ModError, ModResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub chat: ChatConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StoreBackendConfig,
}

/// Moderation store backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreBackendConfig {
    Sqlite { location: PathBuf },
    Memory,
}

/// Admin gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared admin key; `None` means every admin request is forbidden
    pub key: Option<String>,
}

/// Chat logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Opt-in persistence of chat transcripts
    pub logging_enabled: bool,
}

/// Admin monitoring client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Gateway base URL
    pub backend_url: String,
    /// Dashboard URL; its `key` query parameter carries the admin session
    pub dashboard_url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl MonitorConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            dashboard_url: "http://localhost:3000/admin".to_string(),
            refresh_interval_secs: 3,
            request_timeout_secs: 10,
        }
    }
}

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "anonychat_admin=debug,tower_http=debug";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives
    pub level: String,
}

/// Parse an on/off environment value
fn parse_flag(name: &str, value: &str) -> ModResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ModError::Validation(format!(
            "Invalid value for {}: {}",
            name, other
        ))),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ModResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("ANONYCHAT_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("ANONYCHAT_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ModError::Validation("Invalid port number".to_string()))?;

        let data_directory: PathBuf = env::var("ANONYCHAT_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let backend = match env::var("ANONYCHAT_STORE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .to_lowercase()
            .as_str()
        {
            "sqlite" => StoreBackendConfig::Sqlite {
                location: env::var("ANONYCHAT_DB_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("data.db")),
            },
            "memory" => StoreBackendConfig::Memory,
            other => {
                return Err(ModError::Validation(format!(
                    "Unknown store backend: {}",
                    other
                )))
            }
        };

        let admin_key = env::var("ANONYCHAT_ADMIN_KEY").ok();

        let logging_enabled = match env::var("ANONYCHAT_CHAT_LOGGING") {
            Ok(value) => parse_flag("ANONYCHAT_CHAT_LOGGING", &value)?,
            Err(_) => false,
        };

        let defaults = MonitorConfig::default();
        let backend_url = env::var("ANONYCHAT_BACKEND_URL").unwrap_or(defaults.backend_url);
        let dashboard_url = env::var("ANONYCHAT_DASHBOARD_URL").unwrap_or(defaults.dashboard_url);
        let refresh_interval_secs = env::var("ANONYCHAT_REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.refresh_interval_secs);
        let request_timeout_secs = env::var("ANONYCHAT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(ServerConfig {
            service: ServiceConfig { hostname, port },
            storage: StorageConfig { backend },
            admin: AdminConfig { key: admin_key },
            chat: ChatConfig { logging_enabled },
            monitor: MonitorConfig {
                backend_url,
                dashboard_url,
                refresh_interval_secs,
                request_timeout_secs,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ModResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ModError::Validation("Hostname cannot be empty".to_string()));
        }

        if let Some(key) = &self.admin.key {
            if key.trim().is_empty() {
                return Err(ModError::Validation(
                    "Admin key cannot be blank; unset it to disable the admin API".to_string(),
                ));
            }
        }

        if self.monitor.refresh_interval_secs == 0 {
            return Err(ModError::Validation(
                "Refresh interval must be at least one second".to_string(),
            ));
        }

        for url in [&self.monitor.backend_url, &self.monitor.dashboard_url] {
            reqwest::Url::parse(url)
                .map_err(|e| ModError::Validation(format!("Invalid URL {}: {}", url, e)))?;
        }

        Ok(())
    }
}
