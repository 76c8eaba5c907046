/// Application context and dependency injection
use crate::{
    config::{ServerConfig, StoreBackendConfig},
    db,
    error::ModResult,
    moderation::ModerationStore,
    pairing::PairingState,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    /// Present when the store is SQLite-backed; used by readiness checks
    pub db: Option<SqlitePool>,
    pub moderation: ModerationStore,
    pub pairing: Arc<PairingState>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ModResult<Self> {
        // Validate configuration
        config.validate()?;

        let (db, moderation) = match &config.storage.backend {
            StoreBackendConfig::Sqlite { location } => {
                let pool = db::create_pool(location, db::DatabaseOptions::default()).await?;
                db::run_migrations(&pool).await?;
                db::test_connection(&pool).await?;
                tracing::info!("Moderation store: sqlite at {}", location.display());
                (Some(pool.clone()), ModerationStore::sqlite(pool))
            }
            StoreBackendConfig::Memory => {
                tracing::warn!("Moderation store: in-memory, bans and logs are lost on restart");
                (None, ModerationStore::memory())
            }
        };

        Ok(Self::with_parts(config, db, moderation, Arc::new(PairingState::new())))
    }

    /// Assemble a context from already-built services
    pub fn with_parts(
        config: ServerConfig,
        db: Option<SqlitePool>,
        moderation: ModerationStore,
        pairing: Arc<PairingState>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db,
            moderation,
            pairing,
        }
    }

    /// Whether chat transcripts should be persisted
    pub fn chat_logging_enabled(&self) -> bool {
        self.config.chat.logging_enabled
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
