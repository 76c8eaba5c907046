//! Shared helpers for integration tests
#![allow(dead_code)]

use anonychat_admin::{
    config::{
        AdminConfig, ChatConfig, LoggingConfig, MonitorConfig, ServerConfig, ServiceConfig,
        StorageConfig, StoreBackendConfig,
    },
    context::AppContext,
    moderation::ModerationStore,
    pairing::PairingState,
    server::build_router,
};
use std::sync::Arc;

pub const ADMIN_KEY: &str = "test-admin-key";

pub fn test_config(admin_key: Option<&str>, backend: StoreBackendConfig) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 0,
        },
        storage: StorageConfig { backend },
        admin: AdminConfig {
            key: admin_key.map(str::to_string),
        },
        chat: ChatConfig {
            logging_enabled: true,
        },
        monitor: MonitorConfig::default(),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// Serve the admin gateway on an ephemeral port; returns its base URL
pub async fn spawn_gateway(ctx: AppContext) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(ctx);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// In-memory gateway guarded by [`ADMIN_KEY`]
pub async fn memory_gateway() -> (String, AppContext) {
    let ctx = AppContext::with_parts(
        test_config(Some(ADMIN_KEY), StoreBackendConfig::Memory),
        None,
        ModerationStore::memory(),
        Arc::new(PairingState::new()),
    );
    let url = spawn_gateway(ctx.clone()).await;
    (url, ctx)
}
