/// AnonyChat moderation and live monitoring
///
/// Moderation store (ban list and chat transcripts with fail-open /
/// fail-silent policies), the admin gateway that exposes it over HTTP,
/// and the monitoring client that polls that gateway.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod metrics;
pub mod moderation;
pub mod monitor;
pub mod pairing;
pub mod server;

pub use context::AppContext;
pub use error::{ModError, ModResult};
pub use moderation::ModerationStore;
