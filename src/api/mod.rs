/// API routes and handlers
pub mod admin;
pub mod health;
pub mod models;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(health::routes())
        .merge(admin::routes())
}
