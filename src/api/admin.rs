/// Admin API Endpoints
///
/// Status snapshot plus ban/unban, all guarded by the `?key=` admin key.
use crate::{
    api::models::{ActionResponse, BanRequest, StatusSnapshot, UnbanRequest},
    auth::AdminKey,
    context::AppContext,
    error::{ModError, ModResult},
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

/// Build admin API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin", get(get_status))
        .route("/admin/ban", post(ban_ip))
        .route("/admin/unban", post(unban_ip))
}

/// Live pairing state plus the ban list, newest ban first
async fn get_status(
    State(ctx): State<AppContext>,
    _admin: AdminKey,
) -> ModResult<Json<StatusSnapshot>> {
    let bans = ctx.moderation.get_banned_ips().await?;
    let pairing = ctx.pairing.snapshot().await;

    Ok(Json(StatusSnapshot::new(pairing, bans)))
}

/// Ban an address
async fn ban_ip(
    State(ctx): State<AppContext>,
    _admin: AdminKey,
    Json(req): Json<BanRequest>,
) -> ModResult<Json<ActionResponse>> {
    let ip = normalize_ip(&req.ip)?;
    let reason = req
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    ctx.moderation.ban_ip(ip, reason).await?;

    Ok(Json(ActionResponse { success: true }))
}

/// Lift a ban
async fn unban_ip(
    State(ctx): State<AppContext>,
    _admin: AdminKey,
    Json(req): Json<UnbanRequest>,
) -> ModResult<Json<ActionResponse>> {
    let ip = normalize_ip(&req.ip)?;

    ctx.moderation.unban_ip(ip).await?;

    Ok(Json(ActionResponse { success: true }))
}

fn normalize_ip(ip: &str) -> ModResult<&str> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Err(ModError::Validation("ip must not be blank".to_string()));
    }
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ip() {
        assert_eq!(normalize_ip("  203.0.113.5 ").unwrap(), "203.0.113.5");
        assert!(normalize_ip("   ").is_err());
    }
}
