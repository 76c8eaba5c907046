/// Admin key authentication
use crate::{context::AppContext, error::ModError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

/// Proof that the request carried the configured admin key in `?key=`
#[derive(Debug, Clone)]
pub struct AdminKey;

#[async_trait]
impl FromRequestParts<AppContext> for AdminKey {
    type Rejection = ModError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let provided = Query::<KeyQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.key)
            .ok_or_else(|| ModError::Authorization("Missing admin key".to_string()))?;

        match state.config.admin.key.as_deref() {
            Some(expected) if keys_match(expected, &provided) => Ok(AdminKey),
            Some(_) => Err(ModError::Authorization("Invalid admin key".to_string())),
            None => Err(ModError::Authorization("Admin API disabled".to_string())),
        }
    }
}

/// Compare without short-circuiting on the first differing byte
fn keys_match(expected: &str, provided: &str) -> bool {
    let (a, b) = (expected.as_bytes(), provided.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secret", "secreT"));
        assert!(!keys_match("secret", "secret2"));
        assert!(!keys_match("secret", ""));
    }
}
