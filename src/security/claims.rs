//! JWT claims and the per-request user context.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

/// JWT payload minted by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject: the provider's user id.
    pub sub: String,
    /// Account email, copied into profiles and couple records.
    pub email: String,
    /// Display name, when the provider knows one.
    #[serde(default)]
    pub name: Option<String>,
    /// Expiration time (UNIX timestamp).
    pub exp: usize,
}

/// Per-request identity, injected by the auth middleware.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: String,
    pub email: String,
    pub claims: UserClaims,
}

impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserContext>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "Authentication required".to_string()))
    }
}
