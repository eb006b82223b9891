//! Bearer-JWT authentication middleware.

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{DecodingKey, Validation, decode};

use super::claims::{UserClaims, UserContext};
use crate::AppState;

/// Verify the bearer token and inject a [`UserContext`] extension.
///
/// Tokens come from the external identity provider and are verified with
/// the shared HS256 secret. When `security.jwt_required` is off, requests
/// without a token pass through anonymously; handlers that extract
/// [`UserContext`] still reject them.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(value) if value.starts_with("Bearer ") => &value[7..],
        _ => {
            if state.config.security.jwt_required {
                return Err(StatusCode::UNAUTHORIZED);
            }
            return Ok(next.run(request).await);
        }
    };

    let key = DecodingKey::from_secret(state.config.security.jwt_secret.as_bytes());
    match decode::<UserClaims>(token, &key, &Validation::default()) {
        Ok(token_data) => {
            let claims = token_data.claims;
            let context = UserContext {
                user_id: claims.sub.clone(),
                email: claims.email.clone(),
                claims,
            };
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
