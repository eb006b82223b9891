//! HTTP API handlers.
//!
//! Every route sits behind the auth middleware; handlers take the caller's
//! identity from the [`UserContext`](crate::security::UserContext)
//! extractor and scope all reads and writes to the caller's couple.

pub mod map;
pub mod memories;
pub mod partners;
pub mod time_machine;
pub mod uploads;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::AppState;
use crate::domain::UserProfile;
use crate::security::UserContext;

/// All API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/profile", post(users::create_profile))
        .route("/api/partners/invite-code", get(partners::invite_code))
        .route("/api/partners/accept", post(partners::accept_invite))
        .route("/api/partners/me", get(partners::partner_info))
        .route("/api/partners/status", get(partners::partner_status))
        .route(
            "/api/memories",
            post(memories::create_memory).get(memories::list_memories),
        )
        .route("/api/memories/dates", get(memories::memory_dates))
        .route(
            "/api/memories/{id}",
            get(memories::get_memory)
                .patch(memories::update_memory)
                .delete(memories::delete_memory),
        )
        .route("/api/map/clusters", get(map::map_clusters))
        .route("/api/time-machine", get(time_machine::time_machine))
        .route("/api/uploads", post(uploads::upload_media))
}

/// Map a storage failure to a 500 response.
pub(crate) fn internal(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = ?err, "storage operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {err}"))
}

/// Resolve the caller's profile and couple id.
///
/// Memory, map, and time-machine routes require a linked couple; callers
/// without one get `403 Forbidden`, callers without a profile at all get
/// `404 Not Found`.
pub(crate) async fn require_couple(
    state: &AppState,
    user: &UserContext,
) -> Result<(UserProfile, String), (StatusCode, String)> {
    let profile = state
        .store
        .get_profile(&user.user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Profile not found".to_string()))?;

    match profile.couple_id.clone() {
        Some(couple_id) => Ok((profile, couple_id)),
        None => Err((StatusCode::FORBIDDEN, "Partner link required".to_string())),
    }
}
