//! User profile endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use crate::AppState;
use crate::api::internal;
use crate::domain::UserProfile;
use crate::security::UserContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `POST /api/users/profile` - Create or refresh the caller's profile.
///
/// Called by the frontend on first sign-in. Re-posting keeps the existing
/// couple link and invite code, refreshes the email from the token, and
/// only touches the display name when one is supplied.
pub async fn create_profile(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<CreateProfileRequest>,
) -> Result<Json<UserProfile>, (StatusCode, String)> {
    let existing = state
        .store
        .get_profile(&user.user_id)
        .await
        .map_err(internal)?;

    let profile = match existing {
        Some(mut profile) => {
            profile.email = user.email.clone();
            if request.display_name.is_some() {
                profile.display_name = request.display_name;
            }
            profile
        }
        None => UserProfile {
            id: user.user_id.clone(),
            email: user.email.clone(),
            display_name: request.display_name.or_else(|| user.claims.name.clone()),
            couple_id: None,
            invite_code: None,
            created_at: Utc::now(),
        },
    };

    state.store.save_profile(&profile).await.map_err(internal)?;

    tracing::info!(user_id = %profile.id, "profile saved");
    Ok(Json(profile))
}
