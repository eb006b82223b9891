//! Partner linking endpoints.
//!
//! Linking is invite-code based: one user generates a short code, the other
//! redeems it. Redeeming creates the couple record and stamps both profiles
//! with its id. There is no unlink operation.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::api::{internal, require_couple};
use crate::domain::couple::generate_invite_code;
use crate::domain::{Couple, PartnerInfo};
use crate::security::UserContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeResponse {
    pub invite_code: String,
}

/// `GET /api/partners/invite-code` - The caller's invite code, minting one
/// on first use.
pub async fn invite_code(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<InviteCodeResponse>, (StatusCode, String)> {
    let mut profile = state
        .store
        .get_profile(&user.user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Profile not found".to_string()))?;

    if let Some(code) = profile.invite_code.clone() {
        return Ok(Json(InviteCodeResponse { invite_code: code }));
    }

    // Mint until the code is unclaimed.
    let mut code = generate_invite_code();
    while state
        .store
        .profile_by_invite_code(&code)
        .await
        .map_err(internal)?
        .is_some()
    {
        code = generate_invite_code();
    }

    profile.invite_code = Some(code.clone());
    state.store.save_profile(&profile).await.map_err(internal)?;

    tracing::info!(user_id = %user.user_id, "invite code minted");
    Ok(Json(InviteCodeResponse { invite_code: code }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    pub invite_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteResponse {
    pub couple_id: String,
}

/// `POST /api/partners/accept` - Redeem an invite code and form a couple.
pub async fn accept_invite(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<AcceptInviteRequest>,
) -> Result<Json<AcceptInviteResponse>, (StatusCode, String)> {
    let code = request.invite_code.trim().to_uppercase();

    let mut inviter = state
        .store
        .profile_by_invite_code(&code)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Invalid invite code".to_string()))?;

    if inviter.couple_id.is_some() {
        return Err((
            StatusCode::CONFLICT,
            "This code's owner is already partnered".to_string(),
        ));
    }

    let mut acceptor = state
        .store
        .get_profile(&user.user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Profile not found".to_string()))?;

    if acceptor.couple_id.is_some() {
        return Err((StatusCode::CONFLICT, "You are already partnered".to_string()));
    }
    if inviter.id == acceptor.id {
        return Err((
            StatusCode::BAD_REQUEST,
            "You cannot partner with yourself".to_string(),
        ));
    }

    let couple = Couple {
        id: Uuid::new_v4().to_string(),
        user_ids: [inviter.id.clone(), acceptor.id.clone()],
        partner1_email: inviter.email.clone(),
        partner2_email: acceptor.email.clone(),
        created_at: Utc::now(),
    };
    state.store.save_couple(&couple).await.map_err(internal)?;

    // A spent code stays on the profile; redeeming it again fails the
    // already-partnered check above.
    inviter.couple_id = Some(couple.id.clone());
    acceptor.couple_id = Some(couple.id.clone());
    state.store.save_profile(&inviter).await.map_err(internal)?;
    state.store.save_profile(&acceptor).await.map_err(internal)?;

    tracing::info!(couple_id = %couple.id, "partners linked");
    Ok(Json(AcceptInviteResponse { couple_id: couple.id }))
}

/// `GET /api/partners/me` - What the caller may see about their partner.
pub async fn partner_info(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<PartnerInfo>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;

    let couple = state
        .store
        .get_couple(&couple_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Couple not found".to_string()))?;

    let partner_id = couple
        .partner_of(&user.user_id)
        .ok_or((StatusCode::NOT_FOUND, "Partner not found".to_string()))?
        .to_string();

    let partner = state
        .store
        .get_profile(&partner_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Partner not found".to_string()))?;

    Ok(Json(PartnerInfo {
        email: partner.email,
        display_name: partner.display_name,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStatusResponse {
    pub has_partner: bool,
}

/// `GET /api/partners/status` - Whether the caller is linked yet.
pub async fn partner_status(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<PartnerStatusResponse>, (StatusCode, String)> {
    let profile = state
        .store
        .get_profile(&user.user_id)
        .await
        .map_err(internal)?;

    Ok(Json(PartnerStatusResponse {
        has_partner: profile.and_then(|p| p.couple_id).is_some(),
    }))
}
