//! Memory CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::api::{internal, require_couple};
use crate::domain::{Location, Memory, UserProfile};
use crate::persistence::MemoryStore;
use crate::security::UserContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    pub date: String,
    pub title: String,
    pub caption: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub activity_tags: Vec<String>,
}

/// `POST /api/memories` - Record a new memory for the caller's couple.
pub async fn create_memory(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<CreateMemoryRequest>,
) -> Result<(StatusCode, Json<Memory>), (StatusCode, String)> {
    let (profile, couple_id) = require_couple(&state, &user).await?;
    validate_date(&request.date)?;

    let now = Utc::now();
    let memory = Memory {
        id: Uuid::new_v4().to_string(),
        date: request.date,
        title: request.title,
        caption: request.caption,
        notes: request.notes,
        image_urls: request.image_urls,
        location: request.location,
        activity_tags: request.activity_tags,
        couple_id,
        created_by: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    state.store.save_memory(&memory).await.map_err(internal)?;

    tracing::info!(
        memory_id = %memory.id,
        date = %memory.date,
        has_location = memory.location.is_some(),
        "memory created"
    );

    notify_partner(&state, &profile, &memory);

    Ok((StatusCode::CREATED, Json(memory)))
}

#[derive(Debug, Deserialize)]
pub struct ListMemoriesQuery {
    /// Restrict to one calendar day (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<String>,
    /// Return only the N newest memories.
    #[serde(default)]
    pub recent: Option<usize>,
}

/// `GET /api/memories` - The couple's memories, newest date first.
pub async fn list_memories(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<ListMemoriesQuery>,
) -> Result<Json<Vec<Memory>>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;

    let memories = if let Some(date) = &query.date {
        validate_date(date)?;
        state.store.memories_on_date(&couple_id, date).await
    } else if let Some(limit) = query.recent {
        state.store.recent_memories(&couple_id, limit).await
    } else {
        state.store.memories_for_couple(&couple_id).await
    }
    .map_err(internal)?;

    Ok(Json(memories))
}

#[derive(Debug, Deserialize)]
pub struct MemoryDatesQuery {
    pub year: i32,
    pub month: u32,
}

/// `GET /api/memories/dates` - Days in a month that have memories, for the
/// calendar dot view.
pub async fn memory_dates(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<MemoryDatesQuery>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;

    if !(1..=12).contains(&query.month) {
        return Err((StatusCode::BAD_REQUEST, "month must be 1-12".to_string()));
    }

    let dates = state
        .store
        .memory_dates_in_month(&couple_id, query.year, query.month)
        .await
        .map_err(internal)?;

    Ok(Json(dates))
}

/// `GET /api/memories/{id}`
pub async fn get_memory(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<String>,
) -> Result<Json<Memory>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;
    let memory = fetch_couple_memory(&state, &couple_id, &id).await?;
    Ok(Json(memory))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemoryRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub activity_tags: Option<Vec<String>>,
}

/// `PATCH /api/memories/{id}` - Partial update; bumps `updatedAt`.
pub async fn update_memory(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<String>,
    Json(request): Json<UpdateMemoryRequest>,
) -> Result<Json<Memory>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;
    let mut memory = fetch_couple_memory(&state, &couple_id, &id).await?;

    if let Some(date) = request.date {
        validate_date(&date)?;
        memory.date = date;
    }
    if let Some(title) = request.title {
        memory.title = title;
    }
    if let Some(caption) = request.caption {
        memory.caption = caption;
    }
    if let Some(notes) = request.notes {
        memory.notes = notes;
    }
    if let Some(image_urls) = request.image_urls {
        memory.image_urls = image_urls;
    }
    if let Some(location) = request.location {
        memory.location = Some(location);
    }
    if let Some(activity_tags) = request.activity_tags {
        memory.activity_tags = activity_tags;
    }
    memory.updated_at = Utc::now();

    state.store.save_memory(&memory).await.map_err(internal)?;
    Ok(Json(memory))
}

/// `DELETE /api/memories/{id}`
pub async fn delete_memory(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;
    fetch_couple_memory(&state, &couple_id, &id).await?;
    state.store.delete_memory(&id).await.map_err(internal)?;

    tracing::info!(memory_id = %id, "memory deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a memory and confirm it belongs to the caller's couple. Another
/// couple's memory is indistinguishable from a missing one.
async fn fetch_couple_memory(
    state: &AppState,
    couple_id: &str,
    id: &str,
) -> Result<Memory, (StatusCode, String)> {
    match state.store.get_memory(id).await.map_err(internal)? {
        Some(memory) if memory.couple_id == couple_id => Ok(memory),
        _ => Err((StatusCode::NOT_FOUND, "Memory not found".to_string())),
    }
}

/// Best-effort partner notification, detached from the request. Failures
/// are logged and never surfaced to the poster.
fn notify_partner(state: &AppState, poster: &UserProfile, memory: &Memory) {
    if !state.notifier.is_configured() {
        return;
    }

    let store = Arc::clone(&state.store);
    let notifier = Arc::clone(&state.notifier);
    let couple_id = memory.couple_id.clone();
    let poster_id = poster.id.clone();
    let from_name = poster.display_name.clone().unwrap_or_else(|| {
        poster
            .email
            .split('@')
            .next()
            .unwrap_or("Your partner")
            .to_string()
    });
    let link = memory_link(&state.config.server.public_url, &memory.id);

    tokio::spawn(async move {
        let partner = match partner_email(store.as_ref(), &couple_id, &poster_id).await {
            Ok(Some(email)) => email,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = ?e, "partner lookup for notification failed");
                return;
            }
        };
        if let Err(e) = notifier.memory_posted(&partner, &from_name, &link, None).await {
            tracing::warn!(error = %e, "partner notification failed");
        }
    });
}

async fn partner_email(
    store: &dyn MemoryStore,
    couple_id: &str,
    poster_id: &str,
) -> anyhow::Result<Option<String>> {
    Ok(store.get_couple(couple_id).await?.map(|couple| {
        if couple.user_ids[0] == poster_id {
            couple.partner2_email
        } else {
            couple.partner1_email
        }
    }))
}

/// Deep link into the frontend for one memory.
fn memory_link(public_url: &str, memory_id: &str) -> String {
    url::Url::parse(public_url)
        .and_then(|base| base.join(&format!("/memories/{memory_id}")))
        .map_or_else(
            |_| format!("{}/memories/{}", public_url.trim_end_matches('/'), memory_id),
            |joined| joined.to_string(),
        )
}

/// The upstream schema for `date` is a plain `YYYY-MM-DD` string; reject
/// anything unpadded or unparseable before it reaches storage.
fn validate_date(date: &str) -> Result<(), (StatusCode, String)> {
    let well_formed = date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err((StatusCode::BAD_REQUEST, "date must be YYYY-MM-DD".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_accepts_padded_iso_days() {
        assert!(validate_date("2024-07-15").is_ok());
        assert!(validate_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_validate_date_rejects_unpadded_and_garbage() {
        for bad in ["2024-7-15", "15-07-2024", "2023-02-29", "yesterday", ""] {
            assert!(validate_date(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_memory_link_joins_against_the_public_url() {
        assert_eq!(
            memory_link("https://keepsake.example", "m1"),
            "https://keepsake.example/memories/m1"
        );
        assert_eq!(
            memory_link("not a url", "m1"),
            "not a url/memories/m1"
        );
    }
}
