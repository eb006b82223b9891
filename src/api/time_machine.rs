//! Time-machine endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;

use crate::AppState;
use crate::api::{internal, require_couple};
use crate::domain::Memory;
use crate::security::UserContext;
use crate::time_machine::recall;

/// Recall buckets plus the narrator's one-liner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMachineResponse {
    pub on_this_day: Vec<Memory>,
    pub exactly_one_month_ago: Vec<Memory>,
    pub around_one_month_ago: Vec<Memory>,
    /// Empty when every bucket is empty; the frontend hides the panel.
    pub message: String,
}

/// `GET /api/time-machine` - Memories from this day in earlier years and
/// from about one month ago, with a nostalgic message.
pub async fn time_machine(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<TimeMachineResponse>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;

    let memories = state
        .store
        .memories_for_couple(&couple_id)
        .await
        .map_err(internal)?;

    // Bucketing works on plain calendar days; the time of day is dropped
    // here and nowhere else.
    let today = Utc::now().date_naive();
    let buckets = recall(&memories, today);

    let message = if buckets.is_empty() {
        String::new()
    } else {
        state.narrator.nostalgic_message(&buckets).await
    };

    tracing::debug!(
        on_this_day = buckets.on_this_day.len(),
        exactly_one_month_ago = buckets.exactly_one_month_ago.len(),
        around_one_month_ago = buckets.around_one_month_ago.len(),
        "time machine recall"
    );

    Ok(Json(TimeMachineResponse {
        on_this_day: buckets.on_this_day,
        exactly_one_month_ago: buckets.exactly_one_month_ago,
        around_one_month_ago: buckets.around_one_month_ago,
        message,
    }))
}
