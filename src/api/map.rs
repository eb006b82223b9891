//! Map view endpoint.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::AppState;
use crate::api::{internal, require_couple};
use crate::clusters::{Cluster, cluster_memories};
use crate::security::UserContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQuery {
    /// Clustering radius override, in kilometres.
    #[serde(default)]
    pub radius_km: Option<f64>,
}

/// `GET /api/map/clusters` - One marker per cluster of located memories.
///
/// The cluster payload carries the full member memories, so the frontend
/// can render pin badges and popups without further requests.
pub async fn map_clusters(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<MapQuery>,
) -> Result<Json<Vec<Cluster>>, (StatusCode, String)> {
    let (_, couple_id) = require_couple(&state, &user).await?;

    let memories = state
        .store
        .memories_for_couple(&couple_id)
        .await
        .map_err(internal)?;

    let located: Vec<_> = memories
        .into_iter()
        .filter(|m| m.location.is_some())
        .collect();
    let radius_km = query
        .radius_km
        .unwrap_or(state.config.recall.cluster_radius_km);
    let clusters = cluster_memories(&located, radius_km);

    tracing::debug!(
        memories = located.len(),
        clusters = clusters.len(),
        radius_km,
        "clustered map pins"
    );

    Ok(Json(clusters))
}
