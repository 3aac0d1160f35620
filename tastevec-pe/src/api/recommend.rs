//! Preference estimation endpoint
//!
//! POST /recommend takes the seed tracks, fetches their features concurrently
//! and runs the estimation pipeline on the result.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tastevec_common::Track;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{self, PreferenceEstimate};
use crate::services::FeatureFetcher;
use crate::AppState;

/// POST /recommend
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Track>>, JsonRejection>,
) -> ApiResult<Json<PreferenceEstimate>> {
    let Json(tracks) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if tracks.is_empty() {
        return Err(ApiError::BadRequest("track list is empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    tracing::info!(request_id = %request_id, tracks = tracks.len(), "Recommendation requested");

    let fetcher = FeatureFetcher::new(state.feature_provider.clone(), state.max_concurrent_fetches);
    let responses = fetcher.fetch_all(tracks, &state.shutdown).await?;

    // Numeric stages run on the blocking pool
    let config = state.pipeline;
    let estimate = tokio::task::spawn_blocking(move || pipeline::estimate_preference(responses, &config))
        .await
        .map_err(|e| ApiError::Internal(format!("pipeline task failed: {}", e)))??;

    tracing::info!(
        request_id = %request_id,
        dominant_size = estimate.diagnostics.dominant_cluster.size,
        noise = estimate.diagnostics.noise_track_ids.len(),
        excluded = estimate.diagnostics.excluded.len(),
        "Recommendation complete"
    );

    Ok(Json(estimate))
}

/// Build recommendation routes
pub fn recommend_routes() -> Router<AppState> {
    Router::new().route("/recommend", post(recommend))
}
