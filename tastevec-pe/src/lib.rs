//! tastevec-pe library interface
//!
//! Preference Estimator: turns a handful of liked tracks into one vector of
//! high-level musical traits. Exposed as a library for integration tests
//! and benchmarks; the binary only adds configuration and the listener.

pub mod api;
pub mod error;
pub mod pipeline;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tastevec_common::config::PipelineConfig;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{FeatureProvider, TrackCatalog};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-track high-level feature source
    pub feature_provider: Arc<dyn FeatureProvider>,
    /// Recording search backend
    pub catalog: Arc<dyn TrackCatalog>,
    /// Clustering tunables
    pub pipeline: PipelineConfig,
    /// Upper bound on simultaneously outstanding feature requests
    pub max_concurrent_fetches: usize,
    /// Cancelled on shutdown; aborts in-flight feature fetches
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        feature_provider: Arc<dyn FeatureProvider>,
        catalog: Arc<dyn TrackCatalog>,
        pipeline: PipelineConfig,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            feature_provider,
            catalog,
            pipeline,
            max_concurrent_fetches,
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::recommend_routes())
        .merge(api::search_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Browser front-end is served from a different origin
        .layer(CorsLayer::permissive())
}
